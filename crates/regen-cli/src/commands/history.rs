use anyhow::Result;

use crate::context::RuntimeContext;

pub async fn run(ctx: &RuntimeContext) -> Result<()> {
    ctx.store.reload_history().await?;
    let snapshot = ctx.store.snapshot().await;

    if snapshot.session.is_none() {
        println!("Not signed in; no history to show.");
        return Ok(());
    }
    if snapshot.history.is_empty() {
        println!("No scans yet.");
        return Ok(());
    }

    for record in &snapshot.history {
        println!(
            "{}  {}  {} (+{})",
            record.timestamp.format("%Y-%m-%d %H:%M"),
            record.item_name,
            record.disposal_method,
            record.eco_points
        );
    }
    Ok(())
}
