use anyhow::Result;

use crate::context::RuntimeContext;

pub async fn run(ctx: &RuntimeContext) -> Result<()> {
    let snapshot = ctx.store.snapshot().await;

    match &snapshot.session {
        Some(session) => {
            let who = if snapshot.username.is_empty() {
                session.principal_id()
            } else {
                &snapshot.username
            };
            println!("Signed in as {}", who);
            println!("Eco-points: {}", snapshot.points);
            println!("Scans: {}", snapshot.history.len());
        }
        None => println!("Not signed in."),
    }
    println!("Theme: {}", snapshot.theme.as_str());
    Ok(())
}

pub async fn toggle_theme(ctx: &RuntimeContext) -> Result<()> {
    let theme = ctx.store.toggle_theme().await?;
    println!("Theme set to {}", theme.as_str());
    Ok(())
}
