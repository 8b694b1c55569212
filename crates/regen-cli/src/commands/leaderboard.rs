use anyhow::Result;
use regen_core::BackendGateway;

use crate::context::RuntimeContext;

/// Matches the mobile app's top-50 cutoff.
const TOP_LIMIT: u32 = 50;

pub async fn run(ctx: &RuntimeContext) -> Result<()> {
    let profiles = ctx.gateway.list_top_profiles(TOP_LIMIT).await?;
    if profiles.is_empty() {
        println!("No profiles yet.");
        return Ok(());
    }

    let snapshot = ctx.store.snapshot().await;
    let current = snapshot.session.as_ref().map(|s| s.user_id.clone());

    for (index, profile) in profiles.iter().enumerate() {
        let name = if current.as_deref() == Some(profile.id.as_str()) {
            "You"
        } else {
            profile.username.as_str()
        };
        println!("{:>3}. {:<24} {} pts", index + 1, name, profile.points);
    }
    Ok(())
}
