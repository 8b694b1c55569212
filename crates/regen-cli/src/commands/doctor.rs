use anyhow::Result;
use regen_core::BackendGateway;

use crate::context::RuntimeContext;

/// One-time connectivity diagnostic; a failure here is a notice, not a
/// reason to abort other commands.
pub async fn run(ctx: &RuntimeContext) -> Result<()> {
    match ctx.client.check_connectivity().await {
        Ok(reply) => println!("Vision model reachable (replied: {reply:?})"),
        Err(err) => println!("Vision model unreachable: {err}"),
    }

    match ctx.gateway.current_session().await? {
        Some(_) => println!("Backend session: active"),
        None => println!("Backend session: none (run `regen login`)"),
    }
    Ok(())
}
