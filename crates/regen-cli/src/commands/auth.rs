use anyhow::Result;

use crate::context::RuntimeContext;

pub async fn login(ctx: &RuntimeContext, email: &str, password: &str) -> Result<()> {
    let session = ctx.gateway.sign_in(email, password).await?;
    println!(
        "Signed in as {}",
        session.email.as_deref().unwrap_or(session.principal_id())
    );
    Ok(())
}

pub async fn signup(
    ctx: &RuntimeContext,
    email: &str,
    password: &str,
    username: &str,
) -> Result<()> {
    match ctx.gateway.sign_up(email, password, username).await? {
        Some(session) => println!(
            "Account created; signed in as {}",
            session.email.as_deref().unwrap_or(session.principal_id())
        ),
        None => println!("Account created. Verify your email, then run `regen login`."),
    }
    Ok(())
}

pub async fn logout(ctx: &RuntimeContext) -> Result<()> {
    ctx.gateway.sign_out().await?;
    println!("Signed out.");
    Ok(())
}
