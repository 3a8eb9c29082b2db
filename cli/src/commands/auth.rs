//! Auth commands
//!
//! A successful login stores the token in the active profile.

use anyhow::{bail, Result};
use colored::Colorize;
use erp_sdk::{AuthSession, Credentials, OtpTarget};

use super::Context;
use crate::config::Config;
use crate::{AuthCommands, OtpCommands};

fn target(phone: Option<String>, email: Option<String>) -> Result<OtpTarget> {
    match (phone, email) {
        (Some(phone), None) => Ok(OtpTarget::Phone(phone)),
        (None, Some(email)) => Ok(OtpTarget::Email(email)),
        _ => bail!("pass exactly one of --phone or --email"),
    }
}

fn remember(ctx: &Context, session: &AuthSession) -> Result<()> {
    let profile = ctx.profile.as_deref();
    let mut config = Config::load(profile)?;
    config.token = Some(session.token.clone());
    let path = config.save(profile)?;
    println!(
        "{} Logged in as {} (token saved to {})",
        "✓".green(),
        session.user.name.bold(),
        path.display()
    );
    Ok(())
}

pub async fn handle(action: AuthCommands, ctx: &Context) -> Result<()> {
    match action {
        AuthCommands::Login { email, password } => {
            let session = ctx.client.login(&Credentials { email, password }).await?;
            remember(ctx, &session)?;
        }
        AuthCommands::Otp { action: OtpCommands::Send { phone, email } } => {
            ctx.client.send_otp(&target(phone, email)?).await?;
            println!("One-time password sent");
        }
        AuthCommands::Otp { action: OtpCommands::Verify { phone, email, code } } => {
            let session = ctx.client.verify_otp(&target(phone, email)?, &code).await?;
            remember(ctx, &session)?;
        }
    }
    Ok(())
}
