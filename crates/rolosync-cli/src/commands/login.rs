use crate::commands::{print_json, Context};
use anyhow::{Context as _, Result};
use rolosync_config as config;
use rolosync_google::auth::{Authenticator, ClientSecrets};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct LoginReport {
    token_path: String,
}

pub fn login(ctx: &Context<'_>) -> Result<()> {
    let secrets = ClientSecrets::from_file(&ctx.config.credentials_path).with_context(|| {
        format!(
            "read credentials {}",
            ctx.config.credentials_path.display()
        )
    })?;
    let token_path = config::resolve_token_path(ctx.config.token_path.clone())
        .with_context(|| "resolve token path")?;
    let auth = Authenticator::new(secrets, token_path.clone())?;
    auth.login().with_context(|| "authorize")?;

    if ctx.json {
        return print_json(&LoginReport {
            token_path: token_path.display().to_string(),
        });
    }
    println!("Authorized. Token saved to {}", token_path.display());
    Ok(())
}
