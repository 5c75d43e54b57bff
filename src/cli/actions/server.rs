use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::janua;
use anyhow::Result;
use url::Url;

/// Handle the server action
/// # Errors
/// Returns an error if the DSN is malformed or the server fails to start.
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            token_secret,
            token_ttl_seconds,
        } => {
            // Fail early on a malformed DSN instead of at pool creation
            let dsn = Url::parse(&dsn)?;

            let globals = GlobalArgs::new(token_secret, token_ttl_seconds);

            janua::new(port, dsn.to_string(), &globals).await?;
        }
    }

    Ok(())
}
