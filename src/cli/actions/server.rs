use crate::api;
use crate::auth::{AuthConfig, StrategyKind};
use anyhow::{Context, Result};
use url::Url;

/// Validated server configuration.
#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<String>,
    pub strategy: StrategyKind,
    pub cookie_name: String,
    pub session_duration: i64,
    pub excluded_paths: Vec<String>,
    pub cookie_secure: bool,
}

/// Execute the server action.
///
/// # Errors
///
/// Returns an error if the database connection, session restore, or the
/// server itself fails to start.
pub async fn execute(args: Args) -> Result<()> {
    // Validate the DSN shape before handing it to the pool.
    let dsn = args
        .dsn
        .map(|dsn| {
            Url::parse(&dsn)
                .map(|parsed| parsed.to_string())
                .context("invalid database connection string")
        })
        .transpose()?;

    let config = AuthConfig::new()
        .with_strategy(args.strategy)
        .with_cookie_name(args.cookie_name)
        .with_session_duration_seconds(args.session_duration)
        .with_excluded_paths(args.excluded_paths.iter().map(String::as_str))
        .with_cookie_secure(args.cookie_secure);

    api::new(args.port, dsn, config).await
}
