//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the
//! appropriate action, such as starting the API server with its full
//! configuration state.

use crate::auth::config::{parse_session_duration, DEFAULT_SESSION_COOKIE};
use crate::auth::StrategyKind;
use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::auth;
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
///
/// Returns an error if the strategy name is unknown.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches.get_one::<String>("dsn").cloned();

    let strategy = matches
        .get_one::<String>(auth::ARG_STRATEGY)
        .map_or("session", String::as_str)
        .parse::<StrategyKind>()?;

    let cookie_name = matches
        .get_one::<String>(auth::ARG_SESSION_COOKIE)
        .cloned()
        .unwrap_or_else(|| DEFAULT_SESSION_COOKIE.to_string());

    // Lenient on purpose: a malformed duration means "no expiry".
    let session_duration = matches
        .get_one::<String>(auth::ARG_SESSION_DURATION)
        .map_or(0, |value| parse_session_duration(value));

    let excluded_paths = matches
        .get_many::<String>(auth::ARG_EXCLUDE_PATH)
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let cookie_secure = matches.get_flag(auth::ARG_COOKIE_SECURE);

    Ok(Action::Server(Args {
        port,
        dsn,
        strategy,
        cookie_name,
        session_duration,
        excluded_paths,
        cookie_secure,
    }))
}
