use clap::{Arg, ArgAction, Command};

pub const ARG_STRATEGY: &str = "auth-strategy";
pub const ARG_SESSION_COOKIE: &str = "session-cookie";
pub const ARG_SESSION_DURATION: &str = "session-duration";
pub const ARG_EXCLUDE_PATH: &str = "exclude-path";
pub const ARG_COOKIE_SECURE: &str = "cookie-secure";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_STRATEGY)
                .long(ARG_STRATEGY)
                .help("Authentication strategy: basic, session, expiring or persisted")
                .env("GARDISTO_AUTH_STRATEGY")
                .default_value("session"),
        )
        .arg(
            Arg::new(ARG_SESSION_COOKIE)
                .long(ARG_SESSION_COOKIE)
                .help("Cookie name carrying the session token")
                .env("GARDISTO_SESSION_COOKIE")
                .default_value("gardisto_session"),
        )
        .arg(
            Arg::new(ARG_SESSION_DURATION)
                .long(ARG_SESSION_DURATION)
                .help("Session lifetime in seconds; 0 or a malformed value means sessions never expire")
                .env("SESSION_DURATION")
                .default_value("0"),
        )
        .arg(
            Arg::new(ARG_EXCLUDE_PATH)
                .long(ARG_EXCLUDE_PATH)
                .help("Path exempt from authentication; a trailing * matches by prefix (repeatable)")
                .env("GARDISTO_EXCLUDED_PATHS")
                .value_delimiter(',')
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new(ARG_COOKIE_SECURE)
                .long(ARG_COOKIE_SECURE)
                .help("Mark the session cookie Secure")
                .env("GARDISTO_COOKIE_SECURE")
                .action(ArgAction::SetTrue),
        )
}
