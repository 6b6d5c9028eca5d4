//! Authentication configuration assembled at startup.

use super::exclusions::ExclusionPattern;
use super::strategy::StrategyKind;

pub const DEFAULT_SESSION_COOKIE: &str = "gardisto_session";

/// Paths the API itself must keep public: health, the OpenAPI document,
/// registration and the auth endpoints. Operator patterns are appended.
const BUILTIN_EXCLUDED_PATHS: &[&str] = &["/health", "/v1/openapi.json", "/v1/users", "/v1/auth/*"];

#[derive(Clone, Debug)]
pub struct AuthConfig {
    cookie_name: String,
    session_duration_seconds: i64,
    excluded_paths: Vec<ExclusionPattern>,
    strategy: StrategyKind,
    cookie_secure: bool,
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            session_duration_seconds: 0,
            excluded_paths: BUILTIN_EXCLUDED_PATHS
                .iter()
                .map(|pattern| ExclusionPattern::parse(pattern))
                .collect(),
            strategy: StrategyKind::Session,
            cookie_secure: false,
        }
    }

    #[must_use]
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Non-positive means sessions never expire.
    #[must_use]
    pub fn with_session_duration_seconds(mut self, seconds: i64) -> Self {
        self.session_duration_seconds = seconds;
        self
    }

    /// Append operator exclusions to the built-in public paths.
    #[must_use]
    pub fn with_excluded_paths<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.excluded_paths.extend(
            patterns
                .into_iter()
                .map(|pattern| ExclusionPattern::parse(pattern.as_ref())),
        );
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    #[must_use]
    pub fn session_duration_seconds(&self) -> i64 {
        self.session_duration_seconds
    }

    #[must_use]
    pub fn excluded_paths(&self) -> &[ExclusionPattern] {
        &self.excluded_paths
    }

    #[must_use]
    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a session duration; malformed values mean "no expiry".
#[must_use]
pub fn parse_session_duration(value: &str) -> i64 {
    value.trim().parse().unwrap_or(0)
}
