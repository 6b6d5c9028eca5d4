//! Path exclusion rules deciding whether a request must authenticate.

/// A configured path exempt from authentication.
///
/// Patterns ending with `*` match by prefix; everything else matches the
/// normalized path exactly. Parsed once at configuration time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExclusionPattern {
    Exact(String),
    Prefix(String),
}

impl ExclusionPattern {
    #[must_use]
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix('*') {
            Some(prefix) => Self::Prefix(prefix.to_string()),
            None => Self::Exact(normalize(pattern)),
        }
    }

    fn matches(&self, normalized_path: &str) -> bool {
        match self {
            Self::Exact(exact) => normalized_path == exact,
            Self::Prefix(prefix) => normalized_path.starts_with(prefix.as_str()),
        }
    }
}

/// Strip any trailing separators, then append exactly one, so `/foo`,
/// `/foo/` and `/foo//` compare equal.
fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    format!("{trimmed}/")
}

/// Whether a request to `path` requires authentication.
///
/// An empty path or an empty exclusion list always requires authentication.
/// The first matching exclusion grants exemption.
#[must_use]
pub fn requires_auth(path: &str, excluded: &[ExclusionPattern]) -> bool {
    if path.is_empty() || excluded.is_empty() {
        return true;
    }
    let normalized = normalize(path);
    !excluded.iter().any(|pattern| pattern.matches(&normalized))
}
