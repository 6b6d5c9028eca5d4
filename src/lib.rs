//! # Gardisto
//!
//! `gardisto` authenticates HTTP API requests with interchangeable
//! strategies: static `Basic` credentials decoded from the Authorization
//! header, or server-side session tokens carried in a cookie, optionally
//! with expiration and durable persistence.
//!
//! ## Strategies
//!
//! - **basic**: credentials travel on every request; no server state.
//! - **session**: opaque random tokens resolved against the in-memory store.
//! - **expiring**: session tokens with a read-time expiry judgment; expired
//!   records are treated as absent, not eagerly swept.
//! - **persisted**: sessions are mirrored to durable records; the durable
//!   store is authoritative and the in-memory map is a warm cache restored
//!   at startup.
//!
//! ## Path exclusions
//!
//! Routes listed as exclusions (literal paths, or prefixes with a trailing
//! `*`) skip authentication entirely. Everything else requires a principal:
//! requests with no credential material get `401`, requests with rejected
//! credentials get `403`.

pub mod api;
pub mod auth;
pub mod cli;
pub mod redact;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
