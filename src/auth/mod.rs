//! Request authentication core.
//!
//! The gateway decides per request whether authentication is required at all
//! (path exclusions) and, when it is, delegates to the configured strategy.
//! Strategies compose the credential codec, the user directory, the session
//! store and the durable session backing; every failure along the way
//! collapses to "no principal" rather than an error, and the only distinction
//! that survives to the HTTP layer is whether credential material was
//! presented at all.

pub mod backing;
pub mod basic;
pub mod config;
pub mod directory;
pub mod exclusions;
pub mod gateway;
pub mod request;
pub mod session;
pub mod storage;
pub mod store;
pub mod strategy;

pub use config::AuthConfig;
pub use gateway::{Access, AuthFailure, AuthGateway};
pub use strategy::{AuthAttempt, AuthStrategy, Principal, StrategyKind};
