//! Login, logout and session introspection endpoints.

pub(crate) mod login;
pub(crate) mod session;
pub(crate) mod types;

pub(crate) use login::login;
pub(crate) use session::{logout, session};
