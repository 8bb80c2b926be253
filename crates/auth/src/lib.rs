//! `voxgate-auth` — session and navigation policy for the voxgate client.
//!
//! This crate is intentionally decoupled from HTTP and storage: the reducer
//! returns the store effect it wants applied, and the guard only reads an
//! in-memory [`Session`].

pub mod error;
pub mod guard;
pub mod reducer;
pub mod roles;
pub mod session;

pub use error::AuthError;
pub use guard::{resolve, settle, Decision, Route, LOGIN_PATH};
pub use reducer::{reduce, SessionEvent, Transition};
pub use roles::{Role, UnknownRole};
pub use session::{Session, SessionGrant, SessionStatus};
