//! `voxgate-client`
//!
//! **Responsibility:** the IO side of the voxgate client.
//!
//! This crate provides:
//! - The persisted session store (survives restarts)
//! - The HTTP authentication gateway
//! - The session context owned by the application root
//! - Bearer-authorized calls to the backend resource endpoints
//!
//! Session policy itself lives in `voxgate-auth`; this crate only wires it to
//! the network and the disk.

pub mod config;
pub mod context;
pub mod gateway;
pub mod resources;
pub mod store;
pub mod types;

pub use config::{ClientConfig, ConfigError};
pub use context::{LoginError, SessionContext};
pub use gateway::{AuthGateway, HttpGateway};
pub use resources::{RequestError, ResourceBody, ResourceClient};
pub use store::{FileStore, MemoryStore, SessionKey, SessionStore, StoreError};
