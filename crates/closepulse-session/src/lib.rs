//! Authentication session management for ClosePulse
//!
//! [`SessionStore`] owns the signed-in identity, persists it on request
//! through a [`KeyValueStore`] and restores it on the next start.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod credentials;
pub mod error;
pub mod storage;
pub mod store;

pub use credentials::{CredentialVerifier, StaticCredentials};
pub use error::{ErrorKind, SessionError, SessionResult, UNEXPECTED_MESSAGE};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{
    LOGIN_SUCCESS_MESSAGE, PASSWORD_RESET_MESSAGE, SessionHandle, SessionSettings, SessionStore,
};
