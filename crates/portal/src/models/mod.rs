//! Domain models for the portal.
//!
//! The portal holds no database of its own; the only model it owns is the
//! per-browser session state. Everything else lives in [`crate::library`]
//! as wire types.

pub mod session;

pub use session::{AuthSession, keys as session_keys};
