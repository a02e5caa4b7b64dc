//! Launch session handling for Gamelink.
//!
//! An embedded game is opened by a host window with its session encoded
//! in the URL query string. This crate turns that query string into an
//! immutable [`SessionContext`] and decides, once, whether the session is
//! usable.
//!
//! # How it fits in the stack
//!
//! ```text
//! Bridge (above)   ← refuses to start or submit without a valid context
//!     ↕
//! Session (this crate)   ← parses and validates launch parameters
//!     ↕
//! Protocol (below)   ← provides SessionIds for outbound messages
//! ```
//!
//! The session token is opaque here. It is carried back to the host with
//! each message; verifying it is the host's job.

mod context;
mod error;
pub mod params;

pub use context::SessionContext;
pub use error::SessionError;
