//! Wire protocol for Gamelink.
//!
//! This crate defines the messages an embedded game and its launching
//! window exchange:
//!
//! - **Types** ([`OutboundMessage`], [`InboundMessage`], [`Score`], etc.):
//!   the closed set of message shapes on the cross-window channel.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong while doing so.
//!
//! # Message flow
//!
//! ```text
//! game ── SUBMIT_SCORE ──────────────▶ opener
//! game ◀─ SCORE_SUBMISSION_SUCCESS ─── opener
//! game ◀─ SCORE_SUBMISSION_ERROR ───── opener
//! game ── EXIT_GAME ─────────────────▶ opener   (on unload)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    FinalStats, InboundMessage, OutboundMessage, Score, SessionIds,
    SubmissionMetadata, WILDCARD_ORIGIN,
};
