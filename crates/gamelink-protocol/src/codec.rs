//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The bridge doesn't care HOW messages are serialized; it hands the
//! encoded bytes to the host window, which forwards them to the opener.
//!
//! The host page speaks JSON, so [`JsonCodec`] is the only implementation
//! today. Tests and alternative hosts can plug in their own.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because the codec lives inside the bridge's
/// shared state, which is reached from spawned lifecycle tasks.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or
    /// don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use gamelink_protocol::{Codec, InboundMessage, JsonCodec};
///
/// let codec = JsonCodec;
///
/// let bytes = br#"{"type":"SCORE_SUBMISSION_ERROR","error":"room closed"}"#;
/// let reply: InboundMessage = codec.decode(bytes).unwrap();
///
/// assert_eq!(
///     reply,
///     InboundMessage::ScoreSubmissionError { error: Some("room closed".into()) },
/// );
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{InboundMessage, OutboundMessage, SessionIds};

    #[test]
    fn test_json_codec_encodes_exit_game() {
        let msg = OutboundMessage::ExitGame {
            ids: SessionIds {
                user_id: Some("u".into()),
                ..SessionIds::default()
            },
        };
        let bytes = JsonCodec.encode(&msg).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with(r#"{"type":"EXIT_GAME""#));
    }

    #[test]
    fn test_json_codec_decode_garbage_is_decode_error() {
        let result: Result<InboundMessage, _> = JsonCodec.decode(b"not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
