//! Message types for the cross-window contract between an embedded game
//! and the window that launched it.
//!
//! Everything in this module travels "on the wire": it is serialized by a
//! [`Codec`](crate::Codec), handed to the host window's message channel,
//! and parsed again by the page on the other side.
//!
//! The host page is written in JavaScript, so the JSON shapes follow its
//! conventions: a `type` discriminator in SCREAMING_SNAKE_CASE and camelCase
//! field names.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Target origin meaning "deliver to whatever document the opener holds".
///
/// The opener/launcher relationship is the trust boundary for this
/// protocol, not the message origin.
pub const WILDCARD_ORIGIN: &str = "*";

// ---------------------------------------------------------------------------
// Score
// ---------------------------------------------------------------------------

/// A game score as the host page sees it: a plain JSON number.
///
/// `#[serde(transparent)]` keeps it as `42` on the wire rather than
/// `{ "0": 42 }`. Whole scores print without a trailing `.0`, so
/// `Score(100.0).to_string()` is `"100"`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(pub f64);

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<f64> for Score {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<i64> for Score {
    fn from(value: i64) -> Self {
        Self(value as f64)
    }
}

// ---------------------------------------------------------------------------
// Session identifiers
// ---------------------------------------------------------------------------

/// The identifiers echoed back to the host on every outbound message.
///
/// All fields are optional on the wire: an identifier the launcher did not
/// supply is sent as `null`, never omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIds {
    pub user_id: Option<String>,
    pub room_id: Option<String>,
    pub on_chain_room_id: Option<String>,
    pub game_id: Option<String>,
    pub session_token: Option<String>,
}

// ---------------------------------------------------------------------------
// Submission metadata
// ---------------------------------------------------------------------------

/// Summary numbers nested inside [`SubmissionMetadata`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalStats {
    /// Same value as the top-level `score`.
    pub total_score: Score,
    /// Same value as `gameDuration`, in seconds.
    pub time_played: f64,
    /// Fixed game identifier, e.g. `"ball-and-wall"`.
    pub game_type: String,
}

/// Timing and stats attached to a score submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionMetadata {
    /// Seconds between the last game start and the game over. `0` when no
    /// start was observed.
    pub game_duration: f64,
    /// ISO-8601 UTC timestamp taken when the submission was sent.
    pub game_end_time: String,
    pub final_stats: FinalStats,
}

// ---------------------------------------------------------------------------
// Outbound: game → opener
// ---------------------------------------------------------------------------

/// Messages the embedded game posts to its opener.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON, and
/// `#[serde(flatten)]` lifts the identifiers to the top level:
///
/// ```text
/// { "type": "EXIT_GAME", "userId": "u1", "roomId": "r1", ... }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboundMessage {
    /// A finished game's score, sent once per submission attempt.
    SubmitScore {
        score: Score,
        #[serde(flatten)]
        ids: SessionIds,
        metadata: SubmissionMetadata,
    },

    /// The embedded window is going away. Fire-and-forget.
    ExitGame {
        #[serde(flatten)]
        ids: SessionIds,
    },
}

impl OutboundMessage {
    /// The wire name of this message, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SubmitScore { .. } => "SUBMIT_SCORE",
            Self::ExitGame { .. } => "EXIT_GAME",
        }
    }
}

// ---------------------------------------------------------------------------
// Inbound: opener → game
// ---------------------------------------------------------------------------

/// Replies the opener posts back after a submission.
///
/// The window's message channel is shared with every other script on the
/// page, so anything with an unrecognised `type` decodes to
/// [`InboundMessage::Unknown`] instead of failing. Replies carry no
/// request id: they are matched to submissions by type alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InboundMessage {
    /// The host stored the score. `updated` is true when it beat the
    /// player's previous best.
    #[serde(rename_all = "camelCase")]
    ScoreSubmissionSuccess {
        #[serde(default)]
        updated: bool,
        #[serde(default)]
        new_score: Option<Score>,
        #[serde(default)]
        previous_score: Option<Score>,
    },

    /// The host rejected the score.
    ScoreSubmissionError {
        #[serde(default)]
        error: Option<String>,
    },

    /// Any other message type.
    #[serde(other)]
    Unknown,
}

impl InboundMessage {
    /// The wire name of this message, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ScoreSubmissionSuccess { .. } => "SCORE_SUBMISSION_SUCCESS",
            Self::ScoreSubmissionError { .. } => "SCORE_SUBMISSION_ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The host page parses these shapes by hand, so the tests pin the
    //! exact JSON rather than just checking that values survive a trip.

    use super::*;

    fn ids() -> SessionIds {
        SessionIds {
            user_id: Some("u-1".into()),
            room_id: Some("room-9".into()),
            on_chain_room_id: None,
            game_id: Some("g-3".into()),
            session_token: Some("tok".into()),
        }
    }

    #[test]
    fn test_score_serializes_as_plain_number() {
        let json = serde_json::to_value(Score(42.0)).unwrap();
        assert_eq!(json.as_f64(), Some(42.0));
    }

    #[test]
    fn test_score_display_drops_trailing_zero() {
        assert_eq!(Score(100.0).to_string(), "100");
        assert_eq!(Score(12.5).to_string(), "12.5");
    }

    #[test]
    fn test_score_from_integer() {
        assert_eq!(Score::from(7_i64), Score(7.0));
    }

    #[test]
    fn test_submit_score_json_format() {
        let msg = OutboundMessage::SubmitScore {
            score: Score(42.0),
            ids: ids(),
            metadata: SubmissionMetadata {
                game_duration: 1.5,
                game_end_time: "2024-01-01T00:00:00.000Z".into(),
                final_stats: FinalStats {
                    total_score: Score(42.0),
                    time_played: 1.5,
                    game_type: "ball-and-wall".into(),
                },
            },
        };
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "SUBMIT_SCORE");
        assert_eq!(json["score"].as_f64(), Some(42.0));
        assert_eq!(json["userId"], "u-1");
        assert_eq!(json["roomId"], "room-9");
        assert_eq!(json["gameId"], "g-3");
        assert_eq!(json["sessionToken"], "tok");
        assert_eq!(json["metadata"]["gameDuration"].as_f64(), Some(1.5));
        assert_eq!(json["metadata"]["gameEndTime"], "2024-01-01T00:00:00.000Z");
        assert_eq!(
            json["metadata"]["finalStats"]["totalScore"].as_f64(),
            Some(42.0)
        );
        assert_eq!(json["metadata"]["finalStats"]["timePlayed"].as_f64(), Some(1.5));
        assert_eq!(json["metadata"]["finalStats"]["gameType"], "ball-and-wall");
    }

    #[test]
    fn test_missing_identifier_is_null_not_omitted() {
        let msg = OutboundMessage::ExitGame { ids: ids() };
        let json = serde_json::to_value(&msg).unwrap();

        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("onChainRoomId"));
        assert!(json["onChainRoomId"].is_null());
    }

    #[test]
    fn test_exit_game_json_format() {
        let msg = OutboundMessage::ExitGame { ids: ids() };
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "EXIT_GAME");
        assert_eq!(json["userId"], "u-1");
        assert_eq!(json["sessionToken"], "tok");
        assert_eq!(json.as_object().unwrap().len(), 6);
    }

    #[test]
    fn test_outbound_decodes_from_host_view() {
        // The in-memory host decodes what the bridge sent.
        let msg = OutboundMessage::ExitGame { ids: ids() };
        let bytes = serde_json::to_vec(&msg).unwrap();
        let decoded: OutboundMessage = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_outbound_kind() {
        let msg = OutboundMessage::ExitGame { ids: ids() };
        assert_eq!(msg.kind(), "EXIT_GAME");
    }

    #[test]
    fn test_success_reply_parses_camel_case_fields() {
        let raw = r#"{"type":"SCORE_SUBMISSION_SUCCESS","updated":false,"newScore":50,"previousScore":80}"#;
        let msg: InboundMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(
            msg,
            InboundMessage::ScoreSubmissionSuccess {
                updated: false,
                new_score: Some(Score(50.0)),
                previous_score: Some(Score(80.0)),
            }
        );
    }

    #[test]
    fn test_success_reply_tolerates_missing_fields() {
        let raw = r#"{"type":"SCORE_SUBMISSION_SUCCESS","newScore":10,"previousScore":null}"#;
        let msg: InboundMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(
            msg,
            InboundMessage::ScoreSubmissionSuccess {
                updated: false,
                new_score: Some(Score(10.0)),
                previous_score: None,
            }
        );
    }

    #[test]
    fn test_error_reply_parses() {
        let raw = r#"{"type":"SCORE_SUBMISSION_ERROR","error":"room closed"}"#;
        let msg: InboundMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(
            msg,
            InboundMessage::ScoreSubmissionError {
                error: Some("room closed".into())
            }
        );
        assert_eq!(msg.kind(), "SCORE_SUBMISSION_ERROR");
    }

    #[test]
    fn test_unknown_type_decodes_to_unknown() {
        let raw = r#"{"type":"WEBPACK_HOT_UPDATE","hash":"abc"}"#;
        let msg: InboundMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(msg, InboundMessage::Unknown);
    }

    #[test]
    fn test_untagged_payload_is_a_decode_error() {
        let result: Result<InboundMessage, _> = serde_json::from_str(r#""hello""#);
        assert!(result.is_err());
    }
}
