//! Text shown to the player.

use gamelink_protocol::Score;

pub const INVALID_SESSION: &str =
    "Invalid game session. Please return to the game room and try again.";

pub const OPENER_UNAVAILABLE: &str =
    "Unable to submit score. Please ensure the game room tab is still open.";

/// Message for a `SCORE_SUBMISSION_SUCCESS` reply.
pub fn submission_success(
    updated: bool,
    new_score: Option<Score>,
    previous_score: Option<Score>,
) -> String {
    let new_score = display_score(new_score);
    if updated {
        format!("New High Score: {new_score}!")
    } else {
        format!("Score: {new_score} (Best: {})", display_score(previous_score))
    }
}

/// Message for a `SCORE_SUBMISSION_ERROR` reply.
pub fn submission_error(error: Option<&str>) -> String {
    format!("Error submitting score: {}", error.unwrap_or("unknown error"))
}

fn display_score(score: Option<Score>) -> String {
    score.map_or_else(|| "none".to_string(), |s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_high_score() {
        let text = submission_success(true, Some(Score(100.0)), Some(Score(80.0)));
        assert_eq!(text, "New High Score: 100!");
    }

    #[test]
    fn test_not_a_high_score_shows_best() {
        let text = submission_success(false, Some(Score(50.0)), Some(Score(80.0)));
        assert_eq!(text, "Score: 50 (Best: 80)");
    }

    #[test]
    fn test_missing_scores_render_as_none() {
        assert_eq!(submission_success(false, None, None), "Score: none (Best: none)");
    }

    #[test]
    fn test_error_text() {
        assert_eq!(
            submission_error(Some("room closed")),
            "Error submitting score: room closed"
        );
        assert_eq!(submission_error(None), "Error submitting score: unknown error");
    }
}
