//! Headless ball-and-wall: a tiny game runtime wired to a Gamelink bridge,
//! with an in-memory "room page" on the other side of the opener.
//!
//! ```text
//! cargo run -p ball-and-wall -- '?user_id=u1&room_id=r1&session_token=t'
//! RUST_LOG=gamelink=debug cargo run -p ball-and-wall
//! ```

use std::time::Duration;

use gamelink::host::memory::{MemoryLoader, MemoryOpener, MemoryWindow};
use gamelink::prelude::*;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

const DEFAULT_QUERY: &str =
    "?user_id=player-1&room_id=room-7&game_id=ball-and-wall&session_token=demo-token";

const TICK: Duration = Duration::from_millis(20);

// ---------------------------------------------------------------------------
// Game runtime
// ---------------------------------------------------------------------------

/// A ball bouncing between a paddle at 0 and a wall at `WIDTH`. Every wall
/// hit scores a point; the paddle misses after `misses_after` returns.
struct BallAndWall {
    loader: MemoryLoader,
}

impl BallAndWall {
    const WIDTH: i32 = 8;

    async fn play(&self, misses_after: u32) {
        let (mut x, mut dx) = (0_i32, 1_i32);
        let mut score = 0_i64;
        let mut returns = 0;

        self.loader.set_score(score);
        self.loader.mediator().emit(GAME_START);

        loop {
            tokio::time::sleep(TICK).await;
            x += dx;
            if x >= Self::WIDTH {
                dx = -1;
                score += 1;
                self.loader.set_score(score);
            } else if x <= 0 {
                if returns == misses_after {
                    break;
                }
                returns += 1;
                dx = 1;
            }
        }

        self.loader.mediator().emit(GAME_OVER);
    }
}

// ---------------------------------------------------------------------------
// Room page
// ---------------------------------------------------------------------------

/// The launching page: reads what the game posts and answers submissions.
struct RoomPage {
    opener: MemoryOpener,
    best: Option<f64>,
}

impl RoomPage {
    /// Waits for the next message from the game.
    async fn next_message(&self) -> Option<Value> {
        let poll = async {
            loop {
                if let Some(posted) = self.opener.take_messages().into_iter().next() {
                    return serde_json::from_slice::<Value>(&posted.data).ok();
                }
                tokio::time::sleep(TICK).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(2), poll)
            .await
            .ok()
            .flatten()
    }

    fn reply_to(&mut self, submission: &Value) -> Value {
        let score = submission["score"].as_f64().unwrap_or_default();
        let previous = self.best;
        let updated = previous.is_none_or(|best| score > best);
        if updated {
            self.best = Some(score);
        }
        json!({
            "type": "SCORE_SUBMISSION_SUCCESS",
            "updated": updated,
            "newScore": score,
            "previousScore": previous,
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let query = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_QUERY.to_string());
    tracing::info!("starting ball-and-wall");

    let opener = MemoryOpener::new();
    let window = MemoryWindow::with_opener(opener.clone());
    let loader = MemoryLoader::new();
    let bridge = BridgeBuilder::new()
        .game_type("ball-and-wall")
        .build(window.clone(), SessionContext::from_query(&query));

    let (ready, readiness) = Readiness::channel();
    if bridge.start_with(Some(loader.clone()), readiness).is_none() {
        for alert in window.alerts() {
            eprintln!("[alert] {alert}");
        }
        return Err("game session rejected".into());
    }
    ready.notify();
    tokio::time::sleep(TICK).await;

    let game = BallAndWall { loader };
    let mut room = RoomPage { opener, best: None };

    for misses_after in [2, 1, 4] {
        game.play(misses_after).await;
        tracing::debug!(misses_after, "play finished");

        let Some(submission) = room.next_message().await else {
            return Err("no score submitted".into());
        };
        println!("[room] received {submission}");

        let reply = room.reply_to(&submission);
        bridge.handle_message(reply.to_string().as_bytes());
    }

    for alert in window.alerts() {
        println!("[alert] {alert}");
    }

    bridge.on_unload();
    if let Some(exit) = room.next_message().await {
        println!("[room] received {exit}");
    }
    Ok(())
}
