//! Integration tests: the bridge against the in-memory host window.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use gamelink::host::memory::{MemoryLoader, MemoryOpener, MemoryWindow};
use gamelink::prelude::*;
use gamelink::{INVALID_SESSION, OPENER_UNAVAILABLE};
use serde_json::{json, Value};

// =========================================================================
// Helpers
// =========================================================================

const VALID_QUERY: &str = "?user_id=u1&room_id=r1&on_chain_room_id=42\
    &game_id=g1&session_token=tok&game_name=Ball%20and%20Wall";

fn launch_time() -> DateTime<Utc> {
    // 2023-11-14T22:13:20Z
    DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
}

struct Page {
    opener: MemoryOpener,
    window: MemoryWindow,
    loader: MemoryLoader,
    clock: Arc<ManualClock>,
    bridge: Arc<Bridge<MemoryWindow>>,
}

fn page_with(query: &str, builder: BridgeBuilder) -> Page {
    let opener = MemoryOpener::new();
    let window = MemoryWindow::with_opener(opener.clone());
    let clock = Arc::new(ManualClock::new(launch_time()));
    let bridge = builder
        .clock(clock.clone())
        .build(window.clone(), SessionContext::from_query(query));
    Page {
        opener,
        window,
        loader: MemoryLoader::new(),
        clock,
        bridge,
    }
}

fn page() -> Page {
    page_with(VALID_QUERY, BridgeBuilder::new())
}

fn posted_json(opener: &MemoryOpener) -> Vec<Value> {
    opener
        .messages()
        .iter()
        .map(|m| serde_json::from_slice(&m.data).unwrap())
        .collect()
}

/// Lets spawned bridge tasks catch up with what the test just did.
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

/// Starts the bridge with hooks attached immediately and waits for them.
async fn start_attached(page: &Page) {
    page.bridge
        .start_with(Some(page.loader.clone()), Readiness::Immediate)
        .expect("valid session should start");
    settle().await;
    assert_eq!(page.loader.mediator().listener_count(GAME_OVER), 1);
}

// =========================================================================
// Session validation
// =========================================================================

#[tokio::test]
async fn test_invalid_session_alerts_and_closes_once() {
    let page = page_with("?user_id=u1&room_id=r1", BridgeBuilder::new());

    let handle = page.bridge.start(Some(page.loader.clone()));

    assert!(handle.is_none(), "no lifecycle task for an invalid session");
    assert_eq!(page.window.alerts(), vec![INVALID_SESSION.to_string()]);
    assert_eq!(page.window.close_requests(), 1);
    assert!(page.opener.messages().is_empty());

    settle().await;
    assert_eq!(page.loader.mediator().listener_count(GAME_START), 0);
}

#[tokio::test]
async fn test_empty_token_counts_as_missing() {
    let page = page_with(
        "?user_id=u1&room_id=r1&session_token=",
        BridgeBuilder::new(),
    );
    assert!(page.bridge.start(Some(page.loader.clone())).is_none());
    assert_eq!(page.window.alerts().len(), 1);
}

#[tokio::test]
async fn test_submit_with_invalid_session_posts_nothing() {
    let page = page_with("", BridgeBuilder::new());

    let outcome = page
        .bridge
        .submit_score(Score(10.0), &PlayTiming::new())
        .unwrap();

    assert_eq!(outcome, SubmitOutcome::InvalidSession);
    assert!(page.opener.messages().is_empty());
    assert_eq!(page.window.alerts(), vec![INVALID_SESSION.to_string()]);
    assert_eq!(page.window.close_requests(), 1);
}

#[tokio::test]
async fn test_start_is_idempotent() {
    let page = page();
    assert!(page
        .bridge
        .start_with(Some(page.loader.clone()), Readiness::Immediate)
        .is_some());
    assert!(page
        .bridge
        .start_with(Some(page.loader.clone()), Readiness::Immediate)
        .is_none());

    settle().await;
    assert_eq!(page.loader.mediator().listener_count(GAME_OVER), 1);
}

#[tokio::test]
async fn test_build_from_url_rejects_garbage() {
    let result = BridgeBuilder::new().build_from_url(MemoryWindow::orphan(), "not a url");
    assert!(matches!(result, Err(GamelinkError::Session(_))));
}

#[tokio::test]
async fn test_build_from_url_reads_query() {
    let bridge = BridgeBuilder::new()
        .build_from_url(
            MemoryWindow::orphan(),
            "https://games.example/ball?user_id=u&room_id=r&session_token=t",
        )
        .unwrap();
    assert!(bridge.session().is_valid());
    assert_eq!(bridge.session().user_id(), Some("u"));
}

// =========================================================================
// Score submission
// =========================================================================

#[tokio::test]
async fn test_submit_score_message_shape() {
    let page = page();
    let mut timing = PlayTiming::new();
    timing.record_start(page.clock.now());
    page.clock.advance(Duration::from_millis(12_500));
    timing.record_end(page.clock.now());

    let outcome = page.bridge.submit_score(Score(42.0), &timing).unwrap();
    assert_eq!(outcome, SubmitOutcome::Sent);

    let posted = page.opener.messages();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].target_origin, "*");

    let msg: Value = serde_json::from_slice(&posted[0].data).unwrap();
    assert_eq!(msg["type"], "SUBMIT_SCORE");
    assert_eq!(msg["score"].as_f64(), Some(42.0));
    assert_eq!(msg["userId"], "u1");
    assert_eq!(msg["roomId"], "r1");
    assert_eq!(msg["onChainRoomId"], "42");
    assert_eq!(msg["gameId"], "g1");
    assert_eq!(msg["sessionToken"], "tok");

    let metadata = &msg["metadata"];
    assert_eq!(metadata["gameDuration"].as_f64(), Some(12.5));
    assert_eq!(metadata["gameEndTime"], "2023-11-14T22:13:32.500Z");
    assert_eq!(
        metadata["finalStats"],
        json!({ "totalScore": 42.0, "timePlayed": 12.5, "gameType": "ball-and-wall" })
    );
}

#[tokio::test]
async fn test_missing_optional_ids_are_null() {
    let page = page_with(
        "?user_id=u1&room_id=r1&session_token=tok",
        BridgeBuilder::new(),
    );
    page.bridge.submit_score(Score(1.0), &PlayTiming::new()).unwrap();

    let msg = &posted_json(&page.opener)[0];
    assert!(msg["onChainRoomId"].is_null());
    assert!(msg["gameId"].is_null());
    assert_eq!(msg["metadata"]["gameDuration"].as_f64(), Some(0.0));
}

#[tokio::test]
async fn test_submit_with_closed_opener_alerts_only() {
    let page = page();
    page.opener.close();

    let outcome = page
        .bridge
        .submit_score(Score(42.0), &PlayTiming::new())
        .unwrap();

    assert_eq!(outcome, SubmitOutcome::OpenerUnavailable);
    assert!(page.opener.messages().is_empty());
    assert_eq!(page.window.alerts(), vec![OPENER_UNAVAILABLE.to_string()]);
    assert_eq!(page.window.close_requests(), 0);
}

#[tokio::test]
async fn test_submit_from_orphan_window_alerts_only() {
    let window = MemoryWindow::orphan();
    let bridge = BridgeBuilder::new()
        .build(window.clone(), SessionContext::from_query(VALID_QUERY));

    let outcome = bridge.submit_score(Score(7.0), &PlayTiming::new()).unwrap();

    assert_eq!(outcome, SubmitOutcome::OpenerUnavailable);
    assert_eq!(window.alerts(), vec![OPENER_UNAVAILABLE.to_string()]);
}

#[tokio::test]
async fn test_rejected_post_is_an_error() {
    let page = page();
    page.opener.reject_posts(true);

    let result = page.bridge.submit_score(Score(1.0), &PlayTiming::new());

    assert!(matches!(
        result,
        Err(GamelinkError::Host(HostError::PostFailed(_)))
    ));
    assert!(page.window.alerts().is_empty());
}

#[tokio::test]
async fn test_configured_origin_and_game_type() {
    let page = page_with(
        VALID_QUERY,
        BridgeBuilder::new()
            .target_origin("https://rooms.example")
            .game_type("brick-breaker"),
    );
    page.bridge.submit_score(Score(3.0), &PlayTiming::new()).unwrap();

    let posted = page.opener.messages();
    assert_eq!(posted[0].target_origin, "https://rooms.example");
    let msg: Value = serde_json::from_slice(&posted[0].data).unwrap();
    assert_eq!(msg["metadata"]["finalStats"]["gameType"], "brick-breaker");
}

#[tokio::test]
async fn test_repeated_submissions_are_not_deduplicated() {
    let page = page();
    page.bridge.submit_score(Score(5.0), &PlayTiming::new()).unwrap();
    page.bridge.submit_score(Score(5.0), &PlayTiming::new()).unwrap();
    assert_eq!(page.opener.messages().len(), 2);
}

// =========================================================================
// Replies from the opener
// =========================================================================

#[tokio::test]
async fn test_success_reply_new_high_score() {
    let page = page();
    let reply = json!({
        "type": "SCORE_SUBMISSION_SUCCESS",
        "updated": true,
        "newScore": 100,
        "previousScore": 80,
    });

    page.bridge.handle_message(reply.to_string().as_bytes());

    assert_eq!(page.window.alerts(), vec!["New High Score: 100!".to_string()]);
    assert!(page.bridge.has_submitted());
}

#[tokio::test]
async fn test_success_reply_not_a_high_score() {
    let page = page();
    let reply = json!({
        "type": "SCORE_SUBMISSION_SUCCESS",
        "updated": false,
        "newScore": 50,
        "previousScore": 80,
    });

    page.bridge.handle_message(reply.to_string().as_bytes());

    assert_eq!(page.window.alerts(), vec!["Score: 50 (Best: 80)".to_string()]);
}

#[tokio::test]
async fn test_error_reply_shows_host_error() {
    let page = page();
    let reply = json!({ "type": "SCORE_SUBMISSION_ERROR", "error": "room closed" });

    page.bridge.handle_message(reply.to_string().as_bytes());

    assert_eq!(
        page.window.alerts(),
        vec!["Error submitting score: room closed".to_string()]
    );
    assert!(!page.bridge.has_submitted());
}

#[tokio::test]
async fn test_unknown_and_garbage_messages_are_ignored() {
    let page = page();

    page.bridge
        .handle_message(json!({ "type": "PING", "n": 1 }).to_string().as_bytes());
    page.bridge.handle_message(b"definitely not json");
    page.bridge.handle_message(b"{\"no_type\": true}");

    assert!(page.window.alerts().is_empty());
    assert_eq!(page.window.close_requests(), 0);
    assert!(page.opener.messages().is_empty());
    assert!(!page.bridge.has_submitted());
}

// =========================================================================
// Unload
// =========================================================================

#[tokio::test]
async fn test_unload_sends_exit_game() {
    let page = page();

    assert!(page.bridge.on_unload());

    let msgs = posted_json(&page.opener);
    assert_eq!(msgs.len(), 1);
    assert_eq!(
        msgs[0],
        json!({
            "type": "EXIT_GAME",
            "userId": "u1",
            "roomId": "r1",
            "onChainRoomId": "42",
            "gameId": "g1",
            "sessionToken": "tok",
        })
    );
}

#[tokio::test]
async fn test_unload_without_opener_is_silent() {
    let page = page();
    page.opener.close();

    assert!(!page.bridge.on_unload());
    assert!(page.opener.messages().is_empty());
    assert!(page.window.alerts().is_empty());
}

#[tokio::test]
async fn test_unload_swallows_post_failure() {
    let page = page();
    page.opener.reject_posts(true);

    assert!(!page.bridge.on_unload());
    assert!(page.window.alerts().is_empty());
}

#[tokio::test]
async fn test_exit_game_closes_without_posting() {
    let page = page();
    page.bridge.exit_game();
    assert_eq!(page.window.close_requests(), 1);
    assert!(page.opener.messages().is_empty());
}

// =========================================================================
// End to end through the game's mediator
// =========================================================================

#[tokio::test]
async fn test_game_over_submits_timed_score() {
    let page = page();
    start_attached(&page).await;

    page.loader.mediator().emit(GAME_START);
    settle().await;
    page.clock.advance(Duration::from_millis(12_500));
    page.loader.set_score(42_i64);
    page.loader.mediator().emit(GAME_OVER);
    settle().await;

    let msgs = posted_json(&page.opener);
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0]["type"], "SUBMIT_SCORE");
    assert_eq!(msgs[0]["score"].as_f64(), Some(42.0));
    assert_eq!(msgs[0]["metadata"]["finalStats"]["totalScore"].as_f64(), Some(42.0));
    assert_eq!(msgs[0]["metadata"]["gameDuration"].as_f64(), Some(12.5));
}

#[tokio::test]
async fn test_game_over_without_start_has_zero_duration() {
    let page = page();
    start_attached(&page).await;

    page.clock.advance(Duration::from_secs(30));
    page.loader.mediator().emit(GAME_OVER);
    settle().await;

    let msgs = posted_json(&page.opener);
    assert_eq!(msgs[0]["metadata"]["gameDuration"].as_f64(), Some(0.0));
}

#[tokio::test]
async fn test_each_play_submits_once() {
    let page = page();
    start_attached(&page).await;

    for (score, secs) in [(10_i64, 5), (25, 2), (3, 9)] {
        page.loader.mediator().emit(GAME_START);
        settle().await;
        page.clock.advance(Duration::from_secs(secs));
        page.loader.set_score(score);
        page.loader.mediator().emit(GAME_OVER);
        settle().await;
        // Time spent on the game-over screen doesn't count.
        page.clock.advance(Duration::from_secs(60));
    }

    let msgs = posted_json(&page.opener);
    let summary: Vec<(f64, f64)> = msgs
        .iter()
        .map(|m| {
            (
                m["score"].as_f64().unwrap(),
                m["metadata"]["gameDuration"].as_f64().unwrap(),
            )
        })
        .collect();
    assert_eq!(summary, vec![(10.0, 5.0), (25.0, 2.0), (3.0, 9.0)]);
}

#[tokio::test]
async fn test_game_over_after_opener_closed() {
    let page = page();
    start_attached(&page).await;

    page.opener.close();
    page.loader.mediator().emit(GAME_OVER);
    settle().await;

    assert!(page.opener.messages().is_empty());
    assert_eq!(page.window.alerts(), vec![OPENER_UNAVAILABLE.to_string()]);
}

#[tokio::test]
async fn test_missing_loader_leaves_game_unhooked() {
    let page = page();
    let handle = page
        .bridge
        .start_with(None::<MemoryLoader>, Readiness::Immediate)
        .unwrap();

    handle.await.unwrap();
    assert!(page.window.alerts().is_empty());
    assert_eq!(page.loader.mediator().emit(GAME_OVER), 0);
}

#[tokio::test(start_paused = true)]
async fn test_start_waits_for_configured_delay() {
    let page = page_with(
        VALID_QUERY,
        BridgeBuilder::new().startup_delay(Duration::from_millis(500)),
    );
    page.bridge.start(Some(page.loader.clone())).unwrap();

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(page.loader.mediator().listener_count(GAME_OVER), 0);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(page.loader.mediator().listener_count(GAME_OVER), 1);
}

#[tokio::test]
async fn test_start_after_ready_signal() {
    let page = page();
    let (notifier, readiness) = Readiness::channel();
    page.bridge
        .start_with(Some(page.loader.clone()), readiness)
        .unwrap();

    settle().await;
    assert_eq!(page.loader.mediator().listener_count(GAME_START), 0);

    notifier.notify();
    settle().await;
    assert_eq!(page.loader.mediator().listener_count(GAME_START), 1);
}
