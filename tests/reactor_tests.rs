mod support;

use axum::http::StatusCode;
use narrator::composer::prompt::PayloadComposer;
use narrator::kernel::event::{CompletionDelivery, RequestId};
use narrator::outputs::text::TextBlock;
use narrator::services::llm::client::CompletionRequest;
use narrator::services::llm::extract::FALLBACK_MESSAGE;
use narrator::world::snapshot::Snapshot;
use narrator::world::source::{EntityRecord, Position, StaticWorld};
use narrator::{NarratorConfig, Reactor, StalePolicy};
use serde_json::json;
use std::time::Duration;
use support::{choices, dead_endpoint, reactor_for, spawn_endpoint, Reply};

async fn next_applied(reactor: &mut Reactor) -> bool {
    tokio::time::timeout(Duration::from_secs(5), reactor.apply_next())
        .await
        .expect("completion should arrive")
        .expect("delivery channel open")
}

#[tokio::test]
async fn test_first_tick_pushes_and_sink_receives_text() {
    let endpoint = spawn_endpoint(Reply::Json(choices("Hello world"))).await;
    let sink = TextBlock::new();
    let mut reactor = reactor_for(&endpoint.url, &sink);

    let report = reactor.initialize(&StaticWorld::new());
    assert!(report.changed, "first tick always reports a change");
    assert!(report.dispatched.is_some());

    assert!(next_applied(&mut reactor).await);
    assert_eq!(sink.text().as_deref(), Some("Hello world"));

    // Wire format: POST with JSON header and the bare prompt body
    let received = endpoint.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(received[0].body, json!({ "prompt": "What is the current game state?" }));
}

#[tokio::test]
async fn test_unchanged_world_does_not_push() {
    let endpoint = spawn_endpoint(Reply::Json(choices("ok"))).await;
    let sink = TextBlock::new();
    let mut reactor = reactor_for(&endpoint.url, &sink);
    let world = StaticWorld::new();

    let first = reactor.tick_step(&world);
    let second = reactor.tick_step(&world);

    assert!(first.changed);
    assert!(!second.changed);
    assert_eq!(second.dispatched, None);

    assert!(next_applied(&mut reactor).await);
    assert_eq!(reactor.in_flight(), 0);
    assert_eq!(endpoint.received().len(), 1, "only the first tick reaches the endpoint");
    assert_eq!(sink.history(), vec!["ok".to_string()]);
}

#[tokio::test]
async fn test_world_change_pushes_again() {
    let endpoint = spawn_endpoint(Reply::Json(choices("updated"))).await;
    let sink = TextBlock::new();
    let mut reactor = reactor_for(&endpoint.url, &sink);
    let mut world = StaticWorld::with_entities(vec![EntityRecord::new("Cube", "StaticMeshActor", Position::default())]);

    reactor.tick_step(&world);
    assert!(next_applied(&mut reactor).await);

    world.move_to("Cube", Position::new(10.0, 0.0, 0.0));
    let report = reactor.tick_step(&world);
    assert!(report.changed);
    let id = report.dispatched.expect("changed tick dispatches");
    assert_eq!(id.seq, 1);
    assert_eq!(id.tick.frame, 2);

    assert!(next_applied(&mut reactor).await);
    assert_eq!(endpoint.received().len(), 2);
}

// Counts lights and names the possessed entity
struct HeadcountComposer;

impl PayloadComposer for HeadcountComposer {
    fn compose(&self, snapshot: &Snapshot) -> CompletionRequest {
        let subject = snapshot
            .player
            .subject
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or("nobody");
        CompletionRequest::prompt(format!(
            "{} lights, {} actors, controlling {}",
            snapshot.lighting.len(),
            snapshot.actors.len(),
            subject
        ))
    }
}

#[tokio::test]
async fn test_custom_composer_shapes_the_prompt() {
    let endpoint = spawn_endpoint(Reply::Json(choices("composed"))).await;
    let sink = TextBlock::new();
    let mut reactor = reactor_for(&endpoint.url, &sink).with_composer(Box::new(HeadcountComposer));

    let mut world = StaticWorld::with_entities(vec![
        EntityRecord::new("SkyLight_0", "SkyLight", Position::default()),
        EntityRecord::new("Hero", "Character", Position::default()),
    ]);
    assert!(world.possess("Hero"));

    reactor.initialize(&world);
    assert!(next_applied(&mut reactor).await);

    let received = endpoint.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(received[0].body, json!({ "prompt": "1 lights, 1 actors, controlling Hero" }));
    assert_eq!(sink.text().as_deref(), Some("composed"));
}

#[tokio::test]
async fn test_http_error_status_shows_fallback() {
    let endpoint = spawn_endpoint(Reply::Raw(
        StatusCode::INTERNAL_SERVER_ERROR,
        choices("should not be shown").to_string(),
    ))
    .await;
    let sink = TextBlock::new();
    let mut reactor = reactor_for(&endpoint.url, &sink);

    reactor.initialize(&StaticWorld::new());
    assert!(next_applied(&mut reactor).await);
    assert_eq!(sink.text().as_deref(), Some(FALLBACK_MESSAGE));
}

#[tokio::test]
async fn test_connection_refused_shows_fallback() {
    let sink = TextBlock::new();
    let mut reactor = reactor_for(&dead_endpoint().await, &sink);

    reactor.initialize(&StaticWorld::new());
    assert!(next_applied(&mut reactor).await);
    assert_eq!(sink.text().as_deref(), Some(FALLBACK_MESSAGE));

    let stats = reactor.telemetry.snapshot();
    assert_eq!(stats.outcome_stats.transport_errors, 1);
}

#[tokio::test]
async fn test_malformed_bodies_show_fallback() {
    for body in ["not json", r#"{"choices":[]}"#, r#"{"choices":[{}]}"#] {
        let endpoint = spawn_endpoint(Reply::Raw(StatusCode::OK, body.to_string())).await;
        let sink = TextBlock::new();
        let mut reactor = reactor_for(&endpoint.url, &sink);

        reactor.initialize(&StaticWorld::new());
        assert!(next_applied(&mut reactor).await);
        assert_eq!(sink.text().as_deref(), Some(FALLBACK_MESSAGE), "body {:?}", body);
    }
}

#[tokio::test]
async fn test_stale_completion_is_discarded() {
    let endpoint = spawn_endpoint(Reply::Json(choices("fresh"))).await;
    let sink = TextBlock::new();
    let mut reactor = reactor_for(&endpoint.url, &sink);
    let mut world = StaticWorld::new();

    let first = reactor.tick_step(&world).dispatched.expect("first dispatch");
    world.spawn(EntityRecord::new("Lamp", "SkyLight", Position::default()));
    let second = reactor.tick_step(&world).dispatched.expect("second dispatch");
    assert!(second > first);
    assert_eq!(reactor.latest_dispatched(), Some(second));

    // An answer for the superseded request never reaches the sink
    let late = CompletionDelivery::succeeded(first, choices("stale").to_string());
    assert!(!reactor.apply_completion(late));

    let current = CompletionDelivery::succeeded(second, choices("current").to_string());
    assert!(reactor.apply_completion(current));
    assert_eq!(sink.text().as_deref(), Some("current"));
    assert!(!sink.history().contains(&"stale".to_string()));

    let stats = reactor.telemetry.snapshot();
    assert_eq!(stats.request_stats.discarded, 1);
}

#[tokio::test]
async fn test_apply_all_policy_keeps_every_completion() {
    let sink = TextBlock::new();
    let config = NarratorConfig {
        endpoint: dead_endpoint().await,
        stale_policy: StalePolicy::ApplyAll,
        ..NarratorConfig::default()
    };
    let mut reactor = Reactor::new(&config, Box::new(sink.clone())).expect("client builds");
    let mut world = StaticWorld::new();

    let first = reactor.tick_step(&world).dispatched.expect("first dispatch");
    world.spawn(EntityRecord::new("Lamp", "SkyLight", Position::default()));
    reactor.tick_step(&world);

    let late = CompletionDelivery::succeeded(first, choices("older").to_string());
    assert!(reactor.apply_completion(late));
    assert_eq!(sink.text().as_deref(), Some("older"));
}

#[tokio::test]
async fn test_every_request_delivers_exactly_once() {
    let endpoint = spawn_endpoint(Reply::Json(choices("n"))).await;
    let sink = TextBlock::new();
    let config = NarratorConfig {
        endpoint: endpoint.url.clone(),
        stale_policy: StalePolicy::ApplyAll,
        ..NarratorConfig::default()
    };
    let mut reactor = Reactor::new(&config, Box::new(sink.clone())).expect("client builds");
    let mut world = StaticWorld::new();

    // Overlapping in-flight requests
    let mut dispatched: Vec<RequestId> = Vec::new();
    for i in 0..5 {
        world.spawn(EntityRecord::new(format!("Cube_{i}"), "StaticMeshActor", Position::default()));
        dispatched.extend(reactor.tick_step(&world).dispatched);
    }
    assert_eq!(dispatched.len(), 5);
    assert_eq!(reactor.in_flight(), 5);

    for _ in 0..5 {
        assert!(next_applied(&mut reactor).await);
    }
    assert_eq!(reactor.in_flight(), 0);
    assert_eq!(sink.history().len(), 5);

    // Nothing further shows up
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(reactor.drain_completions(), 0);
}

#[tokio::test]
async fn test_run_ticks_once_then_stops_on_shutdown() {
    let endpoint = spawn_endpoint(Reply::Json(choices("from run"))).await;
    let sink = TextBlock::new();
    let mut reactor = reactor_for(&endpoint.url, &sink);
    let world = StaticWorld::new();

    reactor
        .run(&world, None, tokio::time::sleep(Duration::from_millis(500)))
        .await;

    assert_eq!(reactor.tick.frame, 1, "no period means a single startup tick");
    assert_eq!(sink.text().as_deref(), Some("from run"));
}

#[tokio::test]
async fn test_run_with_period_keeps_ticking_without_pushing() {
    let endpoint = spawn_endpoint(Reply::Json(choices("periodic"))).await;
    let sink = TextBlock::new();
    let mut reactor = reactor_for(&endpoint.url, &sink);
    let world = StaticWorld::new();

    reactor
        .run(&world, Some(Duration::from_millis(20)), tokio::time::sleep(Duration::from_millis(300)))
        .await;

    let stats = reactor.telemetry.snapshot();
    assert!(stats.tick_stats.total > 2, "ticks: {}", stats.tick_stats.total);
    assert_eq!(stats.tick_stats.changed, 1);
    assert_eq!(stats.request_stats.dispatched, 1);
    assert_eq!(endpoint.received().len(), 1);
}

#[test]
#[should_panic]
fn test_changed_tick_needs_a_tokio_runtime() {
    let sink = TextBlock::new();
    let mut reactor = reactor_for("http://127.0.0.1:9/v1/completions", &sink);

    // The first tick is always a change and spawns its request
    reactor.tick_step(&StaticWorld::new());
}
