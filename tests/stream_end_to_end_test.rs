// End-to-end tests: HTTP transport against a local competition server

use axum::{
    extract::State,
    response::sse::{Event, Sse},
    routing::{get, post},
    Router,
};
use farm_arena::action::ActionCategory;
use farm_arena::config::ServerConfig;
use farm_arena::event::{AgentId, Day};
use farm_arena::stream::{
    ControlCommand, ControlSurface, HttpTransport, RunOutcome, RunState, StreamController,
};
use futures::stream::{self, Stream, StreamExt};
use serde_json::json;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

#[derive(Clone)]
struct ServerState {
    payloads: Arc<Vec<String>>,
    /// Keep the stream open after the scripted payloads
    hold_open: bool,
    stop_calls: Arc<AtomicUsize>,
}

async fn stream_competition(
    State(state): State<ServerState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = stream::iter(
        state
            .payloads
            .iter()
            .map(|payload| Ok(Event::default().data(payload.clone())))
            .collect::<Vec<_>>(),
    );
    let tail = if state.hold_open {
        stream::pending().boxed()
    } else {
        stream::empty().boxed()
    };
    Sse::new(events.chain(tail))
}

async fn stop_competition(State(state): State<ServerState>) -> &'static str {
    state.stop_calls.fetch_add(1, Ordering::SeqCst);
    "stopped"
}

/// Serve the two competition routes on an ephemeral port
async fn spawn_server(payloads: Vec<String>, hold_open: bool) -> (ServerConfig, Arc<AtomicUsize>) {
    let stop_calls = Arc::new(AtomicUsize::new(0));
    let state = ServerState {
        payloads: Arc::new(payloads),
        hold_open,
        stop_calls: stop_calls.clone(),
    };
    let app = Router::new()
        .route("/stream-competition", get(stream_competition))
        .route("/stop-competition", post(stop_competition))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let server = ServerConfig {
        base_url: format!("http://{}", addr),
        ..ServerConfig::default()
    };
    (server, stop_calls)
}

fn day_message(day: serde_json::Value, gpt35: (f64, &str), gpt4: (f64, &str)) -> String {
    json!({
        "gpt35": {
            "day": day, "money": gpt35.0, "energy": 50.0,
            "crops": [{"type": "Corn", "planted_at": 1}],
            "decision": gpt35.1
        },
        "gpt4": {
            "day": day, "money": gpt4.0, "energy": 60.0,
            "crops": [],
            "decision": gpt4.1
        },
    })
    .to_string()
}

fn controller_for(server: &ServerConfig) -> StreamController {
    let transport = Arc::new(HttpTransport::new(server).unwrap());
    StreamController::new(transport, Duration::ZERO)
}

#[tokio::test]
async fn test_full_competition_over_http() {
    let payloads = vec![
        day_message(json!(1), (100.0, "T1 Plant Corn"), (90.0, "T2 Harvest Wheat")),
        day_message(json!(2), (95.0, "T1 Maintenance"), (120.0, "T2 Sell Wheat 2")),
        day_message(
            json!("Final"),
            (95.0, "Competition finished"),
            (120.0, "Competition finished"),
        ),
    ];
    let (server, stop_calls) = spawn_server(payloads, false).await;
    let mut controller = controller_for(&server);

    assert!(controller.start());
    while controller.step().await {}

    assert_eq!(controller.state(), RunState::Idle);
    assert_eq!(controller.last_outcome(), Some(&RunOutcome::Stopped));
    assert_eq!(controller.controls(), ControlSurface::idle());
    assert_eq!(controller.messages_applied(), 3);
    assert_eq!(stop_calls.load(Ordering::SeqCst), 0);

    let gpt35 = controller.store().timeline(AgentId::Gpt35);
    assert_eq!(gpt35.money(), &[100.0, 95.0, 95.0]);
    let categories: Vec<_> = gpt35.actions().iter().map(|a| a.category).collect();
    assert_eq!(
        categories,
        vec![ActionCategory::Plant, ActionCategory::Maintenance]
    );

    let dashboard = controller.dashboard();
    assert_eq!(
        dashboard.money_chart().labels(),
        &[Day::Number(1), Day::Number(2), Day::Final]
    );
    assert_eq!(dashboard.action_scatter().points(AgentId::Gpt4).len(), 2);
    assert_eq!(dashboard.action_scatter().points(AgentId::Gpt4)[1].lane, "SL");
    assert_eq!(dashboard.grid(AgentId::Gpt35).unwrap().occupied(), 1);
}

#[tokio::test]
async fn test_stop_over_http() {
    let payloads = vec![day_message(
        json!(1),
        (100.0, "T1 Plant Corn"),
        (90.0, "T2 Harvest Wheat"),
    )];
    let (server, stop_calls) = spawn_server(payloads, true).await;
    let controller = controller_for(&server);
    let mut frames = controller.subscribe();

    let (tx, rx) = mpsc::channel(8);
    let handle = tokio::spawn(controller.run(rx));
    tx.send(ControlCommand::Start).await.unwrap();

    // Wait for the first day to land
    loop {
        frames.changed().await.unwrap();
        if frames.borrow_and_update().messages_applied == 1 {
            break;
        }
    }

    tx.send(ControlCommand::Stop).await.unwrap();
    loop {
        frames.changed().await.unwrap();
        let frame = frames.borrow_and_update().clone();
        if frame.state == RunState::Idle {
            assert_eq!(frame.last_outcome, Some(RunOutcome::Stopped));
            assert_eq!(frame.controls, ControlSurface::idle());
            assert_eq!(frame.store.timeline(AgentId::Gpt4).money(), &[90.0]);
            break;
        }
    }

    tx.send(ControlCommand::Shutdown).await.unwrap();
    let controller = handle.await.unwrap();
    assert_eq!(controller.state(), RunState::Idle);
    assert_eq!(stop_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unreachable_server_errors() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let server = ServerConfig {
        base_url: format!("http://{}", addr),
        ..ServerConfig::default()
    };
    let mut controller = controller_for(&server);

    assert!(controller.start());
    while controller.step().await {}

    assert_eq!(controller.state(), RunState::Idle);
    assert!(matches!(
        controller.last_outcome(),
        Some(RunOutcome::Errored { .. })
    ));
    assert!(controller.store().is_empty());
}
