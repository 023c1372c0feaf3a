//! The async event loop over an in-memory backend.

mod common;

use aterm::session::SessionKey;
use aterm::status::Notifier;
use aterm::workspace::{Workspace, event_loop};
use aterm_terminal::{MemoryPtyBackend, event_channel};
use common::{PROJECT, test_config};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_loop_renders_output_until_shutdown() {
    let (tx, rx) = event_channel();
    let backend = Arc::new(MemoryPtyBackend::with_events(tx));
    let mut workspace = Workspace::new(test_config(), backend.clone(), Notifier::silent());
    workspace
        .activate_project(PROJECT, None, Instant::now())
        .unwrap();
    let pane = workspace.layout(PROJECT).unwrap().rows[0].panes[0]
        .id
        .clone();
    let key = SessionKey::new(PROJECT, pane.as_str());

    assert!(backend.emit(&key.pty_id(), b"hello from the "));
    assert!(backend.emit(&key.pty_id(), b"loop\r\n$ "));

    event_loop::run(
        &mut workspace,
        rx,
        tokio::time::sleep(Duration::from_millis(100)),
    )
    .await;

    let session = workspace.registry().get(&key).unwrap();
    assert_eq!(session.buffer().tail(2), vec!["hello from the loop", "$ "]);
    assert!(!session.has_pending_flush());

    // The loop leaves sessions running; shutdown is the caller's job
    assert!(backend.is_live(&key.pty_id()));
    assert_eq!(workspace.shutdown(), 1);
    assert!(!backend.is_live(&key.pty_id()));
}

/// The loop stops on its own once every event sender is gone
#[tokio::test]
async fn test_loop_stops_when_channel_closes() {
    let (tx, rx) = event_channel();
    drop(tx);
    let mut workspace = Workspace::new(
        test_config(),
        Arc::new(MemoryPtyBackend::new()),
        Notifier::silent(),
    );

    tokio::time::timeout(
        Duration::from_secs(5),
        event_loop::run(&mut workspace, rx, std::future::pending::<()>()),
    )
    .await
    .expect("loop should exit when the channel closes");
}
