//! Shared integration test helpers for aterm.
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::{memory_workspace, PROJECT};
//! ```
//!
//! Rust integration tests use `mod common;` (not `use`) to bring in helpers
//! from `tests/common/mod.rs`. The `#![allow(dead_code)]` attribute
//! suppresses warnings when only a subset of helpers are used per file.

#![allow(dead_code)]

use aterm::status::{NotificationSink, Notifier, TitleSink};
use aterm::workspace::Workspace;
use aterm_config::{Config, Layout, Pane, Project, Row, new_id};
use aterm_terminal::{MemoryPtyBackend, PtyEventReceiver, event_channel};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Project every helper config contains
pub const PROJECT: &str = "p1";

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Config with one project (`p1`, "api") and a single-pane layout
pub fn test_config() -> Config {
    let mut config = Config::default();
    config
        .projects
        .push(Project::new(PROJECT, "api", "/tmp/api", "shell"));
    config
}

/// Captures notifications and titles for assertions
#[derive(Clone, Default)]
pub struct Recorder(pub Arc<Mutex<Vec<String>>>);

impl Recorder {
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock())
    }
}

impl NotificationSink for Recorder {
    fn notify(&mut self, title: &str, body: &str) {
        self.0.lock().push(format!("{title} | {body}"));
    }
}

impl TitleSink for Recorder {
    fn set_title(&mut self, title: &str) {
        self.0.lock().push(format!("title: {title}"));
    }
}

/// A workspace over an in-memory backend, plus the handles tests poke at
pub struct Harness {
    pub workspace: Workspace,
    pub backend: Arc<MemoryPtyBackend>,
    pub events: PtyEventReceiver,
    pub notes: Recorder,
    pub titles: Recorder,
    pub t0: Instant,
}

impl Harness {
    pub fn new(config: Config) -> Self {
        let (tx, events) = event_channel();
        let backend = Arc::new(MemoryPtyBackend::with_events(tx));
        let notes = Recorder::default();
        let titles = Recorder::default();
        let notifier = Notifier::silent()
            .with_sink(notes.clone())
            .with_title(titles.clone());
        let workspace = Workspace::new(config, backend.clone(), notifier);
        Self {
            workspace,
            backend,
            events,
            notes,
            titles,
            t0: Instant::now(),
        }
    }

    /// `t0 + n` milliseconds
    pub fn at(&self, n: u64) -> Instant {
        self.t0 + ms(n)
    }

    /// Emit output for a pane and route it into the workspace at `now`
    pub fn output(&mut self, pane_id: &str, data: &[u8], now: Instant) {
        let pty_id = format!("{PROJECT}:{pane_id}");
        assert!(self.backend.emit(&pty_id, data), "{pty_id} is not live");
        self.pump(now);
    }

    /// Route everything queued on the event channel
    pub fn pump(&mut self, now: Instant) {
        while let Ok(event) = self.events.try_recv() {
            self.workspace.handle_output(event, now);
        }
    }

    pub fn layout(&self) -> &Layout {
        self.workspace
            .layout(PROJECT)
            .expect("project is not active")
    }
}

/// Harness with `p1` already activated
pub fn memory_workspace() -> Harness {
    let mut harness = Harness::new(test_config());
    let failed = harness
        .workspace
        .activate_project(PROJECT, None, harness.t0)
        .expect("activate");
    assert_eq!(failed, 0);
    harness
}

/// Build a layout whose rows hold panes with the given ids
pub fn layout_of(rows: &[&[&str]]) -> Layout {
    let mut layout = Layout::new("Test");
    for ids in rows {
        let panes: Vec<Pane> = ids
            .iter()
            .map(|id| Pane {
                id: id.to_string(),
                ..Pane::new("shell")
            })
            .collect();
        layout.rows.push(Row {
            id: new_id(),
            flex: 1.0,
            panes,
        });
    }
    layout
}

/// Pane ids, row by row
pub fn shape(layout: &Layout) -> Vec<Vec<String>> {
    layout
        .rows
        .iter()
        .map(|r| r.panes.iter().map(|p| p.id.clone()).collect())
        .collect()
}

/// Structural invariants every committed layout keeps
pub fn assert_layout_invariants(layout: &Layout) {
    assert!(layout.pane_count() >= 1, "layout lost its last pane");
    layout.validate().expect("layout invariants");
    let ids: HashSet<&str> = layout.panes().map(|p| p.id.as_str()).collect();
    assert_eq!(ids.len(), layout.pane_count());
}
