// Library exports for the binary and the integration tests.
//
// Layering, leaves first:
//
//   layout     pure layout commands (split, close, resize, drag) and the
//              saved/working layout store
//   session    registry keyed by (project, pane) plus the output pipeline
//   status     classifier, per-project rollup and notification sinks
//   workspace  glue: reconciles layouts against sessions, drives timers
//
// Data types shared with the config file live in `aterm-config`; process
// primitives live behind `aterm_terminal::PtyBackend`.

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[macro_use]
pub mod debug;

pub mod cli;
pub mod layout;
pub mod session;
pub mod status;
pub mod workspace;
