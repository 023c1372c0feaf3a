//! PTY boundary for the aterm workspace.
//!
//! The workspace core never touches processes directly. It talks to a
//! [`PtyBackend`], keyed by an opaque session id string, and receives output
//! as an ordered stream of [`PtyEvent`]s on a channel:
//!
//! - [`NativePtyBackend`]: real pseudo-terminals via `portable-pty`, one reader
//!   thread per session
//! - [`MemoryPtyBackend`]: an in-memory backend that records every call and
//!   lets the caller inject output; used for headless runs and tests

pub mod command;
pub mod error;
pub mod memory;
pub mod native;

pub use command::{CommandLine, SpawnRequest, SpawnTarget, default_shell};
pub use error::PtyError;
pub use memory::MemoryPtyBackend;
pub use native::NativePtyBackend;

use tokio::sync::mpsc;

/// Events produced by running sessions, in arrival order per session.
///
/// `generation` identifies the spawn that produced the event. An id can be
/// killed and spawned again; events still in flight from the earlier
/// process carry its older generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PtyEvent {
    /// A chunk of raw output bytes
    Output {
        id: String,
        generation: u64,
        data: Vec<u8>,
    },
    /// The session's output stream ended (process exited or PTY closed)
    Exited { id: String, generation: u64 },
}

impl PtyEvent {
    pub fn id(&self) -> &str {
        match self {
            PtyEvent::Output { id, .. } | PtyEvent::Exited { id, .. } => id,
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            PtyEvent::Output { generation, .. } | PtyEvent::Exited { generation, .. } => {
                *generation
            }
        }
    }
}

pub type PtyEventSender = mpsc::UnboundedSender<PtyEvent>;
pub type PtyEventReceiver = mpsc::UnboundedReceiver<PtyEvent>;

/// Create the channel backends publish output on
pub fn event_channel() -> (PtyEventSender, PtyEventReceiver) {
    mpsc::unbounded_channel()
}

/// Process primitives the workspace depends on.
///
/// Implementations must make `kill` idempotent: killing an unknown or
/// already-dead session succeeds.
pub trait PtyBackend: Send + Sync {
    /// Start a process for `id` and return its generation. Spawning an id
    /// that is already live is ignored and returns the live generation.
    fn spawn(&self, id: &str, request: &SpawnRequest) -> Result<u64, PtyError>;

    /// Send input bytes to the process
    fn write(&self, id: &str, data: &[u8]) -> Result<(), PtyError>;

    /// Change the terminal size seen by the process
    fn resize(&self, id: &str, cols: u16, rows: u16) -> Result<(), PtyError>;

    /// Terminate the process, reap it and forget the id
    fn kill(&self, id: &str) -> Result<(), PtyError>;

    /// Terminate every live process
    fn kill_all(&self);

    /// Number of live processes
    fn active_count(&self) -> usize;
}
