//! Typed errors for PTY operations.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PtyError {
    #[error("failed to create PTY: {0}")]
    Create(String),
    #[error("failed to spawn command: {0}")]
    Spawn(String),
    #[error("failed to clone reader: {0}")]
    CloneReader(String),
    #[error("failed to get writer: {0}")]
    Writer(String),
    #[error("failed to resize PTY: {0}")]
    Resize(String),
    #[error("no PTY with id '{0}'")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
