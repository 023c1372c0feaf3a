use super::key::SessionKey;
use aterm_terminal::PtyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to start session {key}: {source}")]
    Spawn {
        key: SessionKey,
        #[source]
        source: PtyError,
    },
}
