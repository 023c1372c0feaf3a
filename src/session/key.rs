use aterm_config::{PaneId, ProjectId};
use std::fmt;

/// Stable identity of a session: the project and pane it belongs to.
///
/// Moving a pane around the tree never changes its key, so the session
/// behind it survives any reshuffle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionKey {
    pub project_id: ProjectId,
    pub pane_id: PaneId,
}

impl SessionKey {
    pub fn new(project_id: impl Into<ProjectId>, pane_id: impl Into<PaneId>) -> Self {
        Self {
            project_id: project_id.into(),
            pane_id: pane_id.into(),
        }
    }

    /// Id the PTY backend knows this session by
    pub fn pty_id(&self) -> String {
        format!("{}:{}", self.project_id, self.pane_id)
    }

    pub fn belongs_to(&self, project_id: &str) -> bool {
        self.project_id == project_id
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.project_id, self.pane_id)
    }
}
