//! Projects: a working directory, its saved layouts and an optional remote host.

use crate::layout::{Layout, LayoutId};
use serde::{Deserialize, Serialize};

/// Unique identifier for a project
pub type ProjectId = String;

/// SSH host a project's sessions run on.
///
/// Sessions attach to a tmux session on the remote so that reconnecting
/// resumes the same shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteHost {
    pub host: String,
    #[serde(default = "crate::defaults::ssh_port")]
    pub port: u16,
    pub user: String,
    /// Identity file passed to `ssh -i`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_path: Option<String>,
    /// Working directory on the remote
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_path: Option<String>,
    #[serde(default = "crate::defaults::tmux_session_prefix")]
    pub tmux_session_prefix: String,
}

impl RemoteHost {
    /// tmux session name for a pane; stable across reconnects
    pub fn tmux_session_name(&self, pane_id: &str) -> String {
        format!("{}-{}", self.tmux_session_prefix, pane_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    /// Local working directory sessions start in
    pub path: String,
    #[serde(default)]
    pub layouts: Vec<Layout>,
    /// Layout shown when the project is activated (first layout if unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_layout_id: Option<LayoutId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteHost>,
}

impl Project {
    /// Create a project with a single-pane default layout
    pub fn new(
        id: impl Into<ProjectId>,
        name: impl Into<String>,
        path: impl Into<String>,
        profile_id: &str,
    ) -> Self {
        let layout = Layout::single("Default", profile_id);
        Self {
            id: id.into(),
            name: name.into(),
            path: path.into(),
            active_layout_id: Some(layout.id.clone()),
            layouts: vec![layout],
            remote: None,
        }
    }

    /// The saved layout to activate
    pub fn active_layout(&self) -> Option<&Layout> {
        self.active_layout_id
            .as_deref()
            .and_then(|id| self.layouts.iter().find(|l| l.id == id))
            .or_else(|| self.layouts.first())
    }

    /// Replace (or append) a saved layout by id
    pub fn store_layout(&mut self, layout: Layout) {
        match self.layouts.iter_mut().find(|l| l.id == layout.id) {
            Some(slot) => *slot = layout,
            None => self.layouts.push(layout),
        }
    }
}
