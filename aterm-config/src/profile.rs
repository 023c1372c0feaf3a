//! Profiles: the command templates panes are spawned from.

use serde::{Deserialize, Serialize};

/// Unique identifier for a profile
pub type ProfileId = String;

/// What a pane of this profile shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    /// An interactive shell (optionally running a command first)
    #[default]
    Terminal,
    /// A git status view; still backed by a shell session
    Git,
}

/// A session profile describing how a pane's process is started
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique identifier for this profile
    pub id: ProfileId,

    /// Display name for the profile
    pub name: String,

    /// Command to run inside the login shell before handing control back to it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Accent color (`#rrggbb`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default)]
    pub kind: ProfileKind,
}

impl Profile {
    /// Create a terminal profile
    pub fn terminal(
        id: impl Into<ProfileId>,
        name: impl Into<String>,
        command: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            command: command.map(str::to_string),
            color: None,
            kind: ProfileKind::Terminal,
        }
    }

    /// Command to spawn, with blank commands treated as "plain shell"
    pub fn effective_command(&self) -> Option<&str> {
        self.command.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

/// Profiles every fresh config starts with.
pub fn default_profiles() -> Vec<Profile> {
    vec![
        Profile::terminal("shell", "Shell", None),
        Profile {
            id: "git".to_string(),
            name: "Git".to_string(),
            command: None,
            color: Some("#f05033".to_string()),
            kind: ProfileKind::Git,
        },
    ]
}
