//! Per-project rollup of session statuses.

use super::tracker::{AgentStatus, StatusTracker, Transition};
use crate::session::SessionKey;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ProjectStatusSummary {
    pub aggregate: AgentStatus,
    /// Sessions waiting and not yet acknowledged
    pub waiting_count: usize,
    pub running_count: usize,
}

impl ProjectStatusSummary {
    pub fn from_trackers<'a>(trackers: impl IntoIterator<Item = &'a StatusTracker>) -> Self {
        let mut summary = Self::default();
        for tracker in trackers {
            if tracker.needs_attention() {
                summary.waiting_count += 1;
            }
            if tracker.status() == AgentStatus::Running {
                summary.running_count += 1;
            }
        }
        summary.aggregate = if summary.waiting_count > 0 {
            AgentStatus::Waiting
        } else if summary.running_count > 0 {
            AgentStatus::Running
        } else {
            AgentStatus::Idle
        };
        summary
    }

    pub fn needs_attention(&self) -> bool {
        self.waiting_count > 0
    }
}

/// A session's status changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub key: SessionKey,
    pub transition: Transition,
}

/// Status edges that users get told about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// `running → waiting`: the agent asked a question
    NeedsInput(SessionKey),
    /// `running → idle`: the agent finished its turn
    Finished(SessionKey),
}

impl StatusEvent {
    pub fn from_change(change: &StatusChange) -> Option<Self> {
        match (change.transition.from, change.transition.to) {
            (AgentStatus::Running, AgentStatus::Waiting) => {
                Some(Self::NeedsInput(change.key.clone()))
            }
            (AgentStatus::Running, AgentStatus::Idle) => Some(Self::Finished(change.key.clone())),
            _ => None,
        }
    }

    pub fn key(&self) -> &SessionKey {
        match self {
            Self::NeedsInput(key) | Self::Finished(key) => key,
        }
    }
}
