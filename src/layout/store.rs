//! Saved versus runtime layouts for one project.
//!
//! The first activation of a layout takes an independent deep copy; every
//! command edits that runtime copy. Saved layouts change only through
//! [`LayoutStore::persist`].

use super::commands::{close_pane, split_horizontal, split_vertical};
use super::drag::handle_drag_end;
use super::resize::{resize_pane, resize_row};
use aterm_config::{Layout, LayoutId, PaneId, Project, ProjectId, RowId};
use std::collections::HashMap;

/// A discrete edit of the active layout
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutCommand {
    SplitVertical {
        pane_id: PaneId,
        row_id: RowId,
        profile_id: String,
    },
    SplitHorizontal {
        row_id: RowId,
        profile_id: String,
    },
    ClosePane {
        pane_id: PaneId,
        row_id: RowId,
    },
    ResizeRow {
        row_index: usize,
        delta: f64,
        container_height: f64,
    },
    ResizePane {
        row_id: RowId,
        pane_index: usize,
        delta: f64,
        container_width: f64,
    },
    DragEnd {
        active_id: PaneId,
        over_id: Option<String>,
    },
    RenamePane {
        pane_id: PaneId,
        name: Option<String>,
    },
}

/// Run a command against a layout.
///
/// Returns the new layout and the pane the command closed, if any.
pub fn execute(layout: &Layout, command: &LayoutCommand) -> (Layout, Option<PaneId>) {
    match command {
        LayoutCommand::SplitVertical {
            pane_id,
            row_id,
            profile_id,
        } => (split_vertical(layout, pane_id, row_id, profile_id), None),
        LayoutCommand::SplitHorizontal { row_id, profile_id } => {
            (split_horizontal(layout, row_id, profile_id), None)
        }
        LayoutCommand::ClosePane { pane_id, row_id } => {
            let outcome = close_pane(layout, pane_id, row_id);
            (outcome.layout, outcome.closed)
        }
        LayoutCommand::ResizeRow {
            row_index,
            delta,
            container_height,
        } => (
            resize_row(layout, *row_index, *delta, *container_height),
            None,
        ),
        LayoutCommand::ResizePane {
            row_id,
            pane_index,
            delta,
            container_width,
        } => (
            resize_pane(layout, row_id, *pane_index, *delta, *container_width),
            None,
        ),
        LayoutCommand::DragEnd { active_id, over_id } => {
            (handle_drag_end(layout, active_id, over_id.as_deref()), None)
        }
        LayoutCommand::RenamePane { pane_id, name } => {
            (layout.rename_pane(pane_id, name.as_deref()), None)
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayoutStore {
    project_id: ProjectId,
    saved: Vec<Layout>,
    active_id: Option<LayoutId>,
    runtime: HashMap<LayoutId, Layout>,
}

impl LayoutStore {
    /// Snapshot a project's saved layouts. Nothing is activated yet.
    pub fn new(project: &Project) -> Self {
        Self {
            project_id: project.id.clone(),
            saved: project.layouts.clone(),
            active_id: project.active_layout().map(|l| l.id.clone()),
            runtime: HashMap::new(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn saved_layouts(&self) -> &[Layout] {
        &self.saved
    }

    pub fn saved(&self, layout_id: &str) -> Option<&Layout> {
        self.saved.iter().find(|l| l.id == layout_id)
    }

    /// Make a layout active, copying it from the saved set on first use.
    ///
    /// `None` re-activates the current one.
    pub fn activate(&mut self, layout_id: Option<&str>) -> Option<&Layout> {
        let id = match layout_id {
            Some(id) => id.to_string(),
            None => self.active_id.clone()?,
        };
        if !self.runtime.contains_key(&id) {
            let saved = self.saved(&id)?.clone();
            self.runtime.insert(id.clone(), saved);
        }
        self.active_id = Some(id.clone());
        self.runtime.get(&id)
    }

    /// The working copy of the active layout, if activated
    pub fn current(&self) -> Option<&Layout> {
        self.active_id
            .as_deref()
            .and_then(|id| self.runtime.get(id))
    }

    /// Replace the active working copy. Ignored if `layout` is not the active layout.
    pub fn commit(&mut self, layout: Layout) -> bool {
        match self.active_id.as_deref() {
            Some(id) if id == layout.id && self.runtime.contains_key(id) => {
                self.runtime.insert(layout.id.clone(), layout);
                true
            }
            _ => false,
        }
    }

    /// Run a command on the active working copy.
    ///
    /// Returns the panes whose sessions must be torn down.
    pub fn apply(&mut self, command: &LayoutCommand) -> Vec<PaneId> {
        let Some(current) = self.current() else {
            log::debug!("apply on project {} with no active layout", self.project_id);
            return Vec::new();
        };
        let (next, closed) = execute(current, command);
        self.commit(next);
        closed.into_iter().collect()
    }

    /// Whether the working copy differs from what is saved
    pub fn is_dirty(&self) -> bool {
        match (self.current(), self.active_id.as_deref()) {
            (Some(current), Some(id)) => self.saved(id) != Some(current),
            _ => false,
        }
    }

    /// Fold the working copy back into the saved set and return it
    pub fn persist(&mut self) -> Option<Layout> {
        let current = self.current()?.clone();
        match self.saved.iter_mut().find(|l| l.id == current.id) {
            Some(slot) => *slot = current.clone(),
            None => self.saved.push(current.clone()),
        }
        Some(current)
    }

    /// Throw away unsaved edits, returning to the saved layout.
    ///
    /// Returns the ids of panes that only existed in the working copy.
    pub fn discard(&mut self) -> Vec<PaneId> {
        let Some(id) = self.active_id.clone() else {
            return Vec::new();
        };
        let Some(saved) = self.saved(&id).cloned() else {
            return Vec::new();
        };
        let dropped = self
            .runtime
            .get(&id)
            .map(|current| {
                current
                    .panes()
                    .filter(|p| saved.find_pane(&p.id).is_none())
                    .map(|p| p.id.clone())
                    .collect()
            })
            .unwrap_or_default();
        self.runtime.insert(id, saved);
        dropped
    }
}
