//! Split and close commands.
//!
//! Like the model's own mutators these return a new `Layout`; an invalid
//! request (unknown ids, closing the last pane) returns the input unchanged.

use aterm_config::{Layout, Pane, PaneId, Row};

/// Result of a close request
#[derive(Debug, Clone, PartialEq)]
pub struct CloseOutcome {
    pub layout: Layout,
    /// The pane whose session must be torn down, if the close happened
    pub closed: Option<PaneId>,
}

/// Insert a new pane immediately after `pane_id` inside `row_id`
pub fn split_vertical(layout: &Layout, pane_id: &str, row_id: &str, profile_id: &str) -> Layout {
    let mut next = layout.clone();
    let Some(row) = next.rows.iter_mut().find(|r| r.id == row_id) else {
        log::debug!("split_vertical: unknown row {}", row_id);
        return next;
    };
    let Some(index) = row.pane_index(pane_id) else {
        log::debug!("split_vertical: pane {} not in row {}", pane_id, row_id);
        return next;
    };
    row.panes.insert(index + 1, Pane::new(profile_id));
    next
}

/// Insert a new row, with the same flex as `row_id`, immediately after it
pub fn split_horizontal(layout: &Layout, row_id: &str, profile_id: &str) -> Layout {
    let mut next = layout.clone();
    let Some(index) = next.row_index(row_id) else {
        log::debug!("split_horizontal: unknown row {}", row_id);
        return next;
    };
    let mut row = Row::with_pane(Pane::new(profile_id));
    row.flex = next.rows[index].flex;
    next.rows.insert(index + 1, row);
    next
}

/// Remove a pane, dropping its row if emptied.
///
/// The last pane of a layout can never be closed.
pub fn close_pane(layout: &Layout, pane_id: &str, row_id: &str) -> CloseOutcome {
    let unchanged = || CloseOutcome {
        layout: layout.clone(),
        closed: None,
    };

    if layout.pane_count() <= 1 {
        log::debug!("close_pane: refusing to close the last pane");
        return unchanged();
    }
    let in_row = layout
        .row(row_id)
        .and_then(|row| row.pane_index(pane_id))
        .is_some();
    if !in_row {
        log::debug!("close_pane: pane {} not in row {}", pane_id, row_id);
        return unchanged();
    }

    let mut next = layout.clone();
    if let Some(row) = next.rows.iter_mut().find(|r| r.id == row_id) {
        row.panes.retain(|p| p.id != pane_id);
    }
    next.drop_empty_rows();
    CloseOutcome {
        layout: next,
        closed: Some(pane_id.to_string()),
    }
}
