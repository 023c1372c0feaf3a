//! Divider drags: zero-sum flex redistribution between two adjacent siblings.
//!
//! A drag is one `begin → update* → end` gesture. Every `update` commits a new
//! layout so the resize is live, not applied only on release.

use aterm_config::{Layout, MIN_FLEX, RowId};

/// Split the combined flex of two siblings after moving their shared
/// divider by `delta` pixels inside a track `container` pixels long.
///
/// `delta` is measured against half the combined track, hence the factor
/// of two. The pair's sum is preserved and neither side drops below
/// [`MIN_FLEX`].
pub fn redistribute(a: f64, b: f64, delta: f64, container: f64) -> (f64, f64) {
    let total = a + b;
    if !(container > 0.0) || !delta.is_finite() || total - MIN_FLEX < MIN_FLEX {
        return (a, b);
    }
    let new_a = (a + delta * total / container * 2.0).clamp(MIN_FLEX, total - MIN_FLEX);
    (new_a, total - new_a)
}

/// Move the divider below row `row_index`
pub fn resize_row(layout: &Layout, row_index: usize, delta: f64, container_height: f64) -> Layout {
    let mut next = layout.clone();
    if row_index + 1 >= next.rows.len() {
        return next;
    }
    let (a, b) = redistribute(
        next.rows[row_index].flex,
        next.rows[row_index + 1].flex,
        delta,
        container_height,
    );
    next.rows[row_index].flex = a;
    next.rows[row_index + 1].flex = b;
    next
}

/// Move the divider right of pane `pane_index` in row `row_id`
pub fn resize_pane(
    layout: &Layout,
    row_id: &str,
    pane_index: usize,
    delta: f64,
    container_width: f64,
) -> Layout {
    let mut next = layout.clone();
    let Some(row) = next.rows.iter_mut().find(|r| r.id == row_id) else {
        return next;
    };
    if pane_index + 1 >= row.panes.len() {
        return next;
    }
    let (a, b) = redistribute(
        row.panes[pane_index].flex,
        row.panes[pane_index + 1].flex,
        delta,
        container_width,
    );
    row.panes[pane_index].flex = a;
    row.panes[pane_index + 1].flex = b;
    next
}

/// Which divider is being dragged
#[derive(Debug, Clone, PartialEq)]
pub enum ResizeTarget {
    /// Divider between rows `row_index` and `row_index + 1`
    Row { row_index: usize },
    /// Divider between panes `pane_index` and `pane_index + 1` of a row
    Pane { row_id: RowId, pane_index: usize },
}

/// An in-flight divider drag.
///
/// Holds the two siblings being resized for the whole gesture; the pointer
/// position is tracked so each move applies only its own increment.
#[derive(Debug, Clone)]
pub struct ResizeDrag {
    target: ResizeTarget,
    last_pos: f64,
    container: f64,
}

impl ResizeDrag {
    /// Pointer pressed on a divider at `pos` inside a track `container` pixels long
    pub fn begin(target: ResizeTarget, pos: f64, container: f64) -> Self {
        Self {
            target,
            last_pos: pos,
            container,
        }
    }

    pub fn target(&self) -> &ResizeTarget {
        &self.target
    }

    /// Pointer moved to `pos`: returns the layout with the increment applied
    pub fn update(&mut self, layout: &Layout, pos: f64) -> Layout {
        let delta = pos - self.last_pos;
        self.last_pos = pos;
        match &self.target {
            ResizeTarget::Row { row_index } => {
                resize_row(layout, *row_index, delta, self.container)
            }
            ResizeTarget::Pane { row_id, pane_index } => {
                resize_pane(layout, row_id, *pane_index, delta, self.container)
            }
        }
    }
}
