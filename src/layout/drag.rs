//! Drag-and-drop of panes.
//!
//! A drop target id is one of:
//!
//! - `row-drop-{index}`: a gap between rows; the pane becomes a new row there
//! - `edge-{left|right|top|bottom}-{paneId}`: a side of another pane
//! - a bare pane id: reorder within a row or move to another row
//!
//! Every path removes the dragged pane (and its emptied row) before looking up
//! where to insert, so index math always sees the post-removal tree.

use aterm_config::{Layout, Pane, PaneId, Row};

/// Side of a pane a drop landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }
}

/// Parsed drop target id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    RowDrop(usize),
    Edge { edge: Edge, pane_id: PaneId },
    Pane(PaneId),
}

impl DropTarget {
    /// Parse a target id. Anything that is not a well-formed row or edge
    /// target is taken to be a pane id.
    pub fn parse(id: &str) -> Self {
        if let Some(index) = id
            .strip_prefix("row-drop-")
            .and_then(|rest| rest.parse::<usize>().ok())
        {
            return Self::RowDrop(index);
        }
        if let Some(rest) = id.strip_prefix("edge-")
            && let Some((side, pane_id)) = rest.split_once('-')
            && let Some(edge) = Edge::parse(side)
            && !pane_id.is_empty()
        {
            return Self::Edge {
                edge,
                pane_id: pane_id.to_string(),
            };
        }
        Self::Pane(id.to_string())
    }

    /// Id string the renderer uses for this target
    pub fn id(&self) -> String {
        match self {
            Self::RowDrop(index) => format!("row-drop-{index}"),
            Self::Edge { edge, pane_id } => {
                let side = match edge {
                    Edge::Left => "left",
                    Edge::Right => "right",
                    Edge::Top => "top",
                    Edge::Bottom => "bottom",
                };
                format!("edge-{side}-{pane_id}")
            }
            Self::Pane(pane_id) => pane_id.clone(),
        }
    }
}

/// Take a pane out of the tree, dropping its row if that empties it.
///
/// Returns the lifted pane and the index of the row it came from, plus
/// whether that row was removed.
fn lift(layout: &mut Layout, pane_id: &str) -> Option<(Pane, usize, bool)> {
    let loc = layout.locate(pane_id)?;
    let row = &mut layout.rows[loc.row_index];
    let pane = row.panes.remove(loc.pane_index);
    let row_removed = row.panes.is_empty();
    if row_removed {
        layout.rows.remove(loc.row_index);
    }
    Some((pane, loc.row_index, row_removed))
}

fn insert_row(layout: &mut Layout, index: usize, pane: Pane) {
    let index = index.min(layout.rows.len());
    layout.rows.insert(index, Row::with_pane(pane));
}

fn drop_on_row_gap(layout: &Layout, active_id: &str, index: usize) -> Layout {
    let mut next = layout.clone();
    let Some((pane, from_row, row_removed)) = lift(&mut next, active_id) else {
        return layout.clone();
    };
    // The rows list shrank below the gap
    let index = if row_removed && from_row < index {
        index - 1
    } else {
        index
    };
    insert_row(&mut next, index, pane);
    next
}

fn drop_on_edge(layout: &Layout, active_id: &str, edge: Edge, target_id: &str) -> Layout {
    if layout.find_pane(target_id).is_none() {
        log::debug!("drag: unknown edge target {}", target_id);
        return layout.clone();
    }
    let mut next = layout.clone();
    let Some((pane, _, _)) = lift(&mut next, active_id) else {
        return layout.clone();
    };
    let Some(target) = next.locate(target_id) else {
        return layout.clone();
    };
    match edge {
        Edge::Left | Edge::Right => {
            let offset = usize::from(edge == Edge::Right);
            next.rows[target.row_index]
                .panes
                .insert(target.pane_index + offset, pane);
        }
        Edge::Top | Edge::Bottom => {
            let offset = usize::from(edge == Edge::Bottom);
            insert_row(&mut next, target.row_index + offset, pane);
        }
    }
    next
}

fn drop_on_pane(layout: &Layout, active_id: &str, target_id: &str) -> Layout {
    let (Some(from), Some(to)) = (layout.locate(active_id), layout.locate(target_id)) else {
        log::debug!("drag: unknown pane in move {} -> {}", active_id, target_id);
        return layout.clone();
    };
    let mut next = layout.clone();

    if from.row_index == to.row_index {
        let panes = &mut next.rows[from.row_index].panes;
        let pane = panes.remove(from.pane_index);
        panes.insert(to.pane_index.min(panes.len()), pane);
        return next;
    }

    let target_row_id = next.rows[to.row_index].id.clone();
    let Some((pane, _, _)) = lift(&mut next, active_id) else {
        return layout.clone();
    };
    if let Some(row) = next.rows.iter_mut().find(|r| r.id == target_row_id) {
        let index = to.pane_index.min(row.panes.len());
        row.panes.insert(index, pane);
    }
    next
}

/// Apply the drop of pane `active_id` on `over_id`.
///
/// Dropping with no target, on the dragged pane itself, or on an id that
/// does not resolve returns the layout unchanged.
pub fn handle_drag_end(layout: &Layout, active_id: &str, over_id: Option<&str>) -> Layout {
    let Some(over_id) = over_id else {
        return layout.clone();
    };
    if over_id == active_id || layout.find_pane(active_id).is_none() {
        return layout.clone();
    }

    match DropTarget::parse(over_id) {
        DropTarget::RowDrop(index) => drop_on_row_gap(layout, active_id, index),
        DropTarget::Edge { pane_id, .. } if pane_id == active_id => layout.clone(),
        DropTarget::Edge { edge, pane_id } => drop_on_edge(layout, active_id, edge, &pane_id),
        DropTarget::Pane(pane_id) => drop_on_pane(layout, active_id, &pane_id),
    }
}

/// The single in-flight pane drag
#[derive(Debug, Default)]
pub struct DragState {
    active: Option<PaneId>,
}

impl DragState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin dragging a pane. Refused while another drag is in flight.
    pub fn start(&mut self, pane_id: &str) -> bool {
        if let Some(active) = &self.active {
            log::debug!("drag: {} already in flight, ignoring {}", active, pane_id);
            return false;
        }
        self.active = Some(pane_id.to_string());
        true
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Finish the drag over `over_id`, returning the resulting layout
    pub fn end(&mut self, layout: &Layout, over_id: Option<&str>) -> Layout {
        match self.active.take() {
            Some(active) => handle_drag_end(layout, &active, over_id),
            None => layout.clone(),
        }
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }
}
