//! Layout mutation scenarios run through the working-layout store.
//!
//! Each command goes through `LayoutStore::apply`, the same path the
//! workspace uses, so the closed-pane reporting is checked alongside the
//! resulting tree.

mod common;

use aterm::layout::{LayoutCommand, LayoutStore, ResizeDrag, ResizeTarget, handle_drag_end};
use aterm_config::{Layout, Project};
use common::{assert_layout_invariants, layout_of, shape};

fn store_with(layout: Layout) -> LayoutStore {
    let mut project = Project::new("p1", "api", "/tmp", "shell");
    project.active_layout_id = Some(layout.id.clone());
    project.layouts = vec![layout];
    let mut store = LayoutStore::new(&project);
    store.activate(None).expect("layout to activate");
    store
}

fn current(store: &LayoutStore) -> &Layout {
    store.current().expect("working layout")
}

/// Split, close, and the last-pane guard, in one walk
#[test]
fn test_split_close_walkthrough() {
    let mut store = store_with(layout_of(&[&["A", "B"]]));
    let row1 = current(&store).rows[0].id.clone();

    let closed = store.apply(&LayoutCommand::SplitHorizontal {
        row_id: row1.clone(),
        profile_id: "shell".to_string(),
    });
    assert!(closed.is_empty());
    let layout = current(&store);
    assert_eq!(layout.rows.len(), 2);
    assert_eq!(layout.rows[1].panes.len(), 1);
    assert_eq!(layout.rows[1].panes[0].profile_id, "shell");
    let new_pane = layout.rows[1].panes[0].id.clone();
    let row2 = layout.rows[1].id.clone();

    let closed = store.apply(&LayoutCommand::ClosePane {
        pane_id: "B".to_string(),
        row_id: row1.clone(),
    });
    assert_eq!(closed, vec!["B".to_string()]);
    assert_eq!(current(&store).rows[0].panes.len(), 1);
    assert_eq!(current(&store).rows[0].panes[0].id, "A");

    // Two panes remain, so closing A is allowed and drops its row
    let closed = store.apply(&LayoutCommand::ClosePane {
        pane_id: "A".to_string(),
        row_id: row1,
    });
    assert_eq!(closed, vec!["A".to_string()]);
    assert_eq!(shape(current(&store)), vec![vec![new_pane.clone()]]);

    // The last pane is never closed
    let before = current(&store).clone();
    let closed = store.apply(&LayoutCommand::ClosePane {
        pane_id: new_pane,
        row_id: row2,
    });
    assert!(closed.is_empty());
    assert_eq!(current(&store), &before);
}

/// Dropping the sole pane of a row on the first gap moves the whole row up
#[test]
fn test_row_drop_zero_moves_single_pane_row() {
    let mut store = store_with(layout_of(&[&["A", "C"], &["B"]]));
    let closed = store.apply(&LayoutCommand::DragEnd {
        active_id: "B".to_string(),
        over_id: Some("row-drop-0".to_string()),
    });
    assert!(closed.is_empty());
    let layout = current(&store);
    assert_eq!(layout.rows.len(), 2);
    assert_eq!(
        shape(layout),
        vec![vec!["B".to_string()], vec!["A".to_string(), "C".to_string()]]
    );
}

/// A drop past the removed row lands where the user pointed
#[test]
fn test_row_drop_below_removed_row_adjusts_index() {
    let layout = layout_of(&[&["A"], &["B"], &["C"]]);
    // Gap 3 is below C; lifting A removes row 0 so the gap becomes index 2
    let next = handle_drag_end(&layout, "A", Some("row-drop-3"));
    assert_eq!(
        shape(&next),
        vec![
            vec!["B".to_string()],
            vec!["C".to_string()],
            vec!["A".to_string()]
        ]
    );
}

#[test]
fn test_edge_drops() {
    let layout = layout_of(&[&["A", "B"], &["C"]]);

    let left = handle_drag_end(&layout, "C", Some("edge-left-A"));
    assert_eq!(
        shape(&left),
        vec![vec!["C".to_string(), "A".to_string(), "B".to_string()]]
    );

    let right = handle_drag_end(&layout, "A", Some("edge-right-B"));
    assert_eq!(shape(&right)[0], vec!["B".to_string(), "A".to_string()]);

    let top = handle_drag_end(&layout, "B", Some("edge-top-C"));
    assert_eq!(
        shape(&top),
        vec![
            vec!["A".to_string()],
            vec!["B".to_string()],
            vec!["C".to_string()]
        ]
    );

    let bottom = handle_drag_end(&layout, "A", Some("edge-bottom-C"));
    assert_eq!(
        shape(&bottom),
        vec![
            vec!["B".to_string()],
            vec!["C".to_string()],
            vec!["A".to_string()]
        ]
    );
}

#[test]
fn test_pane_drop_reorders_and_moves() {
    let layout = layout_of(&[&["A", "B", "C"], &["D"]]);

    let reordered = handle_drag_end(&layout, "A", Some("C"));
    assert_eq!(
        shape(&reordered)[0],
        vec!["B".to_string(), "C".to_string(), "A".to_string()]
    );

    // D's row empties and disappears
    let moved = handle_drag_end(&layout, "D", Some("B"));
    assert_eq!(
        shape(&moved),
        vec![vec![
            "A".to_string(),
            "D".to_string(),
            "B".to_string(),
            "C".to_string()
        ]]
    );
}

#[test]
fn test_drops_that_change_nothing() {
    let layout = layout_of(&[&["A", "B"]]);
    assert_eq!(handle_drag_end(&layout, "A", None), layout);
    assert_eq!(handle_drag_end(&layout, "A", Some("A")), layout);
    assert_eq!(handle_drag_end(&layout, "A", Some("edge-left-A")), layout);
    assert_eq!(handle_drag_end(&layout, "A", Some("nowhere")), layout);
    assert_eq!(handle_drag_end(&layout, "ghost", Some("B")), layout);
}

/// A live divider drag commits every move and keeps the pair's total
#[test]
fn test_resize_drag_is_zero_sum() {
    let mut store = store_with(layout_of(&[&["A", "B"], &["C"]]));
    let row_id = current(&store).rows[0].id.clone();

    let mut drag = ResizeDrag::begin(
        ResizeTarget::Pane {
            row_id: row_id.clone(),
            pane_index: 0,
        },
        400.0,
        800.0,
    );
    for pos in [420.0, 480.0, 10_000.0, 300.0] {
        let next = drag.update(current(&store), pos);
        store.commit(next);
        let panes = &current(&store).rows[0].panes;
        assert!((panes[0].flex + panes[1].flex - 2.0).abs() < 1e-9);
        assert_layout_invariants(current(&store));
    }

    let closed = store.apply(&LayoutCommand::ResizeRow {
        row_index: 0,
        delta: -100_000.0,
        container_height: 600.0,
    });
    assert!(closed.is_empty());
    let rows = &current(&store).rows;
    assert!((rows[0].flex - 0.1).abs() < 1e-9);
    assert!((rows[0].flex + rows[1].flex - 2.0).abs() < 1e-9);
}

/// Small deterministic generator so the sweep is reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n.max(1) as u64) as usize
    }
}

fn random_command(layout: &Layout, rng: &mut Lcg) -> LayoutCommand {
    let row_index = rng.below(layout.rows.len());
    let row = &layout.rows[row_index];
    let pane = &row.panes[rng.below(row.panes.len())];
    let panes = layout.all_pane_ids();
    match rng.below(7) {
        0 => LayoutCommand::SplitVertical {
            pane_id: pane.id.clone(),
            row_id: row.id.clone(),
            profile_id: "shell".to_string(),
        },
        1 => LayoutCommand::SplitHorizontal {
            row_id: row.id.clone(),
            profile_id: "git".to_string(),
        },
        2 => LayoutCommand::ClosePane {
            pane_id: pane.id.clone(),
            row_id: row.id.clone(),
        },
        3 => LayoutCommand::ResizeRow {
            row_index,
            delta: rng.below(1200) as f64 - 600.0,
            container_height: 720.0,
        },
        4 => LayoutCommand::ResizePane {
            row_id: row.id.clone(),
            pane_index: rng.below(row.panes.len()),
            delta: rng.below(1200) as f64 - 600.0,
            container_width: 1280.0,
        },
        5 => {
            let target = &panes[rng.below(panes.len())];
            let over = match rng.below(6) {
                0 => format!("row-drop-{}", rng.below(layout.rows.len() + 1)),
                1 => format!("edge-left-{target}"),
                2 => format!("edge-right-{target}"),
                3 => format!("edge-top-{target}"),
                4 => format!("edge-bottom-{target}"),
                _ => target.clone(),
            };
            LayoutCommand::DragEnd {
                active_id: pane.id.clone(),
                over_id: Some(over),
            }
        }
        _ => LayoutCommand::RenamePane {
            pane_id: pane.id.clone(),
            name: Some(format!("pane {}", rng.below(100))),
        },
    }
}

/// Hundreds of mixed commands never break the tree
#[test]
fn test_invariants_hold_under_command_sweep() {
    let mut store = store_with(layout_of(&[&["A"]]));
    let mut rng = Lcg(0x5eed);

    for _ in 0..600 {
        let before = current(&store).clone();
        let command = random_command(&before, &mut rng);
        let closed = store.apply(&command);
        let after = current(&store);

        assert_layout_invariants(after);
        assert!(closed.len() <= 1);
        for pane_id in &closed {
            assert!(before.find_pane(pane_id).is_some());
            assert!(after.find_pane(pane_id).is_none());
        }
        // Only splits add panes and only closes remove them
        match &command {
            LayoutCommand::SplitVertical { .. } | LayoutCommand::SplitHorizontal { .. } => {
                assert_eq!(after.pane_count(), before.pane_count() + 1);
            }
            LayoutCommand::ClosePane { .. } => {
                assert_eq!(after.pane_count(), before.pane_count() - closed.len());
            }
            _ => assert_eq!(after.pane_count(), before.pane_count()),
        }
    }
}
