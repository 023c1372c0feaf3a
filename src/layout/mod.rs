//! Layout mutation engine.
//!
//! Command handlers that rewrite an `aterm_config::Layout` while keeping its
//! invariants: no empty rows, unique pane ids, flex never below the minimum.
//! Handlers are pure; session lifetime is decided by the caller from the
//! pane ids a command reports as closed.

pub mod commands;
pub mod drag;
pub mod resize;
pub mod store;

pub use commands::{CloseOutcome, close_pane, split_horizontal, split_vertical};
pub use drag::{DragState, DropTarget, Edge, handle_drag_end};
pub use resize::{ResizeDrag, ResizeTarget, redistribute, resize_pane, resize_row};
pub use store::{LayoutCommand, LayoutStore, execute};
