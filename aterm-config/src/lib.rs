//! Configuration system for the aterm workspace.
//!
//! This crate provides the persisted data model and its loading/saving:
//!
//! - Layout tree (`Layout` → `Row` → `Pane`) with copy-on-write mutators
//! - Profiles (command templates panes are spawned from)
//! - Projects (a working directory plus its saved layouts and optional remote host)
//! - Timing constants for the status classifier and the I/O pipeline
//! - YAML persistence with atomic writes

pub mod config;
pub mod defaults;
pub mod error;
pub mod layout;
pub mod profile;
pub mod project;
pub mod timing;

// Re-export main types for convenience
pub use config::{Config, LogLevel};
pub use error::ConfigError;
pub use layout::{Layout, LayoutId, MIN_FLEX, Pane, PaneId, PaneLocation, Row, RowId, new_id};
pub use profile::{Profile, ProfileId, ProfileKind};
pub use project::{Project, ProjectId, RemoteHost};
pub use timing::{IoTiming, NotificationConfig, StatusTiming};
