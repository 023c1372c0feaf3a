//! Layout tree: a `Layout` is a vertical stack of `Row`s, each a horizontal
//! band of `Pane`s sized by relative flex weights.
//!
//! Every mutator here is copy-on-write: it takes `&self` and returns a new
//! `Layout`, leaving the receiver untouched. Two invariants hold for every
//! layout produced by these functions:
//!
//! - no `Row` has an empty `panes` list (a row emptied by a removal is dropped
//!   in the same call)
//! - every flex weight is at least [`MIN_FLEX`]

use crate::error::ConfigError;
use crate::profile::{Profile, ProfileId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Identifier of a layout within a project
pub type LayoutId = String;
/// Identifier of a row within a layout
pub type RowId = String;
/// Identifier of a pane, unique within a layout
pub type PaneId = String;

/// Smallest flex weight a row or pane may be given.
pub const MIN_FLEX: f64 = 0.1;

// Zero-sum resizes can land a rounding step under the floor
const FLEX_TOLERANCE: f64 = 1e-9;

/// Generate a fresh identifier for a layout, row or pane.
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn clamp_flex(flex: f64) -> f64 {
    if flex.is_finite() {
        flex.max(MIN_FLEX)
    } else {
        MIN_FLEX
    }
}

/// One interactive session's slot within a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pane {
    pub id: PaneId,
    /// Profile the session is spawned from
    pub profile_id: ProfileId,
    /// Relative width within the row
    #[serde(default = "crate::defaults::flex")]
    pub flex: f64,
    /// User override of the profile's display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Pane {
    /// Create a pane with a fresh id and unit flex
    pub fn new(profile_id: impl Into<ProfileId>) -> Self {
        Self {
            id: new_id(),
            profile_id: profile_id.into(),
            flex: 1.0,
            name: None,
        }
    }

    /// Name shown for this pane: the user override, else the profile name,
    /// else the profile id.
    pub fn display_name<'a>(&'a self, profile: Option<&'a Profile>) -> &'a str {
        if let Some(name) = self.name.as_deref() {
            return name;
        }
        profile.map(|p| p.name.as_str()).unwrap_or(&self.profile_id)
    }
}

/// Horizontal band of panes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    /// Relative height within the layout
    #[serde(default = "crate::defaults::flex")]
    pub flex: f64,
    pub panes: Vec<Pane>,
}

impl Row {
    /// Create a row with a fresh id and unit flex holding a single pane
    pub fn with_pane(pane: Pane) -> Self {
        Self {
            id: new_id(),
            flex: 1.0,
            panes: vec![pane],
        }
    }

    /// Index of a pane within this row
    pub fn pane_index(&self, pane_id: &str) -> Option<usize> {
        self.panes.iter().position(|p| p.id == pane_id)
    }
}

/// Position of a pane in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneLocation {
    pub row_index: usize,
    pub pane_index: usize,
}

/// A named arrangement of rows and panes owned by a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub id: LayoutId,
    pub name: String,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Layout {
    /// Create an empty layout
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Create a layout with one row holding one pane of the given profile
    pub fn single(name: impl Into<String>, profile_id: impl Into<ProfileId>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            rows: vec![Row::with_pane(Pane::new(profile_id))],
        }
    }

    /// Total number of panes across all rows
    pub fn pane_count(&self) -> usize {
        self.rows.iter().map(|r| r.panes.len()).sum()
    }

    /// Iterate over every pane in row-major order
    pub fn panes(&self) -> impl Iterator<Item = &Pane> {
        self.rows.iter().flat_map(|r| r.panes.iter())
    }

    /// Ids of every pane in row-major order
    pub fn all_pane_ids(&self) -> Vec<PaneId> {
        self.panes().map(|p| p.id.clone()).collect()
    }

    /// Find a pane by id
    pub fn find_pane(&self, pane_id: &str) -> Option<&Pane> {
        self.panes().find(|p| p.id == pane_id)
    }

    /// Locate a pane by id
    pub fn locate(&self, pane_id: &str) -> Option<PaneLocation> {
        self.rows.iter().enumerate().find_map(|(row_index, row)| {
            row.pane_index(pane_id).map(|pane_index| PaneLocation {
                row_index,
                pane_index,
            })
        })
    }

    /// Index of a row by id
    pub fn row_index(&self, row_id: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.id == row_id)
    }

    /// Find a row by id
    pub fn row(&self, row_id: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == row_id)
    }

    /// Drop every row whose pane list is empty.
    pub fn drop_empty_rows(&mut self) {
        self.rows.retain(|r| !r.panes.is_empty());
    }

    // ========================================================================
    // Copy-on-write mutators
    // ========================================================================

    /// Append a new row holding one pane of the given profile
    #[must_use]
    pub fn add_row(&self, profile_id: impl Into<ProfileId>) -> Layout {
        let mut next = self.clone();
        next.rows.push(Row::with_pane(Pane::new(profile_id)));
        next
    }

    /// Append a new pane of the given profile to the end of a row.
    ///
    /// Unknown row ids leave the layout unchanged.
    #[must_use]
    pub fn add_pane_to_row(&self, row_id: &str, profile_id: impl Into<ProfileId>) -> Layout {
        let mut next = self.clone();
        if let Some(row) = next.rows.iter_mut().find(|r| r.id == row_id) {
            row.panes.push(Pane::new(profile_id));
        }
        next
    }

    /// Remove a pane wherever it is, dropping its row if that leaves it empty
    #[must_use]
    pub fn remove_pane(&self, pane_id: &str) -> Layout {
        let mut next = self.clone();
        for row in &mut next.rows {
            row.panes.retain(|p| p.id != pane_id);
        }
        next.drop_empty_rows();
        next
    }

    /// Set a pane's flex weight (clamped to [`MIN_FLEX`])
    #[must_use]
    pub fn update_pane_flex(&self, row_id: &str, pane_id: &str, flex: f64) -> Layout {
        let mut next = self.clone();
        if let Some(pane) = next
            .rows
            .iter_mut()
            .filter(|r| r.id == row_id)
            .flat_map(|r| r.panes.iter_mut())
            .find(|p| p.id == pane_id)
        {
            pane.flex = clamp_flex(flex);
        }
        next
    }

    /// Set a row's flex weight (clamped to [`MIN_FLEX`])
    #[must_use]
    pub fn update_row_flex(&self, row_id: &str, flex: f64) -> Layout {
        let mut next = self.clone();
        if let Some(row) = next.rows.iter_mut().find(|r| r.id == row_id) {
            row.flex = clamp_flex(flex);
        }
        next
    }

    /// Set or clear a pane's display-name override.
    ///
    /// Blank names clear the override.
    #[must_use]
    pub fn rename_pane(&self, pane_id: &str, name: Option<&str>) -> Layout {
        let mut next = self.clone();
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        if let Some(pane) = next
            .rows
            .iter_mut()
            .flat_map(|r| r.panes.iter_mut())
            .find(|p| p.id == pane_id)
        {
            pane.name = name;
        }
        next
    }

    /// Check the structural invariants of this layout
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for row in &self.rows {
            if row.panes.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "layout '{}': row '{}' has no panes",
                    self.name, row.id
                )));
            }
            if !(row.flex >= MIN_FLEX - FLEX_TOLERANCE) {
                return Err(ConfigError::Validation(format!(
                    "layout '{}': row '{}' has flex {} below {}",
                    self.name, row.id, row.flex, MIN_FLEX
                )));
            }
            for pane in &row.panes {
                if !seen.insert(pane.id.as_str()) {
                    return Err(ConfigError::Validation(format!(
                        "layout '{}': duplicate pane id '{}'",
                        self.name, pane.id
                    )));
                }
                if !(pane.flex >= MIN_FLEX - FLEX_TOLERANCE) {
                    return Err(ConfigError::Validation(format!(
                        "layout '{}': pane '{}' has flex {} below {}",
                        self.name, pane.id, pane.flex, MIN_FLEX
                    )));
                }
            }
        }
        Ok(())
    }
}
