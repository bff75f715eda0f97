//! Lifecycle state machine shared by folders and files.
//!
//! ```text
//!   create ──► Active ──delete──► Trashed ──hard delete──► (row removed)
//!                ▲                   │
//!                └─────restore───────┘
//! ```
//!
//! `Purged` has no stored representation: a purged entity is simply gone,
//! so any later transition on it surfaces as `NotFound` from the lookup.

use std::fmt;
use std::str::FromStr;

use drive_core::AppError;
use serde::{Deserialize, Serialize};

/// Persisted lifecycle state of a folder or file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "lifecycle_state", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Active,
    Trashed,
}

/// A caller-initiated lifecycle change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    /// Soft delete.
    Trash,
    Restore,
    /// Hard delete.
    Purge,
}

/// What applying a [`Transition`] to a state results in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The entity moves to the given state.
    To(LifecycleState),
    /// The entity already satisfies the transition; nothing is written.
    Unchanged,
    /// The entity's row is removed.
    Removed,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Trashed => "trashed",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn is_trashed(&self) -> bool {
        matches!(self, Self::Trashed)
    }

    /// Apply a transition to this state.
    ///
    /// Trashing something already trashed is a no-op. Restoring or
    /// purging an active entity fails with `InvalidState`.
    pub fn apply(self, transition: Transition) -> Result<TransitionOutcome, AppError> {
        match (self, transition) {
            (Self::Active, Transition::Trash) => Ok(TransitionOutcome::To(Self::Trashed)),
            (Self::Trashed, Transition::Trash) => Ok(TransitionOutcome::Unchanged),
            (Self::Trashed, Transition::Restore) => Ok(TransitionOutcome::To(Self::Active)),
            (Self::Trashed, Transition::Purge) => Ok(TransitionOutcome::Removed),
            (Self::Active, Transition::Restore) => {
                Err(AppError::invalid_state("Cannot restore an item that is not in trash"))
            }
            (Self::Active, Transition::Purge) => Err(AppError::invalid_state(
                "Only items in trash can be permanently deleted",
            )),
        }
    }
}

impl Transition {
    /// The state an entity must be in for this transition to write anything.
    /// Conditional writes filter on it so that repeated steps are no-ops.
    pub fn source_state(&self) -> LifecycleState {
        match self {
            Self::Trash => LifecycleState::Active,
            Self::Restore | Self::Purge => LifecycleState::Trashed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trash => "trash",
            Self::Restore => "restore",
            Self::Purge => "purge",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleState {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "trashed" => Ok(Self::Trashed),
            _ => Err(AppError::validation(format!("Invalid lifecycle state: {s}"))),
        }
    }
}
