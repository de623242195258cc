//! # Runtime Error Types
//!
//! Errors surfaced by the fallible escape hatches of the runtime.
//!
//! Everyday entity and component operations never fail: a missing entity or
//! component is reported as `None`, `false` or a no-op. Only configuration
//! mistakes and malformed store swaps come back as an [`EcsError`].

use thiserror::Error;

/// Errors that can occur in the ECS runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// More distinct component kinds were registered than the registry allows.
    #[error("component kind limit exceeded: at most {max} kinds may be registered")]
    KindOverflow {
        /// The registry capacity.
        max: usize,
    },

    /// A statically numbered kind asked for a slot held by another kind.
    #[error("kind id {id} requested by {requested} is already assigned to {existing}")]
    KindConflict {
        /// The contested kind id.
        id: u16,
        /// Type name of the kind already holding the id.
        existing: &'static str,
        /// Type name of the kind that asked for it.
        requested: &'static str,
    },

    /// A statically numbered kind declared an id outside the registry range.
    #[error("kind id {id} is out of range (registry capacity {max})")]
    KindOutOfRange {
        /// The declared id.
        id: u16,
        /// The registry capacity.
        max: usize,
    },

    /// An operation needed an existing store for a kind that has none.
    #[error("no store exists for component kind {0}")]
    StoreMissing(&'static str),

    /// A replacement store does not hold the same entities as the live one.
    #[error("replacement store for {kind} does not match live associations (live {expected}, replacement {found})")]
    AssociationMismatch {
        /// Type name of the component kind.
        kind: &'static str,
        /// Associations in the live store.
        expected: usize,
        /// Associations in the replacement.
        found: usize,
    },

    /// Invalid configuration file or value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for runtime operations.
pub type EcsResult<T> = Result<T, EcsError>;
