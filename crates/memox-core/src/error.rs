//! # Consistency Errors
//!
//! The only failure the engine can report is a consistency violation: a rule derived an
//! expression whose signature is already interned to a group other than the one being
//! explored. Two groups that the rules claim are equivalent would then both exist, so the
//! memo's bookkeeping is broken and exploration stops at once.
//!
//! Lookup misses are not errors. A missing signature simply means a new group or a new
//! expression gets created.

use crate::memo::GroupId;

/// Errors raised by memo exploration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoError {
    /// A derived expression resolved to a different group than the one it was derived in.
    #[error(
        "{rule} collision: {origin} => {derived} already belongs to group {existing} (#{existing_id}), not {target} (#{target_id})"
    )]
    Collision {
        /// Name of the rule that derived the expression.
        rule: String,
        /// Rendering of the expression the rule fired on.
        origin: String,
        /// Rendering of the derived expression.
        derived: String,
        /// Group the derived signature is already interned to.
        existing: String,
        existing_id: GroupId,
        /// Group being explored.
        target: String,
        target_id: GroupId,
    },
}
