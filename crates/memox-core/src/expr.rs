//! # Expression Types
//!
//! An expression is one concrete way of producing a group's result. There are only two
//! shapes:
//!
//! - **Relation**: a reference to a base relation by name. This is always a leaf.
//! - **Join**: a binary join of two *groups*. Children are referenced by `GroupId`,
//!   never stored inline, so every alternative of a child group is implicitly shared
//!   by every join that references it.
//!
//! The identity of a join for interning purposes is its ordered pair of child groups,
//! captured by [`JoinSig`]. `(l, r)` and `(r, l)` are distinct signatures even though
//! commutativity places both in the same group.

use crate::memo::GroupId;

/// Ordered join signature: the interning key for join expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JoinSig {
    pub left: GroupId,
    pub right: GroupId,
}

impl JoinSig {
    pub fn new(left: GroupId, right: GroupId) -> Self {
        Self { left, right }
    }

    /// The same join with its children swapped.
    pub fn commuted(&self) -> Self {
        Self {
            left: self.right,
            right: self.left,
        }
    }
}

/// A logical expression stored in a memo group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// Base relation reference.
    Relation { name: String },
    /// Binary join of two groups.
    Join(JoinSig),
}

impl Expr {
    pub fn relation(name: impl Into<String>) -> Self {
        Expr::Relation { name: name.into() }
    }

    pub fn join(left: GroupId, right: GroupId) -> Self {
        Expr::Join(JoinSig::new(left, right))
    }

    pub fn as_join(&self) -> Option<JoinSig> {
        match self {
            Expr::Join(sig) => Some(*sig),
            Expr::Relation { .. } => None,
        }
    }
}
