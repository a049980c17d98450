//! # Declarative Pattern Matching for Rules
//!
//! Each rule declares a `Pattern` describing the shape of expression it rewrites. The
//! exploration engine checks the pattern before calling `apply`, so rules never see
//! expressions they cannot handle.
//!
//! ## Pattern Language
//!
//! - `Pattern::Any`: matches any expression or child group.
//! - `Pattern::Join(left, right)`: matches a join whose child groups match `left` and
//!   `right`.
//!
//! ## Group-Level Matching
//!
//! A child pattern other than `Any` is matched against the child *group*: it succeeds if
//! any expression currently in that group matches. All expressions of a group are
//! equivalent, so one witness is enough.

use crate::expr::Expr;
use crate::memo::{GroupId, Memo};

/// Pattern for matching expressions in the memo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Match anything.
    Any,
    /// Match a join with child patterns.
    Join(Box<Pattern>, Box<Pattern>),
}

impl Pattern {
    /// A join over any two children.
    pub fn join() -> Self {
        Pattern::Join(Box::new(Pattern::Any), Box::new(Pattern::Any))
    }

    /// A join whose left child group contains a join.
    pub fn join_join_left() -> Self {
        Pattern::Join(Box::new(Pattern::join()), Box::new(Pattern::Any))
    }
}

/// Check if an expression matches a pattern.
pub fn matches(memo: &Memo, expr: &Expr, pattern: &Pattern) -> bool {
    match (pattern, expr) {
        (Pattern::Any, _) => true,
        (Pattern::Join(left, right), Expr::Join(sig)) => {
            group_matches(memo, sig.left, left) && group_matches(memo, sig.right, right)
        }
        _ => false,
    }
}

fn group_matches(memo: &Memo, group: GroupId, pattern: &Pattern) -> bool {
    match pattern {
        Pattern::Any => true,
        _ => memo
            .group(group)
            .exprs()
            .iter()
            .any(|e| matches(memo, e, pattern)),
    }
}
