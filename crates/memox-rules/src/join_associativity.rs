//! # Join Associativity Rule
//!
//! This rule implements the identity `(A ⋈ B) ⋈ C = A ⋈ (B ⋈ C)`.
//!
//! ## Why Associativity Matters
//!
//! Commutativity alone only mirrors each join in place; it never changes which
//! relations are joined first. Associativity changes the *shape* of the tree
//! (left-deep, right-deep, bushy), and combined with commutativity it reaches every
//! join order over the input relations.
//!
//! ## Implementation
//!
//! For an expression `(L, R)`, every join `(LL, LR)` present in group `L` when the rule
//! fires yields one proposal:
//!
//! 1. `R' = construct_join(LR, R)` -- finds or creates the group for `LR ⋈ R`. This goes
//!    through the memo's join simplifications, so `R'` may be a relation group.
//! 2. Propose `(LL, R')` for the group owning `(L, R)`.
//!
//! Only the direct expressions of `L` are used; alternatives of `L` derived later are
//! picked up on the next exploration pass. Because `L` is fully explored before its
//! parent fires rules, it already holds both orientations of each of its joins, so both
//! `A ⋈ (B ⋈ C)` and `B ⋈ (A ⋈ C)` are proposed.

use memox_core::expr::Expr;
use memox_core::memo::Memo;
use memox_core::pattern::Pattern;
use memox_core::rule::Rule;

/// Join associativity: `(A ⋈ B) ⋈ C -> A ⋈ (B ⋈ C)`.
pub struct JoinAssociativityRule;

impl Rule for JoinAssociativityRule {
    fn name(&self) -> &str {
        "JoinAssociativity"
    }

    fn pattern(&self) -> Pattern {
        // Match: Join(Join(A, B), C) -- left child group holds a join.
        Pattern::join_join_left()
    }

    fn apply(&self, expr: &Expr, memo: &mut Memo) -> Vec<Expr> {
        let Expr::Join(outer) = expr else {
            return vec![];
        };

        // Snapshot first: construct_join may allocate groups while we iterate.
        let inner_joins: Vec<_> = memo.group(outer.left).joins().collect();

        inner_joins
            .into_iter()
            .map(|inner| {
                let right = memo.construct_join(inner.right, outer.right);
                Expr::join(inner.left, right)
            })
            .collect()
    }
}
