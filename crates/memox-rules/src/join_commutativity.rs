//! # Join Commutativity Rule
//!
//! This rule implements the algebraic identity `A JOIN B = B JOIN A`.
//!
//! The mirrored join `(R, L)` is proposed for the group owning `(L, R)`. The first time
//! it fires the mirrored signature is unknown, so the engine binds it to the same group.
//! When the rule later fires on the mirrored expression it proposes the original
//! `(L, R)`, which is already bound to that group, and nothing changes. That round trip
//! is what keeps commutativity from looping.
//!
//! If the mirrored signature is already bound to a *different* group, two groups claim
//! the same join and the engine reports a collision.

use memox_core::expr::Expr;
use memox_core::memo::Memo;
use memox_core::pattern::Pattern;
use memox_core::rule::Rule;

/// Join commutativity: `A JOIN B -> B JOIN A`.
pub struct JoinCommutativityRule;

impl Rule for JoinCommutativityRule {
    fn name(&self) -> &str {
        "JoinCommutativity"
    }

    fn pattern(&self) -> Pattern {
        Pattern::join()
    }

    fn apply(&self, expr: &Expr, _memo: &mut Memo) -> Vec<Expr> {
        let Expr::Join(sig) = expr else {
            return vec![];
        };
        vec![Expr::Join(sig.commuted())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commute_swaps_children() {
        let mut memo = Memo::without_rules();
        let a = memo.intern_relation("a");
        let b = memo.intern_relation("b");
        let ab = memo.construct_join(a, b);

        let expr = memo.group(ab).exprs()[0].clone();
        let derived = JoinCommutativityRule.apply(&expr, &mut memo);
        assert_eq!(derived, vec![Expr::join(b, a)]);
        // Proposing does not touch the memo.
        assert_eq!(memo.group(ab).num_exprs(), 1);
        assert_eq!(memo.find_join(b, a), None);
    }

    #[test]
    fn test_commute_ignores_relations() {
        let mut memo = Memo::without_rules();
        let a = memo.intern_relation("a");
        let expr = memo.group(a).exprs()[0].clone();
        assert!(JoinCommutativityRule.apply(&expr, &mut memo).is_empty());
    }
}
