//! # Built-in Rules
//!
//! This crate provides the default rules for the memox exploration engine.
//!
//! ## Transformation Rules
//!
//! - **`JoinCommutativityRule`**: `A ⋈ B -> B ⋈ A`.
//! - **`JoinAssociativityRule`**: `(A ⋈ B) ⋈ C -> A ⋈ (B ⋈ C)`, creating the inner
//!   group through `Memo::construct_join`.
//!
//! ## Join Simplifications
//!
//! - **`ZeroCardinalityRule`**: a configured pair of groups whose join collapses to a
//!   named relation (`{a, c} -> E` by default).

pub mod join_associativity;
pub mod join_commutativity;
pub mod zero_cardinality;

use memox_core::memo::Memo;
use memox_core::rule::RuleRegistry;
use std::sync::Arc;

/// Commutativity and associativity, without simplifications.
pub fn reordering_rule_registry() -> RuleRegistry {
    let mut registry = RuleRegistry::new();

    // Order matters: commutativity fires before associativity on each expression.
    registry.add_rule(Box::new(join_commutativity::JoinCommutativityRule));
    registry.add_rule(Box::new(join_associativity::JoinAssociativityRule));

    registry
}

/// Create a default rule registry with all built-in rules.
pub fn default_rule_registry() -> RuleRegistry {
    let mut registry = reordering_rule_registry();
    registry.add_simplification(Box::new(zero_cardinality::ZeroCardinalityRule::default()));
    registry
}

/// An empty memo wired to [`default_rule_registry`].
pub fn default_memo() -> Memo {
    Memo::with_rules(Arc::new(default_rule_registry()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_contents() {
        let registry = default_rule_registry();
        assert_eq!(
            registry.rule_names(),
            vec!["JoinCommutativity", "JoinAssociativity", "ZeroCardinality"]
        );
        assert!(reordering_rule_registry().simplifications.is_empty());
    }

    #[test]
    fn test_default_memo_carries_rules() {
        let memo = default_memo();
        assert_eq!(memo.rules().rule_names().len(), 3);
        assert_eq!(memo.num_groups(), 0);
    }
}
