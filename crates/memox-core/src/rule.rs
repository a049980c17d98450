//! # Rule System
//!
//! Two kinds of rules drive exploration:
//!
//! - **Transformation rules** ([`Rule`]): given an expression of some group, derive
//!   equivalent expressions for the *same* group. Join commutativity and associativity
//!   are transformation rules. Rules only propose expressions; the exploration engine
//!   decides whether a proposal is new, already known, or a consistency violation.
//!
//! - **Join simplifications** ([`JoinSimplification`]): consulted by
//!   [`Memo::construct_join`] before a join group is built. A simplification may declare
//!   that `left ⋈ right` reduces to a named relation, in which case that relation's
//!   group is returned instead of a join group.
//!
//! ## Rule Registry
//!
//! The `RuleRegistry` holds both lists. Order matters: transformation rules fire on each
//! expression in registration order, and the first simplification that matches wins.
//! The registry is immutable once shared with a memo, so it is held behind an `Arc`.

use crate::expr::Expr;
use crate::memo::{Group, Memo};
use crate::pattern::Pattern;

/// A transformation rule deriving equivalent expressions.
pub trait Rule: Send + Sync {
    /// Unique name of this rule, used in logs and collision reports.
    fn name(&self) -> &str;

    /// Pattern that this rule matches against.
    fn pattern(&self) -> Pattern;

    /// Derive expressions equivalent to `expr`.
    ///
    /// Rules may build intermediate groups through `memo` (for example with
    /// [`Memo::construct_join`]) but must not add expressions to existing groups; the
    /// engine inserts the returned expressions into the group owning `expr`.
    fn apply(&self, expr: &Expr, memo: &mut Memo) -> Vec<Expr>;
}

/// A rule that replaces a join by a relation before the join group is created.
pub trait JoinSimplification: Send + Sync {
    fn name(&self) -> &str;

    /// Name of the relation `left ⋈ right` reduces to, or `None` to leave the join alone.
    fn simplify(&self, left: &Group, right: &Group) -> Option<String>;
}

/// Registry of transformation rules and join simplifications.
pub struct RuleRegistry {
    pub transformation_rules: Vec<Box<dyn Rule>>,
    pub simplifications: Vec<Box<dyn JoinSimplification>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self {
            transformation_rules: Vec::new(),
            simplifications: Vec::new(),
        }
    }

    pub fn add_rule(&mut self, rule: Box<dyn Rule>) {
        self.transformation_rules.push(rule);
    }

    pub fn add_simplification(&mut self, simplification: Box<dyn JoinSimplification>) {
        self.simplifications.push(simplification);
    }

    /// Names of all registered rules, transformations first.
    pub fn rule_names(&self) -> Vec<&str> {
        self.transformation_rules
            .iter()
            .map(|r| r.name())
            .chain(self.simplifications.iter().map(|s| s.name()))
            .collect()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
