//! # Zero-Cardinality Simplification
//!
//! Some joins are known to collapse: when two inputs can never produce a matching row,
//! their join is equivalent to a fixed (empty) relation and there is nothing to reorder.
//! A real optimizer would learn this from statistics or constraints. Here the pair is
//! configured by name: a join whose child groups are named `left` and `right`, in either
//! order, is replaced by the relation `replacement`.
//!
//! The default pair is `{a, c}` collapsing to `E`.

use memox_core::memo::Group;
use memox_core::rule::JoinSimplification;

/// Replace `left ⋈ right` (either orientation) by a named relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZeroCardinalityRule {
    pub left: String,
    pub right: String,
    pub replacement: String,
}

impl ZeroCardinalityRule {
    pub fn new(
        left: impl Into<String>,
        right: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            replacement: replacement.into(),
        }
    }

    fn matches(&self, left: &str, right: &str) -> bool {
        (left == self.left && right == self.right) || (left == self.right && right == self.left)
    }
}

impl Default for ZeroCardinalityRule {
    fn default() -> Self {
        Self::new("a", "c", "E")
    }
}

impl JoinSimplification for ZeroCardinalityRule {
    fn name(&self) -> &str {
        "ZeroCardinality"
    }

    fn simplify(&self, left: &Group, right: &Group) -> Option<String> {
        self.matches(&left.name, &right.name)
            .then(|| self.replacement.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memox_core::memo::Memo;

    #[test]
    fn test_matches_either_orientation() {
        let rule = ZeroCardinalityRule::default();
        let mut memo = Memo::without_rules();
        let a = memo.intern_relation("a");
        let b = memo.intern_relation("b");
        let c = memo.intern_relation("c");

        assert_eq!(rule.simplify(memo.group(a), memo.group(c)), Some("E".to_string()));
        assert_eq!(rule.simplify(memo.group(c), memo.group(a)), Some("E".to_string()));
        assert_eq!(rule.simplify(memo.group(a), memo.group(b)), None);
        assert_eq!(rule.simplify(memo.group(a), memo.group(a)), None);
    }

    #[test]
    fn test_custom_pair() {
        let rule = ZeroCardinalityRule::new("x", "yz", "Z");
        let mut memo = Memo::without_rules();
        let x = memo.intern_relation("x");
        let y = memo.intern_relation("y");
        let z = memo.intern_relation("z");
        let yz = memo.construct_join(y, z);

        assert_eq!(rule.simplify(memo.group(yz), memo.group(x)), Some("Z".to_string()));
        assert_eq!(rule.simplify(memo.group(x), memo.group(y)), None);
    }
}
