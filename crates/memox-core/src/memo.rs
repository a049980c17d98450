//! # The Memo Table
//!
//! The memo is the registry of every group discovered during one exploration run. A
//! group is an equivalence class: every expression in it produces the same logical
//! result. Groups are stored in an arena and referenced by `GroupId`, so join
//! expressions can point at child groups without owning them.
//!
//! ## Interning
//!
//! Two tables guarantee that a logical signature never spawns two groups:
//!
//! - relation name → group
//! - ordered join signature `(left, right)` → group
//!
//! [`Memo::intern_relation`] and [`Memo::construct_join`] consult these tables before
//! allocating anything. Rule-derived expressions are bound into the tables by the
//! exploration engine, which refuses to bind a signature that already belongs to a
//! different group (see [`crate::error::MemoError`]).
//!
//! ## Canonical Names
//!
//! A join group is named by sorting the characters of its children's names, so `ab`,
//! `ba` and any commuted or re-associated variant all get the same readable label. Names
//! are for display only; identity is always the `GroupId`.
//!
//! ## Lifetime
//!
//! Groups are never removed or merged. The memo only grows, and is dropped as a whole
//! at the end of a run.

use crate::expr::{Expr, JoinSig};
use crate::rule::RuleRegistry;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Index of a group in the memo arena.
pub type GroupId = u32;

/// An equivalence class of logically equal expressions.
#[derive(Debug, Clone)]
pub struct Group {
    pub id: GroupId,
    /// Canonical, order-independent label.
    pub name: String,
    /// Expressions in insertion order, used for deterministic output.
    exprs: Vec<Expr>,
    /// Membership set backing `exprs`.
    members: HashSet<Expr>,
    /// Set once an exploration pass over this group adds nothing.
    pub explored: bool,
}

impl Group {
    fn new(id: GroupId, name: String, first: Expr) -> Self {
        let mut members = HashSet::new();
        members.insert(first.clone());
        Self {
            id,
            name,
            exprs: vec![first],
            members,
            explored: false,
        }
    }

    pub fn exprs(&self) -> &[Expr] {
        &self.exprs
    }

    pub fn num_exprs(&self) -> usize {
        self.exprs.len()
    }

    pub fn contains(&self, expr: &Expr) -> bool {
        self.members.contains(expr)
    }

    /// Append `expr` unless a structurally identical expression is already present.
    /// Returns whether the group grew.
    pub fn add_expr(&mut self, expr: Expr) -> bool {
        if !self.members.insert(expr.clone()) {
            return false;
        }
        self.exprs.push(expr);
        true
    }

    /// Join signatures among this group's expressions, in insertion order.
    pub fn joins(&self) -> impl Iterator<Item = JoinSig> + '_ {
        self.exprs.iter().filter_map(Expr::as_join)
    }
}

/// The memo: all groups plus the relation and join interning tables.
pub struct Memo {
    groups: Vec<Group>,
    interned_relations: HashMap<String, GroupId>,
    interned_joins: HashMap<JoinSig, GroupId>,
    rules: Arc<RuleRegistry>,
}

impl Memo {
    /// An empty memo whose `construct_join` and exploration use `rules`.
    ///
    /// `memox_rules::default_memo` builds one with the built-in rules.
    pub fn with_rules(rules: Arc<RuleRegistry>) -> Self {
        Self {
            groups: Vec::new(),
            interned_relations: HashMap::new(),
            interned_joins: HashMap::new(),
            rules,
        }
    }

    /// An empty memo with an empty registry: `construct_join` never simplifies and
    /// exploration derives nothing. Meant for exercising the tables directly.
    pub fn without_rules() -> Self {
        Self::with_rules(Arc::new(RuleRegistry::new()))
    }

    pub fn rules(&self) -> &Arc<RuleRegistry> {
        &self.rules
    }

    /// Return the group for relation `name`, creating a singleton group on first use.
    pub fn intern_relation(&mut self, name: &str) -> GroupId {
        if let Some(&gid) = self.interned_relations.get(name) {
            return gid;
        }
        let gid = self.next_group_id();
        self.groups
            .push(Group::new(gid, name.to_string(), Expr::relation(name)));
        self.interned_relations.insert(name.to_string(), gid);
        trace!("Interned relation '{}' as group {}", name, gid);
        gid
    }

    /// Return the group representing `left ⋈ right`.
    ///
    /// Registered join simplifications are consulted first, in registration order; the
    /// first one that fires replaces the join by a relation group and no join signature
    /// is recorded. Otherwise the exact ordered signature is looked up and a new group is
    /// allocated if it is unknown. The signature is (re-)bound to the returned group
    /// either way.
    pub fn construct_join(&mut self, left: GroupId, right: GroupId) -> GroupId {
        let rules = Arc::clone(&self.rules);
        for simplification in &rules.simplifications {
            if let Some(replacement) =
                simplification.simplify(self.group(left), self.group(right))
            {
                debug!(
                    "[{}] {} => {}",
                    simplification.name(),
                    self.render_join(JoinSig::new(left, right)),
                    replacement
                );
                return self.intern_relation(&replacement);
            }
        }

        let sig = JoinSig::new(left, right);
        let gid = match self.find_join(left, right) {
            Some(gid) => gid,
            None => {
                let name = canonical_join_name(&self.group(left).name, &self.group(right).name);
                let gid = self.next_group_id();
                self.groups.push(Group::new(gid, name, Expr::Join(sig)));
                trace!("Created join group {} for {}", gid, self.render_join(sig));
                gid
            }
        };
        self.interned_joins.insert(sig, gid);
        gid
    }

    /// Pure lookup of an ordered join signature.
    pub fn find_join(&self, left: GroupId, right: GroupId) -> Option<GroupId> {
        self.interned_joins.get(&JoinSig::new(left, right)).copied()
    }

    /// Pure lookup of a relation signature.
    pub fn find_relation(&self, name: &str) -> Option<GroupId> {
        self.interned_relations.get(name).copied()
    }

    /// Group that `expr`'s signature is interned to, if any.
    pub fn find_expr(&self, expr: &Expr) -> Option<GroupId> {
        match expr {
            Expr::Relation { name } => self.find_relation(name),
            Expr::Join(sig) => self.find_join(sig.left, sig.right),
        }
    }

    /// Bind a join signature to a group.
    pub fn register_join(&mut self, sig: JoinSig, group: GroupId) {
        self.interned_joins.insert(sig, group);
    }

    /// Bind a relation signature to a group.
    pub fn register_relation(&mut self, name: &str, group: GroupId) {
        self.interned_relations.insert(name.to_string(), group);
    }

    /// Append an expression to a group. Returns whether the group grew.
    pub fn add_expr_to_group(&mut self, group: GroupId, expr: Expr) -> bool {
        self.group_mut(group).add_expr(expr)
    }

    /// # Panics
    ///
    /// Panics if `id` was not handed out by this memo. Every id reachable from a
    /// memo's own expressions is valid for it; ids from another memo are not.
    pub fn group(&self, id: GroupId) -> &Group {
        &self.groups[id as usize]
    }

    /// # Panics
    ///
    /// Same as [`Memo::group`].
    pub fn group_mut(&mut self, id: GroupId) -> &mut Group {
        &mut self.groups[id as usize]
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn num_exprs(&self) -> usize {
        self.groups.iter().map(Group::num_exprs).sum()
    }

    /// Render one expression: a relation as its name, a join as `(left.right)` using the
    /// child group names.
    pub fn render_expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Relation { name } => name.clone(),
            Expr::Join(sig) => self.render_join(*sig),
        }
    }

    pub fn render_join(&self, sig: JoinSig) -> String {
        format!(
            "({}.{})",
            self.group(sig.left).name,
            self.group(sig.right).name
        )
    }

    /// Space-joined rendering of a group's expressions in insertion order.
    pub fn render_group(&self, id: GroupId) -> String {
        self.group(id)
            .exprs()
            .iter()
            .map(|e| self.render_expr(e))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Serializable view of the memo, groups ordered by name then id.
    pub fn snapshot(&self) -> MemoSnapshot {
        let mut groups: Vec<GroupSnapshot> = self
            .groups
            .iter()
            .map(|g| GroupSnapshot {
                id: g.id,
                name: g.name.clone(),
                explored: g.explored,
                exprs: g.exprs().iter().map(|e| self.render_expr(e)).collect(),
            })
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        MemoSnapshot { groups }
    }

    fn next_group_id(&self) -> GroupId {
        self.groups.len() as GroupId
    }
}

/// Diagnostic dump: one line per group, `"{name:>4}: {exprs}"`, lines sorted.
impl fmt::Display for Memo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines: Vec<String> = self
            .groups
            .iter()
            .map(|g| format!("{:>4}: {}", g.name, self.render_group(g.id)))
            .collect();
        lines.sort();
        for line in lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Serializable view of a whole memo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoSnapshot {
    pub groups: Vec<GroupSnapshot>,
}

/// Serializable view of one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSnapshot {
    pub id: GroupId,
    pub name: String,
    pub explored: bool,
    pub exprs: Vec<String>,
}

/// Order-independent group label: the sorted characters of both child names.
pub fn canonical_join_name(left: &str, right: &str) -> String {
    let mut chars: Vec<char> = left.chars().chain(right.chars()).collect();
    chars.sort_unstable();
    chars.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_relation_is_idempotent() {
        let mut memo = Memo::without_rules();
        let a1 = memo.intern_relation("a");
        let b = memo.intern_relation("b");
        let a2 = memo.intern_relation("a");
        assert_eq!(a1, a2);
        assert_ne!(a1, b);
        assert_eq!(memo.num_groups(), 2);
        assert_eq!(memo.group(a1).exprs(), &[Expr::relation("a")]);
    }

    #[test]
    fn test_canonical_join_name() {
        assert_eq!(canonical_join_name("b", "a"), "ab");
        assert_eq!(canonical_join_name("ac", "b"), "abc");
        assert_eq!(canonical_join_name("d", "abc"), "abcd");
        // Uppercase sorts before lowercase.
        assert_eq!(canonical_join_name("b", "E"), "Eb");
    }

    #[test]
    fn test_construct_join_reuses_signature() {
        let mut memo = Memo::without_rules();
        let a = memo.intern_relation("a");
        let b = memo.intern_relation("b");
        let ab = memo.construct_join(a, b);
        let again = memo.construct_join(a, b);
        assert_eq!(ab, again);
        assert_eq!(memo.num_groups(), 3);
        assert_eq!(memo.group(ab).name, "ab");
        assert_eq!(memo.find_join(a, b), Some(ab));
        // The mirrored signature is unknown until commutativity binds it.
        assert_eq!(memo.find_join(b, a), None);
    }

    #[test]
    fn test_construct_join_uses_existing_binding() {
        let mut memo = Memo::without_rules();
        let a = memo.intern_relation("a");
        let b = memo.intern_relation("b");
        let ab = memo.construct_join(a, b);
        memo.register_join(JoinSig::new(b, a), ab);
        assert_eq!(memo.construct_join(b, a), ab);
        assert_eq!(memo.num_groups(), 3);
        // construct_join never adds to an existing group.
        assert_eq!(memo.group(ab).num_exprs(), 1);
    }

    #[test]
    fn test_group_rejects_duplicates() {
        let mut memo = Memo::without_rules();
        let a = memo.intern_relation("a");
        let b = memo.intern_relation("b");
        let ab = memo.construct_join(a, b);
        assert!(!memo.add_expr_to_group(ab, Expr::join(a, b)));
        assert!(memo.add_expr_to_group(ab, Expr::join(b, a)));
        assert_eq!(memo.group(ab).num_exprs(), 2);
        assert!(memo.group(ab).contains(&Expr::join(b, a)));
        assert_eq!(memo.num_exprs(), 4);
    }

    #[test]
    fn test_display_format() {
        let mut memo = Memo::without_rules();
        let a = memo.intern_relation("a");
        let b = memo.intern_relation("b");
        let c = memo.intern_relation("c");
        let ab = memo.construct_join(a, b);
        memo.construct_join(ab, c);
        memo.add_expr_to_group(ab, Expr::join(b, a));

        let expected = "   a: a\n   b: b\n   c: c\n  ab: (a.b) (b.a)\n abc: (ab.c)\n";
        assert_eq!(memo.to_string(), expected);
    }

    #[test]
    #[should_panic]
    fn test_foreign_group_id_panics() {
        let mut other = Memo::without_rules();
        other.intern_relation("a");
        let foreign = other.intern_relation("b");

        let mut memo = Memo::without_rules();
        let a = memo.intern_relation("a");
        memo.construct_join(a, foreign);
    }

    #[test]
    fn test_snapshot_sorted_by_name() {
        let mut memo = Memo::without_rules();
        let c = memo.intern_relation("c");
        let a = memo.intern_relation("a");
        memo.construct_join(c, a);

        let snapshot = memo.snapshot();
        let names: Vec<_> = snapshot.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["a", "ac", "c"]);
        assert_eq!(snapshot.groups[1].exprs, vec!["(c.a)".to_string()]);
        assert!(!snapshot.groups[1].explored);
    }
}
