//! # Exploration Engine
//!
//! This module drives a root group to its fixpoint by repeatedly applying the memo's
//! transformation rules.
//!
//! ## One Pass
//!
//! A pass over a group (`explore_group`) works on the expressions present when the pass
//! starts; the count is snapshotted at entry and anything appended while the pass runs
//! waits for the next pass. The pass has two phases:
//!
//! 1. **Children first**: for each snapshotted join, the left child group and then the
//!    right child group are driven to their own fixpoint. A child pass that adds
//!    nothing marks the child `explored`; otherwise another pass over that child runs
//!    before moving on. Rules therefore always see fully explored children.
//! 2. **Rule firing**: every transformation rule whose pattern matches is applied to
//!    every snapshotted expression, in registration order. Each derived expression is
//!    either new (bound to this group and appended), already owned by this group
//!    (ignored), or owned by another group (a [`MemoError::Collision`]).
//!
//! The pass reports `true` when the group's expression count did not change.
//!
//! ## Work Stack
//!
//! Child fixpoints are not computed by native recursion. Each pending pass is a
//! [`Frame`] on an explicit stack holding its group, its snapshot and a cursor over the
//! child slots of the snapshotted expressions. The top frame either pushes the next
//! unexplored child or, when none is left, fires its rules and pops. Stack depth is
//! bounded by the heap rather than the thread stack, however deep the join tree.
//!
//! ## Termination
//!
//! Rules only add expressions to the group being explored and signatures are interned,
//! so a finite set of base relations gives a finite signature space. There is no pass
//! budget; `explore` loops until the root pass converges.

use crate::error::MemoError;
use crate::expr::Expr;
use crate::memo::{GroupId, Memo};
use crate::pattern::matches;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace};

/// Configuration knobs for exploration.
#[derive(Debug, Clone, Default)]
pub struct SearchConfig {
    /// Emit the full memo dump at trace level after every inserted expression.
    pub trace_memo: bool,
}

/// Driver state. `Converged` is the only terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Exploring,
    Converged,
}

/// Counters reported once the root group converges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExploreStats {
    /// Passes over the root group, including the converging one.
    pub root_passes: usize,
    /// Passes over any group during this call to `explore`.
    pub group_passes: usize,
    pub groups: usize,
    pub exprs: usize,
}

/// A pending pass over one group.
#[derive(Debug)]
struct Frame {
    group: GroupId,
    /// Expression count at pass entry.
    snapshot: usize,
    /// Next child slot to inspect. Two slots per expression: left, then right.
    cursor: usize,
}

impl Frame {
    fn new(memo: &Memo, group: GroupId) -> Self {
        Self {
            group,
            snapshot: memo.group(group).num_exprs(),
            cursor: 0,
        }
    }
}

/// The exploration engine.
///
/// Owns the memo for the duration of a run; the rules come from the registry the memo
/// was built with.
pub struct ExplorationSearch {
    pub memo: Memo,
    pub config: SearchConfig,
    state: SearchState,
    group_passes: usize,
}

impl ExplorationSearch {
    pub fn new(memo: Memo, config: SearchConfig) -> Self {
        Self {
            memo,
            config,
            state: SearchState::Exploring,
            group_passes: 0,
        }
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Explore `root` until a pass over it adds nothing.
    pub fn explore(&mut self, root: GroupId) -> Result<ExploreStats, MemoError> {
        debug!(
            "Starting exploration: root_group={}, groups={}, exprs={}",
            root,
            self.memo.num_groups(),
            self.memo.num_exprs()
        );

        self.state = SearchState::Exploring;
        self.group_passes = 0;
        let mut root_passes = 0;
        while self.state == SearchState::Exploring {
            root_passes += 1;
            if self.explore_group(root)? {
                self.state = SearchState::Converged;
            }
        }

        let stats = ExploreStats {
            root_passes,
            group_passes: self.group_passes,
            groups: self.memo.num_groups(),
            exprs: self.memo.num_exprs(),
        };
        debug!(
            "Exploration converged: root_passes={}, group_passes={}, groups={}, exprs={}",
            stats.root_passes, stats.group_passes, stats.groups, stats.exprs
        );
        Ok(stats)
    }

    /// Run one pass over `group`, driving its children to their fixpoints first.
    ///
    /// Returns `true` iff the pass added no expression to `group`, in which case the
    /// group is marked explored.
    pub fn explore_group(&mut self, group: GroupId) -> Result<bool, MemoError> {
        let mut stack = vec![Frame::new(&self.memo, group)];
        let mut active = HashSet::from([group]);
        let mut converged = false;

        // The root frame is the last one to complete, so `converged` ends up holding
        // the root's result.
        while let Some(mut frame) = stack.pop() {
            if let Some(child) = next_pending_child(&self.memo, &mut frame, &active) {
                active.insert(child);
                let child_frame = Frame::new(&self.memo, child);
                stack.push(frame);
                stack.push(child_frame);
                continue;
            }

            converged = self.fire_rules(&frame)?;
            active.remove(&frame.group);
            if converged {
                self.memo.group_mut(frame.group).explored = true;
            }
        }
        Ok(converged)
    }

    /// Rule-firing phase of a pass. Returns whether the group kept its size.
    fn fire_rules(&mut self, frame: &Frame) -> Result<bool, MemoError> {
        self.group_passes += 1;
        trace!(
            "Pass over group {} ({}) with {} expressions",
            frame.group,
            self.memo.group(frame.group).name,
            frame.snapshot
        );

        let rules = Arc::clone(self.memo.rules());
        for idx in 0..frame.snapshot {
            let expr = self.memo.group(frame.group).exprs()[idx].clone();
            for rule in &rules.transformation_rules {
                if !matches(&self.memo, &expr, &rule.pattern()) {
                    continue;
                }
                for derived in rule.apply(&expr, &mut self.memo) {
                    self.insert_derived(frame.group, &expr, derived, rule.name())?;
                }
            }
        }

        Ok(self.memo.group(frame.group).num_exprs() == frame.snapshot)
    }

    /// Bind a rule-derived expression to `group`, or report that its signature already
    /// belongs elsewhere.
    fn insert_derived(
        &mut self,
        group: GroupId,
        origin: &Expr,
        derived: Expr,
        rule: &str,
    ) -> Result<bool, MemoError> {
        match self.memo.find_expr(&derived) {
            Some(owner) if owner == group => Ok(false),
            Some(owner) => Err(MemoError::Collision {
                rule: rule.to_string(),
                origin: self.memo.render_expr(origin),
                derived: self.memo.render_expr(&derived),
                existing: self.memo.group(owner).name.clone(),
                existing_id: owner,
                target: self.memo.group(group).name.clone(),
                target_id: group,
            }),
            None => {
                debug!(
                    "[{}] {} => {}",
                    rule,
                    self.memo.render_expr(origin),
                    self.memo.render_expr(&derived)
                );
                match &derived {
                    Expr::Join(sig) => self.memo.register_join(*sig, group),
                    Expr::Relation { name } => self.memo.register_relation(name, group),
                }
                let added = self.memo.add_expr_to_group(group, derived);
                if self.config.trace_memo {
                    trace!("Memo after {}:\n{}", rule, self.memo);
                }
                Ok(added)
            }
        }
    }
}

/// Advance `frame`'s cursor to the next child group that still needs exploring.
///
/// Groups already on the work stack are skipped; they cannot be finished from below.
fn next_pending_child(
    memo: &Memo,
    frame: &mut Frame,
    active: &HashSet<GroupId>,
) -> Option<GroupId> {
    while frame.cursor < frame.snapshot * 2 {
        let expr = &memo.group(frame.group).exprs()[frame.cursor / 2];
        if let Some(sig) = expr.as_join() {
            let child = if frame.cursor % 2 == 0 { sig.left } else { sig.right };
            if !memo.group(child).explored && !active.contains(&child) {
                return Some(child);
            }
        }
        frame.cursor += 1;
    }
    None
}
