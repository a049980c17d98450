//! # memox-core: Memo and Exploration Engine
//!
//! This crate implements the core data structures for enumerating logically equivalent
//! join orderings, in the style of a Cascades/Volcano optimizer's memo. There is no
//! costing here: the engine only enumerates alternatives until a fixpoint is reached.
//!
//! ## Module Overview
//!
//! - **`expr`**: Expression types (relation leaves and binary joins) and join signatures.
//! - **`memo`**: The Memo table -- groups of equivalent expressions plus the interning
//!   tables that keep one group per distinct signature.
//! - **`pattern`**: Declarative pattern matching used to decide whether a rule applies.
//! - **`rule`**: The `Rule` and `JoinSimplification` traits and the `RuleRegistry`.
//! - **`search`**: The exploration engine that drives a root group to its fixpoint.
//! - **`error`**: The consistency violation raised when a derived expression collides
//!   with a different group.

pub mod error;
pub mod expr;
pub mod memo;
pub mod pattern;
pub mod rule;
pub mod search;
