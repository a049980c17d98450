//! # memox: Command-Line Driver for Join-Order Exploration
//!
//! Builds a left-deep join over the given relations, explores the root group to its
//! fixpoint, and prints the memo.
//!
//! ```text
//! memox --relations a,b,c
//!   |
//!   +-> intern each relation, construct_join left-deep: ((a ⋈ b) ⋈ c)
//!   +-> ExplorationSearch::explore(root) until the root pass converges
//!   |
//!   v
//! memo dump (text, before and after) or snapshot + stats (JSON) on stdout
//! ```
//!
//! ## Configuration
//!
//! Rule selection comes from an optional TOML file (`--config`, see [`config`]);
//! `--no-simplify` turns the zero-cardinality rule off regardless. Logging goes to
//! stderr and is controlled by `RUST_LOG` (defaults to `memox=info`, or `memox=debug`
//! with `-v`). A consistency violation ends the run with a non-zero exit code.

mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use memox_core::memo::{GroupId, Memo, MemoSnapshot};
use memox_core::search::{ExplorationSearch, ExploreStats};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

#[derive(Debug, Parser)]
#[command(name = "memox", version, about = "Explore equivalent join orders in a memo")]
struct Args {
    /// Relation names, joined left-deep in the given order.
    #[arg(long, value_delimiter = ',', default_values = ["a", "b", "c"])]
    relations: Vec<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Disable the zero-cardinality simplification.
    #[arg(long)]
    no_simplify: bool,

    /// Optional TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log rule firings.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// JSON output: what was explored and what the memo looks like at the fixpoint.
#[derive(Serialize)]
struct Report<'a> {
    relations: &'a [String],
    rules: Vec<String>,
    stats: ExploreStats,
    memo: MemoSnapshot,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let directive = if args.verbose { "memox=debug" } else { "memox=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_writer(std::io::stderr)
        .init();

    print!("{}", run(&args)?);
    Ok(())
}

/// Build, explore and render one run. Errors carry the relation list as context.
fn run(args: &Args) -> Result<String> {
    let mut config = match &args.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    if args.no_simplify {
        config.simplify = false;
    }

    let relations: Vec<String> = args
        .relations
        .iter()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .collect();
    if relations.is_empty() {
        bail!("at least one relation is required");
    }

    let registry = Arc::new(config.rule_registry());
    let rules: Vec<String> = registry.rule_names().into_iter().map(String::from).collect();
    info!("Exploring {} relations with rules [{}]", relations.len(), rules.join(", "));

    let mut memo = Memo::with_rules(registry);
    let root = build_left_deep(&mut memo, &relations);
    let before = memo.to_string();

    let mut search = ExplorationSearch::new(memo, config.search_config());
    let stats = search
        .explore(root)
        .with_context(|| format!("exploring {}", relations.join(",")))?;
    info!(
        "Converged after {} root passes: {} groups, {} expressions",
        stats.root_passes, stats.groups, stats.exprs
    );

    let output = match args.format {
        OutputFormat::Text => format!("{}\n{}", before, search.memo),
        OutputFormat::Json => {
            let report = Report {
                relations: &relations,
                rules,
                stats,
                memo: search.memo.snapshot(),
            };
            format!("{}\n", serde_json::to_string_pretty(&report)?)
        }
    };
    Ok(output)
}

/// `((r0 ⋈ r1) ⋈ r2) ⋈ ...`; `relations` must not be empty.
fn build_left_deep(memo: &mut Memo, relations: &[String]) -> GroupId {
    let mut root = memo.intern_relation(&relations[0]);
    for name in &relations[1..] {
        let next = memo.intern_relation(name);
        root = memo.construct_join(root, next);
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_build_left_deep() {
        let mut memo = Memo::without_rules();
        let relations: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let root = build_left_deep(&mut memo, &relations);
        assert_eq!(memo.group(root).name, "abc");
        assert_eq!(memo.render_group(root), "(ab.c)");
        assert_eq!(memo.num_groups(), 5);
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["memox", "--relations", "x,y", "--format", "json", "--no-simplify"]);
        assert_eq!(args.relations, vec!["x", "y"]);
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.no_simplify);
        assert!(args.config.is_none());

        let defaults = Args::parse_from(["memox"]);
        assert_eq!(defaults.relations, vec!["a", "b", "c"]);
        assert_eq!(defaults.format, OutputFormat::Text);
    }

    #[test]
    fn test_run_prints_both_dumps() {
        let args = Args::parse_from(["memox", "--relations", "a,b"]);
        let output = run(&args).unwrap();
        assert_eq!(output, "   a: a\n   b: b\n  ab: (a.b)\n\n   a: a\n   b: b\n  ab: (a.b) (b.a)\n");
    }

    #[test]
    fn test_run_json_report() {
        let args = Args::parse_from(["memox", "--relations", "a,b,c", "--format", "json"]);
        let output = run(&args).unwrap();
        let report: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(report["stats"]["groups"], 7);
        assert_eq!(report["rules"][2], "ZeroCardinality");
        assert_eq!(report["memo"]["groups"][0]["name"], "E");
    }

    #[test]
    fn test_run_fails_on_collision() {
        let args = Args::parse_from(["memox", "--relations", "a,b,c,d"]);
        let err = run(&args).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.starts_with("exploring a,b,c,d: JoinAssociativity collision"), "{message}");

        let args = Args::parse_from(["memox", "--relations", "a,b,c,d", "--no-simplify"]);
        assert!(run(&args).unwrap().contains("abcd: (abc.d) (d.abc)"));
    }

    #[test]
    fn test_run_rejects_empty_relations() {
        let args = Args::parse_from(["memox", "--relations", " , "]);
        assert!(run(&args).is_err());
    }

    #[test]
    fn test_run_reads_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "simplify = false").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let args = Args::parse_from(["memox", "--relations", "a,b,c", "--config", &path]);
        let output = run(&args).unwrap();
        assert!(output.contains("  ac: (a.c) (c.a)"));
        assert!(!output.contains("   E: E"));
    }
}
