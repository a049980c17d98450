//! # Driver Configuration
//!
//! Settings that shape a run: whether the zero-cardinality simplification is active,
//! which pair of relations it collapses, and whether the memo is dumped at trace level
//! after every insertion. Everything has a default, so the config file is optional and
//! may set any subset of fields:
//!
//! ```toml
//! trace_memo = true
//! simplify = true
//!
//! [zero_cardinality]
//! left = "a"
//! right = "c"
//! replacement = "E"
//! ```

use anyhow::{Context, Result};
use memox_core::rule::RuleRegistry;
use memox_core::search::SearchConfig;
use memox_rules::zero_cardinality::ZeroCardinalityRule;
use serde::Deserialize;
use std::path::Path;

/// Driver-level configuration, loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Dump the memo at trace level after every inserted expression.
    pub trace_memo: bool,
    /// Register the zero-cardinality simplification.
    pub simplify: bool,
    pub zero_cardinality: ZeroCardinalityConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            trace_memo: false,
            simplify: true,
            zero_cardinality: ZeroCardinalityConfig::default(),
        }
    }
}

/// The pair of relations whose join collapses, and what it collapses to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ZeroCardinalityConfig {
    pub left: String,
    pub right: String,
    pub replacement: String,
}

impl Default for ZeroCardinalityConfig {
    fn default() -> Self {
        let rule = ZeroCardinalityRule::default();
        Self {
            left: rule.left,
            right: rule.right,
            replacement: rule.replacement,
        }
    }
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Build the rule registry this configuration asks for.
    pub fn rule_registry(&self) -> RuleRegistry {
        let mut registry = memox_rules::reordering_rule_registry();
        if self.simplify {
            let zc = &self.zero_cardinality;
            registry.add_simplification(Box::new(ZeroCardinalityRule::new(
                zc.left.as_str(),
                zc.right.as_str(),
                zc.replacement.as_str(),
            )));
        }
        registry
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            trace_memo: self.trace_memo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = CliConfig::parse("").unwrap();
        assert_eq!(config, CliConfig::default());
        assert!(config.simplify);
        assert_eq!(config.zero_cardinality.replacement, "E");
        assert_eq!(
            config.rule_registry().rule_names(),
            vec!["JoinCommutativity", "JoinAssociativity", "ZeroCardinality"]
        );
    }

    #[test]
    fn test_partial_override() {
        let config = CliConfig::parse(
            r#"
            trace_memo = true

            [zero_cardinality]
            right = "d"
            "#,
        )
        .unwrap();
        assert!(config.trace_memo);
        assert!(config.search_config().trace_memo);
        assert_eq!(config.zero_cardinality.left, "a");
        assert_eq!(config.zero_cardinality.right, "d");
        assert_eq!(config.zero_cardinality.replacement, "E");
    }

    #[test]
    fn test_simplify_disabled() {
        let config = CliConfig::parse("simplify = false").unwrap();
        let registry = config.rule_registry();
        assert!(registry.simplifications.is_empty());
        assert_eq!(registry.transformation_rules.len(), 2);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[zero_cardinality]\nleft = \"b\"").unwrap();
        let config = CliConfig::load(file.path()).unwrap();
        assert_eq!(config.zero_cardinality.left, "b");
        assert_eq!(config.zero_cardinality.right, "c");
        assert!(config.simplify);
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = CliConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(CliConfig::parse("simplify = \"yes\"").is_err());
    }
}
