//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use erblint_core::{Linter, LinterConfig, RuleOption};
use erblint_parser::ProcessedSource;
use erblint_rule::{Correction, Offense, Rule, RuleDescriptor};
use tempfile::TempDir;

/// Reports every occurrence of `from` and corrects it to `to`.
pub struct ReplaceRule {
    id: &'static str,
    from: &'static str,
    to: &'static str,
}

impl Rule for ReplaceRule {
    fn id(&self) -> &str {
        self.id
    }

    fn description(&self) -> &str {
        "Replaces one literal with another"
    }

    fn offenses(&self, source: &ProcessedSource) -> Vec<Offense> {
        source
            .content()
            .match_indices(self.from)
            .map(|(start, m)| {
                Offense::new(
                    self.id,
                    source.to_range(start, start + m.len()),
                    format!("Replace {:?} with {:?}", self.from, self.to),
                )
            })
            .collect()
    }

    fn supports_autocorrect(&self) -> bool {
        true
    }

    fn autocorrect(&self, _source: &ProcessedSource, offense: &Offense) -> Option<Correction> {
        Some(Correction::new(offense.range, self.to))
    }
}

macro_rules! replace_rule {
    ($id:literal, $from:literal, $to:literal) => {
        RuleDescriptor {
            id: $id,
            description: "Replaces one literal with another",
            schema: || serde_json::json!({ "type": "object" }),
            build: |_| {
                Ok(Box::new(ReplaceRule {
                    id: $id,
                    from: $from,
                    to: $to,
                }))
            },
            enabled_by_default: false,
        }
    };
}

/// Built-in rules plus test rules that misbehave on purpose.
///
/// - `swap-ab` / `swap-ba` undo each other forever
/// - `clash-a` / `clash-b` rewrite the same range differently
/// - `break-markup` inserts an unclosed ERB tag
pub fn descriptors() -> Vec<RuleDescriptor> {
    let mut descriptors = erblint_rules::builtin_descriptors();
    descriptors.extend([
        replace_rule!("swap-ab", "aa", "bb"),
        replace_rule!("swap-ba", "bb", "aa"),
        replace_rule!("clash-a", "clash", "A"),
        replace_rule!("clash-b", "clash", "B"),
        replace_rule!("break-markup", "broken", "<%"),
    ]);
    descriptors
}

/// A configuration enabling exactly `rules`, caching into `dir`.
pub fn config_with(dir: &Path, rules: &[&str]) -> LinterConfig {
    let mut config = LinterConfig::new();
    config.cache.dir = dir.join(".erblint-cache");
    for descriptor in descriptors() {
        config.rules.insert(
            descriptor.id.to_string(),
            RuleOption::Enabled(rules.contains(&descriptor.id)),
        );
    }
    config
}

pub fn create_test_linter(temp_dir: &TempDir, rules: &[&str]) -> Linter {
    Linter::new(config_with(temp_dir.path(), rules), &descriptors())
        .expect("Failed to create linter")
}

pub fn write_file(temp_dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = temp_dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

pub fn rule_ids(offenses: &[Offense]) -> Vec<&str> {
    offenses.iter().map(|o| o.rule_id.as_str()).collect()
}
