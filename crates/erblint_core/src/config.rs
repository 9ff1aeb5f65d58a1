//! Linter configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use erblint_parser::ParserMode;
use erblint_rule::{RuleSetting, Severity};
use jsonschema::Validator;
use serde::{Deserialize, Serialize};

use crate::LinterError;

// Embed the schema
const SCHEMA_JSON: &str = include_str!("../../../schemas/v1/config.json");
static CONFIG_SCHEMA: OnceLock<Result<Validator, String>> = OnceLock::new();

/// Configuration for the linter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinterConfig {
    /// Rule configuration (enable/disable/severity/options), keyed by rule id.
    #[serde(default)]
    pub rules: BTreeMap<String, RuleOption>,

    /// How ERB tags are hidden from the markup parser.
    #[serde(default)]
    pub parser_mode: ParserMode,

    /// Whether to rewrite files with the corrections rules offer.
    #[serde(default)]
    pub autocorrect: bool,

    /// Result cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Worker threads for [`Linter::lint_files`](crate::Linter::lint_files).
    /// `None` uses one per CPU.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
}

/// Result cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether to read and write the cache.
    pub enabled: bool,

    /// Cache directory.
    pub dir: PathBuf,

    /// Whether to delete stale entries after [`Linter::lint_files`](crate::Linter::lint_files).
    pub prune: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from(".erblint-cache"),
            prune: true,
        }
    }
}

/// Configuration for a single rule (in the rules map).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RuleOption {
    /// Rule is enabled/disabled (boolean).
    Enabled(bool),
    /// Rule is enabled with severity string ("error", "warning", "info"), or "off".
    Severity(String),
    /// Rule is enabled with specific options object.
    ///
    /// A `severity` key inside the object sets the severity and is not passed
    /// to the rule.
    Options(serde_json::Value),
}

impl RuleOption {
    /// Returns whether the rule is enabled.
    pub fn is_enabled(&self) -> bool {
        match self {
            RuleOption::Enabled(enabled) => *enabled,
            RuleOption::Severity(s) => s != "off",
            RuleOption::Options(_) => true,
        }
    }

    /// Resolves this option into the setting the registry consumes.
    pub fn to_setting(&self, rule: &str) -> Result<RuleSetting, LinterError> {
        match self {
            RuleOption::Enabled(true) => Ok(RuleSetting::enabled()),
            RuleOption::Enabled(false) => Ok(RuleSetting::disabled()),
            RuleOption::Severity(s) if s == "off" => Ok(RuleSetting::disabled()),
            RuleOption::Severity(s) => {
                Ok(RuleSetting::enabled().with_severity(parse_severity(rule, s)?))
            }
            RuleOption::Options(value) => {
                let mut options = value.clone();
                let severity = match options.as_object_mut().and_then(|o| o.remove("severity")) {
                    Some(serde_json::Value::String(s)) => Some(parse_severity(rule, &s)?),
                    Some(other) => {
                        return Err(LinterError::config(format!(
                            "Severity of rule '{}' must be a string, got {}",
                            rule, other
                        )));
                    }
                    None => None,
                };

                let mut setting = RuleSetting::enabled().with_options(options);
                if let Some(severity) = severity {
                    setting = setting.with_severity(severity);
                }
                Ok(setting)
            }
        }
    }
}

fn parse_severity(rule: &str, name: &str) -> Result<Severity, LinterError> {
    Severity::from_name(name).ok_or_else(|| {
        LinterError::config(format!("Unknown severity '{}' for rule '{}'", name, rule))
    })
}

impl LinterConfig {
    /// Creates a configuration with no rule settings and default options.
    pub fn new() -> Self {
        Self {
            rules: BTreeMap::new(),
            parser_mode: ParserMode::default(),
            autocorrect: false,
            cache: CacheConfig::default(),
            jobs: None,
        }
    }

    /// Loads configuration from a JSON file.
    ///
    /// A relative cache directory is resolved against the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LinterError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| LinterError::config(format!("Failed to read config: {}", e)))?;

        let mut config = Self::from_json(&content)?;

        if config.cache.dir.is_relative()
            && let Some(parent) = path.parent()
        {
            config.cache.dir = parent.join(&config.cache.dir);
        }

        Ok(config)
    }

    /// Parses configuration from JSON string with schema validation.
    pub fn from_json(json: &str) -> Result<Self, LinterError> {
        // Parse into Value first for validation
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| LinterError::config(format!("Invalid JSON: {}", e)))?;

        let schema = CONFIG_SCHEMA
            .get_or_init(|| {
                let schema_json: serde_json::Value = serde_json::from_str(SCHEMA_JSON)
                    .map_err(|e| format!("Invalid embedded config schema: {}", e))?;
                Validator::new(&schema_json)
                    .map_err(|e| format!("Invalid config schema compilation: {}", e))
            })
            .as_ref()
            .map_err(|e| LinterError::internal(e.clone()))?;

        if let Err(e) = schema.validate(&value) {
            let error_msg = format!("{} at {}", e, e.instance_path());
            return Err(LinterError::config(format!(
                "Config validation failed: {}",
                error_msg
            )));
        }

        serde_json::from_value(value)
            .map_err(|e| LinterError::config(format!("Invalid config: {}", e)))
    }

    /// Resolves every rule option into a registry setting.
    pub fn rule_settings(&self) -> Result<BTreeMap<String, RuleSetting>, LinterError> {
        self.rules
            .iter()
            .map(|(name, option)| Ok((name.clone(), option.to_setting(name)?)))
            .collect()
    }
}

impl Default for LinterConfig {
    fn default() -> Self {
        Self::new()
    }
}
