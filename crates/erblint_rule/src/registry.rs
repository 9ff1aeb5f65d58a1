//! Explicit rule registry.

use std::collections::BTreeMap;
use std::fmt;

use jsonschema::Validator;
use serde::Serialize;
use tracing::debug;

use crate::{ConfigurableRule, Rule, RuleError, Severity};

/// Builds a rule from validated options.
pub type RuleBuilder = fn(&serde_json::Value) -> Result<Box<dyn Rule>, RuleError>;

/// Everything the registry needs to know about one rule.
#[derive(Clone, Copy)]
pub struct RuleDescriptor {
    pub id: &'static str,
    pub description: &'static str,
    pub schema: fn() -> serde_json::Value,
    pub build: RuleBuilder,
    pub enabled_by_default: bool,
}

impl RuleDescriptor {
    /// Describes a [`ConfigurableRule`].
    pub fn of<R: ConfigurableRule>() -> Self {
        Self {
            id: R::ID,
            description: R::DESCRIPTION,
            schema: R::schema,
            build: build_configurable::<R>,
            enabled_by_default: R::enabled_by_default(),
        }
    }
}

impl fmt::Debug for RuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDescriptor")
            .field("id", &self.id)
            .field("enabled_by_default", &self.enabled_by_default)
            .finish()
    }
}

fn build_configurable<R: ConfigurableRule>(
    options: &serde_json::Value,
) -> Result<Box<dyn Rule>, RuleError> {
    let config = if options.is_null() {
        R::Config::default()
    } else {
        serde_json::from_value(options.clone())
            .map_err(|e| RuleError::invalid_config(R::ID, e.to_string()))?
    };
    Ok(Box::new(R::from_config(config)))
}

/// Resolved configuration of one rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSetting {
    pub enabled: bool,
    /// Replaces the severity of every offense the rule reports.
    pub severity: Option<Severity>,
    /// Options object, or `null` for defaults.
    pub options: serde_json::Value,
}

impl RuleSetting {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            severity: None,
            options: serde_json::Value::Null,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::enabled()
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_options(mut self, options: serde_json::Value) -> Self {
        self.options = options;
        self
    }
}

/// An enabled rule with its resolved setting.
pub struct RegisteredRule {
    rule: Box<dyn Rule>,
    severity: Option<Severity>,
    options: serde_json::Value,
}

impl RegisteredRule {
    pub fn rule(&self) -> &dyn Rule {
        self.rule.as_ref()
    }

    pub fn severity(&self) -> Option<Severity> {
        self.severity
    }
}

impl fmt::Debug for RegisteredRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredRule")
            .field("id", &self.rule.id())
            .field("severity", &self.severity)
            .field("options", &self.options)
            .finish()
    }
}

#[derive(Serialize)]
struct SerializedRule<'a> {
    id: &'a str,
    severity: Option<Severity>,
    options: &'a serde_json::Value,
}

/// The enabled rules of one run, in descriptor order.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: Vec<RegisteredRule>,
}

impl RuleRegistry {
    /// Builds the registry from descriptors and per-rule settings.
    ///
    /// Settings naming an unknown rule, options failing the rule's schema and
    /// a configuration that enables nothing are all rejected here.
    pub fn build(
        descriptors: &[RuleDescriptor],
        settings: &BTreeMap<String, RuleSetting>,
    ) -> Result<Self, RuleError> {
        if let Some(unknown) = settings
            .keys()
            .find(|name| !descriptors.iter().any(|d| d.id == name.as_str()))
        {
            return Err(RuleError::unknown_rule(unknown.as_str()));
        }

        let mut rules = Vec::new();
        for descriptor in descriptors {
            let setting = settings.get(descriptor.id);
            let enabled = setting.map_or(descriptor.enabled_by_default, |s| s.enabled);
            if !enabled {
                debug!("Rule '{}' is disabled", descriptor.id);
                continue;
            }

            let options = setting
                .map(|s| s.options.clone())
                .unwrap_or(serde_json::Value::Null);
            validate_options(descriptor, &options)?;

            let rule = (descriptor.build)(&options)?;
            rules.push(RegisteredRule {
                rule,
                severity: setting.and_then(|s| s.severity),
                options,
            });
        }

        if rules.is_empty() {
            return Err(RuleError::NoRulesEnabled);
        }

        debug!("Registered {} rules", rules.len());
        Ok(Self { rules })
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredRule> {
        self.rules.iter()
    }

    pub fn get(&self, id: &str) -> Option<&RegisteredRule> {
        self.rules.iter().find(|r| r.rule.id() == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Stable JSON of the active rule configuration, for cache keys.
    pub fn serialized_config(&self) -> String {
        let rules: Vec<SerializedRule<'_>> = self
            .rules
            .iter()
            .map(|r| SerializedRule {
                id: r.rule.id(),
                severity: r.severity,
                options: &r.options,
            })
            .collect();
        serde_json::to_string(&rules).unwrap_or_default()
    }
}

fn validate_options(
    descriptor: &RuleDescriptor,
    options: &serde_json::Value,
) -> Result<(), RuleError> {
    if options.is_null() {
        return Ok(());
    }

    let schema = (descriptor.schema)();
    let validator = Validator::new(&schema).map_err(|e| {
        RuleError::invalid_config(descriptor.id, format!("Invalid rule schema: {}", e))
    })?;
    validator.validate(options).map_err(|e| {
        RuleError::invalid_config(descriptor.id, format!("{} at {}", e, e.instance_path()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Offense;
    use erblint_parser::ProcessedSource;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default, deny_unknown_fields)]
    struct MaxLengthConfig {
        max: Option<usize>,
    }

    struct MaxLength {
        max: usize,
    }

    impl Rule for MaxLength {
        fn id(&self) -> &str {
            Self::ID
        }

        fn description(&self) -> &str {
            Self::DESCRIPTION
        }

        fn offenses(&self, source: &ProcessedSource) -> Vec<Offense> {
            if source.content().len() > self.max {
                vec![Offense::new(Self::ID, source.to_range(0, 0), "Too long")]
            } else {
                Vec::new()
            }
        }
    }

    impl ConfigurableRule for MaxLength {
        const ID: &'static str = "max-length";
        const DESCRIPTION: &'static str = "Limits template length";
        type Config = MaxLengthConfig;

        fn schema() -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": { "max": { "type": "integer", "minimum": 1 } },
                "additionalProperties": false
            })
        }

        fn from_config(config: Self::Config) -> Self {
            Self {
                max: config.max.unwrap_or(80),
            }
        }
    }

    struct OptIn;

    impl Rule for OptIn {
        fn id(&self) -> &str {
            Self::ID
        }

        fn description(&self) -> &str {
            Self::DESCRIPTION
        }

        fn offenses(&self, _source: &ProcessedSource) -> Vec<Offense> {
            Vec::new()
        }
    }

    impl ConfigurableRule for OptIn {
        const ID: &'static str = "opt-in";
        const DESCRIPTION: &'static str = "Disabled unless configured";
        type Config = ();

        fn from_config(_config: Self::Config) -> Self {
            Self
        }

        fn enabled_by_default() -> bool {
            false
        }
    }

    fn descriptors() -> Vec<RuleDescriptor> {
        vec![MaxLength::descriptor(), OptIn::descriptor()]
    }

    fn settings(entries: Vec<(&str, RuleSetting)>) -> BTreeMap<String, RuleSetting> {
        entries
            .into_iter()
            .map(|(name, setting)| (name.to_string(), setting))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let registry = RuleRegistry::build(&descriptors(), &BTreeMap::new()).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.get("max-length").is_some());
        assert!(registry.get("opt-in").is_none());
    }

    #[test]
    fn test_enable_and_severity() {
        let registry = RuleRegistry::build(
            &descriptors(),
            &settings(vec![(
                "opt-in",
                RuleSetting::enabled().with_severity(Severity::Info),
            )]),
        )
        .unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.get("opt-in").and_then(|r| r.severity()),
            Some(Severity::Info)
        );
    }

    #[test]
    fn test_unknown_rule() {
        let err = RuleRegistry::build(
            &descriptors(),
            &settings(vec![("no-such-rule", RuleSetting::enabled())]),
        )
        .unwrap_err();
        assert_eq!(err, RuleError::UnknownRule("no-such-rule".to_string()));
    }

    #[test]
    fn test_no_rules_enabled() {
        let err = RuleRegistry::build(
            &descriptors(),
            &settings(vec![("max-length", RuleSetting::disabled())]),
        )
        .unwrap_err();
        assert_eq!(err, RuleError::NoRulesEnabled);
    }

    #[test]
    fn test_schema_violation() {
        let err = RuleRegistry::build(
            &descriptors(),
            &settings(vec![(
                "max-length",
                RuleSetting::enabled().with_options(serde_json::json!({ "max": 0 })),
            )]),
        )
        .unwrap_err();
        assert!(matches!(err, RuleError::InvalidConfig { ref rule, .. } if rule == "max-length"));
    }

    #[test]
    fn test_typed_config_mismatch() {
        let err = RuleRegistry::build(
            &[RuleDescriptor {
                schema: || serde_json::json!({}),
                ..MaxLength::descriptor()
            }],
            &settings(vec![(
                "max-length",
                RuleSetting::enabled().with_options(serde_json::json!({ "max": "long" })),
            )]),
        )
        .unwrap_err();
        assert!(matches!(err, RuleError::InvalidConfig { .. }));
    }

    #[test]
    fn test_serialized_config_changes_with_options() {
        let a = RuleRegistry::build(&descriptors(), &BTreeMap::new()).unwrap();
        let b = RuleRegistry::build(
            &descriptors(),
            &settings(vec![(
                "max-length",
                RuleSetting::enabled().with_options(serde_json::json!({ "max": 120 })),
            )]),
        )
        .unwrap();
        assert_eq!(
            a.serialized_config(),
            r#"[{"id":"max-length","severity":null,"options":null}]"#
        );
        assert_ne!(a.serialized_config(), b.serialized_config());
    }
}
