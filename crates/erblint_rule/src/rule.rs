//! The rule contract.

use erblint_parser::ProcessedSource;
use serde::de::DeserializeOwned;

use crate::{Correction, Offense, RuleDescriptor};

/// A check run against one parsed template.
///
/// Rules may be invoked for many files, in any order and concurrently, so
/// `offenses` must be a pure function of the rule's configuration and the
/// source.
pub trait Rule: Send + Sync {
    /// Stable identifier, used in configuration and suppression directives.
    fn id(&self) -> &str;

    fn description(&self) -> &str;

    /// Reports the offenses found in `source`.
    fn offenses(&self, source: &ProcessedSource) -> Vec<Offense>;

    /// Whether [`Rule::autocorrect`] can return corrections.
    fn supports_autocorrect(&self) -> bool {
        false
    }

    /// Returns a correction for an offense this rule reported, or declines.
    fn autocorrect(&self, _source: &ProcessedSource, _offense: &Offense) -> Option<Correction> {
        None
    }

    /// Whether the rule must see every other rule's offenses first.
    fn observes_offenses(&self) -> bool {
        false
    }

    /// Reports offenses given the offenses of all non-observing rules,
    /// with suppression already resolved.
    fn offenses_with(&self, source: &ProcessedSource, _offenses: &[Offense]) -> Vec<Offense> {
        self.offenses(source)
    }
}

/// A rule built from a typed configuration record.
///
/// Options are validated against [`ConfigurableRule::schema`] and then
/// deserialized into [`ConfigurableRule::Config`] once, when the registry is
/// built.
pub trait ConfigurableRule: Rule + Sized + 'static {
    const ID: &'static str;
    const DESCRIPTION: &'static str;

    type Config: DeserializeOwned + Default;

    /// JSON schema of the options object.
    fn schema() -> serde_json::Value {
        serde_json::json!({ "type": "object" })
    }

    fn from_config(config: Self::Config) -> Self;

    fn enabled_by_default() -> bool {
        true
    }

    fn descriptor() -> RuleDescriptor {
        RuleDescriptor::of::<Self>()
    }
}
