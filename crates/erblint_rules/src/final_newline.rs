//! final-newline rule: Check the end of the file.
//!
//! Reports a file that does not end with a line break, or, with
//! `present: false`, a file that does.
//!
//! # Configuration
//!
//! | Option | Type | Default | Description |
//! |--------|------|---------|-------------|
//! | present | boolean | true | Whether the file must end with a newline |
//!
//! # Example
//!
//! ```json
//! {
//!   "rules": {
//!     "final-newline": { "present": false }
//!   }
//! }
//! ```

use erblint_parser::ProcessedSource;
use erblint_rule::{ConfigurableRule, Correction, Offense, Rule};
use serde::Deserialize;

/// Configuration for the final-newline rule.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Whether the file must end with a newline.
    present: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { present: true }
    }
}

#[derive(Debug)]
pub struct FinalNewline {
    present: bool,
}

impl Rule for FinalNewline {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        Self::DESCRIPTION
    }

    fn offenses(&self, source: &ProcessedSource) -> Vec<Offense> {
        let content = source.content();
        if content.is_empty() {
            return Vec::new();
        }

        let trimmed = content.trim_end_matches(['\n', '\r']).len();
        if self.present && !content.ends_with('\n') {
            vec![Offense::new(
                Self::ID,
                source.to_range(content.len(), content.len()),
                "Missing a trailing newline at the end of the file",
            )]
        } else if !self.present && trimmed < content.len() {
            vec![Offense::new(
                Self::ID,
                source.to_range(trimmed, content.len()),
                "Remove the trailing newline at the end of the file",
            )]
        } else {
            Vec::new()
        }
    }

    fn supports_autocorrect(&self) -> bool {
        true
    }

    fn autocorrect(&self, _source: &ProcessedSource, offense: &Offense) -> Option<Correction> {
        if self.present {
            Some(Correction::new(offense.range, "\n"))
        } else {
            Some(Correction::delete(offense.range))
        }
    }
}

impl ConfigurableRule for FinalNewline {
    const ID: &'static str = "final-newline";
    const DESCRIPTION: &'static str = "Check that files end (or do not end) with a newline";

    type Config = Config;

    fn schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "present": { "type": "boolean" }
            },
            "additionalProperties": false
        })
    }

    fn from_config(config: Config) -> Self {
        Self {
            present: config.present,
        }
    }
}
