//! trailing-whitespace rule: Remove spaces and tabs at the end of lines.
//!
//! Whitespace before a `\n`, a `\r\n` or the end of the file is reported
//! once per line and deleted by auto-correction.
//!
//! This rule takes no options.

use erblint_parser::ProcessedSource;
use erblint_rule::{ConfigurableRule, Correction, Offense, Rule};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {}

#[derive(Debug, Default)]
pub struct TrailingWhitespace;

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

impl Rule for TrailingWhitespace {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        Self::DESCRIPTION
    }

    fn offenses(&self, source: &ProcessedSource) -> Vec<Offense> {
        let mut offenses = Vec::new();
        let mut start = 0;

        for line in source.content().split_inclusive('\n') {
            let body = line
                .strip_suffix('\n')
                .map(|l| l.strip_suffix('\r').unwrap_or(l))
                .unwrap_or(line);
            let kept = body.trim_end_matches(is_blank).len();
            if kept < body.len() {
                offenses.push(Offense::new(
                    Self::ID,
                    source.to_range(start + kept, start + body.len()),
                    "Trailing whitespace detected",
                ));
            }
            start += line.len();
        }

        offenses
    }

    fn supports_autocorrect(&self) -> bool {
        true
    }

    fn autocorrect(&self, _source: &ProcessedSource, offense: &Offense) -> Option<Correction> {
        Some(Correction::delete(offense.range))
    }
}

impl ConfigurableRule for TrailingWhitespace {
    const ID: &'static str = "trailing-whitespace";
    const DESCRIPTION: &'static str = "Disallow spaces and tabs at the end of lines";

    type Config = Config;

    fn schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "additionalProperties": false
        })
    }

    fn from_config(_config: Config) -> Self {
        Self
    }
}
