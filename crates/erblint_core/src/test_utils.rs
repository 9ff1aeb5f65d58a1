use std::collections::BTreeMap;

use erblint_parser::ProcessedSource;
use erblint_rule::{Correction, Offense, Rule, RuleDescriptor, RuleRegistry, RuleSetting};

/// Reports every non-empty line. Never corrects.
pub struct LineRule {
    id: &'static str,
}

impl LineRule {
    pub const A: &'static str = "line-a";
    pub const B: &'static str = "line-b";
}

impl Rule for LineRule {
    fn id(&self) -> &str {
        self.id
    }

    fn description(&self) -> &str {
        "Reports every non-empty line"
    }

    fn offenses(&self, source: &ProcessedSource) -> Vec<Offense> {
        let buffer = source.buffer();
        (1..=buffer.line_count() as u32)
            .filter_map(|line| {
                let text = buffer.line_text(line).filter(|t| !t.is_empty())?;
                let start = buffer.line_start(line)?;
                Some(Offense::new(
                    self.id,
                    source.to_range(start, start + text.len()),
                    format!("line {}", line),
                ))
            })
            .collect()
    }
}

/// Reports every lowercase `todo` and corrects it to `TODO`.
pub struct UpcaseRule;

impl UpcaseRule {
    pub const ID: &'static str = "upcase";
}

impl Rule for UpcaseRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "Reports lowercase todo markers"
    }

    fn offenses(&self, source: &ProcessedSource) -> Vec<Offense> {
        source
            .content()
            .match_indices("todo")
            .map(|(start, m)| {
                Offense::new(Self::ID, source.to_range(start, start + m.len()), "todo")
            })
            .collect()
    }

    fn supports_autocorrect(&self) -> bool {
        true
    }

    fn autocorrect(&self, _source: &ProcessedSource, offense: &Offense) -> Option<Correction> {
        Some(Correction::new(offense.range, "TODO"))
    }
}

pub fn descriptors() -> Vec<RuleDescriptor> {
    vec![
        RuleDescriptor {
            id: LineRule::A,
            description: "Reports every non-empty line",
            schema: || serde_json::json!({ "type": "object" }),
            build: |_| Ok(Box::new(LineRule { id: LineRule::A })),
            enabled_by_default: true,
        },
        RuleDescriptor {
            id: LineRule::B,
            description: "Reports every non-empty line",
            schema: || serde_json::json!({ "type": "object" }),
            build: |_| Ok(Box::new(LineRule { id: LineRule::B })),
            enabled_by_default: true,
        },
        RuleDescriptor {
            id: UpcaseRule::ID,
            description: "Reports lowercase todo markers",
            schema: || serde_json::json!({ "type": "object" }),
            build: |_| Ok(Box::new(UpcaseRule)),
            enabled_by_default: false,
        },
    ]
}

pub fn registry_of(settings: BTreeMap<String, RuleSetting>) -> RuleRegistry {
    RuleRegistry::build(&descriptors(), &settings).unwrap()
}

/// A registry with only [`UpcaseRule`] enabled.
pub fn upcase_registry() -> RuleRegistry {
    registry_of(BTreeMap::from([
        (LineRule::A.to_string(), RuleSetting::disabled()),
        (LineRule::B.to_string(), RuleSetting::disabled()),
        (UpcaseRule::ID.to_string(), RuleSetting::enabled()),
    ]))
}
