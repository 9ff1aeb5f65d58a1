//! Runs the enabled rules against one parsed template.

use std::path::Path;

use erblint_ast::SourceBuffer;
use erblint_parser::{ParseError, Parser, ProcessedSource};
use erblint_rule::{Offense, RegisteredRule, Rule, RuleRegistry};
use tracing::debug;

use crate::suppression::{self, UnusedDisableDirective};

/// Rule id of the offense reported for a file that failed to parse.
pub const PARSE_ERROR_RULE_ID: &str = "parse-error";

/// Executes every enabled rule and resolves suppression directives.
///
/// The runner does no I/O; everything it needs is in the
/// [`ProcessedSource`].
#[derive(Debug, Clone, Copy)]
pub struct Runner<'r> {
    registry: &'r RuleRegistry,
}

impl<'r> Runner<'r> {
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r RuleRegistry {
        self.registry
    }

    /// Returns every offense for `source`, ordered by start offset and then
    /// rule id. Suppressed offenses are kept with `disabled` set.
    pub fn run(&self, source: &ProcessedSource) -> Vec<Offense> {
        let mut offenses: Vec<Offense> = self
            .registry
            .iter()
            .filter(|r| !r.rule().observes_offenses())
            .flat_map(|r| offenses_of(r, |rule| rule.offenses(source)))
            .collect();

        let directives = suppression::directives(source);
        suppression::apply(&directives, &mut offenses);

        let mut observed: Vec<Offense> = self
            .registry
            .iter()
            .filter(|r| r.rule().observes_offenses())
            .flat_map(|r| offenses_of(r, |rule| rule.offenses_with(source, &offenses)))
            .collect();
        observed.extend(UnusedDisableDirective.offenses_with(source, &offenses));
        offenses.append(&mut observed);

        offenses.sort_by(|a, b| {
            a.range
                .begin()
                .cmp(&b.range.begin())
                .then_with(|| a.rule_id.cmp(&b.rule_id))
        });

        debug!(
            "{} offenses ({} disabled) in {}",
            offenses.len(),
            offenses.iter().filter(|o| o.disabled).count(),
            source.path().display()
        );
        offenses
    }

    /// Parses `content` and runs the rules once.
    ///
    /// A parse failure yields the single [`PARSE_ERROR_RULE_ID`] offense.
    pub fn lint(&self, path: &Path, content: &str, parser: &dyn Parser) -> Vec<Offense> {
        let buffer = SourceBuffer::new(path, content);
        match ProcessedSource::parse(buffer.clone(), parser) {
            Ok(source) => self.run(&source),
            Err(e) => vec![parse_error_offense(&buffer, &e)],
        }
    }
}

/// Runs one registered rule and applies its configured severity.
fn offenses_of(
    registered: &RegisteredRule,
    run: impl FnOnce(&dyn Rule) -> Vec<Offense>,
) -> Vec<Offense> {
    let mut offenses = run(registered.rule());
    if let Some(severity) = registered.severity() {
        for offense in &mut offenses {
            offense.severity = severity;
        }
    }
    offenses
}

/// The offense reporting that `buffer` could not be parsed.
pub fn parse_error_offense(buffer: &SourceBuffer, error: &ParseError) -> Offense {
    let offset = error.offset().unwrap_or(0);
    Offense::new(
        PARSE_ERROR_RULE_ID,
        buffer.clamped_range(offset, offset),
        error.to_string(),
    )
}
