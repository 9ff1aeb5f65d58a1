//! Inline suppression directives.
//!
//! An ERB comment of the form `<%# erblint:disable rule-a, rule-b %>` disables
//! the named rules on every line the comment spans.

use erblint_ast::SourceRange;
use erblint_parser::ProcessedSource;
use erblint_rule::{Offense, Rule, Severity};

const DIRECTIVE: &str = "erblint:disable";

/// One `erblint:disable` comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisableDirective {
    /// The whole comment tag.
    pub range: SourceRange,
    /// Rule ids named by the directive, in source order.
    pub rules: Vec<String>,
}

impl DisableDirective {
    /// True when `line` lies on one of the comment's lines.
    pub fn covers_line(&self, line: u32) -> bool {
        self.range.line() <= line && line <= self.range.last_line()
    }

    /// True when the directive disables `offense`.
    pub fn matches(&self, offense: &Offense) -> bool {
        self.covers_line(offense.line()) && self.rules.iter().any(|r| *r == offense.rule_id)
    }
}

/// Finds every suppression directive in the source.
pub fn directives(source: &ProcessedSource) -> Vec<DisableDirective> {
    source
        .erb_tags()
        .iter()
        .filter(|tag| tag.is_comment())
        .filter_map(|tag| {
            let code = source.content().get(tag.code.range())?;
            let rules = parse_directive(code)?;
            Some(DisableDirective {
                range: source.tag_range(tag),
                rules,
            })
        })
        .collect()
}

/// Parses the body of an ERB comment. Returns `None` unless it is a directive
/// naming at least one rule.
fn parse_directive(comment: &str) -> Option<Vec<String>> {
    let rest = comment.trim().strip_prefix(DIRECTIVE)?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let rules: Vec<String> = rest
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();
    (!rules.is_empty()).then_some(rules)
}

/// Marks every offense covered by a directive as disabled.
pub fn apply(directives: &[DisableDirective], offenses: &mut [Offense]) {
    for offense in offenses {
        if directives.iter().any(|d| d.matches(offense)) {
            offense.disabled = true;
        }
    }
}

/// Reports directive entries that disabled nothing.
///
/// Always active and never configured; the runner adds it after every other
/// rule has run.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnusedDisableDirective;

impl UnusedDisableDirective {
    pub const ID: &'static str = "unused-disable-directive";
}

impl Rule for UnusedDisableDirective {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "Reports erblint:disable comments that suppress no offense"
    }

    fn offenses(&self, _source: &ProcessedSource) -> Vec<Offense> {
        Vec::new()
    }

    fn observes_offenses(&self) -> bool {
        true
    }

    fn offenses_with(&self, source: &ProcessedSource, offenses: &[Offense]) -> Vec<Offense> {
        let mut unused = Vec::new();
        for directive in directives(source) {
            for rule in &directive.rules {
                let used = offenses.iter().any(|o| {
                    o.disabled && o.rule_id == *rule && directive.covers_line(o.line())
                });
                if !used {
                    unused.push(
                        Offense::new(
                            Self::ID,
                            directive.range,
                            format!("Unused erblint:disable comment for {}", rule),
                        )
                        .with_severity(Severity::Warning),
                    );
                }
            }
        }
        unused
    }
}
