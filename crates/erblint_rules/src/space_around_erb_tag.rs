//! space-around-erb-tag rule: Require one space inside ERB delimiters.
//!
//! `<%=foo%>` and `<%=  foo  %>` are both reported; `<%= foo %>` is not.
//! Whitespace containing a line break is accepted, so multi-line tags are
//! left alone. Comment tags and tags with no code are skipped.
//!
//! This rule takes no options.

use erblint_ast::Span;
use erblint_parser::{ErbTag, ProcessedSource};
use erblint_rule::{ConfigurableRule, Correction, Offense, Rule};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {}

#[derive(Debug, Default)]
pub struct SpaceAroundErbTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Opening,
    Closing,
}

impl Side {
    fn message(self, tag: &ErbTag) -> String {
        match self {
            Self::Opening => format!(
                "Use 1 space after `<%{}` instead of the current spacing",
                tag.indicator.as_str()
            ),
            Self::Closing => format!(
                "Use 1 space before `{}%>` instead of the current spacing",
                if tag.trim_close { "-" } else { "" }
            ),
        }
    }
}

/// A whitespace run is acceptable when it is one space or spans lines.
fn well_spaced(run: &str) -> bool {
    run == " " || run.contains('\n')
}

fn check_tag(source: &ProcessedSource, tag: &ErbTag, offenses: &mut Vec<Offense>) {
    let Some(code) = source.buffer().slice(tag.code) else {
        return;
    };
    if code.trim().is_empty() {
        return;
    }

    let start = tag.code.start as usize;
    let end = tag.code.end as usize;
    let leading = code.len() - code.trim_start().len();
    let trailing = code.len() - code.trim_end().len();

    let runs = [
        (Side::Opening, Span::from_usize(start, start + leading)),
        (Side::Closing, Span::from_usize(end - trailing, end)),
    ];
    for (side, span) in runs {
        let run = &code[span.start as usize - start..span.end as usize - start];
        if !well_spaced(run) {
            offenses.push(
                Offense::new(
                    SpaceAroundErbTag::ID,
                    source.to_range(span.start as usize, span.end as usize),
                    side.message(tag),
                )
                .with_context(serde_json::json!({ "found": run })),
            );
        }
    }
}

impl Rule for SpaceAroundErbTag {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        Self::DESCRIPTION
    }

    fn offenses(&self, source: &ProcessedSource) -> Vec<Offense> {
        let mut offenses = Vec::new();
        for tag in source.erb_tags().iter().filter(|t| !t.is_comment()) {
            check_tag(source, tag, &mut offenses);
        }
        offenses
    }

    fn supports_autocorrect(&self) -> bool {
        true
    }

    fn autocorrect(&self, _source: &ProcessedSource, offense: &Offense) -> Option<Correction> {
        Some(Correction::new(offense.range, " "))
    }
}

impl ConfigurableRule for SpaceAroundErbTag {
    const ID: &'static str = "space-around-erb-tag";
    const DESCRIPTION: &'static str = "Require a single space inside ERB tag delimiters";

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

#[cfg(test)]
mod tests {
    use super::*;
    use erblint_ast::SourceBuffer;
    use erblint_parser::StripBalanceParser;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn parse(content: &str) -> ProcessedSource {
        ProcessedSource::parse(
            SourceBuffer::new("a.html.erb", content),
            &StripBalanceParser::new(),
        )
        .unwrap()
    }

    fn ranges(content: &str) -> Vec<(usize, usize)> {
        SpaceAroundErbTag
            .offenses(&parse(content))
            .iter()
            .map(|o| (o.range.begin(), o.range.end()))
            .collect()
    }

    #[rstest]
    #[case::well_spaced("<%= foo %>", vec![])]
    #[case::no_space("<%=foo%>", vec![(3, 3), (6, 6)])]
    #[case::too_much("<%  foo   %>", vec![(2, 4), (7, 10)])]
    #[case::trim_close("<%- foo-%>", vec![(7, 7)])]
    #[case::multiline("<%\n  foo\n%>", vec![])]
    #[case::comment("<%#foo%>", vec![])]
    #[case::empty_code("<%  %>", vec![])]
    #[case::tab("<%=\tfoo %>", vec![(3, 4)])]
    fn test_offenses(#[case] content: &str, #[case] expected: Vec<(usize, usize)>) {
        assert_eq!(ranges(content), expected);
    }

    #[test]
    fn test_messages() {
        let offenses = SpaceAroundErbTag.offenses(&parse("<%=foo-%>"));
        let messages: Vec<_> = offenses.iter().map(|o| o.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Use 1 space after `<%=` instead of the current spacing",
                "Use 1 space before `-%>` instead of the current spacing",
            ]
        );
    }

    #[test]
    fn test_autocorrect_replaces_with_single_space() {
        let source = parse("<%=foo%>");
        let offense = &SpaceAroundErbTag.offenses(&source)[0];

        let correction = SpaceAroundErbTag.autocorrect(&source, offense).unwrap();
        assert_eq!(correction.replacement, " ");
        assert!(correction.range.is_empty());
    }
}
