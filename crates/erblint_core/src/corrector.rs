//! Turns offenses into one conflict-checked rewrite of the content.

use erblint_parser::ProcessedSource;
use erblint_rule::{Correction, Offense, RuleRegistry};
use thiserror::Error;
use tracing::debug;

/// Errors that abort a correction pass for one file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorrectionError {
    /// Two rules asked to rewrite overlapping, non-identical ranges.
    #[error(
        "Conflicting corrections: {first_rule} at {first_begin}..{first_end} overlaps {second_rule} at {second_begin}..{second_end}"
    )]
    Conflict {
        first_rule: String,
        first_begin: usize,
        first_end: usize,
        second_rule: String,
        second_begin: usize,
        second_end: usize,
    },

    /// A correction range does not address the current content.
    #[error("Correction from {rule} at {begin}..{end} is out of bounds for content of length {len}")]
    OutOfBounds {
        rule: String,
        begin: usize,
        end: usize,
        len: usize,
    },
}

/// Result of a correction pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorrectionOutcome {
    /// No rule offered a correction.
    NoCorrections,
    /// Corrections were applied. `content` may equal the input.
    Corrected { content: String, applied: usize },
}

/// A correction together with the rule that offered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleCorrection {
    pub rule_id: String,
    pub correction: Correction,
}

impl RuleCorrection {
    pub fn new(rule_id: impl Into<String>, correction: Correction) -> Self {
        Self {
            rule_id: rule_id.into(),
            correction,
        }
    }

    fn begin(&self) -> usize {
        self.correction.range.begin()
    }

    fn end(&self) -> usize {
        self.correction.range.end()
    }
}

/// Collects corrections from the rules of a registry and applies them.
#[derive(Debug, Clone, Copy)]
pub struct Corrector<'r> {
    registry: &'r RuleRegistry,
}

impl<'r> Corrector<'r> {
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Self { registry }
    }

    /// Asks the reporting rule of every active offense for a correction.
    pub fn collect(&self, source: &ProcessedSource, offenses: &[Offense]) -> Vec<RuleCorrection> {
        offenses
            .iter()
            .filter(|o| o.is_active())
            .filter_map(|offense| {
                let rule = self.registry.get(&offense.rule_id)?.rule();
                if !rule.supports_autocorrect() {
                    return None;
                }
                rule.autocorrect(source, offense)
                    .map(|c| RuleCorrection::new(offense.rule_id.as_str(), c))
            })
            .collect()
    }

    /// Corrects `source` for the given offenses.
    pub fn correct(
        &self,
        source: &ProcessedSource,
        offenses: &[Offense],
    ) -> Result<CorrectionOutcome, CorrectionError> {
        let corrections = self.collect(source, offenses);
        if corrections.is_empty() {
            return Ok(CorrectionOutcome::NoCorrections);
        }
        let (content, applied) = apply_corrections(source.content(), corrections)?;
        Ok(CorrectionOutcome::Corrected { content, applied })
    }
}

/// Applies corrections to `content` in one ascending pass.
///
/// Identical corrections (same range and replacement) are applied once.
/// Returns the new content and the number of corrections applied. The input
/// is never modified.
pub fn apply_corrections(
    content: &str,
    mut corrections: Vec<RuleCorrection>,
) -> Result<(String, usize), CorrectionError> {
    for c in &corrections {
        if c.end() > content.len()
            || !content.is_char_boundary(c.begin())
            || !content.is_char_boundary(c.end())
        {
            return Err(CorrectionError::OutOfBounds {
                rule: c.rule_id.clone(),
                begin: c.begin(),
                end: c.end(),
                len: content.len(),
            });
        }
    }

    // Stable, so insertions at one offset keep offense order.
    corrections.sort_by_key(|c| (c.begin(), c.end()));
    corrections.dedup_by(|b, a| a.correction == b.correction);

    // The accepted correction reaching furthest right; anything overlapping
    // an earlier correction also overlaps this one.
    let mut reach: Option<&RuleCorrection> = None;
    for c in &corrections {
        if let Some(prev) = reach {
            if prev.correction.range.overlaps(&c.correction.range) {
                return Err(CorrectionError::Conflict {
                    first_rule: prev.rule_id.clone(),
                    first_begin: prev.begin(),
                    first_end: prev.end(),
                    second_rule: c.rule_id.clone(),
                    second_begin: c.begin(),
                    second_end: c.end(),
                });
            }
            if c.end() < prev.end() {
                continue;
            }
        }
        reach = Some(c);
    }

    let mut out = String::with_capacity(content.len());
    let mut cursor = 0;
    for c in &corrections {
        debug!(
            "Applying correction from {}: replace [{}..{}] with {:?}",
            c.rule_id,
            c.begin(),
            c.end(),
            c.correction.replacement
        );
        out.push_str(&content[cursor..c.begin()]);
        out.push_str(&c.correction.replacement);
        cursor = c.end();
    }
    out.push_str(&content[cursor..]);

    Ok((out, corrections.len()))
}
