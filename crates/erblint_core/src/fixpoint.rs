//! Iterates parse, run and correct until a file stops changing.

use std::path::Path;

use erblint_ast::SourceBuffer;
use erblint_parser::{ParseError, Parser, ProcessedSource};
use erblint_rule::{Offense, RuleRegistry};
use tracing::{debug, warn};

use crate::corrector::{CorrectionError, CorrectionOutcome, Corrector};
use crate::runner::{PARSE_ERROR_RULE_ID, Runner, parse_error_offense};

/// Upper bound on parse/run/correct iterations for one file.
pub const MAX_ITERATIONS: usize = 7;

/// Why the driver stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// No active offense remains.
    Clean,
    /// Offenses remain but no rule offered a correction.
    NoCorrections,
    /// Corrections left the content byte-identical.
    NoProgress,
    /// The content could not be parsed.
    ParseFailed(ParseError),
    /// Corrections conflicted or did not fit the content.
    CorrectionFailed(CorrectionError),
    /// [`MAX_ITERATIONS`] was reached.
    IterationLimit,
}

/// Final state of one file after the driver stopped.
#[derive(Debug, Clone, PartialEq)]
pub struct FixOutcome {
    /// The last content that parsed, or the input if nothing did.
    pub content: String,
    /// Offenses of the last iteration, disabled ones included.
    pub offenses: Vec<Offense>,
    /// Whether any correction was applied, even if later ones undid it.
    pub corrected: bool,
    /// Corrections applied to reach `content`.
    pub corrections_applied: usize,
    pub iterations: usize,
    pub stop: StopReason,
}

impl FixOutcome {
    /// Offenses not disabled by a suppression directive.
    pub fn active_offenses(&self) -> impl Iterator<Item = &Offense> {
        self.offenses.iter().filter(|o| o.is_active())
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.stop, StopReason::CorrectionFailed(_))
    }
}

/// Runs the fix-point loop for one file at a time.
pub struct FixPointDriver<'a> {
    runner: Runner<'a>,
    corrector: Corrector<'a>,
    parser: &'a dyn Parser,
}

impl<'a> FixPointDriver<'a> {
    pub fn new(registry: &'a RuleRegistry, parser: &'a dyn Parser) -> Self {
        Self {
            runner: Runner::new(registry),
            corrector: Corrector::new(registry),
            parser,
        }
    }

    /// Corrects `content` until no offense remains, nothing changes, or the
    /// iteration bound is hit.
    ///
    /// Corrections from earlier iterations are kept when a later one fails;
    /// content that no longer parses is discarded in favour of the last
    /// content that did.
    pub fn run(&self, path: &Path, content: &str) -> FixOutcome {
        let mut current = content.to_string();
        // The last content that parsed and its offenses, kept while the
        // corrected content has not been parsed yet.
        let mut previous: Option<(String, Vec<Offense>)> = None;
        let mut applied = 0;
        let mut pending = 0;
        let mut iterations = 0;

        let (offenses, stop) = loop {
            iterations += 1;
            let buffer = SourceBuffer::new(path, current.as_str());
            let source = match ProcessedSource::parse(buffer.clone(), self.parser) {
                Ok(source) => source,
                Err(e) => {
                    let offenses = match previous.take() {
                        None => vec![parse_error_offense(&buffer, &e)],
                        Some((parsed, mut offenses)) => {
                            warn!(
                                "Corrected content of {} no longer parses: {}",
                                path.display(),
                                e
                            );
                            current = parsed;
                            offenses.push(unparseable_correction(path, &current, &e));
                            offenses
                        }
                    };
                    break (offenses, StopReason::ParseFailed(e));
                }
            };
            applied += pending;
            pending = 0;

            let offenses = self.runner.run(&source);
            debug!(
                "Iteration {} of {}: {} offenses",
                iterations,
                path.display(),
                offenses.len()
            );

            if !offenses.iter().any(Offense::is_active) {
                break (offenses, StopReason::Clean);
            }
            if iterations == MAX_ITERATIONS {
                break (offenses, StopReason::IterationLimit);
            }

            match self.corrector.correct(&source, &offenses) {
                Err(e) => {
                    warn!("Correction of {} failed: {}", path.display(), e);
                    break (offenses, StopReason::CorrectionFailed(e));
                }
                Ok(CorrectionOutcome::NoCorrections) => {
                    break (offenses, StopReason::NoCorrections);
                }
                Ok(CorrectionOutcome::Corrected { content: next, .. }) if next == current => {
                    break (offenses, StopReason::NoProgress);
                }
                Ok(CorrectionOutcome::Corrected {
                    content: next,
                    applied: count,
                }) => {
                    pending = count;
                    previous = Some((std::mem::replace(&mut current, next), offenses));
                }
            }
        };

        FixOutcome {
            corrected: applied > 0,
            content: current,
            offenses,
            corrections_applied: applied,
            iterations,
            stop,
        }
    }
}

/// The offense reporting that corrections produced unparseable content.
///
/// The error offset points into content that was discarded, so the offense
/// sits at the start of the kept content.
fn unparseable_correction(path: &Path, content: &str, error: &ParseError) -> Offense {
    let buffer = SourceBuffer::new(path, content);
    Offense::new(
        PARSE_ERROR_RULE_ID,
        buffer.clamped_range(0, 0),
        format!("Corrections produced content that does not parse: {}", error),
    )
}
