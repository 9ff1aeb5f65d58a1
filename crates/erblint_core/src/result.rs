//! Lint result types.

use std::path::PathBuf;

use erblint_cache::CachedOffense;
use erblint_rule::{Offense, Severity};

use crate::{CorrectionError, LinterError};

/// What was found in a file.
#[derive(Debug, Clone, PartialEq)]
pub enum Findings {
    /// Offenses from linting the file in this run, disabled ones included.
    Fresh(Vec<Offense>),
    /// Summaries restored from the result cache; active offenses only.
    Cached(Vec<CachedOffense>),
}

/// Result of linting a single file.
#[derive(Debug, Clone, PartialEq)]
pub struct LintResult {
    /// Path to the linted file.
    pub path: PathBuf,

    pub findings: Findings,

    /// Whether any correction was applied to the file.
    pub corrected: bool,

    /// Number of corrections applied to the file.
    pub corrections_applied: usize,

    /// Set when auto-correction failed for this file.
    pub failure: Option<CorrectionError>,
}

impl LintResult {
    /// Creates a new lint result.
    pub fn new(path: PathBuf, offenses: Vec<Offense>) -> Self {
        Self {
            path,
            findings: Findings::Fresh(offenses),
            corrected: false,
            corrections_applied: 0,
            failure: None,
        }
    }

    /// Creates a cached lint result.
    pub fn cached(path: PathBuf, offenses: Vec<CachedOffense>) -> Self {
        Self {
            findings: Findings::Cached(offenses),
            ..Self::new(path, Vec::new())
        }
    }

    /// Creates a result for a file whose correction failed.
    pub fn failure(path: PathBuf, offenses: Vec<Offense>, error: CorrectionError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new(path, offenses)
        }
    }

    /// Whether the result was loaded from cache.
    pub fn from_cache(&self) -> bool {
        matches!(self.findings, Findings::Cached(_))
    }

    /// Offenses from this run; empty for cached results.
    pub fn offenses(&self) -> &[Offense] {
        match &self.findings {
            Findings::Fresh(offenses) => offenses,
            Findings::Cached(_) => &[],
        }
    }

    /// Number of offenses not disabled by a suppression directive.
    pub fn active_count(&self) -> usize {
        match &self.findings {
            Findings::Fresh(offenses) => offenses.iter().filter(|o| o.is_active()).count(),
            Findings::Cached(offenses) => offenses.len(),
        }
    }

    /// Returns true if there are any active error-severity offenses.
    pub fn has_errors(&self) -> bool {
        match &self.findings {
            Findings::Fresh(offenses) => offenses
                .iter()
                .any(|o| o.is_active() && o.severity == Severity::Error),
            Findings::Cached(offenses) => offenses.iter().any(|o| o.severity == Severity::Error),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

/// A file that could not be linted at all.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: LinterError,
}

/// Run-wide statistics, folded from every file's result.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Total files processed, failures included.
    pub files: usize,

    /// Files loaded from cache.
    pub from_cache: usize,

    /// Files rewritten with corrections.
    pub corrected: usize,

    /// Files that could not be read or whose correction failed.
    pub failed: usize,

    /// Total active offenses found.
    pub offenses: usize,

    /// Total corrections applied.
    pub corrections_applied: usize,
}

impl RunStats {
    /// Folds one file's result into the statistics.
    pub fn record(&mut self, result: &LintResult) {
        self.files += 1;
        if result.from_cache() {
            self.from_cache += 1;
        }
        if result.corrected {
            self.corrected += 1;
        }
        if result.is_failure() {
            self.failed += 1;
        }
        self.offenses += result.active_count();
        self.corrections_applied += result.corrections_applied;
    }

    /// Counts a file that could not be linted.
    pub fn record_failure(&mut self) {
        self.files += 1;
        self.failed += 1;
    }

    /// Creates statistics from results and file failures.
    pub fn from_results(results: &[LintResult], failures: &[FileFailure]) -> Self {
        let mut stats = Self::default();
        for result in results {
            stats.record(result);
        }
        for _ in failures {
            stats.record_failure();
        }
        stats
    }
}

/// Outcome of [`Linter::lint_files`](crate::Linter::lint_files).
#[derive(Debug, Default)]
pub struct LintRun {
    /// Results sorted by path.
    pub results: Vec<LintResult>,
    /// Files that could not be linted, sorted by path.
    pub failures: Vec<FileFailure>,
    pub stats: RunStats,
}
