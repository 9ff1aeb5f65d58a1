//! # erblint_core
//!
//! Core linter engine for ErbLint.
//!
//! This crate provides:
//! - The main `Linter` orchestrator
//! - Configuration loading
//! - The rule runner with inline suppression directives
//! - The corrector and the fix-point driver
//! - Parallel processing with a content-addressed result cache
//!
//! ## Example
//!
//! ```rust,ignore
//! use erblint_core::{Linter, LinterConfig};
//!
//! let config = LinterConfig::from_file("erblint.json")?;
//! let linter = Linter::new(config, &erblint_rules::builtin_descriptors())?;
//!
//! let run = linter.lint_files(&paths)?;
//! for result in &run.results {
//!     println!("{}: {} issues", result.path.display(), result.active_count());
//! }
//! ```

mod config;
mod corrector;
mod error;
mod file_linter;
mod fixpoint;
mod linter;
mod result;
mod runner;
pub mod suppression;

pub use config::{CacheConfig, LinterConfig, RuleOption};
pub use corrector::{
    CorrectionError, CorrectionOutcome, Corrector, RuleCorrection, apply_corrections,
};
pub use error::LinterError;
pub use file_linter::MAX_FILE_SIZE;
pub use fixpoint::{FixOutcome, FixPointDriver, MAX_ITERATIONS, StopReason};
pub use linter::{LintFilesResult, Linter};
pub use result::{FileFailure, Findings, LintResult, LintRun, RunStats};
pub use runner::{PARSE_ERROR_RULE_ID, Runner, parse_error_offense};
pub use suppression::UnusedDisableDirective;

#[cfg(test)]
pub mod test_utils;
