//! Single file linting logic.

use std::fs;
use std::path::Path;

use erblint_cache::{CacheEntry, CacheKey, ResultCache, file_mode};
use erblint_parser::Parser;
use erblint_rule::RuleRegistry;
use tracing::{debug, warn};

use crate::error::LinterError;
use crate::fixpoint::{FixPointDriver, StopReason};
use crate::result::LintResult;
use crate::runner::Runner;

pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Everything one file needs from the linter.
pub(crate) struct FileContext<'a> {
    pub registry: &'a RuleRegistry,
    pub parser: &'a dyn Parser,
    pub cache: Option<&'a ResultCache>,
    /// Serialized active configuration, part of every cache key.
    pub cache_config: &'a str,
    pub autocorrect: bool,
}

impl FileContext<'_> {
    /// Lints in-memory content. Returns the result and the final content.
    pub(crate) fn lint_content(&self, path: &Path, content: &str) -> (LintResult, String) {
        if !self.autocorrect {
            let offenses = Runner::new(self.registry).lint(path, content, self.parser);
            return (
                LintResult::new(path.to_path_buf(), offenses),
                content.to_string(),
            );
        }

        let outcome = FixPointDriver::new(self.registry, self.parser).run(path, content);
        debug!(
            "Fix loop for {} stopped after {} iterations: {:?}",
            path.display(),
            outcome.iterations,
            outcome.stop
        );

        let mut result = match outcome.stop {
            StopReason::CorrectionFailed(error) => {
                LintResult::failure(path.to_path_buf(), outcome.offenses, error)
            }
            _ => LintResult::new(path.to_path_buf(), outcome.offenses),
        };
        result.corrected = outcome.corrected;
        result.corrections_applied = outcome.corrections_applied;
        (result, outcome.content)
    }
}

pub(crate) fn lint_file_internal(
    path: &Path,
    ctx: &FileContext<'_>,
) -> Result<LintResult, LinterError> {
    debug!("Linting {}", path.display());

    let metadata = fs::metadata(path).map_err(|e| {
        LinterError::file(format!(
            "Failed to read metadata for {}: {}",
            path.display(),
            e
        ))
    })?;

    if !metadata.is_file() {
        return Err(LinterError::file(format!(
            "Not a regular file: {}",
            path.display()
        )));
    }

    if metadata.len() > MAX_FILE_SIZE {
        return Err(LinterError::file(format!(
            "File size exceeds limit of {} bytes: {}",
            MAX_FILE_SIZE,
            path.display()
        )));
    }

    let content = fs::read_to_string(path)
        .map_err(|e| LinterError::file(format!("Failed to read {}: {}", path.display(), e)))?;

    let key = ctx.cache.map(|_| {
        CacheKey::digest(
            path,
            file_mode(&metadata),
            ctx.cache_config,
            content.as_bytes(),
        )
    });

    if !ctx.autocorrect
        && let (Some(cache), Some(key)) = (ctx.cache, &key)
        && let Some(entry) = cache.get(key)
    {
        debug!("Using cached result for {}", path.display());
        return Ok(LintResult::cached(path.to_path_buf(), entry.offenses));
    }

    let (result, fixed) = ctx.lint_content(path, &content);

    let key = if fixed != content {
        fs::write(path, &fixed).map_err(|e| {
            LinterError::file(format!("Failed to write {}: {}", path.display(), e))
        })?;
        debug!(
            "Wrote {} corrections to {}",
            result.corrections_applied,
            path.display()
        );
        ctx.cache.map(|_| CacheKey::for_file(path, ctx.cache_config))
    } else {
        key
    };

    if let (Some(cache), Some(key)) = (ctx.cache, key)
        && !result.is_failure()
    {
        let entry =
            CacheEntry::from_offenses(key.as_hex().unwrap_or_default(), result.offenses());
        if let Err(e) = cache.put(&key, &entry) {
            warn!("Failed to cache result for {}: {}", path.display(), e);
        }
    }

    Ok(result)
}
