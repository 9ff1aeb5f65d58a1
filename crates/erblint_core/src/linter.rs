//! Core linter engine.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use erblint_cache::ResultCache;
use erblint_parser::{OsTokenSource, Parser, TokenSource};
use erblint_rule::{RuleDescriptor, RuleRegistry};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::file_linter::{FileContext, lint_file_internal};
use crate::fixpoint::{FixOutcome, FixPointDriver};
use crate::result::{FileFailure, LintRun, RunStats};
use crate::{LintResult, LinterConfig, LinterError};

/// Result type for [`Linter::lint_files`].
pub type LintFilesResult = Result<LintRun, LinterError>;

/// The core linter engine.
///
/// Owns the rule registry, the parser and the result cache of one run.
pub struct Linter {
    /// Linter configuration.
    config: LinterConfig,
    /// Enabled rules with their resolved settings.
    registry: RuleRegistry,
    /// Parser for the configured mode.
    parser: Box<dyn Parser>,
    /// Result cache, when enabled.
    cache: Option<ResultCache>,
    /// Serialized active configuration, mixed into every cache key.
    cache_config: String,
}

impl Linter {
    /// Creates a new linter with the given configuration and rules.
    ///
    /// Fails when the configuration names unknown rules, rule options do not
    /// match their schema, or no rule is enabled.
    pub fn new(config: LinterConfig, descriptors: &[RuleDescriptor]) -> Result<Self, LinterError> {
        Self::with_token_source(config, descriptors, Arc::new(OsTokenSource))
    }

    /// Creates a linter whose parser draws session tokens from `tokens`.
    pub fn with_token_source(
        config: LinterConfig,
        descriptors: &[RuleDescriptor],
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, LinterError> {
        let settings = config.rule_settings()?;
        let registry = RuleRegistry::build(descriptors, &settings)?;
        let parser = config.parser_mode.parser(tokens);

        let cache = config
            .cache
            .enabled
            .then(|| ResultCache::new(&config.cache.dir));

        // Pre-compute the cache configuration
        let cache_config = format!(
            "{}:{}",
            config.parser_mode.name(),
            registry.serialized_config()
        );

        debug!(
            "Linter ready: {} rules, {} parser, cache {}",
            registry.len(),
            parser.name(),
            if cache.is_some() { "on" } else { "off" }
        );

        Ok(Self {
            config,
            registry,
            parser,
            cache,
            cache_config,
        })
    }

    pub fn config(&self) -> &LinterConfig {
        &self.config
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn cache(&self) -> Option<&ResultCache> {
        self.cache.as_ref()
    }

    fn context(&self) -> FileContext<'_> {
        FileContext {
            registry: &self.registry,
            parser: self.parser.as_ref(),
            cache: self.cache.as_ref(),
            cache_config: &self.cache_config,
            autocorrect: self.config.autocorrect,
        }
    }

    /// Lints the given files in parallel.
    ///
    /// Files that cannot be read are reported in [`LintRun::failures`] and
    /// never abort the run. Stale cache entries are pruned once every file
    /// is done, when pruning is enabled.
    pub fn lint_files(&self, paths: &[PathBuf]) -> LintFilesResult {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.jobs.unwrap_or(0))
            .build()
            .map_err(|e| LinterError::internal(format!("Failed to build thread pool: {}", e)))?;

        let ctx = self.context();
        let outcomes: Vec<Result<LintResult, FileFailure>> = pool.install(|| {
            paths
                .par_iter()
                .map(|path| {
                    lint_file_internal(path, &ctx).map_err(|error| FileFailure {
                        path: path.clone(),
                        error,
                    })
                })
                .collect()
        });

        let mut results = Vec::new();
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(failure) => {
                    warn!("Failed to lint {}: {}", failure.path.display(), failure.error);
                    failures.push(failure);
                }
            }
        }
        results.sort_by(|a, b| a.path.cmp(&b.path));
        failures.sort_by(|a, b| a.path.cmp(&b.path));

        if let Some(cache) = &self.cache
            && self.config.cache.prune
            && let Err(e) = cache.prune()
        {
            warn!("Failed to prune cache: {}", e);
        }

        let stats = RunStats::from_results(&results, &failures);
        info!(
            "Linted {} files ({} from cache, {} corrected, {} failed): {} offenses",
            stats.files, stats.from_cache, stats.corrected, stats.failed, stats.offenses
        );

        Ok(LintRun {
            results,
            failures,
            stats,
        })
    }

    /// Lints one file, rewriting it when auto-correction is enabled.
    pub fn lint_file(&self, path: impl AsRef<Path>) -> Result<LintResult, LinterError> {
        lint_file_internal(path.as_ref(), &self.context())
    }

    /// Lints content directly (useful for editors).
    ///
    /// Neither the cache nor the file system is touched. With auto-correction
    /// enabled the result reflects the corrected content.
    pub fn lint_content(&self, path: impl AsRef<Path>, content: &str) -> LintResult {
        self.context().lint_content(path.as_ref(), content).0
    }

    /// Runs the fix-point loop on content and returns the full outcome.
    pub fn fix_content(&self, path: impl AsRef<Path>, content: &str) -> FixOutcome {
        FixPointDriver::new(&self.registry, self.parser.as_ref()).run(path.as_ref(), content)
    }
}
