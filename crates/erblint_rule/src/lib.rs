//! # erblint_rule
//!
//! The contract between ErbLint and its rules.
//!
//! This crate provides:
//! - [`Rule`]: the trait every check implements
//! - [`Offense`] / [`Correction`]: what rules report and propose
//! - [`RuleRegistry`]: the enabled rules of a run, built explicitly from
//!   [`RuleDescriptor`]s and validated per-rule settings

mod diagnostic;
mod error;
mod registry;
mod rule;

pub use diagnostic::{Correction, Offense, Severity};
pub use error::RuleError;
pub use registry::{RegisteredRule, RuleBuilder, RuleDescriptor, RuleRegistry, RuleSetting};
pub use rule::{ConfigurableRule, Rule};
