//! # erblint_rules
//!
//! Reference rules shipped with ErbLint.
//!
//! | Rule | Auto-correct | Options |
//! |------|--------------|---------|
//! | [`final-newline`](final_newline) | yes | `present` |
//! | [`trailing-whitespace`](trailing_whitespace) | yes | none |
//! | [`space-around-erb-tag`](space_around_erb_tag) | yes | none |

pub mod final_newline;
pub mod space_around_erb_tag;
pub mod trailing_whitespace;

use erblint_rule::{ConfigurableRule, RuleDescriptor};

pub use final_newline::FinalNewline;
pub use space_around_erb_tag::SpaceAroundErbTag;
pub use trailing_whitespace::TrailingWhitespace;

/// Descriptors of every built-in rule, in registration order.
pub fn builtin_descriptors() -> Vec<RuleDescriptor> {
    vec![
        FinalNewline::descriptor(),
        TrailingWhitespace::descriptor(),
        SpaceAroundErbTag::descriptor(),
    ]
}
