//! Moderation taxonomy for Shepherd
//!
//! Shared vocabulary for the classification crates:
//!
//! - [`Priority`]: the four ordered severity tiers (low < medium < high < critical)
//! - [`Classification`]: an oracle's verdict on a piece of content
//! - [`ModeratorDecision`]: the validated human decision, built from a [`DecisionDraft`]
//! - [`Outcome`]: how the AI tier compared with the human one
//! - [`PromptAssembler`]: system and user prompts for the classification oracle
//!
//! # Example
//!
//! ```
//! use shepherd_taxonomy::{Outcome, Priority};
//!
//! assert_eq!(Outcome::between(Priority::Medium, Priority::High), Outcome::UnderClassified);
//! ```

pub mod decision;
pub mod error;
pub mod prompt;
pub mod types;

// Re-export main types
pub use decision::{DecisionDraft, ModeratorDecision, Outcome};
pub use error::TaxonomyError;
pub use prompt::PromptAssembler;
pub use types::*;
