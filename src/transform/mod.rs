//! Text Transformations
//!
//! Pure text-to-text passes applied to the converter output, in order:
//! normalization, acronym folding, heading reconstruction.

pub mod acronyms;
pub mod headings;
pub mod normalize;

pub use acronyms::{fold_acronyms, AcronymFold};
pub use headings::{slugify, HeadingRule, HeadingRules};
pub use normalize::normalize;
