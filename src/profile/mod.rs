//! Conversion Profiles
//!
//! The acronym table, heading title lists and chapter registry, loaded as
//! data at startup instead of being compiled into the pipeline.

pub mod loader;
pub mod schema;

pub use loader::{LoadedProfile, ProfileLoader, ProfileSource};
pub use schema::{AcronymDef, ChapterDef, Profile, ProfileFile};
