//! Chapter Output
//!
//! Splitting the reconstructed document and writing the chapter files.

pub mod split;
pub mod writer;

pub use split::{split_chapters, ChapterSplit};
pub use writer::{backup_path, ChapterWriter, WriteReport, TIMESTAMP_FORMAT};
