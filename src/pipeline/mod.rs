//! The extraction-and-deduplication pipeline: naming and hashing utilities,
//! duplicate detection, the staging area, the archive/upload stage, and the
//! orchestrator that sequences them.

pub mod archive;
pub mod dedup;
pub mod naming;
pub mod orchestrator;
pub mod staging;

pub use archive::{build_archive, ArchiveStage};
pub use dedup::is_duplicate;
pub use naming::{content_hash, sanitize, unique_filename};
pub use orchestrator::ScrapePipeline;
pub use staging::StagingArea;
