//! Per-target release analysis: last released version and commit history

pub mod history;
pub mod last_version;

pub use history::HistoryAnalyzer;
pub use last_version::{find_last_version, TagCache};
