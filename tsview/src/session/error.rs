use std::path::PathBuf;

use thiserror::Error;

/// Reasons why a CSV file could not become the active table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("unable to read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse {} (line {line}): {reason}", .path.display())]
    UnparseableData {
        path: PathBuf,
        line: u64,
        reason: String,
    },
    #[error("no plottable data in {}", .0.display())]
    EmptyDataset(PathBuf),
}
