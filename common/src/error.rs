use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by splitting, resolving and running jobs.
#[derive(Error, Debug)]
pub enum Error {
    #[error("source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("node count must be at least 1, got {0}")]
    InvalidNodeCount(usize),

    /// The metadata document exists but cannot be decoded. Never repaired.
    #[error("metadata at {} is not well-formed: {source}", path.display())]
    CorruptMetadata {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("no chunks found for {0}")]
    NoChunksFound(String),

    #[error("failed to read chunk {}: {source}", path.display())]
    ChunkReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("nothing to rank: no words in any chunk")]
    EmptyCorpus,

    #[error("unknown job {0:?}, expected word_count or top_word")]
    UnknownJob(String),

    #[error("name node is not running")]
    NameNodeUnavailable,

    #[error("worker failed: {0}")]
    Worker(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
