use std::path::{Path, PathBuf};

use time::macros::format_description;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, time::LocalTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use uuid::Uuid;

pub mod config;
pub mod executor;
pub mod locator;
pub mod metadata;
pub mod namenode;
pub mod splitter;

pub use config::StorageLayout;
pub use executor::Executor;
pub use metadata::{ChunkRecord, FileManifest, FileSummary, MetadataRegistry, MetadataStore};
pub use namenode::NameNode;

const LOG_FILE: &str = "mini-hdfs.log";

/// Installs the global subscriber: stderr always, plus a daily rolling file
/// under `log_dir` when given. Keep the returned guard alive until exit or
/// buffered file output is lost.
pub fn init_logger(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let timer = LocalTime::new(format_description!(
        "[hour]:[minute]:[second].[subsecond digits:3]"
    ));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr = fmt::layer()
        .with_timer(timer.clone())
        .with_writer(std::io::stderr);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .with(
                    fmt::layer()
                        .with_timer(timer)
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .init();
            None
        }
    }
}

/// A fresh, hidden file name inside `dir` for write-then-rename.
pub fn temp_file(dir: &Path) -> PathBuf {
    dir.join(format!(".{}.tmp", Uuid::new_v4()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_file() {
        let dir = Path::new("namenode");
        let a = temp_file(dir);
        let b = temp_file(dir);
        assert_ne!(a, b);
        assert_eq!(a.parent(), Some(dir));
        assert!(a.extension().is_some_and(|ext| ext == "tmp"));
    }
}
