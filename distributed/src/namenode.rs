//! Single owner of the metadata registry.
//!
//! A `NameNode` is a cheap handle onto one background task that holds the
//! [`MetadataStore`]. Every split, listing and lookup is a command on that
//! task's channel, so registry mutations in this process never interleave.
//! The registry is still loaded from disk for every command.

use std::path::{Path, PathBuf};

use common::{Error, Result};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, info};

use crate::{
    config::StorageLayout,
    locator,
    metadata::{FileManifest, FileSummary, MetadataStore},
    splitter,
};

const COMMAND_QUEUE: usize = 32;

type Reply<T> = oneshot::Sender<Result<T>>;

#[derive(Debug)]
enum Command {
    Split {
        source: PathBuf,
        num_nodes: usize,
        reply: Reply<FileManifest>,
    },
    List {
        reply: Reply<Vec<FileSummary>>,
    },
    Resolve {
        file_name: String,
        reply: Reply<Vec<PathBuf>>,
    },
}

#[derive(Debug, Clone)]
pub struct NameNode {
    tx: mpsc::Sender<Command>,
}

impl NameNode {
    /// Starts the owner task. It stops once every handle is dropped.
    pub fn spawn(layout: StorageLayout) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE);
        let store = MetadataStore::new(layout.metadata_file());
        let owner = Owner { layout, store };
        let handle = tokio::spawn(owner.serve(rx));
        (Self { tx }, handle)
    }

    /// Splits `source` across `num_nodes` nodes and appends the manifest to
    /// the registry. A name that is already registered gets a second entry.
    pub async fn split(&self, source: impl AsRef<Path>, num_nodes: usize) -> Result<FileManifest> {
        let source = source.as_ref().to_path_buf();
        self.request(|reply| Command::Split {
            source,
            num_nodes,
            reply,
        })
        .await
    }

    pub async fn list_known_files(&self) -> Result<Vec<FileSummary>> {
        self.request(|reply| Command::List { reply }).await
    }

    /// Chunk paths for `file_name`, empty when the name is unknown.
    pub async fn resolve(&self, file_name: &str) -> Result<Vec<PathBuf>> {
        let file_name = file_name.to_string();
        self.request(|reply| Command::Resolve { file_name, reply }).await
    }

    async fn request<T>(&self, command: impl FnOnce(Reply<T>) -> Command) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| Error::NameNodeUnavailable)?;
        rx.await.map_err(|_| Error::NameNodeUnavailable)?
    }
}

struct Owner {
    layout: StorageLayout,
    store: MetadataStore,
}

impl Owner {
    async fn serve(self, mut rx: mpsc::Receiver<Command>) {
        debug!(metadata = %self.store.path().display(), "name node started");
        while let Some(command) = rx.recv().await {
            match command {
                Command::Split {
                    source,
                    num_nodes,
                    reply,
                } => {
                    let _ = reply.send(self.split(&source, num_nodes).await);
                }
                Command::List { reply } => {
                    let _ = reply.send(self.store.load().await.map(|r| r.summaries()));
                }
                Command::Resolve { file_name, reply } => {
                    let resolved = self
                        .store
                        .load()
                        .await
                        .map(|registry| locator::chunk_paths(&registry, &file_name));
                    let _ = reply.send(resolved);
                }
            }
        }
        debug!("name node stopped");
    }

    async fn split(&self, source: &Path, num_nodes: usize) -> Result<FileManifest> {
        // Load first so a corrupt registry fails before any chunk is written.
        let mut registry = self.store.load().await?;
        let manifest = splitter::write_chunks(source, num_nodes, &self.layout).await?;
        registry.files.push(manifest.clone());
        self.store.save(&registry).await?;
        info!(
            file = %manifest.file_name,
            chunks = manifest.num_chunks,
            lines = manifest.total_lines(),
            "file split"
        );
        Ok(manifest)
    }
}
