//! The name node's registry of split files and its persisted document.
//!
//! The whole registry is one JSON document, read fresh on every access and
//! rewritten in full on every mutation:
//!
//! ```json
//! { "files": [ { "file_name": "book.txt", "num_chunks": 3,
//!                "chunks": [ { "node": "node1", "path": "nodes/node1/book.txt_5f0c…_chunk_1.txt", "lines": 3 } ] } ] }
//! ```

use std::{
    fmt,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use common::{Error, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::temp_file;

/// One stored chunk. Owned by exactly one [`FileManifest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    #[serde(rename = "node")]
    pub node_id: String,
    #[serde(rename = "path")]
    pub storage_path: PathBuf,
    #[serde(rename = "lines")]
    pub line_count: usize,
}

/// Chunks of one split file, in node order. Concatenating the chunks
/// reproduces the source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileManifest {
    pub file_name: String,
    pub num_chunks: usize,
    pub chunks: Vec<ChunkRecord>,
}

impl FileManifest {
    pub fn total_lines(&self) -> usize {
        self.chunks.iter().map(|c| c.line_count).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRegistry {
    #[serde(default)]
    pub files: Vec<FileManifest>,
}

impl MetadataRegistry {
    /// First manifest registered under `file_name`. Names are matched
    /// exactly; later entries with the same name are shadowed.
    pub fn find(&self, file_name: &str) -> Option<&FileManifest> {
        self.files.iter().find(|f| f.file_name == file_name)
    }

    pub fn summaries(&self) -> Vec<FileSummary> {
        self.files
            .iter()
            .map(|f| FileSummary {
                file_name: f.file_name.clone(),
                num_chunks: f.num_chunks,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub file_name: String,
    pub num_chunks: usize,
}

impl fmt::Display for FileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} chunks)", self.file_name, self.num_chunks)
    }
}

/// Reads and writes the registry document. Holds no lock: two stores
/// pointed at the same path race and the last write wins. Use
/// [`NameNode`](crate::NameNode) to serialize access.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// An absent or blank document is an empty registry.
    pub async fn load(&self) -> Result<MetadataRegistry> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(MetadataRegistry::default()),
            Err(e) if e.kind() == ErrorKind::InvalidData => return Err(self.corrupt(e)),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(MetadataRegistry::default());
        }
        serde_json::from_str(&raw).map_err(|e| self.corrupt(e))
    }

    /// Writes the full registry to a temp file beside the document, then
    /// renames it into place. The temp file is removed if either step fails.
    pub async fn save(&self, registry: &MetadataRegistry) -> Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).await?;

        let json = serde_json::to_string_pretty(registry).map_err(std::io::Error::from)?;
        let tmp = temp_file(&dir);
        let written = match fs::write(&tmp, json).await {
            Ok(()) => fs::rename(&tmp, &self.path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        debug!(path = %self.path.display(), files = registry.files.len(), "metadata saved");
        Ok(())
    }

    fn corrupt(&self, source: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::CorruptMetadata {
            path: self.path.clone(),
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::METADATA_FILE;
    use tempfile::TempDir;

    fn manifest(name: &str, lines: &[usize]) -> FileManifest {
        FileManifest {
            file_name: name.to_string(),
            num_chunks: lines.len(),
            chunks: lines
                .iter()
                .enumerate()
                .map(|(i, &n)| ChunkRecord {
                    node_id: format!("node{}", i + 1),
                    storage_path: PathBuf::from(format!(
                        "nodes/node{}/{name}_chunk_{}.txt",
                        i + 1,
                        i + 1
                    )),
                    line_count: n,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn missing_document_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = MetadataStore::new(dir.path().join("namenode/metadata.json"));
        assert_eq!(store.load().await.unwrap(), MetadataRegistry::default());
    }

    #[tokio::test]
    async fn blank_and_bare_documents_load_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.json");
        let store = MetadataStore::new(&path);

        std::fs::write(&path, "  \n").unwrap();
        assert!(store.load().await.unwrap().files.is_empty());

        std::fs::write(&path, "{}").unwrap();
        assert!(store.load().await.unwrap().files.is_empty());
    }

    #[tokio::test]
    async fn malformed_document_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.json");
        std::fs::write(&path, r#"{"files": [ {"file_name": 7 "#).unwrap();

        let err = MetadataStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, Error::CorruptMetadata { path: p, .. } if p == path));
    }

    #[tokio::test]
    async fn save_creates_directory_and_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = MetadataStore::new(dir.path().join("namenode/metadata.json"));
        let registry = MetadataRegistry {
            files: vec![manifest("a.txt", &[3, 3, 4]), manifest("b.txt", &[0, 2])],
        };

        store.save(&registry).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, registry);

        store.save(&loaded).await.unwrap();
        assert_eq!(store.load().await.unwrap(), registry);

        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("namenode"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != METADATA_FILE)
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn failed_save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("namenode/metadata.json");
        // A non-empty directory where the document should go makes the rename fail.
        std::fs::create_dir_all(path.join("occupied")).unwrap();
        let store = MetadataStore::new(&path);

        assert!(store.save(&MetadataRegistry::default()).await.is_err());

        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("namenode"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != METADATA_FILE)
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn document_uses_short_chunk_keys() {
        let dir = TempDir::new().unwrap();
        let store = MetadataStore::new(dir.path().join("metadata.json"));
        store
            .save(&MetadataRegistry {
                files: vec![manifest("a.txt", &[1])],
            })
            .await
            .unwrap();

        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        let chunk = &doc["files"][0]["chunks"][0];
        assert_eq!(chunk["node"], "node1");
        assert_eq!(chunk["path"], "nodes/node1/a.txt_chunk_1.txt");
        assert_eq!(chunk["lines"], 1);
        assert_eq!(doc["files"][0]["num_chunks"], 1);
    }

    #[test]
    fn find_returns_first_match_exactly() {
        let first = manifest("a.txt", &[1, 1]);
        let registry = MetadataRegistry {
            files: vec![first.clone(), manifest("a.txt", &[2]), manifest("B.txt", &[1])],
        };
        assert_eq!(registry.find("a.txt"), Some(&first));
        assert!(registry.find("b.txt").is_none());
        assert!(registry.find("A.txt").is_none());
    }

    #[test]
    fn summaries_render_like_listing() {
        let registry = MetadataRegistry {
            files: vec![manifest("a.txt", &[3, 3, 4])],
        };
        let summaries = registry.summaries();
        assert_eq!(summaries[0].to_string(), "a.txt (3 chunks)");
        assert_eq!(registry.files[0].total_lines(), 10);
    }
}
