//! On-disk layout of the simulated cluster.
//!
//! ```text
//! <root>/namenode/metadata.json
//! <root>/nodes/node1/<file>_<split id>_chunk_1.txt
//! <root>/nodes/node2/<file>_<split id>_chunk_2.txt
//! ```

use std::path::{Path, PathBuf};

pub const DEFAULT_NUM_NODES: usize = 3;
pub const NODES_DIR: &str = "nodes";
pub const NAMENODE_DIR: &str = "namenode";
pub const METADATA_FILE: &str = "metadata.json";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn nodes_dir(&self) -> PathBuf {
        self.root.join(NODES_DIR)
    }

    pub fn node_dir(&self, node_id: &str) -> PathBuf {
        self.nodes_dir().join(node_id)
    }

    pub fn namenode_dir(&self) -> PathBuf {
        self.root.join(NAMENODE_DIR)
    }

    pub fn metadata_file(&self) -> PathBuf {
        self.namenode_dir().join(METADATA_FILE)
    }
}

/// Node ids are 1-based: index 0 is `node1`.
pub fn node_id(index: usize) -> String {
    format!("node{}", index + 1)
}
