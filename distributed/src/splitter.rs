//! Line-safe partitioning of a text file across storage nodes.
//!
//! Node `i` gets lines `[i * base, (i + 1) * base)` with
//! `base = total / num_nodes`; the last node also takes the remainder.
//! Lines keep their terminators, so concatenating the chunks in node order
//! gives back the source bytes. Every split gets its own id in the chunk
//! names, so no chunk file is ever shared between two manifests.

use std::{io::ErrorKind, ops::Range, path::Path};

use common::{Error, Result};
use itertools::Itertools;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use crate::{
    config::{node_id, StorageLayout},
    metadata::{ChunkRecord, FileManifest},
};

/// Line ranges per node. Earlier nodes are empty when there are fewer lines
/// than nodes.
pub fn chunk_ranges(total_lines: usize, num_nodes: usize) -> Vec<Range<usize>> {
    if num_nodes == 0 {
        return Vec::new();
    }
    let base = total_lines / num_nodes;
    (0..num_nodes)
        .map(|i| {
            let start = i * base;
            let end = if i + 1 == num_nodes {
                total_lines
            } else {
                start + base
            };
            start..end
        })
        .collect()
}

/// `<file>_<split id>_chunk_<i + 1>.txt`
pub fn chunk_file_name(file_name: &str, split_id: &str, index: usize) -> String {
    format!("{file_name}_{split_id}_chunk_{}.txt", index + 1)
}

/// Splits `contents` into lines, each keeping its trailing `\n`.
pub fn lines(contents: &str) -> Vec<&str> {
    contents.split_inclusive('\n').collect_vec()
}

/// Writes one chunk per node under `layout` and returns the manifest. Does
/// not register it; see [`NameNode::split`](crate::NameNode::split).
pub async fn write_chunks(
    source: &Path,
    num_nodes: usize,
    layout: &StorageLayout,
) -> Result<FileManifest> {
    if num_nodes == 0 {
        return Err(Error::InvalidNodeCount(num_nodes));
    }
    let file_name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| Error::SourceNotFound(source.to_path_buf()))?;
    let contents = match fs::read_to_string(source).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::SourceNotFound(source.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };

    let lines = lines(&contents);
    let split_id = Uuid::new_v4().simple().to_string();
    let mut chunks = Vec::with_capacity(num_nodes);
    for (i, range) in chunk_ranges(lines.len(), num_nodes).into_iter().enumerate() {
        let node_id = node_id(i);
        let dir = layout.node_dir(&node_id);
        fs::create_dir_all(&dir).await?;

        let storage_path = dir.join(chunk_file_name(&file_name, &split_id, i));
        fs::write(&storage_path, lines[range.clone()].concat()).await?;
        debug!(node = %node_id, path = %storage_path.display(), lines = range.len(), "chunk written");

        chunks.push(ChunkRecord {
            node_id,
            storage_path,
            line_count: range.len(),
        });
    }

    Ok(FileManifest {
        file_name,
        num_chunks: num_nodes,
        chunks,
    })
}
