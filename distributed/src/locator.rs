//! Resolves a logical file name to the storage paths of its chunks.

use std::path::PathBuf;

use crate::metadata::MetadataRegistry;

/// Chunk paths of the first manifest named `file_name`, in chunk order.
/// Unknown names resolve to an empty list.
pub fn chunk_paths(registry: &MetadataRegistry, file_name: &str) -> Vec<PathBuf> {
    registry
        .find(file_name)
        .map(|manifest| {
            manifest
                .chunks
                .iter()
                .map(|chunk| chunk.storage_path.clone())
                .collect()
        })
        .unwrap_or_default()
}
