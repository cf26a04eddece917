//! Parallel map over chunks followed by a single reduce.
//!
//! A fixed pool of workers drains a queue holding one task per chunk. Each
//! worker reads its chunk, applies the job's map function and keeps the
//! partial result to itself. The executor joins every worker before it
//! reduces; a failed chunk read is reported only after that barrier, and no
//! result is produced for the run.

use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::Arc,
};

use common::{reduce, Error, FinalResult, Frequencies, JobKind, Result};
use crossbeam_queue::ArrayQueue;
use futures::future::join_all;
use itertools::Itertools;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::namenode::NameNode;

#[derive(Debug)]
struct ChunkTask {
    index: usize,
    path: PathBuf,
}

type Outcome = (usize, Result<Frequencies>);

pub struct Executor {
    namenode: NameNode,
    worker_count: usize,
}

impl Executor {
    /// One worker per available CPU.
    pub fn new(namenode: NameNode) -> Self {
        let worker_count = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        Self::with_workers(namenode, worker_count)
    }

    pub fn with_workers(namenode: NameNode, worker_count: usize) -> Self {
        Self {
            namenode,
            worker_count: worker_count.max(1),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub async fn run(&self, file_name: &str, job: JobKind) -> Result<FinalResult> {
        let paths = self.namenode.resolve(file_name).await?;
        if paths.is_empty() {
            return Err(Error::NoChunksFound(file_name.to_string()));
        }
        info!(file = file_name, %job, chunks = paths.len(), "running job");

        let partials = map_chunks(paths, job, self.worker_count).await?;
        let result = job.finalize(reduce(partials))?;
        info!(file = file_name, %job, %result, "job finished");
        Ok(result)
    }
}

/// Maps every chunk with at most `worker_count` concurrent workers and
/// returns the partial results in chunk order. Fails with the error of the
/// lowest-indexed failed chunk once all workers have finished.
pub async fn map_chunks(
    paths: Vec<PathBuf>,
    job: JobKind,
    worker_count: usize,
) -> Result<Vec<Frequencies>> {
    let total = paths.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let tasks = Arc::new(ArrayQueue::new(total));
    for (index, path) in paths.into_iter().enumerate() {
        // Capacity equals the task count.
        let _ = tasks.push(ChunkTask { index, path });
    }

    let workers = worker_count.clamp(1, total);
    debug!(workers, chunks = total, "dispatching map tasks");
    let handles = (0..workers)
        .map(|worker_id| tokio::spawn(worker_loop(worker_id, Arc::clone(&tasks), job)))
        .collect_vec();

    let mut outcomes = Vec::with_capacity(total);
    for joined in join_all(handles).await {
        outcomes.extend(joined.map_err(|e| Error::Worker(e.to_string()))?);
    }

    let (mut partials, failures): (Vec<_>, Vec<_>) =
        outcomes.into_iter().partition(|(_, outcome)| outcome.is_ok());
    if let Some((index, Err(err))) = failures.into_iter().min_by_key(|(index, _)| *index) {
        warn!(chunk = index, error = %err, "map phase failed");
        return Err(err);
    }

    partials.sort_by_key(|(index, _)| *index);
    partials
        .into_iter()
        .map(|(_, outcome)| outcome)
        .collect()
}

async fn worker_loop(
    worker_id: usize,
    tasks: Arc<ArrayQueue<ChunkTask>>,
    job: JobKind,
) -> Vec<Outcome> {
    let mut done = Vec::new();
    while let Some(task) = tasks.pop() {
        debug!(worker_id, chunk = task.index, path = %task.path.display(), "mapping chunk");
        let outcome = process_chunk(&task.path, job).await;
        done.push((task.index, outcome));
    }
    done
}

async fn process_chunk(path: &Path, job: JobKind) -> Result<Frequencies> {
    let contents = fs::read_to_string(path)
        .await
        .map_err(|source| Error::ChunkReadError {
            path: path.to_path_buf(),
            source,
        })?;
    tokio::task::spawn_blocking(move || job.map(&contents))
        .await
        .map_err(|e| Error::Worker(e.to_string()))
}
