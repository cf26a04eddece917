//! Split, resolve and run against a throwaway storage root.

use common::{reduce, Error, FinalResult, JobKind, WORD_COUNT_KEY};
use distributed::{Executor, MetadataStore, NameNode, StorageLayout};
use tempfile::TempDir;

const TEXT: &str = "It was the best of times, it was the worst of times,\n\
it was the age of wisdom, it was the age of foolishness,\n\
it was the epoch of belief, it was the epoch of incredulity,\n\
it was the season of Light, it was the season of Darkness,\n\
it was the spring of hope, it was the winter of despair.\n";

fn setup() -> (TempDir, StorageLayout) {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("two_cities.txt"), TEXT).unwrap();
    let layout = StorageLayout::new(dir.path().join("cluster"));
    (dir, layout)
}

#[tokio::test]
async fn parallel_run_matches_whole_file() {
    let (dir, layout) = setup();
    let (namenode, _) = NameNode::spawn(layout);
    let manifest = namenode
        .split(dir.path().join("two_cities.txt"), 3)
        .await
        .unwrap();
    assert_eq!(manifest.total_lines(), TEXT.lines().count());

    let executor = Executor::with_workers(namenode, 3);
    for job in [JobKind::WordCount, JobKind::TopWord] {
        let expected = job.finalize(reduce([job.map(TEXT)])).unwrap();
        assert_eq!(executor.run("two_cities.txt", job).await.unwrap(), expected);
    }

    assert_eq!(
        executor
            .run("two_cities.txt", JobKind::WordCount)
            .await
            .unwrap(),
        FinalResult::TotalWords(60)
    );
    match executor.run("two_cities.txt", JobKind::TopWord).await.unwrap() {
        FinalResult::TopWord { word, count } => {
            assert_ne!(word, WORD_COUNT_KEY);
            assert_eq!((word.as_str(), count), ("it", 10));
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[tokio::test]
async fn registry_survives_a_new_name_node() {
    let (dir, layout) = setup();
    {
        let (namenode, owner) = NameNode::spawn(layout.clone());
        namenode
            .split(dir.path().join("two_cities.txt"), 4)
            .await
            .unwrap();
        drop(namenode);
        owner.await.unwrap();
    }

    let store = MetadataStore::new(layout.metadata_file());
    let before = store.load().await.unwrap();
    store.save(&before).await.unwrap();
    assert_eq!(store.load().await.unwrap(), before);

    let (namenode, _) = NameNode::spawn(layout);
    let files = namenode.list_known_files().await.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].to_string(), "two_cities.txt (4 chunks)");
    assert_eq!(namenode.resolve("two_cities.txt").await.unwrap().len(), 4);
}

#[tokio::test]
async fn unknown_file_is_reported_not_fatal() {
    let (_dir, layout) = setup();
    let (namenode, _) = NameNode::spawn(layout);
    let executor = Executor::with_workers(namenode.clone(), 2);

    assert!(namenode.resolve("nonexistent.txt").await.unwrap().is_empty());
    assert!(matches!(
        executor.run("nonexistent.txt", JobKind::TopWord).await,
        Err(Error::NoChunksFound(_))
    ));
    // The name node keeps serving after a failed run.
    assert!(namenode.list_known_files().await.unwrap().is_empty());
}
