//! Storage integration tests: object index + local engine.
//!
//! Run with: `cargo test`

use std::collections::HashSet;
use std::io::{self, Cursor, Read};
use std::sync::Arc;

use chrono::Utc;
use tempfile::TempDir;

use filestore::config::Config;
use filestore::error::{Result, StoreError};
use filestore::storage::{
    prepare_root, IdGenerator, LocalStorage, Object, ObjectIndex, StorageProvider, TimeOrderedIds,
};

fn tmp_dir() -> TempDir {
    tempfile::tempdir().expect("create tempdir")
}

fn read_all(storage: &LocalStorage, id: &str) -> Vec<u8> {
    let mut reader = storage.get(id).expect("get");
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).expect("read");
    buf
}

/// Yields `good` bytes, then fails.
struct FailingReader {
    good: Cursor<Vec<u8>>,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.good.read(buf)?;
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "client went away"));
        }
        Ok(n)
    }
}

struct BrokenIds;

impl IdGenerator for BrokenIds {
    fn generate(&self) -> Result<String> {
        Err(StoreError::IdGeneration("entropy exhausted".into()))
    }
}

struct FixedId(&'static str);

impl IdGenerator for FixedId {
    fn generate(&self) -> Result<String> {
        Ok(self.0.to_string())
    }
}

#[test]
fn test_put_get_list_scenario() {
    let dir = tmp_dir();
    let storage = LocalStorage::open(dir.path());

    let before = Utc::now();
    let obj = storage.put("a.txt", &mut Cursor::new(b"hello".to_vec())).expect("put");
    assert_eq!(obj.name, "a.txt");
    assert!(!obj.id.is_empty());
    assert!(obj.created_at >= before && obj.created_at <= Utc::now());

    assert_eq!(read_all(&storage, &obj.id), b"hello");
    assert_eq!(storage.list(), vec![obj.clone()]);

    // Raw content, no header, under <root>/<id>.
    let on_disk = std::fs::read(dir.path().join(&obj.id)).expect("read file");
    assert_eq!(on_disk, b"hello");
}

#[test]
fn test_get_unknown_id_is_not_found() {
    let dir = tmp_dir();
    let storage = LocalStorage::open(dir.path());

    match storage.get("nonexistent-id") {
        Err(StoreError::NotFound { id }) => assert_eq!(id, "nonexistent-id"),
        other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
    }
    assert!(matches!(storage.stat("nonexistent-id"), Err(StoreError::NotFound { .. })));
}

#[test]
fn test_get_rejects_path_like_ids() {
    let dir = tmp_dir();
    std::fs::write(dir.path().join("outside"), b"secret").expect("write");
    let root = dir.path().join("objects");
    std::fs::create_dir(&root).expect("mkdir");
    let storage = LocalStorage::open(&root);

    for id in ["../outside", "..", ".", "", "a/b"] {
        assert!(
            matches!(storage.get(id), Err(StoreError::NotFound { .. })),
            "id {id:?} should be NotFound"
        );
    }
}

#[test]
fn test_empty_store_lists_nothing() {
    let dir = tmp_dir();
    let storage = LocalStorage::open(dir.path());
    assert!(storage.list().is_empty());
}

#[test]
fn test_list_after_n_puts_matches_returned_metadata() {
    let dir = tmp_dir();
    let storage = LocalStorage::open(dir.path());

    let mut created = Vec::new();
    for i in 0..10 {
        let name = format!("file{i}.bin");
        let obj = storage
            .put(&name, &mut Cursor::new(vec![i as u8; 32]))
            .expect("put");
        created.push(obj);
    }

    let mut listed = storage.list();
    assert_eq!(listed.len(), 10);

    listed.sort_by(|a, b| a.id.cmp(&b.id));
    created.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(listed, created);
}

#[test]
fn test_round_trip_binary_and_empty_content() {
    let dir = tmp_dir();
    let storage = LocalStorage::open(dir.path());

    let binary: Vec<u8> = (0..=255u8).cycle().take(200_000).collect();
    let big = storage.put("blob", &mut Cursor::new(binary.clone())).expect("put");
    let empty = storage.put("empty", &mut io::empty()).expect("put empty");

    assert_eq!(read_all(&storage, &big.id), binary);
    assert!(read_all(&storage, &empty.id).is_empty());
}

#[test]
fn test_concurrent_puts_get_distinct_ids() {
    let dir = tmp_dir();
    let storage = Arc::new(LocalStorage::open(dir.path()));

    let results: Vec<(Object, Vec<u8>)> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..100)
            .map(|i| {
                let storage = storage.clone();
                s.spawn(move || {
                    let content = format!("payload number {i}").into_bytes();
                    let obj = storage
                        .put(&format!("obj{i}"), &mut Cursor::new(content.clone()))
                        .expect("put");
                    (obj, content)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().expect("join")).collect()
    });

    let ids: HashSet<_> = results.iter().map(|(o, _)| o.id.clone()).collect();
    assert_eq!(ids.len(), 100);
    assert_eq!(storage.list().len(), 100);

    for (obj, content) in &results {
        assert_eq!(&read_all(&storage, &obj.id), content);
    }
}

#[test]
fn test_failed_copy_is_not_registered() {
    let dir = tmp_dir();
    let index = Arc::new(ObjectIndex::new());
    let storage = LocalStorage::new(dir.path(), index.clone(), Box::new(FixedId("partial")));

    let mut reader = FailingReader {
        good: Cursor::new(vec![7u8; 100]),
    };
    let err = storage.put("broken.bin", &mut reader).unwrap_err();
    assert!(matches!(err, StoreError::Write(_)), "got {err:?}");

    assert!(index.is_empty());
    assert!(storage.list().is_empty());
    // The orphaned file may exist, but it is never served.
    assert!(matches!(storage.get("partial"), Err(StoreError::NotFound { .. })));
}

#[test]
fn test_id_generation_failure_creates_nothing() {
    let dir = tmp_dir();
    let storage = LocalStorage::new(dir.path(), Arc::new(ObjectIndex::new()), Box::new(BrokenIds));

    let mut source = Cursor::new(b"untouched".to_vec());
    let err = storage.put("x", &mut source).unwrap_err();
    assert!(matches!(err, StoreError::IdGeneration(_)), "got {err:?}");

    assert_eq!(source.position(), 0, "stream must not be consumed");
    assert!(storage.list().is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).expect("read_dir").count(), 0);
}

#[test]
fn test_id_collision_does_not_overwrite() {
    let dir = tmp_dir();
    let storage = LocalStorage::new(dir.path(), Arc::new(ObjectIndex::new()), Box::new(FixedId("same")));

    let first = storage.put("one", &mut Cursor::new(b"first".to_vec())).expect("put");
    let err = storage.put("two", &mut Cursor::new(b"second".to_vec())).unwrap_err();
    assert!(matches!(err, StoreError::Write(_)), "got {err:?}");

    assert_eq!(read_all(&storage, &first.id), b"first");
    assert_eq!(storage.list(), vec![first]);
}

#[test]
fn test_missing_file_for_registered_id_is_not_found() {
    let dir = tmp_dir();
    let storage = LocalStorage::open(dir.path());
    let obj = storage.put("gone", &mut Cursor::new(b"data".to_vec())).expect("put");

    std::fs::remove_file(dir.path().join(&obj.id)).expect("remove");
    assert!(matches!(storage.get(&obj.id), Err(StoreError::NotFound { .. })));
}

#[test]
fn test_injected_index_is_shared() {
    let dir = tmp_dir();
    let index = Arc::new(ObjectIndex::new());
    let storage = LocalStorage::new(dir.path(), index.clone(), Box::new(TimeOrderedIds));

    let obj = storage.put("shared", &mut Cursor::new(b"x".to_vec())).expect("put");
    assert_eq!(index.len(), 1);
    assert_eq!(index.get(&obj.id).expect("index get"), obj);
    assert_eq!(storage.stat(&obj.id).expect("stat"), obj);
}

#[test]
fn test_index_set_get_all() {
    let index = ObjectIndex::new();
    assert!(index.all().is_empty());
    assert!(matches!(index.get("a"), Err(StoreError::NotFound { .. })));

    let a = Object::new("a".into(), "first");
    index.set(a.clone());
    let snapshot = index.all();

    // Overwrite keyed by id.
    let a2 = Object::new("a".into(), "renamed");
    index.set(a2.clone());
    index.set(Object::new("b".into(), "second"));

    assert_eq!(snapshot, vec![a], "earlier snapshot is unaffected");
    assert_eq!(index.get("a").expect("get"), a2);
    assert_eq!(index.len(), 2);
}

#[test]
fn test_index_concurrent_readers_and_writers() {
    let index = Arc::new(ObjectIndex::new());

    std::thread::scope(|s| {
        for w in 0..4 {
            let index = index.clone();
            s.spawn(move || {
                for i in 0..250 {
                    index.set(Object::new(format!("w{w}-{i}"), "n"));
                }
            });
        }
        for _ in 0..4 {
            let index = index.clone();
            s.spawn(move || {
                for _ in 0..100 {
                    for obj in index.all() {
                        assert_eq!(obj.name, "n");
                    }
                }
            });
        }
    });

    assert_eq!(index.len(), 1000);
}

#[test]
fn test_time_ordered_ids_are_unique() {
    let ids = TimeOrderedIds;
    let generated: HashSet<String> = (0..1000).map(|_| ids.generate().expect("id")).collect();
    assert_eq!(generated.len(), 1000);
}

#[test]
fn test_prepare_root_reset_and_keep() {
    let dir = tmp_dir();
    let root = dir.path().join("storage");

    prepare_root(&root, true).expect("create");
    std::fs::write(root.join("leftover"), b"old").expect("write");

    prepare_root(&root, false).expect("keep");
    assert!(root.join("leftover").exists());

    prepare_root(&root, true).expect("reset");
    assert!(root.is_dir());
    assert_eq!(std::fs::read_dir(&root).expect("read_dir").count(), 0);
}

#[test]
fn test_default_startup_keeps_existing_files() {
    let dir = tmp_dir();
    let root = dir.path().join("home");
    std::fs::create_dir(&root).expect("mkdir");
    std::fs::write(root.join("notes.txt"), b"keep me").expect("write");

    let cfg = Config::default();
    prepare_root(&root, cfg.storage.reset_on_start).expect("prepare");
    assert_eq!(std::fs::read(root.join("notes.txt")).expect("read"), b"keep me");

    // Leftovers are never indexed, so they are not served either.
    let storage = LocalStorage::open(&root);
    assert!(storage.list().is_empty());
    assert!(matches!(storage.get("notes.txt"), Err(StoreError::NotFound { .. })));
}
