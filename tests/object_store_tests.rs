use bytes::Bytes;
use sharebox::object_store::{LocalStore, ObjectStore, ObjectStoreError};
use tokio::io::AsyncReadExt;

async fn read_all(store: &LocalStore, key: &str, offset: u64, len: u64) -> Vec<u8> {
    let mut reader = store.open_range(key, offset, len).await.unwrap();
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await.unwrap();
    buf
}

#[tokio::test]
async fn test_local_store_put_and_read() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    store.put("1-hello.txt", Bytes::from("hello world")).await.unwrap();

    assert_eq!(store.size("1-hello.txt").await.unwrap(), 11);
    assert_eq!(read_all(&store, "1-hello.txt", 0, 11).await, b"hello world");
}

#[tokio::test]
async fn test_local_store_open_range() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();
    store.put("digits", Bytes::from("0123456789")).await.unwrap();

    assert_eq!(read_all(&store, "digits", 2, 4).await, b"2345");
    assert_eq!(read_all(&store, "digits", 7, 100).await, b"789");
}

#[tokio::test]
async fn test_local_store_exists() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    assert!(!store.exists("missing").await.unwrap());

    store.put("present", Bytes::from("data")).await.unwrap();
    assert!(store.exists("present").await.unwrap());
}

#[tokio::test]
async fn test_local_store_never_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    store.put("key", Bytes::from("first")).await.unwrap();
    let result = store.put("key", Bytes::from("second")).await;
    assert!(matches!(result, Err(ObjectStoreError::AlreadyExists(_))));

    assert_eq!(read_all(&store, "key", 0, 64).await, b"first");
}

#[tokio::test]
async fn test_local_store_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    assert!(matches!(
        store.size("missing").await,
        Err(ObjectStoreError::NotFound(_))
    ));
    assert!(matches!(
        store.open_range("missing", 0, 1).await,
        Err(ObjectStoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_local_store_rejects_traversal_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path().join("uploads")).unwrap();
    std::fs::write(dir.path().join("secret.txt"), b"secret").unwrap();

    for key in ["../secret.txt", "..", ".", "", "sub/file"] {
        assert!(
            matches!(store.size(key).await, Err(ObjectStoreError::InvalidKey(_))),
            "key {key:?}"
        );
    }
}

#[tokio::test]
async fn test_local_store_directories_are_not_objects() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();

    assert!(!store.exists("nested").await.unwrap());
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_local_store_list_sorted() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    for key in ["c.txt", "a.txt", "b.txt"] {
        store.put(key, Bytes::from(key)).await.unwrap();
    }

    assert_eq!(store.list().await.unwrap(), vec!["a.txt", "b.txt", "c.txt"]);
}

#[tokio::test]
async fn test_local_store_read_small_respects_limit() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();
    store.put("note.txt", Bytes::from("tiny")).await.unwrap();

    assert_eq!(
        store.read_small("note.txt", 1024).await.unwrap(),
        Some(Bytes::from("tiny"))
    );
    assert_eq!(store.read_small("note.txt", 4).await.unwrap(), None);
}
