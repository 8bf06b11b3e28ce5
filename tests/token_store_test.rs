use std::{
    env, fs,
    path::PathBuf,
    process,
    sync::atomic::{AtomicUsize, Ordering},
};

use serde_json::Value;
use trimify::management::{
    ACCESS_TOKEN_KEY, FileTokenStore, MemoryTokenStore, REFRESH_TOKEN_KEY, TokenStore,
};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

// Unique path per test so tests can run in parallel
fn scratch_file(name: &str) -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    env::temp_dir()
        .join(format!("trimify-test-{}-{}", process::id(), n))
        .join(name)
}

fn exercise(store: &dyn TokenStore) {
    // Fresh store is empty
    assert_eq!(store.access_token(), None);
    assert_eq!(store.refresh_token(), None);

    store.save("a1", "r1").unwrap();
    assert_eq!(store.access_token().as_deref(), Some("a1"));
    assert_eq!(store.refresh_token().as_deref(), Some("r1"));

    // Save overwrites both
    store.save("a2", "r2").unwrap();
    assert_eq!(store.access_token().as_deref(), Some("a2"));
    assert_eq!(store.refresh_token().as_deref(), Some("r2"));

    // Refresh keeps the refresh token
    store.set_access("a3").unwrap();
    assert_eq!(store.access_token().as_deref(), Some("a3"));
    assert_eq!(store.refresh_token().as_deref(), Some("r2"));

    store.clear().unwrap();
    assert_eq!(store.access_token(), None);
    assert_eq!(store.refresh_token(), None);

    // Clearing twice is fine
    store.clear().unwrap();
}

#[test]
fn test_memory_store_contract() {
    exercise(&MemoryTokenStore::new());
}

#[test]
fn test_file_store_contract() {
    let path = scratch_file("session.json");
    let store = FileTokenStore::open(&path).unwrap();
    exercise(&store);
    assert!(!path.exists());
}

#[test]
fn test_file_store_survives_reopen() {
    let path = scratch_file("session.json");
    {
        let store = FileTokenStore::open(&path).unwrap();
        store.save("access", "refresh").unwrap();
    }

    let reopened = FileTokenStore::open(&path).unwrap();
    assert_eq!(reopened.access_token().as_deref(), Some("access"));
    assert_eq!(reopened.refresh_token().as_deref(), Some("refresh"));
    assert_eq!(reopened.path(), path.as_path());
}

#[test]
fn test_file_store_uses_fixed_keys() {
    let path = scratch_file("session.json");
    let store = FileTokenStore::open(&path).unwrap();
    store.save("access", "refresh").unwrap();

    let doc: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc[ACCESS_TOKEN_KEY], "access");
    assert_eq!(doc[REFRESH_TOKEN_KEY], "refresh");
    assert_eq!(doc.as_object().unwrap().len(), 2);
}

#[test]
fn test_file_store_discards_truncated_file() {
    let path = scratch_file("session.json");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, r#"{"access_token": "abc"#).unwrap();

    let store = FileTokenStore::open(&path).unwrap();
    assert_eq!(store.access_token(), None);
    assert_eq!(store.refresh_token(), None);
    assert!(!path.exists());

    // The store is usable again right away
    store.save("access", "refresh").unwrap();
    let reopened = FileTokenStore::open(&path).unwrap();
    assert_eq!(reopened.access_token().as_deref(), Some("access"));
}

#[test]
fn test_file_store_leaves_no_temp_file_behind() {
    let path = scratch_file("session.json");
    let store = FileTokenStore::open(&path).unwrap();
    store.save("access", "refresh").unwrap();
    store.set_access("rotated").unwrap();

    let entries: Vec<_> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("session.json")]);
}

#[cfg(unix)]
#[test]
fn test_file_store_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let path = scratch_file("session.json");
    let store = FileTokenStore::open(&path).unwrap();
    store.save("access", "refresh").unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn test_file_store_accepts_empty_file() {
    let path = scratch_file("session.json");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "").unwrap();

    let store = FileTokenStore::open(&path).unwrap();
    assert_eq!(store.access_token(), None);
}
