//! Cache behaviour across runs, driven through real files.

use std::fs;

use erblint_cache::{CacheEntry, CacheKey, PruneStats, ResultCache};
use pretty_assertions::{assert_eq, assert_ne};
use tempfile::TempDir;

const CONFIG: &str = r#"[{"id":"final-newline","severity":null,"options":null}]"#;

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn store(cache: &ResultCache, key: &CacheKey) {
    cache
        .put(key, &CacheEntry::new(key.as_hex().unwrap(), Vec::new()))
        .unwrap();
}

#[test]
fn test_identical_files_at_different_paths_have_different_keys() {
    let files = TempDir::new().unwrap();
    let a = write(&files, "a.html.erb", "<p><%= x %></p>\n");
    let b = write(&files, "b.html.erb", "<p><%= x %></p>\n");

    assert_ne!(CacheKey::for_file(&a, CONFIG), CacheKey::for_file(&b, CONFIG));
}

#[test]
fn test_one_byte_change_misses() {
    let files = TempDir::new().unwrap();
    let cache_dir = TempDir::new().unwrap();
    let path = write(&files, "a.html.erb", "<p><%= x %></p>\n");

    let cache = ResultCache::new(cache_dir.path());
    store(&cache, &CacheKey::for_file(&path, CONFIG));

    let next_run = ResultCache::new(cache_dir.path());
    assert!(next_run.get(&CacheKey::for_file(&path, CONFIG)).is_some());

    fs::write(&path, "<p><%= y %></p>\n").unwrap();
    assert!(next_run.get(&CacheKey::for_file(&path, CONFIG)).is_none());
}

#[test]
fn test_config_change_misses() {
    let files = TempDir::new().unwrap();
    let cache_dir = TempDir::new().unwrap();
    let path = write(&files, "a.html.erb", "<p></p>\n");

    let cache = ResultCache::new(cache_dir.path());
    store(&cache, &CacheKey::for_file(&path, CONFIG));

    let other_config = r#"[{"id":"final-newline","severity":null,"options":{"present":false}}]"#;
    assert!(cache.get(&CacheKey::for_file(&path, other_config)).is_none());
}

#[cfg(unix)]
#[test]
fn test_permission_change_misses() {
    use std::os::unix::fs::PermissionsExt;

    let files = TempDir::new().unwrap();
    let path = write(&files, "a.html.erb", "<p></p>\n");

    fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();
    let first = CacheKey::for_file(&path, CONFIG);
    fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();
    let second = CacheKey::for_file(&path, CONFIG);

    assert_ne!(first, second);
}

#[test]
fn test_prune_keeps_hits_and_writes_of_this_run() {
    let cache_dir = TempDir::new().unwrap();
    let key = |content: &str| {
        CacheKey::digest(std::path::Path::new("f"), 0o644, CONFIG, content.as_bytes())
    };
    let (hit, stale, fresh) = (key("hit"), key("stale"), key("fresh"));

    let first_run = ResultCache::new(cache_dir.path());
    store(&first_run, &hit);
    store(&first_run, &stale);

    let second_run = ResultCache::new(cache_dir.path());
    assert!(second_run.get(&hit).is_some());
    store(&second_run, &fresh);
    fs::write(cache_dir.path().join("README"), "not an entry").unwrap();

    assert_eq!(
        second_run.prune().unwrap(),
        PruneStats {
            examined: 3,
            removed: 1,
            stale_temps: 0
        }
    );
    assert!(cache_dir.path().join(hit.as_hex().unwrap()).exists());
    assert!(cache_dir.path().join(fresh.as_hex().unwrap()).exists());
    assert!(!cache_dir.path().join(stale.as_hex().unwrap()).exists());
    assert!(cache_dir.path().join("README").exists());
}

#[test]
fn test_key_recorded_as_written_survives_failed_write() {
    let cache_dir = TempDir::new().unwrap();
    let blocked = cache_dir.path().join("blocked");
    // A regular file where the cache directory should be makes every write fail.
    fs::write(&blocked, "").unwrap();

    let key = CacheKey::digest(std::path::Path::new("f"), 0, CONFIG, b"x");
    let cache = ResultCache::new(&blocked);
    assert!(cache.put(&key, &CacheEntry::new(key.as_hex().unwrap(), Vec::new())).is_err());
    assert_eq!(cache.stats().writes, 1);
}
