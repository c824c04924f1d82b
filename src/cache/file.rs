//! File-backed cache gateway with cross-process locking.
//!
//! Each `(namespace, key)` pair maps to one file under `base_dir`, named by
//! the key's own hex form (cache keys are already SHA-256 hex strings from
//! [`crate::key_builder::ResolveKey::canonical`], so no further hashing is
//! needed to make them filesystem-safe). Reads and writes take an exclusive
//! [`fs4`] file lock for the duration of the operation, the same pattern
//! this codebase's repository cache uses to guard concurrent access from
//! unrelated processes.

use super::CacheGateway;
use crate::error::ResolverError;
use crate::types::CacheEntry;
use fs4::fs_std::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

pub struct FileCacheGateway {
    base_dir: PathBuf,
    enabled: AtomicBool,
}

impl FileCacheGateway {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            enabled: AtomicBool::new(true),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn entry_path(&self, namespace: &str, key: &str) -> PathBuf {
        self.base_dir.join(namespace).join(format!("{key}.json"))
    }

    fn lock_path(&self, namespace: &str, key: &str) -> PathBuf {
        self.base_dir.join(namespace).join(format!("{key}.lock"))
    }

    fn lock_file(&self, namespace: &str, key: &str) -> Result<File, ResolverError> {
        let lock_path = self.lock_path(namespace, key);
        fs::create_dir_all(lock_path.parent().expect("lock path has a parent"))?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;
        file.lock_exclusive()
            .map_err(|e| ResolverError::CacheIo(format!("failed to lock {}: {e}", lock_path.display())))?;
        Ok(file)
    }
}

fn read_entry(path: &Path) -> Result<Option<CacheEntry>, ResolverError> {
    if !path.exists() {
        return Ok(None);
    }
    let mut file = File::open(path)?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    if buf.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(&buf)?))
}

impl CacheGateway for FileCacheGateway {
    fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn get(&self, namespace: &str, key: &str) -> Result<Option<CacheEntry>, ResolverError> {
        let _lock = self.lock_file(namespace, key)?;
        read_entry(&self.entry_path(namespace, key))
    }

    fn set(&self, namespace: &str, key: &str, value: &CacheEntry) -> Result<(), ResolverError> {
        let _lock = self.lock_file(namespace, key)?;
        let path = self.entry_path(namespace, key);
        fs::create_dir_all(path.parent().expect("entry path has a parent"))?;
        let bytes = serde_json::to_vec(value)?;
        let mut file = OpenOptions::new().create(true).write(true).truncate(true).open(&path)?;
        file.write_all(&bytes)?;
        Ok(())
    }

    fn delete(&self, namespace: &str, key: &str) -> Result<(), ResolverError> {
        let _lock = self.lock_file(namespace, key)?;
        let path = self.entry_path(namespace, key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ResolverStatus, SolverDict};
    use tempfile::TempDir;

    fn entry() -> CacheEntry {
        CacheEntry {
            solver_dict: SolverDict {
                status: ResolverStatus::Solved,
                ..SolverDict::pending()
            },
            release_times: Default::default(),
            variant_states: Default::default(),
        }
    }

    #[test]
    fn store_then_load_round_trips_across_gateway_instances() {
        let dir = TempDir::new().unwrap();
        let gw1 = FileCacheGateway::new(dir.path());
        gw1.set("resolve", "k1", &entry()).unwrap();

        // A second gateway pointed at the same directory stands in for a
        // different process reading the same shared cache.
        let gw2 = FileCacheGateway::new(dir.path());
        assert_eq!(gw2.get("resolve", "k1").unwrap(), Some(entry()));
    }

    #[test]
    fn delete_on_absent_key_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let gw = FileCacheGateway::new(dir.path());
        assert!(gw.delete("resolve", "missing").is_ok());
    }
}
