//! Shared access-list snapshot.
//!
//! Readers take an `Arc` of the current [`AccessPolicy`] without blocking
//! one another. A reload reads and decodes the whole document first and only
//! then publishes it with a single atomic pointer store, so no reader can
//! observe a half-written snapshot and a failed reload changes nothing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::loader::{load_access_policy, ConfigError};
use crate::observability::metrics;
use crate::security::AccessPolicy;

pub struct ConfigStore {
    path: PathBuf,
    current: ArcSwap<AccessPolicy>,
}

impl ConfigStore {
    /// Perform the first, synchronous load. Failure here is fatal to startup.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let policy = load_access_policy(&path)?;
        tracing::info!(
            path = ?path,
            allow = policy.allow.len(),
            deny = policy.deny.len(),
            "Access list loaded"
        );
        Ok(Self::with_policy(path, policy))
    }

    /// Build a store around an already-decoded policy.
    pub fn with_policy(path: impl Into<PathBuf>, policy: AccessPolicy) -> Self {
        Self {
            path: path.into(),
            current: ArcSwap::from_pointee(policy),
        }
    }

    /// The active snapshot.
    pub fn current(&self) -> Arc<AccessPolicy> {
        self.current.load_full()
    }

    /// Re-read the source and publish it. On error the previous snapshot
    /// stays in effect.
    pub fn reload(&self) -> Result<(), ConfigError> {
        match load_access_policy(&self.path) {
            Ok(policy) => {
                tracing::info!(
                    path = ?self.path,
                    allow = policy.allow.len(),
                    deny = policy.deny.len(),
                    "Access list reloaded"
                );
                self.current.store(Arc::new(policy));
                metrics::record_config_reload(true);
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    path = ?self.path,
                    error = %e,
                    "Failed to reload access list. Keeping current configuration."
                );
                metrics::record_config_reload(false);
                Err(e)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("hub-gate-store-{}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_load_and_reload() {
        let path = temp_path();
        fs::write(&path, r#"{"allow": ["alice"]}"#).unwrap();

        let store = ConfigStore::load(&path).unwrap();
        assert_eq!(store.current().allow, vec!["alice".to_string()]);

        fs::write(&path, r#"{"allow": [], "deny": ["mallory"]}"#).unwrap();
        store.reload().unwrap();
        let current = store.current();
        assert!(current.allow.is_empty());
        assert_eq!(current.deny, vec!["mallory".to_string()]);

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_failed_reload_keeps_snapshot() {
        let path = temp_path();
        fs::write(&path, r#"{"allow": ["alice"], "deny": ["alice-old"]}"#).unwrap();
        let store = ConfigStore::load(&path).unwrap();
        let before = store.current();

        fs::write(&path, r#"{"allow": ["bob"], "deny": "#).unwrap();
        assert!(matches!(store.reload(), Err(ConfigError::Decode(_))));
        assert_eq!(*store.current(), *before);

        fs::remove_file(&path).unwrap();
        assert!(matches!(store.reload(), Err(ConfigError::Io(_))));
        assert_eq!(*store.current(), *before);
    }

    #[test]
    fn test_initial_load_failure_is_an_error() {
        let path = temp_path();
        fs::write(&path, "not json").unwrap();
        assert!(ConfigStore::load(&path).is_err());
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_readers_never_observe_partial_snapshot() {
        let path = temp_path();
        let first = AccessPolicy::new(vec!["a1".into(), "a2".into()], vec!["d1".into()]);
        let second = AccessPolicy::new(vec!["b1".into()], vec!["e1".into(), "e2".into()]);
        fs::write(&path, serde_json::to_string(&first).unwrap()).unwrap();

        let store = Arc::new(ConfigStore::load(&path).unwrap());
        let done = Arc::new(AtomicBool::new(false));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                let done = done.clone();
                let (first, second) = (first.clone(), second.clone());
                thread::spawn(move || {
                    let mut reads = 0u64;
                    while !done.load(Ordering::Relaxed) || reads == 0 {
                        let snapshot = store.current();
                        assert!(*snapshot == first || *snapshot == second, "{snapshot:?}");
                        reads += 1;
                    }
                })
            })
            .collect();

        for i in 0..50 {
            let contents = match i % 3 {
                0 => serde_json::to_string(&second).unwrap(),
                1 => r#"{"allow": ["half"#.to_string(),
                _ => serde_json::to_string(&first).unwrap(),
            };
            fs::write(&path, contents).unwrap();
            let _ = store.reload();
        }
        done.store(true, Ordering::Relaxed);

        for reader in readers {
            reader.join().unwrap();
        }
        fs::remove_file(path).unwrap();
    }
}
