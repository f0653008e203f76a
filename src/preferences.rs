//! File-backed preferences.
//!
//! A [`PreferenceStore`] holds a value in memory and mirrors it to a JSON
//! file. Changes made through [`update`](PreferenceStore::update) are
//! written after a short quiet period, so a burst of changes costs one
//! write. Reading never fails: a missing, empty or corrupt file yields the
//! defaults.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{HuginnError, Result};

/// Quiet period before pending changes are written.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

struct StoreInner<T> {
    path: PathBuf,
    value: Mutex<T>,
    generation: AtomicU64,
    debounce: Duration,
}

/// A JSON file-backed value with defaults.
pub struct PreferenceStore<T> {
    inner: Arc<StoreInner<T>>,
}

impl<T> Clone for PreferenceStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> PreferenceStore<T>
where
    T: Serialize + DeserializeOwned + Default + Clone + Send + 'static,
{
    /// Open the store at `path`, loading what is there.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::open_with_debounce(path, DEFAULT_DEBOUNCE)
    }

    pub fn open_with_debounce(path: impl Into<PathBuf>, debounce: Duration) -> Self {
        let path = path.into();
        let value = load_file(&path).unwrap_or_default();
        Self {
            inner: Arc::new(StoreInner {
                path,
                value: Mutex::new(value),
                generation: AtomicU64::new(0),
                debounce,
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// A snapshot of the current value.
    pub fn get(&self) -> T {
        self.inner.lock().clone()
    }

    /// Change the value and schedule a write.
    ///
    /// Outside a tokio runtime the write happens immediately.
    pub fn update<F>(&self, change: F)
    where
        F: FnOnce(&mut T),
    {
        change(&mut self.inner.lock());
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            if let Err(e) = self.inner.write() {
                warn!(path = %self.inner.path.display(), error = %e, "failed to save preferences");
            }
            return;
        };
        let inner = Arc::clone(&self.inner);
        handle.spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            // a later update (or flush) owns the write
            if inner.generation.load(Ordering::SeqCst) != generation {
                return;
            }
            let path = inner.path.clone();
            match tokio::task::spawn_blocking(move || inner.write()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(path = %path.display(), error = %e, "failed to save preferences");
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "preferences writer panicked");
                }
            }
        });
    }

    /// Write the current value now, cancelling any pending write.
    pub fn flush(&self) -> Result<()> {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.write()
    }

    /// Re-read the file, e.g. after another process changed it.
    ///
    /// If the file is missing or unreadable the in-memory value is kept.
    pub fn reload(&self) {
        if let Some(value) = load_file(&self.inner.path) {
            *self.inner.lock() = value;
        }
    }
}

impl<T: Serialize> StoreInner<T> {
    fn lock(&self) -> MutexGuard<'_, T> {
        self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomic write via tmp + rename.
    fn write(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&*self.lock())
            .map_err(|e| HuginnError::Storage(format!("failed to serialize preferences: {e}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                HuginnError::Storage(format!(
                    "failed to create preferences dir {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json).map_err(|e| {
            HuginnError::Storage(format!(
                "failed to write preferences file {}: {e}",
                tmp_path.display()
            ))
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            HuginnError::Storage(format!(
                "failed to rename preferences file {} → {}: {e}",
                tmp_path.display(),
                self.path.display()
            ))
        })?;
        debug!(path = %self.path.display(), "saved preferences");
        Ok(())
    }
}

/// `None` on a missing, empty or corrupt file (logs a warning on corrupt).
fn load_file<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read preferences");
            return None;
        }
    };
    if content.trim().is_empty() {
        return None;
    }
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "corrupt preferences file, using defaults");
            None
        }
    }
}
