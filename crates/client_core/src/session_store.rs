//! Session-scoped key/value store.
//!
//! Values live in memory and are mirrored to a small JSON file named after
//! the session scope, so they survive a restart within the same scope. Every
//! storage failure is logged and swallowed: a value that cannot be read is
//! simply absent.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::{debug, warn};

/// Key holding the home institution typed in the first stage.
pub const HOME_INSTITUTION_KEY: &str = "EHD_university_from";

#[derive(Debug, Default)]
pub struct SessionStore {
    path: Option<PathBuf>,
    entries: Mutex<HashMap<String, String>>,
}

impl SessionStore {
    /// Store that never touches the disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens (or lazily creates) the store for `scope` under `dir`.
    pub fn open(dir: &Path, scope: &str) -> Self {
        let path = dir.join(format!("session-{}.json", sanitize_scope(scope)));
        let entries = match fs::read(&path) {
            Ok(raw) => serde_json::from_slice::<HashMap<String, String>>(&raw).unwrap_or_else(
                |err| {
                    warn!(path = %path.display(), %err, "ignoring unreadable session file");
                    HashMap::new()
                },
            ),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => {
                warn!(path = %path.display(), %err, "session storage unavailable");
                HashMap::new()
            }
        };
        debug!(path = %path.display(), keys = entries.len(), "opened session store");
        Self {
            path: Some(path),
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set(&self, key: &str, value: &str) {
        let Ok(mut entries) = self.entries.lock() else {
            warn!(key, "session store lock poisoned; dropping write");
            return;
        };
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries);
    }

    /// Returns the stored value, or an empty string when it is absent or the
    /// store is unusable.
    pub fn get(&self, key: &str) -> String {
        match self.entries.lock() {
            Ok(entries) => entries.get(key).cloned().unwrap_or_default(),
            Err(_) => String::new(),
        }
    }

    pub fn clear(&self, key: &str) {
        let Ok(mut entries) = self.entries.lock() else {
            warn!(key, "session store lock poisoned; dropping clear");
            return;
        };
        if entries.remove(key).is_some() {
            self.persist(&entries);
        }
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        let Some(path) = &self.path else {
            return;
        };
        let result = serde_json::to_vec(entries)
            .map_err(|err| err.to_string())
            .and_then(|raw| {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).map_err(|err| err.to_string())?;
                }
                fs::write(path, raw).map_err(|err| err.to_string())
            });
        if let Err(err) = result {
            warn!(path = %path.display(), %err, "failed to persist session store");
        }
    }
}

fn sanitize_scope(scope: &str) -> String {
    let cleaned: String = scope
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "default".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
#[path = "tests/session_store_tests.rs"]
mod tests;
