//! Per-session chat context memory.
//!
//! Remembers which libraries, prompts and templates a chat session last
//! used. Purely a convenience: every failure to read or write is logged
//! and swallowed, and a session without memory simply starts empty.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::io::workspace_io::atomic_write;

/// How a chat session searches its libraries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchPolicy {
    Semantic,
    #[default]
    Hybrid,
    Text,
}

impl SearchPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchPolicy::Semantic => "semantic",
            SearchPolicy::Hybrid => "hybrid",
            SearchPolicy::Text => "text",
        }
    }

    pub fn parse_policy(s: &str) -> Option<SearchPolicy> {
        match s.trim().to_ascii_lowercase().as_str() {
            "semantic" => Some(SearchPolicy::Semantic),
            "hybrid" => Some(SearchPolicy::Hybrid),
            "text" => Some(SearchPolicy::Text),
            _ => None,
        }
    }
}

/// What a session remembers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedCtx {
    #[serde(default)]
    pub library_ids: Vec<String>,
    #[serde(default)]
    pub prompt_ids: Vec<String>,
    #[serde(default)]
    pub template_ids: Vec<String>,
    #[serde(default)]
    pub search_policy: SearchPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

/// Error type for session store backends
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),
}

/// Opaque string key-value storage
pub trait SessionStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

pub fn ctx_key(session_id: &str) -> String {
    format!("chat-ctx-{}", session_id)
}

/// Load a session's remembered context, or `None` when there is nothing
/// usable (missing, unreadable, or not valid JSON).
pub fn load_ctx<S: SessionStore + ?Sized>(store: &S, session_id: &str) -> Option<PersistedCtx> {
    let key = ctx_key(session_id);
    let raw = match store.read(&key) {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::debug!(key = %key, error = %e, "session memory read failed");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            tracing::debug!(key = %key, error = %e, "ignoring unparseable session memory");
            None
        }
    }
}

/// Remember a session's context. Failures are logged and ignored.
pub fn save_ctx<S: SessionStore + ?Sized>(store: &S, session_id: &str, ctx: &PersistedCtx) {
    let key = ctx_key(session_id);
    let mut stamped = ctx.clone();
    stamped.saved_at = Some(Utc::now());
    let value = match serde_json::to_string(&stamped) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(key = %key, error = %e, "could not encode session memory");
            return;
        }
    };
    if let Err(e) = store.write(&key, &value) {
        tracing::debug!(key = %key, error = %e, "session memory write failed");
    }
}

/// One JSON file per key under a directory
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileSessionStore { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

impl SessionStore for FileSessionStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        atomic_write(&self.path_for(key), value.as_bytes())?;
        Ok(())
    }
}

/// In-memory store, optionally failing every call
#[derive(Default)]
pub struct MemorySessionStore {
    slots: RefCell<HashMap<String, String>>,
    unavailable: bool,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        MemorySessionStore::default()
    }

    /// A store whose every call fails, like a browser with storage disabled
    pub fn unavailable() -> Self {
        MemorySessionStore {
            unavailable: true,
            ..MemorySessionStore::default()
        }
    }

    pub fn put_raw(&self, key: &str, value: &str) {
        self.slots.borrow_mut().insert(key.to_string(), value.to_string());
    }
}

impl SessionStore for MemorySessionStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("storage disabled".into()));
        }
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("storage disabled".into()));
        }
        self.put_raw(key, value);
        Ok(())
    }
}
