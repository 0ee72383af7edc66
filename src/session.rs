//! Document session persistence
//!
//! The session record is the only shared state between pipeline runs.
//! Updates replace the whole record, so two racing runs on the same id
//! resolve last-writer-wins without tearing a record.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{RedactError, Result};
use crate::types::DocumentSession;

/// Trait for persisting document sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new session; fails if the id already exists
    async fn create(&self, session: &DocumentSession) -> Result<()>;

    /// Fetch a session by id; `NotFound` if absent
    async fn get(&self, id: &str) -> Result<DocumentSession>;

    /// Replace an existing session record
    async fn update(&self, session: &DocumentSession) -> Result<()>;

    /// List sessions, most recently updated first
    async fn list(&self, limit: usize) -> Result<Vec<DocumentSession>>;
}

fn session_not_found(id: &str) -> RedactError {
    RedactError::NotFound(format!("Session not found: {}", id))
}

/// In-memory session store
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, DocumentSession>>,
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, session: &DocumentSession) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(RedactError::Validation(format!(
                "Session already exists: {}",
                session.id
            )));
        }
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<DocumentSession> {
        let sessions = self.sessions.read().await;
        sessions.get(id).cloned().ok_or_else(|| session_not_found(id))
    }

    async fn update(&self, session: &DocumentSession) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session.id) {
            Some(existing) => {
                *existing = session.clone();
                Ok(())
            }
            None => Err(session_not_found(&session.id)),
        }
    }

    async fn list(&self, limit: usize) -> Result<Vec<DocumentSession>> {
        let sessions = self.sessions.read().await;
        let mut all: Vec<DocumentSession> = sessions.values().cloned().collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        all.truncate(limit);
        Ok(all)
    }
}

/// JSON file-based session store
///
/// One `<id>.json` file per session in a directory. Atomic writes via
/// temp file + rename.
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, id: &str) -> Result<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(RedactError::Validation(format!("Invalid session id: {:?}", id)));
        }
        Ok(self.dir.join(format!("{}.json", id)))
    }

    async fn write(&self, session: &DocumentSession) -> Result<()> {
        let path = self.path_for(&session.id)?;
        let json = serde_json::to_string_pretty(session)?;

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            RedactError::Storage(format!(
                "Failed to create session directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        // Unique temp name so concurrent writers never share a temp file
        let tmp_path = self
            .dir
            .join(format!("{}.{}.tmp", session.id, uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp_path, json).await.map_err(|e| {
            RedactError::Storage(format!(
                "Failed to write session file {}: {}",
                tmp_path.display(),
                e
            ))
        })?;
        tokio::fs::rename(&tmp_path, &path).await.map_err(|e| {
            RedactError::Storage(format!(
                "Failed to rename session file {} → {}: {}",
                tmp_path.display(),
                path.display(),
                e
            ))
        })?;

        tracing::debug!(session_id = %session.id, status = %session.processing_status, "Session saved");
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn create(&self, session: &DocumentSession) -> Result<()> {
        let path = self.path_for(&session.id)?;
        if tokio::fs::try_exists(&path).await? {
            return Err(RedactError::Validation(format!(
                "Session already exists: {}",
                session.id
            )));
        }
        self.write(session).await
    }

    async fn get(&self, id: &str) -> Result<DocumentSession> {
        let path = self.path_for(id)?;
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(session_not_found(id))
            }
            Err(e) => {
                return Err(RedactError::Storage(format!(
                    "Failed to read session file {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&json).map_err(|e| {
            RedactError::Storage(format!(
                "Failed to parse session file {}: {}",
                path.display(),
                e
            ))
        })
    }

    async fn update(&self, session: &DocumentSession) -> Result<()> {
        let path = self.path_for(&session.id)?;
        if !tokio::fs::try_exists(&path).await? {
            return Err(session_not_found(&session.id));
        }
        self.write(session).await
    }

    async fn list(&self, limit: usize) -> Result<Vec<DocumentSession>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut sessions = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match self.get(id).await {
                Ok(session) => sessions.push(session),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable session file"),
            }
        }

        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        sessions.truncate(limit);
        Ok(sessions)
    }
}
