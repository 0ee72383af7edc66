//! Document processing pipeline
//!
//! Sequences fetch → detect → (encrypt + rewrite) → persist → status
//! update for one session. The generated key leaves this module exactly
//! once, in the returned [`ProcessOutcome`]; only its fingerprint is
//! written to the session record.

use std::path::Path;
use std::sync::Arc;

use crate::crypto::{key_fingerprint, DocumentKey};
use crate::detector::PatternMatcher;
use crate::error::{RedactError, Result};
use crate::rewriter::{self, OverlapPolicy};
use crate::session::SessionStore;
use crate::storage::ObjectStore;
use crate::types::{DocumentSession, NewUpload, ProcessOutcome, ProcessingStatus};

/// Tunables for a pipeline instance
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub overlap_policy: OverlapPolicy,
    pub retain_plaintext: bool,
    pub max_upload_bytes: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            overlap_policy: OverlapPolicy::default(),
            retain_plaintext: true,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl From<&crate::config::RedactConfig> for PipelineOptions {
    fn from(config: &crate::config::RedactConfig) -> Self {
        Self {
            overlap_policy: config.overlap_policy,
            retain_plaintext: config.retain_plaintext,
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// Object key of the rewritten document for a session
pub fn processed_path(session_id: &str) -> String {
    format!("processed/{}.txt", session_id)
}

/// Object key of an original upload
pub fn upload_path(session_id: &str, filename: &str) -> String {
    format!("uploads/{}/{}", session_id, sanitize_filename(filename))
}

/// Reduce a client-supplied filename to a single safe path segment
fn sanitize_filename(filename: &str) -> String {
    let base = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Orchestrates detection and encryption for document sessions
pub struct Pipeline {
    sessions: Arc<dyn SessionStore>,
    objects: Arc<dyn ObjectStore>,
    detector: PatternMatcher,
    options: PipelineOptions,
}

impl Pipeline {
    /// Create a pipeline with the built-in detection rules
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        objects: Arc<dyn ObjectStore>,
        options: PipelineOptions,
    ) -> Result<Self> {
        Ok(Self::with_detector(
            sessions,
            objects,
            PatternMatcher::with_default_rules()?,
            options,
        ))
    }

    pub fn with_detector(
        sessions: Arc<dyn SessionStore>,
        objects: Arc<dyn ObjectStore>,
        detector: PatternMatcher,
        options: PipelineOptions,
    ) -> Self {
        Self {
            sessions,
            objects,
            detector,
            options,
        }
    }

    /// Store an upload and open a session for it in `created` status
    pub async fn create_session(&self, upload: NewUpload) -> Result<DocumentSession> {
        if upload.filename.trim().is_empty() {
            return Err(RedactError::Validation("Filename is required".to_string()));
        }
        if upload.bytes.len() > self.options.max_upload_bytes {
            return Err(RedactError::Validation(format!(
                "Upload of {} bytes exceeds the {} byte limit",
                upload.bytes.len(),
                self.options.max_upload_bytes
            )));
        }

        let id = DocumentSession::generate_id();
        let path = upload_path(&id, &upload.filename);
        let content_type = upload
            .mime_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());

        self.objects
            .put(&path, upload.bytes.clone(), &content_type)
            .await?;

        let session = DocumentSession::new(
            id,
            upload.filename,
            upload.bytes.len() as u64,
            upload.mime_type,
            path,
        );
        self.sessions.create(&session).await?;

        tracing::info!(
            session_id = %session.id,
            size = session.file_size,
            "Session created"
        );
        Ok(session)
    }

    /// Fetch a session record
    pub async fn session(&self, session_id: &str) -> Result<DocumentSession> {
        self.sessions.get(session_id).await
    }

    /// Most recently updated sessions
    pub async fn sessions(&self, limit: usize) -> Result<Vec<DocumentSession>> {
        self.sessions.list(limit).await
    }

    /// Run the pipeline for one session
    ///
    /// Failures after the run has started are recorded on the session as
    /// `error` and then returned. A session that is already completed or
    /// in flight is refused with `InvalidTransition` and left untouched.
    pub async fn process(&self, session_id: &str) -> Result<ProcessOutcome> {
        let mut session = self.sessions.get(session_id).await?;

        let from = session.processing_status;
        if !from.can_transition_to(ProcessingStatus::Analyzing) {
            return Err(RedactError::InvalidTransition {
                from,
                to: ProcessingStatus::Analyzing,
            });
        }

        match self.run(&mut session).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.record_failure(session_id, &e).await;
                Err(e)
            }
        }
    }

    async fn run(&self, session: &mut DocumentSession) -> Result<ProcessOutcome> {
        session.transition(ProcessingStatus::Analyzing)?;
        session.error_message = None;
        self.sessions.update(session).await?;
        tracing::info!(session_id = %session.id, "Analyzing document");

        let data = self.objects.get(&session.upload_path).await?;
        let text = String::from_utf8_lossy(&data);

        let matches = self.detector.detect(&text);
        if matches.is_empty() {
            session.pii_detected.clear();
            session.transition(ProcessingStatus::Completed)?;
            self.sessions.update(session).await?;
            tracing::info!(session_id = %session.id, "No PII found");
            return Ok(ProcessOutcome {
                success: true,
                key_base64: None,
                pii_count: 0,
            });
        }

        session.transition(ProcessingStatus::Encrypting)?;
        self.sessions.update(session).await?;

        let matches = rewriter::resolve_overlaps(&text, matches, self.options.overlap_policy)?;
        let pii_count = matches.len();

        let key = DocumentKey::generate();
        let (processed, encrypted) = rewriter::encrypt_and_rewrite(&text, matches, &key)?;

        let processed_path = processed_path(&session.id);
        self.objects
            .put(&processed_path, processed.into_bytes().into(), "text/plain")
            .await?;

        let key_base64 = key.export();
        session.processed_path = Some(processed_path);
        session.encryption_key_hash = Some(key_fingerprint(&key_base64));
        session.pii_detected = if self.options.retain_plaintext {
            encrypted
        } else {
            encrypted
                .into_iter()
                .map(|m| m.without_plaintext())
                .collect()
        };
        session.transition(ProcessingStatus::Completed)?;
        self.sessions.update(session).await?;

        tracing::info!(session_id = %session.id, pii_count, "Document encrypted");
        Ok(ProcessOutcome {
            success: true,
            key_base64: Some(key_base64),
            pii_count,
        })
    }

    /// Mark the stored session as failed; secondary failures are only logged
    async fn record_failure(&self, session_id: &str, error: &RedactError) {
        tracing::warn!(session_id = %session_id, error = %error, "Processing failed");

        let mut session = match self.sessions.get(session_id).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Could not load session to record failure");
                return;
            }
        };
        if let Err(e) = session.transition(ProcessingStatus::Error) {
            tracing::warn!(session_id = %session_id, error = %e, "Session not in a failable state");
            return;
        }
        session.error_message = Some(error.to_string());
        if let Err(e) = self.sessions.update(&session).await {
            tracing::warn!(session_id = %session_id, error = %e, "Could not record failure");
        }
    }

    /// Check a caller-held key against the session's stored fingerprint
    pub async fn verify_key(&self, session_id: &str, key_base64: &str) -> Result<bool> {
        let session = self.sessions.get(session_id).await?;
        let stored = session.encryption_key_hash.ok_or_else(|| {
            RedactError::NotFound(format!("Session {} has no encryption key", session_id))
        })?;
        Ok(key_fingerprint(key_base64.trim()) == stored)
    }

    /// Rewritten document bytes for a completed session
    pub async fn processed_document(&self, session_id: &str) -> Result<bytes::Bytes> {
        let session = self.sessions.get(session_id).await?;
        let path = session.processed_path.ok_or_else(|| {
            RedactError::NotFound(format!("Session {} has no processed document", session_id))
        })?;
        self.objects.get(&path).await
    }
}
