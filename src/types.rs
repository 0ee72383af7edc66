//! Core data types for the redaction pipeline
//!
//! All types use camelCase JSON serialization for wire compatibility.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RedactError, Result};

/// Category of a detected PII value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PiiKind {
    Email,
    Ssn,
    Phone,
    CreditCard,
    ZipCode,
}

impl PiiKind {
    /// Wire name, identical to the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Ssn => "ssn",
            Self::Phone => "phone",
            Self::CreditCard => "creditCard",
            Self::ZipCode => "zipCode",
        }
    }
}

impl std::fmt::Display for PiiKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected occurrence of PII
///
/// `start`/`end` are byte offsets into the original document text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PiiMatch {
    #[serde(rename = "type")]
    pub kind: PiiKind,
    pub value: String,
    pub start: usize,
    pub end: usize,
    /// Detector weight in `[0, 1]`
    pub confidence: f64,
}

impl PiiMatch {
    /// Whether the two spans share at least one byte
    pub fn overlaps(&self, other: &PiiMatch) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn span(&self) -> (usize, usize) {
        (self.start, self.end)
    }
}

/// A PII match together with its encrypted literal
///
/// `encrypted` is base64(nonce ‖ ciphertext ‖ tag). `value` is `None`
/// once the record has been stripped for zero-retention persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedMatch {
    #[serde(rename = "type")]
    pub kind: PiiKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub start: usize,
    pub end: usize,
    pub confidence: f64,
    pub encrypted: String,
}

impl EncryptedMatch {
    /// Attach an encrypted blob to a detected match
    pub fn new(m: PiiMatch, encrypted: String) -> Self {
        Self {
            kind: m.kind,
            value: Some(m.value),
            start: m.start,
            end: m.end,
            confidence: m.confidence,
            encrypted,
        }
    }

    /// Drop the cleartext literal, keeping only the encrypted form
    pub fn without_plaintext(mut self) -> Self {
        self.value = None;
        self
    }
}

/// Lifecycle of a document session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Created,
    Analyzing,
    Encrypting,
    Completed,
    Error,
}

impl ProcessingStatus {
    /// Whether `self -> next` is a permitted lifecycle step
    ///
    /// `Error -> Analyzing` exists so a failed run can be re-invoked.
    pub fn can_transition_to(&self, next: ProcessingStatus) -> bool {
        use ProcessingStatus::*;
        matches!(
            (self, next),
            (Created, Analyzing)
                | (Analyzing, Encrypting)
                | (Analyzing, Completed)
                | (Encrypting, Completed)
                | (Created | Analyzing | Encrypting, Error)
                | (Error, Analyzing)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Analyzing => "analyzing",
            Self::Encrypting => "encrypting",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The durable record tracking one document through the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSession {
    /// Unique session identifier (doc-<uuid>)
    pub id: String,

    pub original_filename: String,

    /// Upload size in bytes
    pub file_size: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Object store key of the original upload
    pub upload_path: String,

    pub processing_status: ProcessingStatus,

    /// Object store key of the rewritten document, set only when PII was found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_path: Option<String>,

    /// base64 SHA-256 of the exported key; the key itself is never stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_key_hash: Option<String>,

    #[serde(default)]
    pub pii_detected: Vec<EncryptedMatch>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentSession {
    /// Create a new session in `created` status
    pub fn new(
        id: impl Into<String>,
        original_filename: impl Into<String>,
        file_size: u64,
        mime_type: Option<String>,
        upload_path: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            original_filename: original_filename.into(),
            file_size,
            mime_type,
            upload_path: upload_path.into(),
            processing_status: ProcessingStatus::Created,
            processed_path: None,
            encryption_key_hash: None,
            pii_detected: Vec::new(),
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Generate a fresh session id
    pub fn generate_id() -> String {
        format!("doc-{}", uuid::Uuid::new_v4())
    }

    /// Move to `next`, rejecting steps the lifecycle does not allow
    pub fn transition(&mut self, next: ProcessingStatus) -> Result<()> {
        if !self.processing_status.can_transition_to(next) {
            return Err(RedactError::InvalidTransition {
                from: self.processing_status,
                to: next,
            });
        }
        self.processing_status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// A file handed to the pipeline for a new session
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: bytes::Bytes,
}

/// What the caller of `process` receives, exactly once
///
/// `key_base64` is `None` when the document contained no PII.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessOutcome {
    pub success: bool,
    pub key_base64: Option<String>,
    pub pii_count: usize,
}
