//! # a3s-redact
//!
//! PII detection and field-level encryption for uploaded documents.
//!
//! ## Overview
//!
//! `a3s-redact` finds personally identifiable information in text (emails,
//! SSNs, phone numbers, credit cards, ZIP codes), encrypts each occurrence
//! with a per-document AES-256-GCM key, and rewrites the document so every
//! occurrence becomes an `[ENCRYPTED_PII_<i>:<base64>]` placeholder. The
//! key is handed to the caller once; only its SHA-256 fingerprint is stored.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use a3s_redact::{NewUpload, Pipeline, PipelineOptions};
//! use a3s_redact::session::MemorySessionStore;
//! use a3s_redact::storage::MemoryObjectStore;
//!
//! # async fn example() -> a3s_redact::Result<()> {
//! let pipeline = Pipeline::new(
//!     Arc::new(MemorySessionStore::default()),
//!     Arc::new(MemoryObjectStore::default()),
//!     PipelineOptions::default(),
//! )?;
//!
//! let session = pipeline
//!     .create_session(NewUpload {
//!         filename: "note.txt".into(),
//!         mime_type: Some("text/plain".into()),
//!         bytes: "Contact john@example.com".into(),
//!     })
//!     .await?;
//!
//! let outcome = pipeline.process(&session.id).await?;
//! println!("Encrypted {} value(s)", outcome.pii_count);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **PatternMatcher**: ordered regex rules producing typed matches
//! - **DocumentKey**: AES-256-GCM key with base64 export and fingerprint
//! - **rewriter**: overlap policy, placeholder substitution and restore
//! - **SessionStore** / **ObjectStore**: pluggable persistence
//! - **Pipeline**: drives a session through its status lifecycle
//! - **server**: axum HTTP API over a file-backed pipeline

pub mod cli;
pub mod config;
pub mod crypto;
pub mod detector;
pub mod dirs;
pub mod error;
pub mod pipeline;
pub mod rewriter;
pub mod server;
pub mod session;
pub mod storage;
pub mod types;

pub use config::RedactConfig;
pub use crypto::DocumentKey;
pub use detector::{DetectionRule, PatternMatcher};
pub use error::{RedactError, Result};
pub use pipeline::{Pipeline, PipelineOptions};
pub use rewriter::OverlapPolicy;
pub use session::SessionStore;
pub use storage::ObjectStore;
pub use types::{
    DocumentSession, EncryptedMatch, NewUpload, PiiKind, PiiMatch, ProcessOutcome,
    ProcessingStatus,
};
