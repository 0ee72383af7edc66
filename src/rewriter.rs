//! Placeholder substitution
//!
//! Replaces each matched span of the original text with
//! `[ENCRYPTED_PII_<index>:<base64>]`. Edits are applied right-to-left
//! over the untouched original, so every offset (always computed against
//! the original) stays valid while later spans are rewritten.

use std::borrow::Cow;
use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::crypto::{self, DocumentKey};
use crate::error::{RedactError, Result};
use crate::types::{EncryptedMatch, PiiMatch};

/// Literal prefix of every placeholder token
pub const PLACEHOLDER_PREFIX: &str = "[ENCRYPTED_PII_";

/// What to do when detected spans intersect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Fail with [`RedactError::OverlappingMatches`]
    Reject,
    /// Collapse each intersecting group into one match over the union span
    ///
    /// ZIP+4 codes (also SSN-shaped) and unseparated card numbers (which
    /// contain a phone-shaped run) always overlap, so this is the default.
    #[default]
    Merge,
}

/// Render one placeholder token
pub fn placeholder(index: usize, encrypted: &str) -> String {
    format!("{PLACEHOLDER_PREFIX}{index}:{encrypted}]")
}

/// Apply the overlap policy to matches sorted by start offset
///
/// Under `Merge`, the surviving match takes the kind and confidence of the
/// highest-confidence member (the earliest on ties) and its value is the
/// original text of the union span.
pub fn resolve_overlaps(
    text: &str,
    matches: Vec<PiiMatch>,
    policy: OverlapPolicy,
) -> Result<Vec<PiiMatch>> {
    let mut resolved: Vec<PiiMatch> = Vec::with_capacity(matches.len());

    for m in matches {
        let Some(last) = resolved.last_mut() else {
            resolved.push(m);
            continue;
        };
        if !last.overlaps(&m) {
            resolved.push(m);
            continue;
        }

        match policy {
            OverlapPolicy::Reject => {
                return Err(RedactError::OverlappingMatches {
                    first: last.span(),
                    second: m.span(),
                });
            }
            OverlapPolicy::Merge => {
                if m.confidence > last.confidence {
                    last.kind = m.kind;
                    last.confidence = m.confidence;
                }
                last.start = last.start.min(m.start);
                last.end = last.end.max(m.end);
                last.value = text
                    .get(last.start..last.end)
                    .ok_or_else(|| {
                        RedactError::Validation(format!(
                            "Span {}..{} is not a valid range of the document",
                            last.start, last.end
                        ))
                    })?
                    .to_string();
            }
        }
    }

    Ok(resolved)
}

/// Substitute every encrypted match into `text`
///
/// `matches[i]` becomes `[ENCRYPTED_PII_i:<blob>]`. Spans must lie on char
/// boundaries of `text` and must not intersect.
pub fn rewrite(text: &str, matches: &[EncryptedMatch]) -> Result<String> {
    let mut order: Vec<usize> = (0..matches.len()).collect();
    order.sort_by_key(|&i| Reverse(matches[i].start));

    let mut pieces: Vec<Cow<'_, str>> = Vec::with_capacity(matches.len() * 2 + 1);
    let mut tail_start = text.len();
    let mut tail_span = (text.len(), text.len());

    for i in order {
        let m = &matches[i];
        if m.start > m.end || !text.is_char_boundary(m.start) || !text.is_char_boundary(m.end) {
            return Err(RedactError::Validation(format!(
                "Span {}..{} is not a valid range of the document",
                m.start, m.end
            )));
        }
        if m.end > tail_start {
            return Err(RedactError::OverlappingMatches {
                first: (m.start, m.end),
                second: tail_span,
            });
        }

        pieces.push(Cow::Borrowed(&text[m.end..tail_start]));
        pieces.push(Cow::Owned(placeholder(i, &m.encrypted)));
        tail_start = m.start;
        tail_span = (m.start, m.end);
    }
    pieces.push(Cow::Borrowed(&text[..tail_start]));

    Ok(pieces.iter().rev().map(|p| p.as_ref()).collect())
}

/// Encrypt each match under `key` and rewrite the document
///
/// Returns the rewritten text and the encrypted matches in document order.
pub fn encrypt_and_rewrite(
    text: &str,
    matches: Vec<PiiMatch>,
    key: &DocumentKey,
) -> Result<(String, Vec<EncryptedMatch>)> {
    let encrypted = matches
        .into_iter()
        .map(|m| {
            let blob = crypto::encrypt_str(key, &m.value)?;
            Ok(EncryptedMatch::new(m, blob))
        })
        .collect::<Result<Vec<_>>>()?;

    let rewritten = rewrite(text, &encrypted)?;
    Ok((rewritten, encrypted))
}

/// A placeholder token found in a processed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub index: usize,
    pub encrypted: String,
    /// Byte range of the whole token in the processed text
    pub start: usize,
    pub end: usize,
}

/// Locate every placeholder token in a processed document
///
/// Text that starts like a token but is not well formed is skipped.
pub fn parse_placeholders(text: &str) -> Vec<Placeholder> {
    let mut found = Vec::new();
    let mut offset = 0;

    while let Some(pos) = text[offset..].find(PLACEHOLDER_PREFIX) {
        let start = offset + pos;
        let body = start + PLACEHOLDER_PREFIX.len();
        match parse_token(&text[body..]) {
            Some((index, encrypted, len)) => {
                found.push(Placeholder {
                    index,
                    encrypted: encrypted.to_string(),
                    start,
                    end: body + len,
                });
                offset = body + len;
            }
            None => offset = body,
        }
    }

    found
}

/// Parse `<digits>:<base64>]`, returning the index, blob and consumed length
fn parse_token(rest: &str) -> Option<(usize, &str, usize)> {
    let colon = rest.find(':')?;
    let digits = &rest[..colon];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index = digits.parse().ok()?;

    let after = &rest[colon + 1..];
    let close = after.find(']')?;
    let blob = &after[..close];
    let is_base64 = |b: u8| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=');
    if blob.is_empty() || !blob.bytes().all(is_base64) {
        return None;
    }

    Some((index, blob, colon + 1 + close + 1))
}

/// Decrypt every placeholder back to its literal
///
/// Fails with [`RedactError::Integrity`] if any token does not verify.
pub fn restore(text: &str, key: &DocumentKey) -> Result<String> {
    let mut restored = String::with_capacity(text.len());
    let mut cursor = 0;

    for token in parse_placeholders(text) {
        restored.push_str(&text[cursor..token.start]);
        restored.push_str(&crypto::decrypt_str(key, &token.encrypted)?);
        cursor = token.end;
    }
    restored.push_str(&text[cursor..]);

    Ok(restored)
}
