//! Per-document AES-256-GCM encryption
//!
//! Each document gets one freshly generated key. Every encrypted unit is a
//! self-describing blob: base64(nonce ‖ ciphertext ‖ tag), with a random
//! 96-bit nonce per call, so any single blob decrypts without external state.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{RedactError, Result};

/// Key length in bytes (256 bits)
pub const KEY_LEN: usize = 32;

/// Nonce length in bytes (96 bits)
pub const NONCE_LEN: usize = 12;

/// GCM authentication tag length in bytes
pub const TAG_LEN: usize = 16;

/// A 256-bit AES-GCM key, wiped from memory on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DocumentKey {
    bytes: [u8; KEY_LEN],
}

impl DocumentKey {
    /// Generate a fresh random key
    pub fn generate() -> Self {
        let key = Aes256Gcm::generate_key(&mut OsRng);
        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(key.as_slice());
        Self { bytes }
    }

    /// Build a key from raw bytes
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Portable base64 encoding of the raw key, for one-time disclosure
    pub fn export(&self) -> String {
        BASE64.encode(self.bytes)
    }

    /// Inverse of [`DocumentKey::export`]
    pub fn import(encoded: &str) -> Result<Self> {
        let mut raw = BASE64
            .decode(encoded.trim())
            .map_err(|e| RedactError::Validation(format!("Invalid key encoding: {}", e)))?;
        if raw.len() != KEY_LEN {
            let len = raw.len();
            raw.zeroize();
            return Err(RedactError::Validation(format!(
                "Key must be {} bytes, got {}",
                KEY_LEN, len
            )));
        }
        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&raw);
        raw.zeroize();
        Ok(Self { bytes })
    }

    /// One-way digest of the exported key, safe to persist
    pub fn fingerprint(&self) -> String {
        key_fingerprint(&self.export())
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.bytes))
    }
}

impl std::fmt::Debug for DocumentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DocumentKey(<redacted>)")
    }
}

/// base64 SHA-256 of an exported key string
pub fn key_fingerprint(key_base64: &str) -> String {
    BASE64.encode(Sha256::digest(key_base64.as_bytes()))
}

/// Encrypt `plaintext`, returning base64(nonce ‖ ciphertext ‖ tag)
pub fn encrypt(key: &DocumentKey, plaintext: &[u8]) -> Result<String> {
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = key
        .cipher()
        .encrypt(&nonce, plaintext)
        .map_err(|e| RedactError::Validation(format!("Encryption failed: {}", e)))?;

    let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    combined.extend_from_slice(nonce.as_slice());
    combined.extend_from_slice(&ciphertext);
    Ok(BASE64.encode(combined))
}

/// Encrypt a UTF-8 string
pub fn encrypt_str(key: &DocumentKey, plaintext: &str) -> Result<String> {
    encrypt(key, plaintext.as_bytes())
}

/// Decrypt a blob produced by [`encrypt`]
///
/// Malformed base64, a truncated blob, a wrong key and a failed tag all
/// surface as [`RedactError::Integrity`].
pub fn decrypt(key: &DocumentKey, blob: &str) -> Result<Vec<u8>> {
    let combined = BASE64
        .decode(blob.trim())
        .map_err(|_| RedactError::Integrity)?;
    if combined.len() < NONCE_LEN + TAG_LEN {
        return Err(RedactError::Integrity);
    }

    let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    key.cipher()
        .decrypt(nonce, ciphertext)
        .map_err(|_| RedactError::Integrity)
}

/// Decrypt a blob and decode it as UTF-8
pub fn decrypt_str(key: &DocumentKey, blob: &str) -> Result<String> {
    let plaintext = decrypt(key, blob)?;
    String::from_utf8(plaintext).map_err(|_| RedactError::Integrity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> DocumentKey {
        DocumentKey::from_bytes([0x42; KEY_LEN])
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = DocumentKey::generate();
        let blob = encrypt_str(&key, "john.doe@example.com").unwrap();
        assert_eq!(decrypt_str(&key, &blob).unwrap(), "john.doe@example.com");
    }

    #[test]
    fn test_empty_plaintext() {
        let key = test_key();
        let blob = encrypt(&key, b"").unwrap();
        assert_eq!(BASE64.decode(&blob).unwrap().len(), NONCE_LEN + TAG_LEN);
        assert!(decrypt(&key, &blob).unwrap().is_empty());
    }

    #[test]
    fn test_blob_layout() {
        let key = test_key();
        let blob = encrypt_str(&key, "123-45-6789").unwrap();
        let raw = BASE64.decode(&blob).unwrap();
        assert_eq!(raw.len(), NONCE_LEN + "123-45-6789".len() + TAG_LEN);
    }

    #[test]
    fn test_each_encryption_unique_nonce() {
        let key = test_key();
        let b1 = encrypt_str(&key, "same").unwrap();
        let b2 = encrypt_str(&key, "same").unwrap();

        // Same plaintext should produce different blobs (random nonce)
        assert_ne!(b1, b2);
        assert_ne!(
            BASE64.decode(&b1).unwrap()[..NONCE_LEN],
            BASE64.decode(&b2).unwrap()[..NONCE_LEN]
        );
        assert_eq!(decrypt_str(&key, &b1).unwrap(), "same");
        assert_eq!(decrypt_str(&key, &b2).unwrap(), "same");
    }

    #[test]
    fn test_decrypt_with_wrong_key_fails() {
        let blob = encrypt_str(&DocumentKey::generate(), "secret").unwrap();
        let result = decrypt(&DocumentKey::generate(), &blob);
        assert!(matches!(result, Err(RedactError::Integrity)));
    }

    #[test]
    fn test_every_bit_flip_detected() {
        let key = test_key();
        let blob = encrypt_str(&key, "555-123-4567").unwrap();
        let raw = BASE64.decode(&blob).unwrap();

        for byte in 0..raw.len() {
            for bit in 0..8 {
                let mut tampered = raw.clone();
                tampered[byte] ^= 1 << bit;
                let result = decrypt(&key, &BASE64.encode(&tampered));
                assert!(
                    matches!(result, Err(RedactError::Integrity)),
                    "flip at byte {byte} bit {bit} went undetected"
                );
            }
        }
    }

    #[test]
    fn test_truncated_blob_fails() {
        let key = test_key();
        let short = BASE64.encode([0u8; NONCE_LEN + TAG_LEN - 1]);
        assert!(matches!(decrypt(&key, &short), Err(RedactError::Integrity)));
    }

    #[test]
    fn test_malformed_base64_fails() {
        assert!(matches!(
            decrypt(&test_key(), "not base64!!"),
            Err(RedactError::Integrity)
        ));
    }

    #[test]
    fn test_export_import_roundtrip() {
        let key = DocumentKey::generate();
        let exported = key.export();
        assert_eq!(BASE64.decode(&exported).unwrap().len(), KEY_LEN);

        let imported = DocumentKey::import(&exported).unwrap();
        let blob = encrypt_str(&key, "payload").unwrap();
        assert_eq!(decrypt_str(&imported, &blob).unwrap(), "payload");
    }

    #[test]
    fn test_import_rejects_wrong_length() {
        let err = DocumentKey::import(&BASE64.encode([1u8; 16])).unwrap_err();
        assert!(matches!(err, RedactError::Validation(_)));
        assert!(DocumentKey::import("%%%").is_err());
    }

    #[test]
    fn test_fingerprint_is_stable_and_not_the_key() {
        let key = test_key();
        let exported = key.export();
        assert_eq!(key.fingerprint(), key_fingerprint(&exported));
        assert_ne!(key.fingerprint(), exported);
        assert_eq!(BASE64.decode(key.fingerprint()).unwrap().len(), 32);
    }

    #[test]
    fn test_debug_hides_key_material() {
        let key = test_key();
        let debug = format!("{:?}", key);
        assert!(!debug.contains(&key.export()));
    }
}
