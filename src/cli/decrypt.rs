use crate::crypto::{self, DocumentKey};
use crate::error::Result;

/// Execute the `decrypt` command: print the cleartext of one blob.
pub fn execute(key: &str, blob: &str) -> Result<()> {
    let key = DocumentKey::import(key)?;
    let plaintext = crypto::decrypt_str(&key, blob.trim())?;
    println!("{plaintext}");
    Ok(())
}
