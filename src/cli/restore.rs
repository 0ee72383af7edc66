use std::path::Path;

use crate::crypto::DocumentKey;
use crate::error::Result;
use crate::rewriter;

/// Execute the `restore` command: write the fully decrypted document to stdout.
pub fn execute(key: &str, file: &Path) -> Result<()> {
    let key = DocumentKey::import(key)?;
    let text = super::scan::read_text(file)?;
    let placeholders = rewriter::parse_placeholders(&text).len();
    let restored = rewriter::restore(&text, &key)?;

    print!("{restored}");
    tracing::debug!(placeholders, file = %file.display(), "Document restored");
    Ok(())
}
