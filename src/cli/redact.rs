use std::path::{Path, PathBuf};

use crate::config::RedactConfig;
use crate::crypto::DocumentKey;
use crate::detector::PatternMatcher;
use crate::error::Result;
use crate::rewriter::{self, OverlapPolicy};

/// Execute the `redact` command: encrypt every match and write the result.
///
/// The key is printed to stderr once and never written to disk.
pub fn execute(file: &Path, out: Option<&Path>) -> Result<()> {
    let config = RedactConfig::load()?;
    let out = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(file));

    let text = super::scan::read_text(file)?;
    let Some((processed, key, count)) = redact_text(&text, config.overlap_policy)? else {
        println!("No PII found in {}; nothing written", file.display());
        return Ok(());
    };

    std::fs::write(&out, processed)?;
    println!("Encrypted {} match(es) -> {}", count, out.display());
    eprintln!("Key (shown once, store it safely): {}", key.export());
    Ok(())
}

/// Detect and encrypt; `None` when the text holds no PII
fn redact_text(text: &str, policy: OverlapPolicy) -> Result<Option<(String, DocumentKey, usize)>> {
    let matches = PatternMatcher::with_default_rules()?.detect(text);
    if matches.is_empty() {
        return Ok(None);
    }
    let matches = rewriter::resolve_overlaps(text, matches, policy)?;
    let key = DocumentKey::generate();
    let (processed, encrypted) = rewriter::encrypt_and_rewrite(text, matches, &key)?;
    Ok(Some((processed, key, encrypted.len())))
}

fn default_output(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_owned();
    name.push(".redacted");
    PathBuf::from(name)
}
