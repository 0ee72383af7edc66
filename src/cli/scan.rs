use std::path::Path;

use crate::detector::PatternMatcher;
use crate::error::Result;

/// Execute the `scan` command: print every match found in a file as JSON.
pub fn execute(file: &Path) -> Result<()> {
    let text = read_text(file)?;
    let matches = PatternMatcher::with_default_rules()?.detect(&text);

    println!("{}", serde_json::to_string_pretty(&matches)?);
    tracing::info!(file = %file.display(), matches = matches.len(), "Scan complete");
    Ok(())
}

/// Read a file as text, replacing invalid UTF-8 the same way the pipeline does
pub(crate) fn read_text(file: &Path) -> Result<String> {
    let data = std::fs::read(file)?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}
