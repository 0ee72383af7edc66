use std::path::PathBuf;

/// Returns the base directory for redaction data.
///
/// Uses `$A3S_REDACT_HOME` if set, otherwise defaults to `~/.a3s/redact`.
pub fn redact_home() -> PathBuf {
    if let Ok(home) = std::env::var("A3S_REDACT_HOME") {
        return PathBuf::from(home);
    }

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".a3s")
        .join("redact")
}

/// Returns the path to the user configuration file.
pub fn config_path() -> PathBuf {
    redact_home().join("config.toml")
}

/// Directory holding one JSON record per document session.
pub fn sessions_dir(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("sessions")
}

/// Root of the object store (uploads and processed artifacts).
pub fn objects_dir(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("objects")
}

/// Ensure all required directories exist.
pub fn ensure_dirs(data_dir: &std::path::Path) -> std::io::Result<()> {
    std::fs::create_dir_all(sessions_dir(data_dir))?;
    std::fs::create_dir_all(objects_dir(data_dir))?;
    Ok(())
}
