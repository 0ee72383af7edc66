pub mod decrypt;
pub mod redact;
pub mod restore;
pub mod scan;
pub mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// A3S Redact - PII detection and field-level encryption for documents
#[derive(Debug, Parser)]
#[command(name = "a3s-redact", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host address to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// List the PII found in a file without changing it
    Scan {
        /// Text file to scan
        file: PathBuf,
    },

    /// Encrypt every PII match in a file and write the rewritten document
    Redact {
        /// Text file to redact
        file: PathBuf,

        /// Output path (default: <file>.redacted)
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// Decrypt a single encrypted blob
    Decrypt {
        /// Base64 document key
        #[arg(long)]
        key: String,

        /// Base64 blob (nonce, ciphertext and tag)
        blob: String,
    },

    /// Replace every placeholder in a redacted file with its cleartext
    Restore {
        /// Base64 document key
        #[arg(long)]
        key: String,

        /// Redacted file
        file: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_redact() {
        let cli = Cli::try_parse_from(["a3s-redact", "redact", "in.txt", "--out", "out.txt"]).unwrap();
        match cli.command {
            Commands::Redact { file, out } => {
                assert_eq!(file, PathBuf::from("in.txt"));
                assert_eq!(out, Some(PathBuf::from("out.txt")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["a3s-redact", "serve"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Serve {
                host: None,
                port: None
            }
        ));
    }

    #[test]
    fn test_decrypt_requires_key() {
        assert!(Cli::try_parse_from(["a3s-redact", "decrypt", "blob"]).is_err());
    }
}
