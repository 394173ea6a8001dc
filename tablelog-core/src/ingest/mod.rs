//! Ingestion layer for exported chat-log HTML
//!
//! Turns a raw log file into an ordered list of [`Statement`]s. Parsed
//! content is never cached: every call reads and parses the file again.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌───────────┐     ┌───────────────┐     ┌───────────┐
//! │  .html file │ ──► │ Tokenizer │ ──► │ LogHtmlParser │ ──► │ ParsedLog │
//! └─────────────┘     └───────────┘     └───────────────┘     └───────────┘
//!                      open/text/close    Idle / InParagraph
//!                      events             / InSpan(n)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tablelog_core::ingest;
//!
//! let parsed = ingest::parse_file(Path::new("/logs/session.html"))?;
//! for statement in &parsed.statements {
//!     println!("[{}] {}: {}", statement.tab, statement.speaker, statement.content);
//! }
//! ```
//!
//! [`Statement`]: crate::types::Statement

mod parser;
mod source;
mod status;
pub mod tokenizer;

pub use parser::{LogHtmlParser, ParsedLog, ParserState};
pub use source::{GlobFileSource, LogFileSource};
pub use status::StatusChange;

use crate::error::{Error, Result};
use std::path::Path;

/// Read and parse one log file.
///
/// Invalid UTF-8 is replaced rather than rejected.
pub fn parse_file(path: &Path) -> Result<ParsedLog> {
    let bytes = std::fs::read(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to open {}: {}", path.display(), e),
        ))
    })?;
    let html = String::from_utf8_lossy(&bytes);
    let parsed = LogHtmlParser::parse(&html);

    tracing::debug!(
        path = %path.display(),
        statements = parsed.statements.len(),
        tabs = parsed.tabs.len(),
        "Parsed log file"
    );
    for warning in &parsed.warnings {
        tracing::warn!(path = %path.display(), warning = %warning, "Log file anomaly");
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.html");
        std::fs::write(
            &path,
            "<p style=\"color:#445566;\"><span>[main]</span><span>GM</span><span>Start</span></p>",
        )
        .unwrap();

        let parsed = parse_file(&path).unwrap();
        assert_eq!(parsed.statements.len(), 1);
        assert_eq!(parsed.statements[0].color, "#445566");
    }

    #[test]
    fn test_parse_file_tolerates_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.html");
        let mut bytes = b"<p><span>[main]</span><span>GM</span><span>a".to_vec();
        bytes.push(0xff);
        bytes.extend_from_slice(b"b</span></p>");
        std::fs::write(&path, bytes).unwrap();

        let parsed = parse_file(&path).unwrap();
        assert_eq!(parsed.statements[0].content, "a\u{fffd}b");
    }

    #[test]
    fn test_parse_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = parse_file(&dir.path().join("missing.html")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
