//! CLI command implementations.

pub mod dump;
pub mod extract;
pub mod list;
pub mod system;

use crate::error::CliError;
use hlpdec_core::{Config, Container, CoreResult};
use hlpdec_storage::DiskFile;
use std::path::Path;

/// How a command prints its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl Format {
    /// Parses a `--format` value.
    pub fn parse(value: &str) -> Result<Self, CliError> {
        match value {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(CliError::UnknownFormat(other.to_string())),
        }
    }
}

/// Opens the help file at `path`.
pub fn open(path: &Path, config: Config) -> CoreResult<Container<DiskFile>> {
    Container::open_with_config(DiskFile::open(path)?, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn format_names() {
        assert_eq!(Format::parse("text").unwrap(), Format::Text);
        assert_eq!(Format::parse("json").unwrap(), Format::Json);
        assert!(matches!(Format::parse("xml"), Err(CliError::UnknownFormat(_))));
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(open(&dir.path().join("missing.hlp"), Config::default()).is_err());
    }

    #[test]
    fn open_rejects_non_help_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"MZ this is not a help file").unwrap();
        file.flush().unwrap();
        let err = open(file.path(), Config::default()).unwrap_err();
        assert!(matches!(err, hlpdec_core::CoreError::InvalidFormat { .. }));
    }
}
