//! Extract command implementation.

use super::open;
use crate::error::CliError;
use hlpdec_codec::Method;
use hlpdec_core::{extract_to_path, Config};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default output file name for a stream: its name without `|` markers.
pub fn default_output(name: &str) -> PathBuf {
    let trimmed: String = name.chars().filter(|&c| c != '|').collect();
    if trimmed.is_empty() {
        PathBuf::from("stream.bin")
    } else {
        PathBuf::from(trimmed)
    }
}

/// Runs the extract command.
pub fn run(
    path: &Path,
    config: Config,
    name: &str,
    output: Option<PathBuf>,
    method: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let method = Method::from_bits(method)?;
    let output = output.unwrap_or_else(|| default_output(name));
    info!("Extracting {} from {:?} ({:?})", name, path, method);
    let mut container = open(path, config)?;

    let written = extract_to_path(&mut container, name, method, &output)?
        .ok_or_else(|| CliError::StreamNotFound(name.to_string()))?;

    println!("Extracted {name} to {} ({written} bytes)", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_strips_markers() {
        assert_eq!(default_output("|SYSTEM"), PathBuf::from("SYSTEM"));
        assert_eq!(default_output("bm0"), PathBuf::from("bm0"));
        assert_eq!(default_output("|"), PathBuf::from("stream.bin"));
    }
}
