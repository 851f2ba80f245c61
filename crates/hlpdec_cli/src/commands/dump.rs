//! Dump command implementation.

use super::open;
use crate::error::CliError;
use hlpdec_codec::Method;
use hlpdec_core::Config;
use hlpdec_storage::MemoryFile;
use std::path::Path;
use tracing::debug;

/// Largest output buffered when dumping a decompressed stream.
const MAX_EXPANDED: usize = 16 * 1024 * 1024;

/// Formats `data` as hex dump lines: address, 16 hex bytes, then the
/// printable characters.
pub fn hex_dump(data: &[u8]) -> Vec<String> {
    data.chunks(16)
        .enumerate()
        .map(|(row, chunk)| {
            let mut line = format!("{:08X} ", row * 16);
            for byte in chunk {
                line.push_str(&format!("{byte:02X} "));
            }
            for _ in chunk.len()..16 {
                line.push_str("   ");
            }
            line.extend(chunk.iter().map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    char::from(b)
                } else {
                    '.'
                }
            }));
            line
        })
        .collect()
}

/// Runs the dump command.
pub fn run(
    path: &Path,
    config: Config,
    name: &str,
    method: u8,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let method = Method::from_bits(method)?;
    let mut container = open(path, config)?;
    let capacity = limit.unwrap_or(MAX_EXPANDED);

    let data = if method == Method::Copy {
        let mut data = container
            .read_stream(name)?
            .ok_or_else(|| CliError::StreamNotFound(name.to_string()))?;
        data.truncate(capacity);
        data
    } else {
        let mut buf = vec![0u8; capacity];
        let produced = {
            let mut sink = MemoryFile::writer(&mut buf);
            container
                .decompress_stream(name, method, &mut sink)?
                .ok_or_else(|| CliError::StreamNotFound(name.to_string()))?
        };
        buf.truncate(usize::try_from(produced)?);
        buf
    };
    debug!(bytes = data.len(), "dumping {}", name);

    println!("[-Addr-] [--------------------Data---------------------] [-----Text-----]");
    for line in hex_dump(&data) {
        println!("{line}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_line() {
        let lines = hex_dump(b"0123456789ABCDEF");
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0],
            "00000000 30 31 32 33 34 35 36 37 38 39 41 42 43 44 45 46 0123456789ABCDEF"
        );
    }

    #[test]
    fn partial_line_is_padded() {
        let mut data = vec![b'x'; 16];
        data.extend_from_slice(&[0x00, b'a', 0x7F]);
        let lines = hex_dump(&data);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("00000010 00 61 7F "));
        assert!(lines[1].ends_with(".a."));
        assert_eq!(lines[1].len(), lines[0].len() - 13);
    }

    #[test]
    fn empty_input() {
        assert!(hex_dump(&[]).is_empty());
    }
}
