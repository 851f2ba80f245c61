//! List command implementation.

use super::{open, Format};
use hlpdec_core::Config;
use serde::Serialize;
use std::path::Path;

/// One listed stream.
#[derive(Debug, Serialize)]
pub struct ListedStream {
    /// Stream name.
    pub name: String,
    /// Offset of the stream header.
    pub offset: u32,
}

/// Directory listing result.
#[derive(Debug, Serialize)]
pub struct ListResult {
    /// Help file path.
    pub path: String,
    /// Container size from its header.
    pub file_size: u32,
    /// Streams in directory order.
    pub streams: Vec<ListedStream>,
}

/// Runs the list command.
pub fn run(path: &Path, config: Config, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let format = Format::parse(format)?;
    let mut container = open(path, config)?;

    let streams = container
        .entries()?
        .into_iter()
        .map(|entry| ListedStream {
            name: entry.name_lossy().into_owned(),
            offset: entry.offset,
        })
        .collect();

    let result = ListResult {
        path: path.display().to_string(),
        file_size: container.header().file_size,
        streams,
    };

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        Format::Text => print_text_output(&result),
    }

    Ok(())
}

fn print_text_output(result: &ListResult) {
    println!("FileName                FileOffset | FileName                FileOffset");
    println!("-----------------------------------+-----------------------------------");
    for pair in result.streams.chunks(2) {
        let left = format!("{:<23} 0x{:08X}", pair[0].name, pair[0].offset);
        match pair.get(1) {
            Some(right) => println!("{left} | {:<23} 0x{:08X}", right.name, right.offset),
            None => println!("{left}"),
        }
    }
}
