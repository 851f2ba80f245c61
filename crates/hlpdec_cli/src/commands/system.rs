//! System command implementation.

use super::{open, Format};
use crate::error::CliError;
use hlpdec_core::{Config, SystemInfo};
use serde::Serialize;
use std::path::Path;

/// One `|SYSTEM` record.
#[derive(Debug, Serialize)]
pub struct RecordSummary {
    /// Record type.
    pub record_type: u16,
    /// Data size in bytes.
    pub size: usize,
    /// Text of string records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// `|SYSTEM` summary.
#[derive(Debug, Serialize)]
pub struct SystemResult {
    /// Format minor version.
    pub minor: u16,
    /// Format major version.
    pub major: u16,
    /// Generation time (Unix seconds).
    pub gen_date: u32,
    /// Compression flags.
    pub flags: u16,
    /// Bytes per `|TOPIC` block.
    pub topic_block_size: u32,
    /// Whether topic blocks are LZ77 compressed.
    pub topic_compressed: bool,
    /// Help title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Records in stored order.
    pub records: Vec<RecordSummary>,
}

impl From<&SystemInfo> for SystemResult {
    fn from(info: &SystemInfo) -> Self {
        let layout = info.header.topic_layout();
        Self {
            minor: info.header.minor,
            major: info.header.major,
            gen_date: info.header.gen_date,
            flags: info.header.flags,
            topic_block_size: layout.block_size,
            topic_compressed: layout.compressed,
            title: info.title(),
            records: info
                .records
                .iter()
                .map(|record| RecordSummary {
                    record_type: record.record_type,
                    size: record.data.len(),
                    text: record.text(),
                })
                .collect(),
        }
    }
}

/// Runs the system command.
pub fn run(path: &Path, config: Config, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let format = Format::parse(format)?;
    let mut container = open(path, config)?;
    let info = container.system()?.ok_or(CliError::NoSystemStream)?;
    let result = SystemResult::from(&info);

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        Format::Text => print_text_output(&result),
    }

    Ok(())
}

fn print_text_output(result: &SystemResult) {
    println!("Help file version {}.{}", result.major, result.minor);
    if let Some(title) = &result.title {
        println!("Title:      {title}");
    }
    println!("Generated:  {}", result.gen_date);
    println!("Flags:      0x{:04X}", result.flags);
    println!(
        "Topics:     {} byte blocks, {}",
        result.topic_block_size,
        if result.topic_compressed {
            "LZ77 compressed"
        } else {
            "uncompressed"
        }
    );

    if !result.records.is_empty() {
        println!();
        println!("Records:");
        for record in &result.records {
            match &record.text {
                Some(text) => println!("  [{:2}] {text}", record.record_type),
                None => println!("  [{:2}] {} bytes", record.record_type, record.size),
            }
        }
    }
}
