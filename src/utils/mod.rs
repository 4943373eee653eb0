//! Utilities (source file input, unicode helpers).

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{bail, Result};

pub mod unicode;

/// Read Meow source from `file_path`, or from stdin when it is "-".
/// Accepts .nyan files and files without an extension.
pub fn read_source(file_path: &str) -> Result<String> {
    if file_path == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }

    let path = Path::new(file_path);

    if !path.exists() {
        bail!("Source file '{}' does not exist", file_path);
    }

    if !path.is_file() {
        bail!("'{}' is not a file", file_path);
    }

    let extension = path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "nyan" | "meow" | "txt" | "" => fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read file '{}': {}", file_path, e)),
        _ => {
            bail!("Unsupported file type: .{}\nCurrently supported: .nyan, .meow, .txt, and files without extension", extension);
        }
    }
}
