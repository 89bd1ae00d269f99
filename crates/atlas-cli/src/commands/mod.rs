//! Subcommand implementations.

pub mod data;
pub mod import;
pub mod invoke;
pub mod search;
pub mod serve;
pub mod todos;

use std::io::{self, Read};

use anyhow::{Context, Result};

/// Read a file's contents, or stdin for `-`.
pub(crate) fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))
    }
}
