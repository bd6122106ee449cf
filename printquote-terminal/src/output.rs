//! Structured output for `--format json`.

use anyhow::{Context, Result};
use serde::Serialize;

/// Print `value` as pretty JSON on stdout unless `quiet`.
pub fn print_json<T: Serialize>(value: &T, quiet: bool) -> Result<()> {
    if quiet {
        return Ok(());
    }
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
