//! printquote view command - interactive terminal viewport.

use std::path::Path;

use anyhow::{Context, Result};
use printquote_core::ColorOption;
use printquote_terminal::TerminalApp;
use tracing::info;

use super::{check_color, find_material, load_catalogs, load_draft};
use crate::Cli;

/// The material's colors, rotated so `initial` comes first.
pub fn palette(colors: &[ColorOption], initial: Option<&str>) -> Vec<ColorOption> {
    let start = initial
        .and_then(|name| colors.iter().position(|c| c.name == name))
        .unwrap_or(0);
    let mut palette = colors.to_vec();
    palette.rotate_left(start);
    palette
}

pub fn run(input: &Path, material: Option<&str>, color: Option<&str>, cli: &Cli) -> Result<()> {
    let catalogs = load_catalogs(cli.catalog.as_deref())?;
    let draft = load_draft(input)?;

    let material = match material {
        Some(id) => find_material(&catalogs, id)?,
        None => catalogs.materials.default_material(),
    };
    if let Some(name) = color {
        check_color(material, name)?;
    }

    info!(file = draft.file_name(), material = %material.id, "opening viewport");
    let mut app = TerminalApp::new(draft.model(), palette(&material.colors, color), draft.file_name())
        .context("Failed to query terminal size")?;
    app.run().context("Terminal viewport failed")?;
    Ok(())
}
