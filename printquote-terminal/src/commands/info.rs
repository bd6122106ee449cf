//! printquote info command - display model geometry.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use printquote_core::Dimensions;
use serde::Serialize;

use super::load_draft;
use crate::{output, Cli, OutputFormat};

#[derive(Serialize)]
struct ModelInfo<'a> {
    path: String,
    file_size: &'a str,
    triangles: usize,
    dimensions: Dimensions,
    volume: f64,
}

pub fn run(input: &Path, cli: &Cli) -> Result<()> {
    let draft = load_draft(input)?;
    let model = draft.model();

    let info = ModelInfo {
        path: input.display().to_string(),
        file_size: draft.file_size(),
        triangles: model.triangle_count(),
        dimensions: model.dimensions(),
        volume: model.volume(),
    };

    match cli.format {
        OutputFormat::Json => output::print_json(&info, cli.quiet)?,
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "Model Information".bold().underline());
                println!("  {}: {}", "File".cyan(), info.path);
                println!("  {}: {}", "Size".cyan(), info.file_size);
                println!("  {}: {}", "Triangles".cyan(), info.triangles);
                println!(
                    "  {}: {:.2} x {:.2} x {:.2} mm",
                    "Dimensions".cyan(),
                    info.dimensions.x,
                    info.dimensions.y,
                    info.dimensions.z
                );
                println!("  {}: {:.0} mm³", "Volume".cyan(), info.volume);
                if model.is_empty() {
                    println!("  {}", "Model has no triangles".yellow());
                }
            }
        }
    }

    Ok(())
}
