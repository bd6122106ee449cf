//! printquote catalog command - list materials and qualities.

use anyhow::{Context, Result};
use colored::Colorize;
use printquote_core::catalog::INFILL_PRESETS;

use super::load_catalogs;
use crate::{Cli, OutputFormat};

pub fn run(cli: &Cli) -> Result<()> {
    let catalogs = load_catalogs(cli.catalog.as_deref())?;

    match cli.format {
        OutputFormat::Json => {
            if !cli.quiet {
                println!("{}", catalogs.to_json().context("Failed to serialize catalog")?);
            }
        }
        OutputFormat::Text => {
            if cli.quiet {
                return Ok(());
            }
            let default_material = &catalogs.materials.default_material().id;
            println!("{}", "Materials".bold().underline());
            for m in catalogs.materials.iter() {
                let marker = if &m.id == default_material { "*" } else { " " };
                println!(
                    " {} {:<10} {:<16} {:.2}/g  {}",
                    marker,
                    m.id.cyan(),
                    m.display_name,
                    m.price_per_gram,
                    m.description.dimmed()
                );
                let colors: Vec<&str> = m.colors.iter().map(|c| c.name.as_str()).collect();
                println!("     {}: {}", "Colors".dimmed(), colors.join(", "));
            }

            let default_quality = &catalogs.qualities.default_quality().id;
            println!();
            println!("{}", "Qualities".bold().underline());
            for q in catalogs.qualities.iter() {
                let marker = if &q.id == default_quality { "*" } else { " " };
                println!(
                    " {} {:<10} {:<10} {:.2} mm  x{:.1} time",
                    marker,
                    q.id.cyan(),
                    q.display_name,
                    q.layer_height_mm,
                    q.time_multiplier
                );
            }

            println!();
            println!("{}", "Infill presets".bold().underline());
            let presets: Vec<String> = INFILL_PRESETS
                .iter()
                .map(|p| format!("{}% ({})", p.percent, p.label))
                .collect();
            println!("   {}", presets.join(", "));
        }
    }

    Ok(())
}
