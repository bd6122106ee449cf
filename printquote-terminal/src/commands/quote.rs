//! printquote quote command - price a model with chosen print parameters.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use printquote_core::{Catalogs, OrderDraft};

use super::{check_color, find_material, load_catalogs, load_draft};
use crate::{output, Cli, OutputFormat};

/// Parameters given on the command line; `None` keeps the default.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides<'a> {
    pub material: Option<&'a str>,
    pub color: Option<&'a str>,
    pub quality: Option<&'a str>,
    pub infill: Option<u32>,
    pub scale: Option<u32>,
    pub quantity: Option<u32>,
}

/// Apply `overrides` to the draft's parameters, rejecting unknown ids.
pub fn apply(draft: &mut OrderDraft, catalogs: &Catalogs, overrides: Overrides<'_>) -> Result<()> {
    let material = match overrides.material {
        Some(id) => {
            let material = find_material(catalogs, id)?;
            draft.params.select_material(material);
            material
        }
        None => catalogs.materials.resolve(&draft.params.material_id),
    };

    if let Some(name) = overrides.color {
        check_color(material, name)?;
        draft.params.select_color(material, name);
    }

    if let Some(id) = overrides.quality {
        if catalogs.qualities.get(id).is_none() {
            let ids: Vec<&str> = catalogs.qualities.iter().map(|q| q.id.as_str()).collect();
            anyhow::bail!("Unknown quality '{}' (available: {})", id, ids.join(", "));
        }
        draft.params.select_quality(id);
    }

    if let Some(infill) = overrides.infill {
        draft.params.set_infill(infill);
    }
    if let Some(scale) = overrides.scale {
        draft.params.set_scale(scale);
    }
    if let Some(quantity) = overrides.quantity {
        draft.params.set_quantity(quantity);
    }
    Ok(())
}

pub fn run(input: &Path, overrides: Overrides<'_>, cli: &Cli) -> Result<()> {
    let catalogs = load_catalogs(cli.catalog.as_deref())?;
    let mut draft = load_draft(input)?;
    apply(&mut draft, &catalogs, overrides)?;

    let line = draft.freeze(&catalogs);

    match cli.format {
        OutputFormat::Json => output::print_json(&line, cli.quiet)?,
        OutputFormat::Text => {
            if !cli.quiet {
                let d = line.model.dimensions;
                let p = &line.params;
                println!("{}", "Print Quote".bold().underline());
                println!("  {}: {} ({})", "File".cyan(), line.file_name, line.file_size);
                println!("  {}: {:.2} x {:.2} x {:.2} mm", "Dimensions".cyan(), d.x, d.y, d.z);
                println!("  {}: {:.0} mm³", "Volume".cyan(), line.model.volume);
                println!("  {}: {} / {}", "Material".cyan(), line.material_name, p.color_name);
                println!("  {}: {}", "Quality".cyan(), line.quality_name);
                println!(
                    "  {}: {}%   {}: {}%   {}: {}",
                    "Infill".cyan(),
                    p.infill_percent,
                    "Scale".cyan(),
                    p.scale_percent,
                    "Quantity".cyan(),
                    p.quantity
                );
                println!();
                println!("  {}: {}", "Price".green().bold(), line.estimate.price);
                println!("  {}: ~{} h", "Print time".green(), line.estimate.estimated_hours);
                println!("  {}: {:.1} g", "Weight".green(), line.estimate.weight_grams);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use printquote_core::ParsedModel;

    fn draft() -> OrderDraft {
        OrderDraft::new("part.stl", 1024, ParsedModel::from_points(Vec::new()))
    }

    #[test]
    fn test_overrides_update_params() {
        let catalogs = Catalogs::builtin();
        let mut draft = draft();
        let overrides = Overrides {
            material: Some("silk"),
            color: Some("Copper"),
            quality: Some("high"),
            infill: Some(50),
            scale: Some(150),
            quantity: Some(4),
        };
        apply(&mut draft, &catalogs, overrides).unwrap();

        let p = &draft.params;
        assert_eq!(p.material_id, "silk");
        assert_eq!(p.color_name, "Copper");
        assert_eq!(p.quality_id, "high");
        assert_eq!((p.infill_percent, p.scale_percent, p.quantity), (50, 150, 4));
    }

    #[test]
    fn test_material_resets_color() {
        let catalogs = Catalogs::builtin();
        let mut draft = draft();
        let overrides = Overrides {
            material: Some("petg"),
            ..Overrides::default()
        };
        apply(&mut draft, &catalogs, overrides).unwrap();
        assert_eq!(draft.params.color_name, "Clear");
    }

    #[test]
    fn test_unknown_ids_are_rejected() {
        let catalogs = Catalogs::builtin();
        let mut draft = draft();

        let err = apply(
            &mut draft,
            &catalogs,
            Overrides {
                material: Some("wood"),
                ..Overrides::default()
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("petg"));

        let err = apply(
            &mut draft,
            &catalogs,
            Overrides {
                color: Some("Gold"),
                ..Overrides::default()
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("Gold"));

        assert!(apply(
            &mut draft,
            &catalogs,
            Overrides {
                quality: Some("insane"),
                ..Overrides::default()
            },
        )
        .is_err());
    }
}
