//! Subcommand implementations and the file loading they share.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use printquote_core::{Catalogs, MaterialProfile, OrderDraft};
use tracing::info;

pub mod catalog;
pub mod info;
pub mod quote;
pub mod view;

/// Read and parse a model file into a fresh order draft.
pub fn load_draft(input: &Path) -> Result<OrderDraft> {
    let bytes = fs::read(input).with_context(|| format!("Failed to read {:?}", input))?;
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    OrderDraft::from_upload(&file_name, &bytes).with_context(|| format!("Failed to load model from {:?}", input))
}

/// Built-in catalogs, or the ones in the `--catalog` JSON file.
pub fn load_catalogs(path: Option<&Path>) -> Result<Catalogs> {
    let Some(path) = path else {
        return Ok(Catalogs::builtin());
    };
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read catalog {:?}", path))?;
    let catalogs = Catalogs::from_json(&json).with_context(|| format!("Invalid catalog {:?}", path))?;
    info!(
        materials = catalogs.materials.len(),
        qualities = catalogs.qualities.len(),
        "loaded catalog"
    );
    Ok(catalogs)
}

/// Look up a material by id, listing the valid ids on failure.
pub fn find_material<'a>(catalogs: &'a Catalogs, id: &str) -> Result<&'a MaterialProfile> {
    match catalogs.materials.get(id) {
        Some(material) => Ok(material),
        None => {
            let ids: Vec<&str> = catalogs.materials.iter().map(|m| m.id.as_str()).collect();
            bail!("Unknown material '{}' (available: {})", id, ids.join(", "))
        }
    }
}

/// Check that `name` is stocked in `material`, listing its colors on failure.
pub fn check_color(material: &MaterialProfile, name: &str) -> Result<()> {
    if material.color(name).is_none() {
        let names: Vec<&str> = material.colors.iter().map(|c| c.name.as_str()).collect();
        bail!(
            "Color '{}' is not stocked in {} (available: {})",
            name,
            material.display_name,
            names.join(", ")
        );
    }
    Ok(())
}
