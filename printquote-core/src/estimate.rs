//! Price, print time and filament weight estimation.
//!
//! The model is a pure function of the geometry summary, the print
//! parameters and the two catalogs:
//!
//! ```text
//! weight  = volume * s^3 / 1000 * (0.3 + 0.7 * infill) * 1.24
//! price   = max(15, round((10 + weight * price_per_gram * multiplier) * quantity))
//! hours   = max(1, ceil(z * s / layer_height * 0.5 * quantity / 60))
//! ```
//!
//! The base fee sits inside the quantity multiply, so it is charged once per
//! copy. Density is fixed at the PLA value whatever material is selected.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{MaterialCatalog, QualityCatalog};
use crate::model::{round_to, ModelSummary};
use crate::params::{PrintParameters, MAX_INFILL_PERCENT};

/// Per-job fee in currency units.
pub const BASE_FEE: f64 = 10.0;
/// Lowest price ever quoted.
pub const MIN_PRICE: u64 = 15;
/// Lowest print time ever quoted, in hours.
pub const MIN_HOURS: u64 = 1;
/// Reference filament density in g/cm³.
pub const DENSITY_G_PER_CM3: f64 = 1.24;
/// Share of the volume printed even at 0% infill (walls and shells).
pub const SHELL_FACTOR: f64 = 0.3;
/// Printing time per layer, in minutes.
pub const MINUTES_PER_LAYER: f64 = 0.5;

/// Quoted figures for one order line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimateResult {
    /// Total price in currency units, at least [`MIN_PRICE`].
    pub price: u64,
    /// Total print time in whole hours, at least [`MIN_HOURS`].
    pub estimated_hours: u64,
    /// Filament for all copies, in grams to one decimal.
    pub weight_grams: f64,
}

/// Estimate price, time and weight for printing `model` with `params`.
///
/// Never fails: out-of-range parameters are clamped and unknown catalog ids
/// resolve to the catalog defaults.
pub fn estimate(
    model: &ModelSummary,
    params: &PrintParameters,
    materials: &MaterialCatalog,
    qualities: &QualityCatalog,
) -> EstimateResult {
    let params = params.clamped();
    let material = materials.resolve(&params.material_id);
    let quality = qualities.resolve(&params.quality_id);
    let quantity = f64::from(params.quantity);
    let scale = params.scale_factor();

    // Volume scales with the cube of a uniform linear scale
    let scaled_volume_mm3 = model.volume * scale.powi(3);
    let volume_cm3 = scaled_volume_mm3 / 1000.0;
    let infill = f64::from(params.infill_percent) / f64::from(MAX_INFILL_PERCENT);
    let infill_factor = SHELL_FACTOR + infill * (1.0 - SHELL_FACTOR);
    let weight = volume_cm3 * infill_factor * DENSITY_G_PER_CM3;

    let base_price = weight * material.price_per_gram;
    let price = ((BASE_FEE + base_price * quality.time_multiplier) * quantity).round();

    let layers = model.dimensions.z * scale / quality.layer_height_mm;
    let minutes = layers * MINUTES_PER_LAYER * quantity;
    let hours = (minutes / 60.0).ceil();

    // f64::max discards NaN, and the casts saturate
    let result = EstimateResult {
        price: price.max(MIN_PRICE as f64) as u64,
        estimated_hours: hours.max(MIN_HOURS as f64) as u64,
        weight_grams: round_to(weight * quantity, 1),
    };

    debug!(
        material = %material.id,
        quality = %quality.id,
        scale,
        infill = params.infill_percent,
        quantity = params.quantity,
        price = result.price,
        hours = result.estimated_hours,
        weight = result.weight_grams,
        "estimated print"
    );
    result
}
