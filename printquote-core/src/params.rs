//! User-editable print parameters.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::MaterialProfile;

/// Smallest accepted uniform scale, in percent.
pub const MIN_SCALE_PERCENT: u32 = 25;
/// Largest accepted uniform scale, in percent.
pub const MAX_SCALE_PERCENT: u32 = 300;
/// Increment used by the scale slider.
pub const SCALE_STEP_PERCENT: u32 = 5;
/// Fully solid infill.
pub const MAX_INFILL_PERCENT: u32 = 100;

/// Working print configuration, edited between upload and add-to-cart.
///
/// Fields are public so hosts can deserialize or set them directly; the
/// estimator clamps out-of-range values instead of rejecting them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintParameters {
    pub material_id: String,
    pub color_name: String,
    pub color_code: String,
    pub quality_id: String,
    pub infill_percent: u32,
    pub scale_percent: u32,
    pub quantity: u32,
}

impl Default for PrintParameters {
    fn default() -> Self {
        Self {
            material_id: "pla".to_string(),
            color_name: "White".to_string(),
            color_code: "#FFFFFF".to_string(),
            quality_id: "standard".to_string(),
            infill_percent: 20,
            scale_percent: 100,
            quantity: 1,
        }
    }
}

impl PrintParameters {
    /// Switch material and reset the color to its first stocked color.
    pub fn select_material(&mut self, material: &MaterialProfile) {
        self.material_id = material.id.clone();
        if let Some(color) = material.default_color() {
            self.color_name = color.name.clone();
            self.color_code = color.hex_code.clone();
        }
        debug!(material = %self.material_id, color = %self.color_name, "selected material");
    }

    /// Pick a color by name from `material`; returns `false` if it is not stocked.
    pub fn select_color(&mut self, material: &MaterialProfile, name: &str) -> bool {
        match material.color(name) {
            Some(color) => {
                self.color_name = color.name.clone();
                self.color_code = color.hex_code.clone();
                true
            }
            None => false,
        }
    }

    pub fn select_quality(&mut self, quality_id: &str) {
        self.quality_id = quality_id.to_string();
    }

    pub fn set_infill(&mut self, percent: u32) {
        self.infill_percent = percent.min(MAX_INFILL_PERCENT);
    }

    pub fn set_scale(&mut self, percent: u32) {
        self.scale_percent = percent.clamp(MIN_SCALE_PERCENT, MAX_SCALE_PERCENT);
    }

    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity.max(1);
    }

    pub fn increment_quantity(&mut self) {
        self.quantity = self.quantity.saturating_add(1);
    }

    pub fn decrement_quantity(&mut self) {
        self.quantity = self.quantity.saturating_sub(1).max(1);
    }

    /// Copy with every numeric field forced into its accepted range.
    #[must_use]
    pub fn clamped(&self) -> Self {
        let mut out = self.clone();
        out.set_infill(self.infill_percent);
        out.set_scale(self.scale_percent);
        out.set_quantity(self.quantity);
        if out != *self {
            warn!(
                infill = self.infill_percent,
                scale = self.scale_percent,
                quantity = self.quantity,
                "print parameters out of range, clamping"
            );
        }
        out
    }

    /// Linear scale factor (1.0 at 100%).
    #[must_use]
    pub fn scale_factor(&self) -> f64 {
        f64::from(self.scale_percent) / 100.0
    }
}
