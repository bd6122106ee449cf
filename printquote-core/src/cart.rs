//! Frozen order lines and the cart that collects them.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::estimate::EstimateResult;
use crate::model::ModelSummary;
use crate::params::PrintParameters;

/// A model, its parameters and its quote, captured at add-to-cart time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: Uuid,
    pub file_name: String,
    pub file_size: String,
    pub model: ModelSummary,
    pub params: PrintParameters,
    pub material_name: String,
    pub quality_name: String,
    pub estimate: EstimateResult,
}

impl CartLine {
    pub fn new(
        file_name: &str,
        file_size: &str,
        model: ModelSummary,
        material_name: String,
        quality_name: String,
        estimate: EstimateResult,
        params: PrintParameters,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.to_string(),
            file_size: file_size.to_string(),
            model,
            params,
            material_name,
            quality_name,
            estimate,
        }
    }
}

/// Ordered list of cart lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line and return its id.
    pub fn add(&mut self, line: CartLine) -> Uuid {
        let id = line.id;
        info!(%id, file = %line.file_name, price = line.estimate.price, "added to cart");
        self.lines.push(line);
        id
    }

    pub fn remove(&mut self, id: Uuid) -> Option<CartLine> {
        let index = self.lines.iter().position(|l| l.id == id)?;
        info!(%id, "removed from cart");
        Some(self.lines.remove(index))
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of line prices.
    pub fn total_price(&self) -> u64 {
        self.lines.iter().map(|l| l.estimate.price).sum()
    }

    /// Longest line print time; lines print on separate machines.
    pub fn total_hours(&self) -> u64 {
        self.lines
            .iter()
            .map(|l| l.estimate.estimated_hours)
            .max()
            .unwrap_or(0)
    }
}
