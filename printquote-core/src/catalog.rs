//! Material and print-quality reference tables.
//!
//! Catalogs are built once at startup, either from the built-in tables or
//! from a JSON document, and are read-only afterwards. Every lookup falls
//! back to the catalog's default entry, so pricing never fails on an
//! unknown id.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CatalogError;

/// A named color a material is stocked in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorOption {
    /// Display name.
    pub name: String,
    /// CSS-style `#RRGGBB` code.
    pub hex_code: String,
}

impl ColorOption {
    fn new(name: &str, hex_code: &str) -> Self {
        Self {
            name: name.to_string(),
            hex_code: hex_code.to_string(),
        }
    }
}

/// A printable material and its price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialProfile {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    /// Price in currency units per gram of filament.
    pub price_per_gram: f64,
    /// Stocked colors; the first is selected when the material is picked.
    pub colors: Vec<ColorOption>,
}

impl MaterialProfile {
    /// Look up a stocked color by name.
    #[must_use]
    pub fn color(&self, name: &str) -> Option<&ColorOption> {
        self.colors.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn default_color(&self) -> Option<&ColorOption> {
        self.colors.first()
    }
}

/// A layer-height preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityProfile {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub layer_height_mm: f64,
    /// Multiplier on the material price; finer layers cost more machine time.
    pub time_multiplier: f64,
}

/// An infill choice offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfillPreset {
    pub percent: u32,
    pub label: &'static str,
}

/// Infill percentages offered by the order form.
pub const INFILL_PRESETS: [InfillPreset; 5] = [
    InfillPreset { percent: 10, label: "Light" },
    InfillPreset { percent: 20, label: "Standard" },
    InfillPreset { percent: 50, label: "Strong" },
    InfillPreset { percent: 80, label: "Very strong" },
    InfillPreset { percent: 100, label: "Solid" },
];

/// Materials offered for printing.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialCatalog {
    materials: Vec<MaterialProfile>,
    default_index: usize,
}

impl MaterialCatalog {
    /// Build a catalog, checking ids are unique, prices are usable and the
    /// default exists.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] describing the first problem found.
    pub fn new(materials: Vec<MaterialProfile>, default_id: &str) -> Result<Self, CatalogError> {
        const TABLE: &str = "material";
        check_ids(TABLE, materials.iter().map(|m| m.id.as_str()))?;
        for m in &materials {
            if !m.price_per_gram.is_finite() || m.price_per_gram < 0.0 {
                return Err(invalid(TABLE, &m.id, "price per gram must be finite and non-negative"));
            }
            if m.colors.is_empty() {
                return Err(invalid(TABLE, &m.id, "at least one color is required"));
            }
        }
        let default_index = default_position(TABLE, materials.iter().map(|m| m.id.as_str()), default_id)?;
        Ok(Self {
            materials,
            default_index,
        })
    }

    /// The six filaments offered by the shop.
    #[must_use]
    pub fn builtin() -> Self {
        let material = |id: &str, name: &str, description: &str, price: f64, colors: &[(&str, &str)]| {
            MaterialProfile {
                id: id.to_string(),
                display_name: name.to_string(),
                description: description.to_string(),
                price_per_gram: price,
                colors: colors.iter().map(|(n, h)| ColorOption::new(n, h)).collect(),
            }
        };

        let materials = vec![
            material(
                "pla",
                "PLA",
                "Most popular, easy to print, eco-friendly",
                0.15,
                &[
                    ("White", "#FFFFFF"),
                    ("Black", "#1a1a1a"),
                    ("Red", "#ef4444"),
                    ("Blue", "#3b82f6"),
                    ("Green", "#22c55e"),
                    ("Yellow", "#eab308"),
                    ("Orange", "#f97316"),
                    ("Purple", "#a855f7"),
                    ("Pink", "#ec4899"),
                    ("Grey", "#6b7280"),
                ],
            ),
            material(
                "pla-plus",
                "PLA+",
                "Stronger, impact resistant",
                0.20,
                &[
                    ("White", "#FFFFFF"),
                    ("Black", "#1a1a1a"),
                    ("Red", "#ef4444"),
                    ("Blue", "#3b82f6"),
                    ("Green", "#22c55e"),
                    ("Grey", "#6b7280"),
                ],
            ),
            material(
                "petg",
                "PETG",
                "Waterproof, chemically resistant",
                0.25,
                &[
                    ("Clear", "#e0f2fe"),
                    ("White", "#FFFFFF"),
                    ("Black", "#1a1a1a"),
                    ("Blue", "#3b82f6"),
                    ("Green", "#22c55e"),
                ],
            ),
            material(
                "abs",
                "ABS",
                "Heat resistant, for mechanical parts",
                0.22,
                &[
                    ("White", "#FFFFFF"),
                    ("Black", "#1a1a1a"),
                    ("Red", "#ef4444"),
                    ("Blue", "#3b82f6"),
                ],
            ),
            material(
                "tpu",
                "TPU (Flexible)",
                "Flexible, rubber-like",
                0.35,
                &[("White", "#FFFFFF"), ("Black", "#1a1a1a"), ("Red", "#ef4444")],
            ),
            material(
                "silk",
                "Silk PLA",
                "Glossy, silky surface",
                0.28,
                &[
                    ("Gold", "#fbbf24"),
                    ("Silver", "#d1d5db"),
                    ("Copper", "#b45309"),
                    ("Rose Gold", "#f472b6"),
                ],
            ),
        ];

        Self {
            materials,
            default_index: 0,
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&MaterialProfile> {
        self.materials.iter().find(|m| m.id == id)
    }

    /// Look up a material, falling back to the default for unknown ids.
    #[must_use]
    pub fn resolve(&self, id: &str) -> &MaterialProfile {
        self.get(id).unwrap_or_else(|| {
            warn!(id, fallback = %self.default_material().id, "unknown material id");
            self.default_material()
        })
    }

    #[must_use]
    pub fn default_material(&self) -> &MaterialProfile {
        &self.materials[self.default_index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaterialProfile> {
        self.materials.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl Default for MaterialCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Layer-height presets.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityCatalog {
    qualities: Vec<QualityProfile>,
    default_index: usize,
}

impl QualityCatalog {
    /// Build a catalog, checking ids are unique, layer heights are positive
    /// and the default exists.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] describing the first problem found.
    pub fn new(qualities: Vec<QualityProfile>, default_id: &str) -> Result<Self, CatalogError> {
        const TABLE: &str = "quality";
        check_ids(TABLE, qualities.iter().map(|q| q.id.as_str()))?;
        for q in &qualities {
            if !(q.layer_height_mm.is_finite() && q.layer_height_mm > 0.0) {
                return Err(invalid(TABLE, &q.id, "layer height must be positive"));
            }
            if !q.time_multiplier.is_finite() || q.time_multiplier < 0.0 {
                return Err(invalid(TABLE, &q.id, "time multiplier must be finite and non-negative"));
            }
        }
        let default_index = default_position(TABLE, qualities.iter().map(|q| q.id.as_str()), default_id)?;
        Ok(Self {
            qualities,
            default_index,
        })
    }

    /// Draft through ultra, defaulting to standard.
    #[must_use]
    pub fn builtin() -> Self {
        let quality = |id: &str, name: &str, description: &str, layer: f64, multiplier: f64| QualityProfile {
            id: id.to_string(),
            display_name: name.to_string(),
            description: description.to_string(),
            layer_height_mm: layer,
            time_multiplier: multiplier,
        };

        Self {
            qualities: vec![
                quality("draft", "Draft", "Fast, for prototypes", 0.3, 0.8),
                quality("standard", "Standard", "Balanced quality", 0.2, 1.0),
                quality("high", "High", "Detailed print", 0.12, 1.4),
                quality("ultra", "Ultra", "Maximum detail", 0.08, 1.8),
            ],
            default_index: 1,
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&QualityProfile> {
        self.qualities.iter().find(|q| q.id == id)
    }

    /// Look up a quality, falling back to the default for unknown ids.
    #[must_use]
    pub fn resolve(&self, id: &str) -> &QualityProfile {
        self.get(id).unwrap_or_else(|| {
            warn!(id, fallback = %self.default_quality().id, "unknown quality id");
            self.default_quality()
        })
    }

    #[must_use]
    pub fn default_quality(&self) -> &QualityProfile {
        &self.qualities[self.default_index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &QualityProfile> {
        self.qualities.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.qualities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.qualities.is_empty()
    }
}

impl Default for QualityCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Both reference tables, as loaded at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalogs {
    pub materials: MaterialCatalog,
    pub qualities: QualityCatalog,
}

/// On-disk shape of a catalog document.
#[derive(Debug, Serialize, Deserialize)]
struct CatalogDocument {
    materials: Vec<MaterialProfile>,
    default_material: String,
    qualities: Vec<QualityProfile>,
    default_quality: String,
}

impl Catalogs {
    #[must_use]
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Load both tables from a JSON document.
    ///
    /// ```json
    /// { "materials": [...], "default_material": "pla",
    ///   "qualities": [...], "default_quality": "standard" }
    /// ```
    ///
    /// # Errors
    ///
    /// Fails if the document does not decode or either table is invalid.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument = serde_json::from_str(json)?;
        Ok(Self {
            materials: MaterialCatalog::new(doc.materials, &doc.default_material)?,
            qualities: QualityCatalog::new(doc.qualities, &doc.default_quality)?,
        })
    }

    /// Serialize both tables in the format accepted by [`Catalogs::from_json`].
    ///
    /// # Errors
    ///
    /// Fails only if serialization itself fails.
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let doc = CatalogDocument {
            materials: self.materials.materials.clone(),
            default_material: self.materials.default_material().id.clone(),
            qualities: self.qualities.qualities.clone(),
            default_quality: self.qualities.default_quality().id.clone(),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }
}

fn check_ids<'a>(table: &'static str, ids: impl Iterator<Item = &'a str>) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId {
                table,
                id: id.to_string(),
            });
        }
    }
    if seen.is_empty() {
        return Err(CatalogError::Empty { table });
    }
    Ok(())
}

fn default_position<'a>(
    table: &'static str,
    mut ids: impl Iterator<Item = &'a str>,
    default_id: &str,
) -> Result<usize, CatalogError> {
    ids.position(|id| id == default_id)
        .ok_or_else(|| CatalogError::UnknownDefault {
            table,
            id: default_id.to_string(),
        })
}

fn invalid(table: &'static str, id: &str, message: &str) -> CatalogError {
    CatalogError::InvalidEntry {
        table,
        id: id.to_string(),
        message: message.to_string(),
    }
}
