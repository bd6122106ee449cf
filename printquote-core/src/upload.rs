//! Upload boundary: accepted file types and the per-upload order draft.

use tracing::info;

use crate::cart::CartLine;
use crate::catalog::Catalogs;
use crate::error::{ModelError, ModelResult};
use crate::estimate::{estimate, EstimateResult};
use crate::model::ParsedModel;
use crate::params::PrintParameters;
use crate::stl::parse_stl;

/// Extensions accepted at upload. Only the STL layouts are actually parsed.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = [".stl", ".obj", ".3mf"];

/// Lower-cased text from the last `.` onward, e.g. `".stl"`.
pub fn extension_of(file_name: &str) -> Option<String> {
    file_name.rfind('.').map(|i| file_name[i..].to_lowercase())
}

pub fn is_accepted(file_name: &str) -> bool {
    extension_of(file_name).is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Human size label in megabytes, e.g. `"1.25 MB"`.
pub fn format_file_size(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}

/// The model currently being configured, with its working parameters.
///
/// A new upload replaces the draft wholesale; the geometry is never edited.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    file_name: String,
    file_size: String,
    model: ParsedModel,
    pub params: PrintParameters,
}

impl OrderDraft {
    /// Check the file name, parse the bytes and start from default parameters.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnsupportedExtension`] for rejected file names, otherwise
    /// whatever [`parse_stl`] reports.
    pub fn from_upload(file_name: &str, bytes: &[u8]) -> ModelResult<Self> {
        if !is_accepted(file_name) {
            return Err(ModelError::UnsupportedExtension {
                file_name: file_name.to_string(),
            });
        }

        let model = parse_stl(bytes)?;
        info!(file = file_name, triangles = model.triangle_count(), "model uploaded");
        Ok(Self::new(file_name, bytes.len() as u64, model))
    }

    pub fn new(file_name: &str, size_bytes: u64, model: ParsedModel) -> Self {
        Self {
            file_name: file_name.to_string(),
            file_size: format_file_size(size_bytes),
            model,
            params: PrintParameters::default(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn file_size(&self) -> &str {
        &self.file_size
    }

    pub fn model(&self) -> &ParsedModel {
        &self.model
    }

    /// Quote the draft with its current parameters.
    pub fn estimate(&self, catalogs: &Catalogs) -> EstimateResult {
        estimate(
            self.model.summary(),
            &self.params,
            &catalogs.materials,
            &catalogs.qualities,
        )
    }

    /// Snapshot the draft into a cart line; later edits do not affect it.
    pub fn freeze(&self, catalogs: &Catalogs) -> CartLine {
        let params = self.params.clamped();
        CartLine::new(
            &self.file_name,
            &self.file_size,
            *self.model.summary(),
            catalogs.materials.resolve(&params.material_id).display_name.clone(),
            catalogs.qualities.resolve(&params.quality_id).display_name.clone(),
            self.estimate(catalogs),
            params,
        )
    }
}
