//! PrintQuote Core Library - Mesh ingestion and print-cost estimation
//!
//! Parses STL buffers into geometry (dimensions, enclosed volume, centered
//! vertices), prices prints from that geometry and user parameters, and keeps
//! the camera/model state of an interactive viewport. Nothing here renders,
//! stores or authenticates; hosts supply bytes and draw frames.

pub mod cart;
pub mod catalog;
pub mod error;
pub mod estimate;
pub mod geometry;
pub mod model;
pub mod params;
pub mod projection;
pub mod stl;
pub mod transform;
pub mod upload;
pub mod viewport;

// Re-export commonly used types
pub use cart::{Cart, CartLine};
pub use catalog::{Catalogs, ColorOption, MaterialCatalog, MaterialProfile, QualityCatalog, QualityProfile};
pub use error::{CatalogError, ModelError, ModelResult};
pub use estimate::{estimate, EstimateResult};
pub use geometry::{Mesh, Triangle, Vertex};
pub use model::{Dimensions, ModelSummary, ParsedModel, VertexSet};
pub use params::PrintParameters;
pub use projection::Camera;
pub use stl::parse_stl;
pub use transform::{RotationState, Transform};
pub use upload::OrderDraft;
pub use viewport::{Frame, RenderSurface, Rgb, SurfaceSize, ViewportEvent, ViewportPhase, ViewportState};
