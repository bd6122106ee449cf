//! Browser-independent state behind the JS bindings.
//!
//! One `Session` backs one upload page: the current order draft, the cart,
//! the catalogs and the preview viewport. Everything here is plain Rust so it
//! runs under native tests; `lib.rs` only converts types at the JS boundary.

use printquote_core::{
    Cart, Catalogs, EstimateResult, Frame, ModelError, OrderDraft, RenderSurface, Rgb, SurfaceSize,
    ViewportEvent, ViewportPhase, ViewportState,
};
use tracing::{debug, warn};
use uuid::Uuid;

/// Matrices and color of the most recent frame, in the layout WebGL expects.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameData {
    /// Column-major 4x4 model matrix (rotation and fit scale).
    pub model: Vec<f32>,
    /// Column-major 4x4 projection * view matrix.
    pub view_projection: Vec<f32>,
    pub color: Rgb,
}

/// Collects frames drawn by the viewport instead of rasterizing them.
#[derive(Debug, Default)]
struct FrameCapture {
    last: Option<FrameData>,
}

impl RenderSurface for FrameCapture {
    type Error = std::convert::Infallible;

    fn draw(&mut self, frame: &Frame<'_>) -> Result<(), Self::Error> {
        let view_projection = frame.camera.projection_matrix() * frame.camera.view_matrix();
        self.last = Some(FrameData {
            model: frame.model_matrix.as_slice().to_vec(),
            view_projection: view_projection.as_slice().to_vec(),
            color: frame.color,
        });
        Ok(())
    }

    fn draw_empty(&mut self, _size: SurfaceSize) -> Result<(), Self::Error> {
        self.last = None;
        Ok(())
    }
}

#[derive(Debug)]
pub struct Session {
    catalogs: Catalogs,
    draft: Option<OrderDraft>,
    cart: Cart,
    viewport: ViewportState,
}

impl Session {
    pub fn new(catalogs: Catalogs, width: u32, height: u32) -> Self {
        Self {
            catalogs,
            draft: None,
            cart: Cart::new(),
            viewport: ViewportState::new(width, height),
        }
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    pub fn draft(&self) -> Option<&OrderDraft> {
        self.draft.as_ref()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    /// Replace the current draft with a new upload.
    ///
    /// On failure the previous draft is discarded and the viewport emptied.
    pub fn upload(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), ModelError> {
        self.draft = None;
        self.viewport.reset();

        let draft = OrderDraft::from_upload(file_name, bytes)?;
        self.viewport.load(draft.model());
        self.viewport.set_color(&draft.params.color_code);
        self.draft = Some(draft);
        Ok(())
    }

    /// Run `edit` on the draft's parameters, then sync the preview color.
    fn edit<R>(&mut self, edit: impl FnOnce(&mut OrderDraft, &Catalogs) -> R) -> Option<R> {
        let draft = self.draft.as_mut()?;
        let out = edit(draft, &self.catalogs);
        self.viewport.set_color(&draft.params.color_code);
        Some(out)
    }

    /// Select a material by id; `false` if unknown or nothing is loaded.
    pub fn select_material(&mut self, id: &str) -> bool {
        self.edit(|draft, catalogs| match catalogs.materials.get(id) {
            Some(material) => {
                draft.params.select_material(material);
                true
            }
            None => {
                warn!(id, "unknown material");
                false
            }
        })
        .unwrap_or(false)
    }

    /// Select a color of the current material by name.
    pub fn select_color(&mut self, name: &str) -> bool {
        self.edit(|draft, catalogs| {
            let material = catalogs.materials.resolve(&draft.params.material_id);
            draft.params.select_color(material, name)
        })
        .unwrap_or(false)
    }

    pub fn select_quality(&mut self, id: &str) -> bool {
        self.edit(|draft, catalogs| {
            if catalogs.qualities.get(id).is_none() {
                warn!(id, "unknown quality");
                return false;
            }
            draft.params.select_quality(id);
            true
        })
        .unwrap_or(false)
    }

    pub fn set_infill(&mut self, percent: u32) {
        self.edit(|draft, _| draft.params.set_infill(percent));
    }

    pub fn set_scale(&mut self, percent: u32) {
        self.edit(|draft, _| draft.params.set_scale(percent));
    }

    pub fn set_quantity(&mut self, quantity: u32) {
        self.edit(|draft, _| draft.params.set_quantity(quantity));
    }

    pub fn increment_quantity(&mut self) {
        self.edit(|draft, _| draft.params.increment_quantity());
    }

    pub fn decrement_quantity(&mut self) {
        self.edit(|draft, _| draft.params.decrement_quantity());
    }

    /// Quote for the current draft, `None` before the first upload.
    pub fn estimate(&self) -> Option<EstimateResult> {
        self.draft.as_ref().map(|d| d.estimate(&self.catalogs))
    }

    /// Freeze the draft into the cart and return the new line id.
    ///
    /// This ends the order: the draft is dropped and the viewport emptied,
    /// so the next line starts from a fresh upload with default parameters.
    pub fn add_to_cart(&mut self) -> Option<Uuid> {
        let line = self.draft.take()?.freeze(&self.catalogs);
        self.viewport.reset();
        Some(self.cart.add(line))
    }

    /// Remove a line by its id string; `false` if malformed or absent.
    pub fn remove_from_cart(&mut self, id: &str) -> bool {
        match Uuid::parse_str(id) {
            Ok(id) => self.cart.remove(id).is_some(),
            Err(err) => {
                debug!(id, %err, "malformed cart line id");
                false
            }
        }
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    pub fn handle(&mut self, event: ViewportEvent) {
        self.viewport.handle(event);
    }

    pub fn phase(&self) -> ViewportPhase {
        self.viewport.phase()
    }

    /// Advance one animation frame and return what to draw.
    pub fn frame(&mut self) -> Option<FrameData> {
        let mut capture = FrameCapture::default();
        match self.viewport.render(&mut capture) {
            Ok(()) => capture.last,
            Err(never) => match never {},
        }
    }

    /// Centered triangle soup as flat `[x, y, z, ...]` positions and normals.
    pub fn vertex_buffers(&self) -> (Vec<f32>, Vec<f32>) {
        let Some(frame) = self.viewport.frame() else {
            return (Vec::new(), Vec::new());
        };
        let capacity = frame.mesh.len() * 9;
        let mut positions = Vec::with_capacity(capacity);
        let mut normals = Vec::with_capacity(capacity);
        for triangle in &frame.mesh.triangles {
            for vertex in &triangle.vertices {
                positions.extend_from_slice(&[vertex.position.x, vertex.position.y, vertex.position.z]);
                normals.extend_from_slice(&[vertex.normal.x, vertex.normal.y, vertex.normal.z]);
            }
        }
        (positions, normals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_stl() -> Vec<u8> {
        let mut data = vec![0u8; 80];
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&[0u8; 12]);
        for c in [0.0f32, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 10.0, 0.0] {
            data.extend_from_slice(&c.to_le_bytes());
        }
        data.extend_from_slice(&[0u8; 2]);
        data
    }

    fn loaded() -> Session {
        let mut session = Session::new(Catalogs::builtin(), 800, 600);
        session.upload("part.stl", &triangle_stl()).unwrap();
        session
    }

    #[test]
    fn test_upload_loads_viewport() {
        let session = loaded();
        assert_eq!(session.phase(), ViewportPhase::Loaded);
        assert_eq!(session.draft().unwrap().file_name(), "part.stl");
        assert_eq!(session.estimate().unwrap().price, 15);
    }

    #[test]
    fn test_failed_upload_clears_previous_draft() {
        let mut session = loaded();
        let err = session.upload("part.step", &triangle_stl()).unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedExtension { .. }));
        assert!(session.draft().is_none());
        assert_eq!(session.phase(), ViewportPhase::Empty);
        assert!(session.frame().is_none());
    }

    #[test]
    fn test_material_choice_recolors_preview() {
        let mut session = loaded();
        assert!(session.select_material("silk"));
        assert_eq!(session.viewport().color(), Rgb::new(0xfb, 0xbf, 0x24));
        assert!(session.select_color("Silver"));
        assert_eq!(session.viewport().color(), Rgb::new(0xd1, 0xd5, 0xdb));
        assert!(!session.select_color("Purple"));
        assert!(!session.select_material("wood"));
        assert!(!session.select_quality("insane"));
    }

    #[test]
    fn test_edits_without_draft_are_ignored() {
        let mut session = Session::new(Catalogs::builtin(), 800, 600);
        session.set_quantity(5);
        assert!(!session.select_material("pla"));
        assert!(session.estimate().is_none());
        assert!(session.add_to_cart().is_none());
    }

    #[test]
    fn test_add_to_cart_ends_the_order() {
        let mut session = loaded();
        session.set_quantity(4);
        session.add_to_cart().unwrap();

        assert!(session.draft().is_none());
        assert_eq!(session.phase(), ViewportPhase::Empty);
        assert!(session.frame().is_none());
        assert_eq!(session.cart().lines()[0].params.quantity, 4);
        assert!(session.add_to_cart().is_none());

        session.upload("next.stl", &triangle_stl()).unwrap();
        assert_eq!(session.draft().unwrap().params.quantity, 1);
    }

    #[test]
    fn test_cart_round_trip() {
        let mut session = loaded();
        let first = session.add_to_cart().unwrap();
        session.upload("part.stl", &triangle_stl()).unwrap();
        session.increment_quantity();
        session.add_to_cart().unwrap();
        assert_eq!(session.cart().len(), 2);
        assert_eq!(session.cart().lines()[1].params.quantity, 2);

        assert!(!session.remove_from_cart("not-a-uuid"));
        assert!(session.remove_from_cart(&first.to_string()));
        assert_eq!(session.cart().len(), 1);
        session.clear_cart();
        assert!(session.cart().is_empty());
    }

    #[test]
    fn test_frames_rotate_and_buffers_match_mesh() {
        let mut session = loaded();
        let a = session.frame().unwrap();
        let b = session.frame().unwrap();
        assert_eq!(a.model.len(), 16);
        assert_eq!(a.view_projection.len(), 16);
        assert_ne!(a.model, b.model);

        let (positions, normals) = session.vertex_buffers();
        assert_eq!(positions.len(), 9);
        assert_eq!(normals.len(), 9);
        // flat triangle in the xy plane faces +z
        assert!((normals[2] - 1.0).abs() < 1e-6);
    }
}
