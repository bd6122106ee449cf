//! PrintQuote Web - WASM bindings for the browser upload page
//!
//! The page hands uploaded file bytes to [`PrintQuote`], edits print
//! parameters, reads quotes back, and drives the preview canvas from the
//! model/view matrices returned by [`PrintQuote::frame`].

use printquote_core::{Catalogs, ViewportEvent};
use wasm_bindgen::prelude::*;

pub mod session;

pub use session::{FrameData, Session};

/// Log to the browser console (and to `tracing` when running natively).
fn warn(message: &str) {
    tracing::warn!("{message}");
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&JsValue::from_str(message));
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// A quote as shown next to the order form
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub price: u32,
    pub estimated_hours: u32,
    pub weight_grams: f64,
}

/// Model, cart and preview state of one upload page
#[wasm_bindgen]
pub struct PrintQuote {
    session: Session,
}

#[wasm_bindgen]
impl PrintQuote {
    /// Create a session with the built-in material and quality tables
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32) -> PrintQuote {
        PrintQuote {
            session: Session::new(Catalogs::builtin(), width, height),
        }
    }

    /// Create a session with catalogs loaded from a JSON document
    #[wasm_bindgen(js_name = withCatalog)]
    pub fn with_catalog(json: &str, width: u32, height: u32) -> Result<PrintQuote, JsValue> {
        let catalogs = Catalogs::from_json(json).map_err(|e| {
            let message = format!("Invalid catalog: {e}");
            warn(&message);
            JsValue::from_str(&message)
        })?;
        Ok(PrintQuote {
            session: Session::new(catalogs, width, height),
        })
    }

    /// Parse an uploaded file and show it; replaces any previous upload
    pub fn upload(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), JsValue> {
        self.session.upload(file_name, bytes).map_err(|e| {
            let message = format!("{file_name}: {e}");
            warn(&message);
            JsValue::from_str(&message)
        })
    }

    #[wasm_bindgen(getter, js_name = fileName)]
    pub fn file_name(&self) -> Option<String> {
        self.session.draft().map(|d| d.file_name().to_string())
    }

    #[wasm_bindgen(getter, js_name = fileSize)]
    pub fn file_size(&self) -> Option<String> {
        self.session.draft().map(|d| d.file_size().to_string())
    }

    /// `[x, y, z]` extents in millimetres, empty before an upload
    pub fn dimensions(&self) -> Vec<f64> {
        self.session
            .draft()
            .map(|d| {
                let dims = d.model().dimensions();
                vec![dims.x, dims.y, dims.z]
            })
            .unwrap_or_default()
    }

    /// Enclosed volume in cubic millimetres
    pub fn volume(&self) -> f64 {
        self.session.draft().map_or(0.0, |d| d.model().volume())
    }

    #[wasm_bindgen(js_name = selectMaterial)]
    pub fn select_material(&mut self, id: &str) -> bool {
        self.session.select_material(id)
    }

    #[wasm_bindgen(js_name = selectColor)]
    pub fn select_color(&mut self, name: &str) -> bool {
        self.session.select_color(name)
    }

    #[wasm_bindgen(js_name = selectQuality)]
    pub fn select_quality(&mut self, id: &str) -> bool {
        self.session.select_quality(id)
    }

    #[wasm_bindgen(js_name = setInfill)]
    pub fn set_infill(&mut self, percent: u32) {
        self.session.set_infill(percent);
    }

    #[wasm_bindgen(js_name = setScale)]
    pub fn set_scale(&mut self, percent: u32) {
        self.session.set_scale(percent);
    }

    #[wasm_bindgen(js_name = setQuantity)]
    pub fn set_quantity(&mut self, quantity: u32) {
        self.session.set_quantity(quantity);
    }

    #[wasm_bindgen(js_name = incrementQuantity)]
    pub fn increment_quantity(&mut self) {
        self.session.increment_quantity();
    }

    #[wasm_bindgen(js_name = decrementQuantity)]
    pub fn decrement_quantity(&mut self) {
        self.session.decrement_quantity();
    }

    /// Current print parameters as JSON
    #[wasm_bindgen(js_name = paramsJson)]
    pub fn params_json(&self) -> Option<String> {
        let draft = self.session.draft()?;
        serde_json::to_string(&draft.params).ok()
    }

    /// Quote for the current upload, `undefined` before one
    pub fn estimate(&self) -> Option<Quote> {
        self.session.estimate().map(|e| Quote {
            price: saturate(e.price),
            estimated_hours: saturate(e.estimated_hours),
            weight_grams: e.weight_grams,
        })
    }

    /// Material and quality tables as JSON
    #[wasm_bindgen(js_name = catalogJson)]
    pub fn catalog_json(&self) -> Result<String, JsValue> {
        self.session
            .catalogs()
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Snapshot the current upload into the cart and start a new order;
    /// returns the line id
    #[wasm_bindgen(js_name = addToCart)]
    pub fn add_to_cart(&mut self) -> Option<String> {
        let id = self.session.add_to_cart();
        if id.is_none() {
            warn("nothing to add to the cart: no model uploaded");
        }
        id.map(|id| id.to_string())
    }

    #[wasm_bindgen(js_name = removeFromCart)]
    pub fn remove_from_cart(&mut self, id: &str) -> bool {
        self.session.remove_from_cart(id)
    }

    #[wasm_bindgen(js_name = clearCart)]
    pub fn clear_cart(&mut self) {
        self.session.clear_cart();
    }

    #[wasm_bindgen(js_name = cartJson)]
    pub fn cart_json(&self) -> String {
        serde_json::to_string(self.session.cart().lines()).unwrap_or_else(|_| "[]".to_string())
    }

    #[wasm_bindgen(js_name = cartTotalPrice)]
    pub fn cart_total_price(&self) -> u32 {
        saturate(self.session.cart().total_price())
    }

    #[wasm_bindgen(js_name = cartTotalHours)]
    pub fn cart_total_hours(&self) -> u32 {
        saturate(self.session.cart().total_hours())
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.session.handle(ViewportEvent::PointerDown { x, y });
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.session.handle(ViewportEvent::PointerMove { x, y });
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) {
        self.session.handle(ViewportEvent::PointerUp);
    }

    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&mut self) {
        self.session.handle(ViewportEvent::PointerLeave);
    }

    pub fn wheel(&mut self, delta_y: f32) {
        self.session.handle(ViewportEvent::Wheel { delta_y });
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.session.handle(ViewportEvent::Resize { width, height });
    }

    /// Advance one animation frame.
    ///
    /// Returns 32 floats: the column-major model matrix followed by the
    /// projection * view matrix. Empty while no model is shown.
    pub fn frame(&mut self) -> Vec<f32> {
        match self.session.frame() {
            Some(frame) => {
                let mut out = frame.model;
                out.extend_from_slice(&frame.view_projection);
                out
            }
            None => Vec::new(),
        }
    }

    /// Surface color as `[r, g, b]` in `0..=1`
    #[wasm_bindgen(js_name = surfaceColor)]
    pub fn surface_color(&self) -> Vec<f32> {
        let c = self.session.viewport().color();
        vec![
            f32::from(c.r) / 255.0,
            f32::from(c.g) / 255.0,
            f32::from(c.b) / 255.0,
        ]
    }

    /// Flat `[x, y, z, ...]` vertex positions of the centered model
    pub fn positions(&self) -> Vec<f32> {
        self.session.vertex_buffers().0
    }

    /// Per-vertex face normals matching [`PrintQuote::positions`]
    pub fn normals(&self) -> Vec<f32> {
        self.session.vertex_buffers().1
    }
}
