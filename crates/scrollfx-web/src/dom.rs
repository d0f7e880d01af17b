use scrollfx_core::measure::{Measure, Rect, Viewport};
use scrollfx_core::physics::Pose;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::constants::MAX_DEVICE_PIXEL_RATIO;
use crate::hit::backing_size;

#[inline]
pub fn window_document() -> Option<(web::Window, web::Document)> {
    let window = web::window()?;
    let document = window.document()?;
    Some((window, document))
}

pub fn canvas_by_id(document: &web::Document, id: &str) -> anyhow::Result<web::HtmlCanvasElement> {
    let el = document
        .get_element_by_id(id)
        .ok_or_else(|| anyhow::anyhow!("missing #{id}"))?;
    el.dyn_into::<web::HtmlCanvasElement>()
        .map_err(|_| anyhow::anyhow!("#{id} is not a canvas"))
}

/// Keep a canvas' pixel size at CSS size times devicePixelRatio. Returns the
/// backing size and whether it changed.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) -> ((u32, u32), bool) {
    let dpr = web::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
    let rect = canvas.get_bounding_client_rect();
    let (w, h) = backing_size(rect.width(), rect.height(), dpr, MAX_DEVICE_PIXEL_RATIO);
    let changed = canvas.width() != w || canvas.height() != h;
    if changed {
        canvas.set_width(w);
        canvas.set_height(h);
    }
    ((w, h), changed)
}

/// Reads layout straight from the live DOM. Rects are viewport-relative, as
/// returned by `getBoundingClientRect`.
pub struct DomMeasure {
    window: web::Window,
    document: web::Document,
}

impl DomMeasure {
    pub fn new(window: web::Window, document: web::Document) -> Self {
        Self { window, document }
    }

    pub fn document(&self) -> &web::Document {
        &self.document
    }
}

impl Measure for DomMeasure {
    fn measure(&self, id: &str) -> Option<Rect> {
        let el = self.document.get_element_by_id(id)?;
        // Detached mid-frame: treat like a missing element.
        if !el.is_connected() {
            return None;
        }
        let r = el.get_bounding_client_rect();
        let rect = Rect::new(
            r.left() as f32,
            r.top() as f32,
            r.width() as f32,
            r.height() as f32,
        );
        rect.is_finite().then_some(rect)
    }

    fn viewport(&self) -> Viewport {
        let dim = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
            v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
        };
        Viewport::new(dim(self.window.inner_width()), dim(self.window.inner_height()))
    }
}

/// Write a spinner pose to its element as a CSS transform.
pub fn apply_pose(document: &web::Document, id: &str, pose: Pose) {
    let Some(el) = document
        .get_element_by_id(id)
        .and_then(|e| e.dyn_into::<web::HtmlElement>().ok())
    else {
        return;
    };
    let value = format!("rotate({:.4}rad) scale({:.4})", pose.rotation, pose.scale);
    let _ = el.style().set_property("transform", &value);
}
