//! Layout measurement seam. The engine asks for rects through [`Measure`] and
//! never touches a layout engine directly.

use fnv::FnvHashMap;
use glam::Vec2;

/// Viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Both dimensions positive and finite.
    pub fn is_ready(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn aspect(&self) -> f32 {
        if self.is_ready() {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Element rect relative to the viewport's top-left, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.left + self.width * 0.5, self.top + self.height * 0.5)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }

    pub fn is_finite(&self) -> bool {
        self.left.is_finite() && self.top.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

pub trait Measure {
    /// Current rect of element `id`, or `None` if it is not mounted.
    fn measure(&self, id: &str) -> Option<Rect>;
    fn viewport(&self) -> Viewport;
}

/// In-memory layout: fixed document-space rects and a scroll offset. Used by
/// the native preview and by tests.
#[derive(Debug, Clone, Default)]
pub struct StaticMeasure {
    rects: FnvHashMap<String, Rect>,
    viewport: Viewport,
    scroll_y: f32,
}

impl StaticMeasure {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            rects: FnvHashMap::default(),
            viewport,
            scroll_y: 0.0,
        }
    }

    /// Register `id` at a document-space rect (top measured from page top).
    pub fn insert(&mut self, id: impl Into<String>, rect: Rect) {
        self.rects.insert(id.into(), rect);
    }

    pub fn remove(&mut self, id: &str) -> Option<Rect> {
        self.rects.remove(id)
    }

    pub fn set_scroll(&mut self, scroll_y: f32) {
        self.scroll_y = scroll_y;
    }

    pub fn scroll_by(&mut self, dy: f32) {
        self.scroll_y += dy;
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }
}

impl Measure for StaticMeasure {
    fn measure(&self, id: &str) -> Option<Rect> {
        self.rects.get(id).map(|r| Rect {
            top: r.top - self.scroll_y,
            ..*r
        })
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}
