use std::f64::consts::TAU;

use glam::{Vec2, Vec3};
use scrollfx_core::graph::{CableGraph, CableId, NodeKind};
use scrollfx_core::scene::ParticleSlot;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::constants::{GLOW_BLUR_PX, NODE_RING_WIDTH, PARTICLE_RADIUS_PX};
use crate::dom::sync_canvas_backing_size;
use crate::paint::{cable_alpha, cable_width, css_rgba, particle_to_surface};

/// 2D overlay for cables, nodes and particles. Draws in CSS px; the context
/// transform absorbs devicePixelRatio.
pub struct Overlay {
    canvas: web::HtmlCanvasElement,
    ctx: web::CanvasRenderingContext2d,
    css_size: Vec2,
}

impl Overlay {
    pub fn new(canvas: web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| anyhow::anyhow!("getContext(2d) failed: {e:?}"))?
            .ok_or_else(|| anyhow::anyhow!("2d context unavailable"))?
            .dyn_into::<web::CanvasRenderingContext2d>()
            .map_err(|_| anyhow::anyhow!("unexpected 2d context type"))?;
        Ok(Self {
            canvas,
            ctx,
            css_size: Vec2::ZERO,
        })
    }

    pub fn canvas(&self) -> &web::HtmlCanvasElement {
        &self.canvas
    }

    /// Resize if needed and clear. Returns false when the canvas has no size.
    pub fn begin(&mut self) -> bool {
        let rect = self.canvas.get_bounding_client_rect();
        self.css_size = Vec2::new(rect.width() as f32, rect.height() as f32);
        if self.css_size.x <= 0.0 || self.css_size.y <= 0.0 {
            return false;
        }
        let ((w, _), _) = sync_canvas_backing_size(&self.canvas);
        let scale = w as f64 / rect.width();
        let _ = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        self.ctx
            .clear_rect(0.0, 0.0, self.canvas.width() as f64, self.canvas.height() as f64);
        let _ = self.ctx.set_transform(scale, 0.0, 0.0, scale, 0.0, 0.0);
        true
    }

    pub fn draw_graph(&self, graph: &CableGraph) {
        let ctx = &self.ctx;
        ctx.set_line_cap("round");
        for id in graph.cable_ids() {
            self.draw_cable(graph, id);
        }
        ctx.set_shadow_blur(0.0);
        for node in graph.nodes() {
            if !node.revealed {
                continue;
            }
            let Some(p) = node.projected() else {
                continue;
            };
            let fill = match (node.kind, node.active) {
                (_, true) => css_rgba(Vec3::ONE, 0.9),
                (NodeKind::Center, false) => css_rgba(Vec3::new(0.55, 0.8, 1.0), 0.75),
                (NodeKind::Corner, false) => css_rgba(Vec3::new(0.4, 0.6, 0.9), 0.55),
            };
            ctx.begin_path();
            if ctx
                .arc(p.x as f64, p.y as f64, node.radius.max(0.0) as f64, 0.0, TAU)
                .is_err()
            {
                continue;
            }
            ctx.set_fill_style_str(&fill);
            ctx.fill();
            ctx.set_line_width(NODE_RING_WIDTH);
            ctx.set_stroke_style_str(&css_rgba(Vec3::ONE, 0.6));
            ctx.stroke();
        }
    }

    fn draw_cable(&self, graph: &CableGraph, id: CableId) {
        if !graph.cable_visible(id) {
            return;
        }
        let Some(cable) = graph.cable(id) else {
            return;
        };
        let Some(geo) = cable.geometry() else {
            return;
        };
        let Some((first, rest)) = geo.points.split_first() else {
            return;
        };
        let ctx = &self.ctx;
        let glow = cable.glow();
        let color = cable.uniforms.current().color;
        ctx.begin_path();
        ctx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            ctx.line_to(p.x as f64, p.y as f64);
        }
        ctx.set_shadow_color(&css_rgba(color, 1.0));
        ctx.set_shadow_blur(GLOW_BLUR_PX * glow.clamp(0.0, 2.0) as f64);
        ctx.set_line_width(cable_width(glow));
        ctx.set_stroke_style_str(&css_rgba(color, cable_alpha(glow)));
        ctx.stroke();
    }

    pub fn draw_particles(&self, slots: &[ParticleSlot], color: Vec3) {
        let ctx = &self.ctx;
        ctx.set_shadow_blur(0.0);
        ctx.set_fill_style_str(&css_rgba(color, 1.0));
        for slot in slots {
            for p in slot.field.particles() {
                if !p.is_visible() {
                    continue;
                }
                let s = particle_to_surface(p.position, self.css_size);
                ctx.set_global_alpha(p.opacity.clamp(0.0, 1.0) as f64);
                ctx.begin_path();
                let r = PARTICLE_RADIUS_PX * p.scale.max(0.0) as f64;
                if ctx.arc(s.x as f64, s.y as f64, r, 0.0, TAU).is_ok() {
                    ctx.fill();
                }
            }
        }
        ctx.set_global_alpha(1.0);
    }

    pub fn clear(&self) {
        let _ = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        self.ctx
            .clear_rect(0.0, 0.0, self.canvas.width() as f64, self.canvas.height() as f64);
    }
}
