// Pure styling math for the Canvas2D overlay.

use glam::{Vec2, Vec3};

use crate::constants::{CABLE_BASE_WIDTH, CABLE_GLOW_WIDTH, CABLE_MAX_WIDTH};

/// `rgba(r, g, b, a)` from linear `[0, 1]` channels.
pub fn css_rgba(color: Vec3, alpha: f32) -> String {
    let c = color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
    let a = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 0.0 };
    format!(
        "rgba({}, {}, {}, {:.3})",
        c.x.round() as u8,
        c.y.round() as u8,
        c.z.round() as u8,
        a
    )
}

/// Stroke width for a cable glowing at `glow`.
#[inline]
pub fn cable_width(glow: f32) -> f64 {
    let g = if glow.is_finite() { glow.max(0.0) as f64 } else { 0.0 };
    (CABLE_BASE_WIDTH + CABLE_GLOW_WIDTH * g).min(CABLE_MAX_WIDTH)
}

/// Stroke alpha for a cable: faint at rest, opaque once glowing.
#[inline]
pub fn cable_alpha(glow: f32) -> f32 {
    if glow.is_finite() {
        (0.25 + 0.75 * glow).clamp(0.0, 1.0)
    } else {
        0.25
    }
}

/// Particles live in a space centered on the surface.
#[inline]
pub fn particle_to_surface(p: Vec2, surface_size: Vec2) -> Vec2 {
    p + surface_size * 0.5
}
