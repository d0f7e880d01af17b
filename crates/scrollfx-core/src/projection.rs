use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::measure::Viewport;

/// Maps node positions to viewport pixels.
pub trait Projector {
    /// `None` when the point cannot be placed this frame (viewport not laid
    /// out, point behind the camera, non-finite input).
    fn project(&self, world: Vec3, viewport: Viewport) -> Option<Vec2>;
}

/// Perspective look-at camera for 3D node layouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fovy_radians: 45f32.to_radians(),
            znear: 0.1,
            zfar: 100.0,
        }
    }
}

impl Camera {
    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, aspect, self.znear, self.zfar)
    }

    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
}

impl Projector for Camera {
    fn project(&self, world: Vec3, viewport: Viewport) -> Option<Vec2> {
        if !viewport.is_ready() || !world.is_finite() {
            return None;
        }
        let clip = self.projection_matrix(viewport.aspect())
            * self.view_matrix()
            * world.extend(1.0);
        if clip.w <= 1e-5 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        let px = Vec2::new(
            (ndc.x * 0.5 + 0.5) * viewport.width,
            (1.0 - (ndc.y * 0.5 + 0.5)) * viewport.height,
        );
        px.is_finite().then_some(px)
    }
}

/// 2D layouts: `x, y` are either pixels or fractions of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenProjector {
    pub normalized: bool,
}

impl Projector for ScreenProjector {
    fn project(&self, world: Vec3, viewport: Viewport) -> Option<Vec2> {
        if !viewport.is_ready() || !world.is_finite() {
            return None;
        }
        let p = world.truncate();
        Some(if self.normalized {
            p * viewport.size()
        } else {
            p
        })
    }
}
