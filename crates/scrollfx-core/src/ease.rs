use serde::{Deserialize, Serialize};

/// Easing curves applied to normalized time in `[0, 1]`.
///
/// Every curve maps 0 to 0 and 1 to 1. Only `OutBack` and `OutElastic`
/// leave `[0, 1]` in between.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    #[default]
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    OutExpo,
    /// `t^k`, the charging curve.
    Power(f32),
    OutBack,
    OutElastic,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        match self {
            Easing::Linear => t,
            Easing::InQuad => t * t,
            Easing::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::InCubic => t * t * t,
            Easing::OutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::OutExpo => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * t)
                }
            }
            Easing::Power(k) => t.powf(k.max(f32::EPSILON)),
            Easing::OutBack => {
                let c1 = 1.70158;
                let c3 = c1 + 1.0;
                1.0 + c3 * (t - 1.0).powi(3) + c1 * (t - 1.0).powi(2)
            }
            Easing::OutElastic => {
                if t <= 0.0 || t >= 1.0 {
                    return t;
                }
                let c4 = std::f32::consts::TAU / 3.0;
                2f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
            }
        }
    }

    /// Whether the curve may leave `[0, 1]`.
    pub fn overshoots(self) -> bool {
        matches!(self, Easing::OutBack | Easing::OutElastic)
    }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Position of `v` between `a` and `b`, clamped. Returns 0 for an empty range.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    let span = b - a;
    if span.abs() <= f32::EPSILON {
        return 0.0;
    }
    ((v - a) / span).clamp(0.0, 1.0)
}

#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = inverse_lerp(edge0, edge1, x);
    t * t * (3.0 - 2.0 * t)
}
