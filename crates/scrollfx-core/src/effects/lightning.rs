use glam::Vec2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{wobble, Effect, EffectConfig, EffectContext, EffectKind, HoverResponse};
use crate::lerp::LerpController;
use crate::noise::signed_fbm1;

/// Bolt geometry in effect-local units (short edge spans -1..1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LightningParams {
    pub start: [f32; 2],
    pub end: [f32; 2],
    /// Sideways bow of the base curve, as a fraction of its length.
    pub bend: f32,
    /// Resting jaggedness independent of instability.
    pub jag: f32,
    /// Head travels along the curve this many times per second.
    pub travel_speed: f32,
    pub seed: f32,
}

impl Default for LightningParams {
    fn default() -> Self {
        Self {
            start: [-0.8, 0.0],
            end: [0.8, 0.0],
            bend: 0.15,
            jag: 0.05,
            travel_speed: 0.6,
            seed: 1.0,
        }
    }
}

pub struct LightningEffect {
    config: EffectConfig,
    params: LightningParams,
    controller: LerpController,
    hover: HoverResponse,
    head: f32,
}

impl LightningEffect {
    pub fn new(config: EffectConfig, params: LightningParams) -> Self {
        let controller = LerpController::with_color(config.color_vec3());
        Self {
            config,
            params,
            controller,
            hover: HoverResponse::default(),
            head: 0.0,
        }
    }

    pub fn params_ref(&self) -> &LightningParams {
        &self.params
    }

    /// Position of the travelling head along the bolt, in `[0, 1)`.
    pub fn head(&self) -> f32 {
        self.head
    }

    /// Polyline of the bolt as currently drawn.
    pub fn points(&self, samples: usize) -> SmallVec<[Vec2; 32]> {
        let cur = self.controller.current();
        bolt_points(
            Vec2::from_array(self.params.start),
            Vec2::from_array(self.params.end),
            self.params.bend,
            self.params.jag,
            self.params.seed,
            cur.time,
            cur.instability,
            samples,
        )
    }
}

impl Effect for LightningEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::Lightning
    }

    fn config(&self) -> &EffectConfig {
        &self.config
    }

    fn controller(&self) -> &LerpController {
        &self.controller
    }

    fn controller_mut(&mut self) -> &mut LerpController {
        &mut self.controller
    }

    fn hover_mut(&mut self) -> Option<&mut HoverResponse> {
        Some(&mut self.hover)
    }

    fn update(&mut self, dt: f32, ctx: &EffectContext) {
        self.hover.apply(&mut self.controller, ctx.engaged);
        self.controller.tick(dt);
        if dt.is_finite() && dt > 0.0 {
            let speed = self.params.travel_speed * (1.0 + self.controller.current().instability);
            self.head = (self.head + dt * speed).fract();
        }
    }

    fn params(&self) -> [[f32; 4]; 2] {
        let p = &self.params;
        [
            [p.start[0], p.start[1], p.end[0], p.end[1]],
            [p.bend, self.head, p.jag, p.seed],
        ]
    }
}

/// Lateral displacement of the bolt at arc parameter `s` in `[0, 1]`.
/// Pinned to zero at both ends.
pub fn bolt_offset(s: f32, time: f32, instability: f32, seed: f32, jag: f32) -> f32 {
    let s = s.clamp(0.0, 1.0);
    let envelope = (s * std::f32::consts::PI).sin();
    let (amp, speed) = wobble(instability);
    let rest = jag * signed_fbm1(s * 6.0 + seed * 13.0, 3);
    let live = amp * signed_fbm1(s * 9.0 + seed * 7.0 + time * speed, 3);
    envelope * (rest + live)
}

/// Sample the bolt from `start` to `end` into `samples` points (at least 2).
#[allow(clippy::too_many_arguments)]
pub fn bolt_points(
    start: Vec2,
    end: Vec2,
    bend: f32,
    jag: f32,
    seed: f32,
    time: f32,
    instability: f32,
    samples: usize,
) -> SmallVec<[Vec2; 32]> {
    let n = samples.max(2);
    let chord = end - start;
    let len = chord.length();
    let normal = if len > f32::EPSILON {
        chord.perp() / len
    } else {
        Vec2::ZERO
    };
    let control = (start + end) * 0.5 + normal * bend * len;
    (0..n)
        .map(|i| {
            let s = i as f32 / (n - 1) as f32;
            let base = crate::curve::quad_bezier(start, control, end, s);
            base + normal * bolt_offset(s, time, instability, seed, jag) * len
        })
        .collect()
}
