use serde::{Deserialize, Serialize};

use super::{thicken, Effect, EffectConfig, EffectContext, EffectKind, HoverResponse};
use crate::conductor::{shockwave_scaled, ConductorPhase};
use crate::constants::{
    BURST_PEAK_SCALE, DEFAULT_BURST_SPEED, SHOCKWAVE_BASE_THICKNESS, SHOCKWAVE_MAX_RADIUS,
};
use crate::lerp::LerpController;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShockwaveMode {
    /// Expands during every discharge of the shared conductor.
    #[default]
    Conductor,
    /// Expands only when fired.
    OneShot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShockwaveParams {
    pub mode: ShockwaveMode,
    pub center: [f32; 2],
    pub max_radius: f32,
    pub thickness: f32,
    /// One-shot expansion speed, in full expansions per second.
    pub speed: f32,
}

impl Default for ShockwaveParams {
    fn default() -> Self {
        Self {
            mode: ShockwaveMode::Conductor,
            center: [0.0, 0.0],
            max_radius: SHOCKWAVE_MAX_RADIUS,
            thickness: SHOCKWAVE_BASE_THICKNESS,
            speed: DEFAULT_BURST_SPEED,
        }
    }
}

pub struct ShockwaveEffect {
    config: EffectConfig,
    params: ShockwaveParams,
    controller: LerpController,
    hover: HoverResponse,
    /// Expansion progress of the visible ring, if any.
    wave: Option<f32>,
}

impl ShockwaveEffect {
    pub fn new(config: EffectConfig, params: ShockwaveParams) -> Self {
        let controller = LerpController::with_color(config.color_vec3());
        Self {
            config,
            params,
            controller,
            hover: HoverResponse::new(0.0, 0.6),
            wave: None,
        }
    }

    pub fn mode(&self) -> ShockwaveMode {
        self.params.mode
    }

    /// Expansion progress in `[0, 1]` of the visible ring.
    pub fn wave_progress(&self) -> Option<f32> {
        self.wave
    }

    /// `(radius, thickness)` of the visible ring.
    pub fn ring(&self) -> Option<(f32, f32)> {
        let inst = self.controller.current().instability;
        self.wave.map(|b| {
            let (r, t) = shockwave_scaled(b, self.params.max_radius, self.params.thickness);
            (r, t * thicken(inst))
        })
    }
}

impl Effect for ShockwaveEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::Shockwave
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
        self.wave = if self.controller.burst_active() {
            Some(self.controller.burst_progress())
        } else if self.params.mode == ShockwaveMode::Conductor
            && ctx.cycle.phase == ConductorPhase::Discharge
        {
            Some(ctx.cycle.burst_progress)
        } else {
            None
        };
    }

    fn fire(&mut self) -> bool {
        let speed = self.params.speed;
        self.controller.trigger_burst(BURST_PEAK_SCALE, speed)
    }

    fn burst(&self) -> f32 {
        self.wave.map(|b| (1.0 - b) * (1.0 - b)).unwrap_or(0.0)
    }

    fn params(&self) -> [[f32; 4]; 2] {
        let (radius, thickness) = self.ring().unwrap_or((0.0, 0.0));
        [
            [self.params.center[0], self.params.center[1], radius, thickness],
            [
                self.burst(),
                self.params.max_radius,
                if self.wave.is_some() { 1.0 } else { 0.0 },
                0.0,
            ],
        ]
    }
}

/// Brightness of a ring of `radius` and `thickness` at distance `dist` from
/// its center, in `[0, 1]`. Zero thickness draws nothing.
pub fn ring_profile(dist: f32, radius: f32, thickness: f32) -> f32 {
    if !(thickness > 0.0) || !dist.is_finite() {
        return 0.0;
    }
    let d = ((dist - radius).abs() / thickness).min(1.0);
    let v = 1.0 - d;
    v * v
}
