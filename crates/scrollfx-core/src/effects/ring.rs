use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{
    burst_envelope, thicken, wobble, Effect, EffectConfig, EffectContext, EffectKind,
    HoverResponse,
};
use crate::conductor::{burst_intensity, input_intensity, ConductorPhase};
use crate::constants::{BURST_PEAK_SCALE, DEFAULT_CHARGE_EXPONENT, MAX_RING_INPUTS};
use crate::lerp::LerpController;
use crate::noise::noise2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnergyRingParams {
    pub radius: f32,
    pub thickness: f32,
    /// Number of input arcs, capped at the uniform block's capacity.
    pub inputs: usize,
    pub charge_exponent: f32,
    pub peak_scale: f32,
}

impl Default for EnergyRingParams {
    fn default() -> Self {
        Self {
            radius: 0.55,
            thickness: 0.04,
            inputs: MAX_RING_INPUTS,
            charge_exponent: DEFAULT_CHARGE_EXPONENT,
            peak_scale: BURST_PEAK_SCALE,
        }
    }
}

/// Radial arcs that charge up in lockstep with the conductor, then hand off
/// to a central discharge.
pub struct EnergyRingEffect {
    config: EffectConfig,
    params: EnergyRingParams,
    controller: LerpController,
    hover: HoverResponse,
    inputs: [f32; MAX_RING_INPUTS],
    output: f32,
    phase: ConductorPhase,
}

impl EnergyRingEffect {
    pub fn new(config: EffectConfig, mut params: EnergyRingParams) -> Self {
        params.inputs = params.inputs.clamp(1, MAX_RING_INPUTS);
        let controller = LerpController::with_color(config.color_vec3());
        Self {
            config,
            params,
            controller,
            hover: HoverResponse::default(),
            inputs: [0.0; MAX_RING_INPUTS],
            output: 0.0,
            phase: ConductorPhase::Accumulation,
        }
    }

    pub fn input_levels(&self) -> &[f32] {
        &self.inputs[..self.params.inputs]
    }

    pub fn output_level(&self) -> f32 {
        self.output
    }

    pub fn phase(&self) -> ConductorPhase {
        self.phase
    }

    /// Outline of the ring as currently drawn.
    pub fn outline(&self, center: Vec2, samples: usize) -> Vec<Vec2> {
        let cur = self.controller.current();
        let n = samples.max(3);
        (0..n)
            .map(|i| {
                let a = i as f32 / n as f32 * std::f32::consts::TAU;
                let r = ring_radius(a, self.params.radius, cur.time, cur.instability);
                center + Vec2::from_angle(a) * r
            })
            .collect()
    }
}

impl Effect for EnergyRingEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::EnergyRing
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
        self.phase = ctx.cycle.phase;
        for (i, slot) in self.inputs.iter_mut().enumerate() {
            *slot = if i < self.params.inputs {
                input_intensity(&ctx.cycle, i, self.params.charge_exponent)
            } else {
                0.0
            };
        }
        self.output = burst_intensity(&ctx.cycle, self.params.peak_scale);
    }

    fn params(&self) -> [[f32; 4]; 2] {
        [
            self.inputs,
            [
                self.params.radius,
                self.params.thickness,
                self.output,
                self.params.inputs as f32,
            ],
        ]
    }

    fn burst(&self) -> f32 {
        let charge = (self.output / self.params.peak_scale.max(f32::EPSILON)).min(1.0);
        burst_envelope(&self.controller).max(charge)
    }
}

/// Radius of the ring at angle `a`. Noise is sampled on the unit circle so
/// the shape closes seamlessly.
pub fn ring_radius(angle: f32, base: f32, time: f32, instability: f32) -> f32 {
    let (amp, speed) = wobble(instability);
    if amp <= 0.0 {
        return base;
    }
    let p = Vec2::from_angle(angle) * 3.0 + Vec2::splat(time * speed);
    base * (1.0 + amp * (noise2(p) * 2.0 - 1.0))
}

pub fn ring_thickness(base: f32, instability: f32) -> f32 {
    base * thicken(instability)
}
