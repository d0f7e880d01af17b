use serde::{Deserialize, Serialize};

use super::{wobble, Effect, EffectConfig, EffectContext, EffectKind, HoverResponse};
use crate::lerp::LerpController;
use crate::noise::signed_fbm1;
use crate::physics::{Pose, RotationIntegrator, SpinParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelixState {
    /// Idle: scale breathes.
    Breathing,
    /// Engaged: scale locked, strands shiver.
    Vibrating,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HelixParams {
    /// Radians of twist per unit of height.
    pub twist: f32,
    /// Strand half-width in effect-local units.
    pub amplitude: f32,
    pub strand_width: f32,
    pub spin: SpinParams,
}

impl Default for HelixParams {
    fn default() -> Self {
        Self {
            twist: 4.0,
            amplitude: 0.3,
            strand_width: 0.025,
            spin: SpinParams::struggle(),
        }
    }
}

/// Double-helix ribbon whose rotation comes from a [`RotationIntegrator`].
pub struct HelixEffect {
    config: EffectConfig,
    params: HelixParams,
    controller: LerpController,
    hover: HoverResponse,
    spin: RotationIntegrator,
    pose: Pose,
}

impl HelixEffect {
    pub fn new(config: EffectConfig, params: HelixParams) -> Self {
        let controller = LerpController::with_color(config.color_vec3());
        let spin = RotationIntegrator::new(params.spin.clone());
        let pose = spin.pose();
        Self {
            config,
            params,
            controller,
            hover: HoverResponse::new(0.05, 0.8),
            spin,
            pose,
        }
    }

    pub fn state(&self) -> HelixState {
        if self.spin.is_engaged() {
            HelixState::Vibrating
        } else {
            HelixState::Breathing
        }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn integrator(&self) -> &RotationIntegrator {
        &self.spin
    }
}

impl Effect for HelixEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::Helix
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
        self.spin.set_engaged(ctx.engaged);
        self.pose = self.spin.step(dt);
    }

    fn set_started(&mut self, started: bool) {
        self.spin.set_started(started);
    }

    fn reset(&mut self) {
        self.controller.reset_targets();
        self.hover.release();
        self.spin.reset();
        self.pose = self.spin.pose();
    }

    fn params(&self) -> [[f32; 4]; 2] {
        let vib = if self.state() == HelixState::Vibrating {
            1.0
        } else {
            0.0
        };
        [
            [
                self.pose.rotation,
                self.pose.scale,
                self.params.twist,
                self.params.amplitude,
            ],
            [vib, self.params.strand_width, 0.0, 0.0],
        ]
    }
}

/// Horizontal offset of strand `strand` (0 or 1) at height `y`. The two
/// strands are half a turn apart.
pub fn strand_offset(
    y: f32,
    strand: u32,
    rotation: f32,
    twist: f32,
    amplitude: f32,
    time: f32,
    instability: f32,
) -> f32 {
    let phase = y * twist + rotation + strand as f32 * std::f32::consts::PI;
    let (amp, speed) = wobble(instability);
    let shiver = amp * signed_fbm1(y * 11.0 + strand as f32 * 5.0 + time * speed, 2);
    amplitude * phase.sin() + shiver
}
