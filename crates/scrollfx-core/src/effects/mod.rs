//! The shader effect family.
//!
//! Every effect owns a [`LerpController`] and packs its smoothed state into
//! the shared [`EffectUniforms`] block. Effects differ only in how they
//! update per frame and what they put in the two `params` slots.

pub mod helix;
pub mod lightning;
pub mod ring;
pub mod shockwave;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::conductor::CycleSample;
use crate::constants::{
    BURST_PEAK_SCALE, DEFAULT_BURST_DURATION, DEFAULT_BURST_SPEED, DEFAULT_CYCLE_DURATION,
    WOBBLE_AMPLITUDE, WOBBLE_BASE_SPEED, WOBBLE_SPEED_GAIN, WOBBLE_THICKEN,
};
use crate::error::{FxError, FxResult};
use crate::lerp::{LerpController, UniformField};

pub use helix::{HelixEffect, HelixParams, HelixState};
pub use lightning::{LightningEffect, LightningParams};
pub use ring::{EnergyRingEffect, EnergyRingParams};
pub use shockwave::{ShockwaveEffect, ShockwaveMode, ShockwaveParams};

/// Per-instance options recognized by every effect. All optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EffectConfig {
    /// Linear RGB in `[0, 1]`.
    pub color: [f32; 3],
    /// Seconds per charge/discharge cycle.
    pub cycle_duration: f32,
    /// Seconds of the cycle spent discharging.
    pub burst_duration: f32,
    pub scale_override: f32,
    pub fade_edges: bool,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            color: [0.45, 0.75, 1.0],
            cycle_duration: DEFAULT_CYCLE_DURATION,
            burst_duration: DEFAULT_BURST_DURATION,
            scale_override: 1.0,
            fade_edges: true,
        }
    }
}

impl EffectConfig {
    pub fn validate(&self) -> FxResult<()> {
        if !(self.cycle_duration.is_finite() && self.cycle_duration > 0.0) {
            return Err(FxError::invalid_config(format!(
                "cycleDuration must be positive, got {}",
                self.cycle_duration
            )));
        }
        if !(self.burst_duration.is_finite()
            && self.burst_duration > 0.0
            && self.burst_duration < self.cycle_duration)
        {
            return Err(FxError::invalid_config(format!(
                "burstDuration must be in (0, cycleDuration), got {}",
                self.burst_duration
            )));
        }
        if !(self.scale_override.is_finite() && self.scale_override > 0.0) {
            return Err(FxError::invalid_config(format!(
                "scaleOverride must be positive, got {}",
                self.scale_override
            )));
        }
        if self.color.iter().any(|c| !c.is_finite()) {
            return Err(FxError::invalid_config("color must be finite"));
        }
        Ok(())
    }

    pub fn color_vec3(&self) -> Vec3 {
        Vec3::from_array(self.color).clamp(Vec3::ZERO, Vec3::ONE)
    }
}

/// Uniform block shared by every effect shader. Mirrors `Uniforms` in
/// `common.wgsl` (80 bytes, std140-compatible).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct EffectUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub progress: f32,
    pub color: [f32; 3],
    pub intensity: f32,
    pub instability: f32,
    pub burst: f32,
    pub scale: f32,
    pub fade_edges: f32,
    pub params: [[f32; 4]; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectKind {
    Lightning,
    EnergyRing,
    Shockwave,
    Helix,
}

impl EffectKind {
    pub const ALL: [EffectKind; 4] = [
        EffectKind::Lightning,
        EffectKind::EnergyRing,
        EffectKind::Shockwave,
        EffectKind::Helix,
    ];

    pub fn shader_source(self) -> &'static str {
        match self {
            EffectKind::Lightning => crate::LIGHTNING_WGSL,
            EffectKind::EnergyRing => crate::ENERGY_RING_WGSL,
            EffectKind::Shockwave => crate::SHOCKWAVE_WGSL,
            EffectKind::Helix => crate::HELIX_WGSL,
        }
    }

    pub fn fragment_entry(self) -> &'static str {
        match self {
            EffectKind::Lightning => "fs_lightning",
            EffectKind::EnergyRing => "fs_energy_ring",
            EffectKind::Shockwave => "fs_shockwave",
            EffectKind::Helix => "fs_helix",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EffectKind::Lightning => "lightning",
            EffectKind::EnergyRing => "energy ring",
            EffectKind::Shockwave => "shockwave",
            EffectKind::Helix => "helix",
        }
    }
}

/// Per-frame input shared by all effects of a scene.
#[derive(Debug, Clone, Copy, Default)]
pub struct EffectContext {
    pub cycle: CycleSample,
    /// Pointer is over the effect's hover region.
    pub engaged: bool,
}

pub trait Effect {
    fn kind(&self) -> EffectKind;
    fn config(&self) -> &EffectConfig;
    fn controller(&self) -> &LerpController;
    fn controller_mut(&mut self) -> &mut LerpController;

    /// Advance one frame. Must tick the controller exactly once.
    fn update(&mut self, dt: f32, ctx: &EffectContext);

    /// Effect-specific packing of the two `params` vectors.
    fn params(&self) -> [[f32; 4]; 2];

    /// Hover edge tracker, if the effect reacts to hover.
    fn hover_mut(&mut self) -> Option<&mut HoverResponse> {
        None
    }

    /// Burst envelope in `[0, 1]` exposed to the shader.
    fn burst(&self) -> f32 {
        burst_envelope(self.controller())
    }

    /// One-shot pulse. Returns false if a pulse is already running.
    fn fire(&mut self) -> bool {
        self.controller_mut()
            .trigger_burst(BURST_PEAK_SCALE, DEFAULT_BURST_SPEED)
    }

    /// Open or close an entrance gate. Only effects with an integrator care.
    fn set_started(&mut self, _started: bool) {}

    /// Drop timeline-written targets and any running one-shot. The hover
    /// tracker forgets its last edge so a pointer still over the effect
    /// re-raises instability on the next update.
    fn reset(&mut self) {
        self.controller_mut().reset_targets();
        if let Some(hover) = self.hover_mut() {
            hover.release();
        }
    }

    fn uniforms(&self, resolution: [f32; 2]) -> EffectUniforms {
        let cur = self.controller().current();
        let cfg = self.config();
        EffectUniforms {
            resolution,
            time: cur.time,
            progress: cur.progress,
            color: cur.color.to_array(),
            intensity: cur.intensity,
            instability: cur.instability,
            burst: self.burst(),
            scale: cfg.scale_override,
            fade_edges: if cfg.fade_edges { 1.0 } else { 0.0 },
            params: self.params(),
        }
    }
}

/// Quadratic fall-off of the controller's running burst, 0 when idle.
pub fn burst_envelope(controller: &LerpController) -> f32 {
    if controller.burst_active() {
        let r = 1.0 - controller.burst_progress();
        r * r
    } else {
        0.0
    }
}

/// Amplitude and speed of noise wobble for an instability level. At 0 the
/// shape is static and smooth.
pub fn wobble(instability: f32) -> (f32, f32) {
    let i = instability.clamp(0.0, 1.0);
    (WOBBLE_AMPLITUDE * i, WOBBLE_BASE_SPEED + WOBBLE_SPEED_GAIN * i)
}

/// Thickness multiplier for an instability level.
pub fn thicken(instability: f32) -> f32 {
    1.0 + WOBBLE_THICKEN * instability.clamp(0.0, 1.0)
}

/// Raises instability while hovered and drops it back on leave. Only the
/// edges write targets, so the timeline stays in charge otherwise.
#[derive(Debug, Clone, Copy)]
pub struct HoverResponse {
    pub rest: f32,
    pub hover: f32,
    engaged: bool,
}

impl HoverResponse {
    pub fn new(rest: f32, hover: f32) -> Self {
        Self {
            rest,
            hover,
            engaged: false,
        }
    }

    pub fn apply(&mut self, controller: &mut LerpController, engaged: bool) {
        if engaged == self.engaged {
            return;
        }
        self.engaged = engaged;
        let v = if engaged { self.hover } else { self.rest };
        controller.set_target(UniformField::Instability, v);
    }

    pub fn engaged(&self) -> bool {
        self.engaged
    }

    /// Forget the last edge without writing a target.
    pub fn release(&mut self) {
        self.engaged = false;
    }
}

impl Default for HoverResponse {
    fn default() -> Self {
        Self::new(0.1, 0.9)
    }
}
