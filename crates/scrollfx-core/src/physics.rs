use serde::{Deserialize, Serialize};

use crate::constants::{
    BREATHE_AMPLITUDE, BREATHE_SPEED, SPIN_CAP_SPEED, SPIN_IDLE_SPEED, STRUGGLE_FAST_SPEED,
    STRUGGLE_SLOW_SPEED, TENSION_JITTER_AMPLITUDE, TENSION_JITTER_FREQ,
};
use crate::ease::lerp;

/// Which way `engaged` pushes the target speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpinMode {
    /// Fast when free, slow while engaged: the glyph resists a pull.
    Struggle,
    /// Slow when free, spins up toward a cap while engaged.
    SpinUp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpinParams {
    pub mode: SpinMode,
    /// rad/s when not engaged.
    pub free_speed: f32,
    /// rad/s while engaged.
    pub engaged_speed: f32,
    /// Approach rate when speeding up, per second.
    pub responsiveness: f32,
    /// Approach rate when slowing down, per second.
    pub friction: f32,
    pub jitter_freq: f32,
    pub jitter_amplitude: f32,
    pub breathe_speed: f32,
    pub breathe_amplitude: f32,
}

impl SpinParams {
    pub fn struggle() -> Self {
        Self {
            mode: SpinMode::Struggle,
            free_speed: STRUGGLE_FAST_SPEED,
            engaged_speed: STRUGGLE_SLOW_SPEED,
            responsiveness: 3.0,
            friction: 6.0,
            jitter_freq: TENSION_JITTER_FREQ,
            jitter_amplitude: TENSION_JITTER_AMPLITUDE,
            breathe_speed: BREATHE_SPEED,
            breathe_amplitude: BREATHE_AMPLITUDE,
        }
    }

    pub fn spin_up() -> Self {
        Self {
            mode: SpinMode::SpinUp,
            free_speed: SPIN_IDLE_SPEED,
            engaged_speed: SPIN_CAP_SPEED,
            responsiveness: 2.0,
            friction: 0.8,
            jitter_freq: TENSION_JITTER_FREQ,
            jitter_amplitude: 0.0,
            breathe_speed: BREATHE_SPEED,
            breathe_amplitude: BREATHE_AMPLITUDE,
        }
    }

    pub fn for_mode(mode: SpinMode) -> Self {
        match mode {
            SpinMode::Struggle => Self::struggle(),
            SpinMode::SpinUp => Self::spin_up(),
        }
    }
}

impl Default for SpinParams {
    fn default() -> Self {
        Self::struggle()
    }
}

/// What a renderer should draw this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub rotation: f32,
    pub scale: f32,
}

/// Velocity model for rotation and scale with a start gate.
#[derive(Debug, Clone)]
pub struct RotationIntegrator {
    params: SpinParams,
    speed: f32,
    rotation: f32,
    time: f32,
    engaged: bool,
    started: bool,
}

impl RotationIntegrator {
    pub fn new(params: SpinParams) -> Self {
        Self {
            params,
            speed: 0.0,
            rotation: 0.0,
            time: 0.0,
            engaged: false,
            started: false,
        }
    }

    pub fn params(&self) -> &SpinParams {
        &self.params
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Integrated rotation, without tension jitter.
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Open or close the start gate. Closing it zeroes the speed.
    pub fn set_started(&mut self, started: bool) {
        if self.started == started {
            return;
        }
        self.started = started;
        if !started {
            self.speed = 0.0;
        }
    }

    pub fn start(&mut self) {
        self.set_started(true);
    }

    pub fn set_engaged(&mut self, engaged: bool) {
        self.engaged = engaged;
    }

    pub fn target_speed(&self) -> f32 {
        if !self.started {
            0.0
        } else if self.engaged {
            self.params.engaged_speed
        } else {
            self.params.free_speed
        }
    }

    pub fn step(&mut self, dt: f32) -> Pose {
        if dt.is_finite() && dt > 0.0 {
            self.time += dt;
            if self.started {
                let target = self.target_speed();
                let rate = if target.abs() < self.speed.abs() {
                    self.params.friction
                } else {
                    self.params.responsiveness
                };
                self.speed = lerp(self.speed, target, (dt * rate).min(1.0));
                self.rotation += self.speed * dt;
            } else {
                self.speed = 0.0;
            }
        }
        self.pose()
    }

    /// Displayed pose. Jitter rides on top of the integrated rotation and is
    /// never fed back into it.
    pub fn pose(&self) -> Pose {
        let p = &self.params;
        if self.engaged {
            let jitter = if self.started {
                (self.time * p.jitter_freq).sin() * p.jitter_amplitude
            } else {
                0.0
            };
            Pose {
                rotation: self.rotation + jitter,
                scale: 1.0,
            }
        } else {
            Pose {
                rotation: self.rotation,
                scale: 1.0 + (self.time * p.breathe_speed).sin() * p.breathe_amplitude,
            }
        }
    }

    pub fn reset(&mut self) {
        self.speed = 0.0;
        self.rotation = 0.0;
        self.started = false;
        self.engaged = false;
    }
}
