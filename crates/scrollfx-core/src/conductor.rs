//! Shared two-phase charge/discharge clock.
//!
//! Phase is a pure function of `t mod (charge + burst)`, so any number of
//! effects sampling one conductor at the same timestamp agree on it no matter
//! how frames were spaced.

use crate::constants::{INPUT_JITTER, SHOCKWAVE_BASE_THICKNESS, SHOCKWAVE_MAX_RADIUS};
use crate::effects::EffectConfig;
use crate::error::{FxError, FxResult};
use crate::noise::jitter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConductorPhase {
    Accumulation,
    Discharge,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleSample {
    pub phase: ConductorPhase,
    /// `t mod D`.
    pub cycle_time: f32,
    /// `cycle_time / D_charge` while accumulating, 1 while discharging.
    pub charge_progress: f32,
    /// 0 while accumulating, `(cycle_time - D_charge) / D_burst` while discharging.
    pub burst_progress: f32,
    pub cycle_index: u64,
}

impl Default for CycleSample {
    fn default() -> Self {
        Self {
            phase: ConductorPhase::Accumulation,
            cycle_time: 0.0,
            charge_progress: 0.0,
            burst_progress: 0.0,
            cycle_index: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Conductor {
    charge: f32,
    burst: f32,
    clock: f32,
}

impl Conductor {
    pub fn new(charge: f32, burst: f32) -> FxResult<Self> {
        validate(charge, burst)?;
        Ok(Self {
            charge,
            burst,
            clock: 0.0,
        })
    }

    /// Split `cycle_duration` into charge and burst phases.
    pub fn from_config(config: &EffectConfig) -> FxResult<Self> {
        Self::new(
            config.cycle_duration - config.burst_duration,
            config.burst_duration,
        )
    }

    pub fn charge_duration(&self) -> f32 {
        self.charge
    }

    pub fn burst_duration(&self) -> f32 {
        self.burst
    }

    pub fn cycle_duration(&self) -> f32 {
        self.charge + self.burst
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn advance(&mut self, dt: f32) -> CycleSample {
        if dt.is_finite() && dt > 0.0 {
            self.clock += dt;
        }
        self.sample(self.clock)
    }

    /// Reconfigure the phases. The clock is left alone, so the current
    /// cycle position may jump for one frame.
    pub fn set_durations(&mut self, charge: f32, burst: f32) -> FxResult<()> {
        validate(charge, burst)?;
        self.charge = charge;
        self.burst = burst;
        Ok(())
    }

    pub fn sample(&self, t: f32) -> CycleSample {
        let d = self.cycle_duration();
        let t = if t.is_finite() { t } else { 0.0 };
        let cycle_time = t.rem_euclid(d);
        let cycle_index = (t / d).floor().max(0.0) as u64;
        if cycle_time < self.charge {
            CycleSample {
                phase: ConductorPhase::Accumulation,
                cycle_time,
                charge_progress: cycle_time / self.charge,
                burst_progress: 0.0,
                cycle_index,
            }
        } else {
            CycleSample {
                phase: ConductorPhase::Discharge,
                cycle_time,
                charge_progress: 1.0,
                burst_progress: ((cycle_time - self.charge) / self.burst).clamp(0.0, 1.0),
                cycle_index,
            }
        }
    }
}

fn validate(charge: f32, burst: f32) -> FxResult<()> {
    if !(charge.is_finite() && charge > 0.0) {
        return Err(FxError::invalid_config(format!(
            "charge duration must be positive, got {charge}"
        )));
    }
    if !(burst.is_finite() && burst > 0.0) {
        return Err(FxError::invalid_config(format!(
            "burst duration must be positive, got {burst}"
        )));
    }
    Ok(())
}

/// Intensity of input element `index` for a sample: `p^k` with a small
/// per-element, per-cycle jitter while charging; 0 while discharging.
pub fn input_intensity(sample: &CycleSample, index: usize, exponent: f32) -> f32 {
    match sample.phase {
        ConductorPhase::Discharge => 0.0,
        ConductorPhase::Accumulation => {
            let base = sample.charge_progress.clamp(0.0, 1.0).powf(exponent.max(0.01));
            let seed = index as f32 * 17.0 + sample.cycle_index as f32 * 3.0;
            (base * (1.0 + INPUT_JITTER * jitter(seed))).clamp(0.0, 1.0)
        }
    }
}

/// Decaying output burst: `(1 - b)^2 * peak` while discharging.
pub fn burst_intensity(sample: &CycleSample, peak: f32) -> f32 {
    match sample.phase {
        ConductorPhase::Accumulation => 0.0,
        ConductorPhase::Discharge => {
            let r = 1.0 - sample.burst_progress;
            r * r * peak
        }
    }
}

/// Expanding ring for a burst progress: `(radius, thickness)`.
pub fn shockwave(burst_progress: f32) -> (f32, f32) {
    shockwave_scaled(burst_progress, SHOCKWAVE_MAX_RADIUS, SHOCKWAVE_BASE_THICKNESS)
}

pub fn shockwave_scaled(burst_progress: f32, max_radius: f32, base_thickness: f32) -> (f32, f32) {
    let b = burst_progress.clamp(0.0, 1.0);
    (b * max_radius, base_thickness * (1.0 - b))
}

