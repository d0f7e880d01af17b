use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_LERP_RATE, LERP_SNAP_EPSILON};

/// Scalar fields a timeline may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UniformField {
    Progress,
    Intensity,
    Instability,
}

impl UniformField {
    /// Clamp a value into the field's legal range.
    pub fn clamp(self, v: f32) -> f32 {
        let v = if v.is_finite() { v } else { 0.0 };
        match self {
            UniformField::Progress | UniformField::Instability => v.clamp(0.0, 1.0),
            UniformField::Intensity => v.max(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformState {
    pub time: f32,
    pub progress: f32,
    pub intensity: f32,
    pub instability: f32,
    pub color: Vec3,
}

impl Default for UniformState {
    fn default() -> Self {
        Self {
            time: 0.0,
            progress: 0.0,
            intensity: 0.0,
            instability: 0.0,
            color: Vec3::ONE,
        }
    }
}

impl UniformState {
    pub fn get(&self, field: UniformField) -> f32 {
        match field {
            UniformField::Progress => self.progress,
            UniformField::Intensity => self.intensity,
            UniformField::Instability => self.instability,
        }
    }

    fn slot(&mut self, field: UniformField) -> &mut f32 {
        match field {
            UniformField::Progress => &mut self.progress,
            UniformField::Intensity => &mut self.intensity,
            UniformField::Instability => &mut self.instability,
        }
    }
}

/// How far `current` moves toward `target` on each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Smoothing {
    /// Fixed fraction of the remaining distance per tick, in `(0, 1]`.
    PerFrame(f32),
    /// Exponential approach at `k` per second, independent of frame rate.
    PerSecond(f32),
}

impl Smoothing {
    /// Blend factor for one tick. Always in `[0, 1]`, so the approach never
    /// overshoots.
    pub fn alpha(self, dt: f32) -> f32 {
        match self {
            Smoothing::PerFrame(rate) => rate.clamp(0.0, 1.0),
            Smoothing::PerSecond(k) => (1.0 - (-dt * k.max(0.0)).exp()).clamp(0.0, 1.0),
        }
    }
}

impl Default for Smoothing {
    fn default() -> Self {
        Smoothing::PerSecond(DEFAULT_LERP_RATE)
    }
}

#[derive(Debug, Clone, Copy)]
struct Burst {
    elapsed: f32,
    speed: f32,
}

/// Smooths one effect's uniforms toward their targets every frame.
///
/// Renderers read [`LerpController::current`] only. The target record is what
/// the timeline and hover handlers write.
#[derive(Debug, Clone)]
pub struct LerpController {
    current: UniformState,
    target: UniformState,
    initial: UniformState,
    smoothing: Smoothing,
    baseline: f32,
    burst: Option<Burst>,
}

impl LerpController {
    pub fn new(initial: UniformState, smoothing: Smoothing) -> Self {
        Self {
            current: initial,
            target: initial,
            initial,
            smoothing,
            baseline: initial.intensity,
            burst: None,
        }
    }

    pub fn with_color(color: Vec3) -> Self {
        Self::new(
            UniformState {
                color,
                ..Default::default()
            },
            Smoothing::default(),
        )
    }

    pub fn current(&self) -> &UniformState {
        &self.current
    }

    pub fn target(&self) -> &UniformState {
        &self.target
    }

    pub fn smoothing(&self) -> Smoothing {
        self.smoothing
    }

    pub fn set_smoothing(&mut self, smoothing: Smoothing) {
        self.smoothing = smoothing;
    }

    pub fn set_target(&mut self, field: UniformField, value: f32) {
        let v = field.clamp(value);
        if field == UniformField::Intensity && self.burst.is_some() {
            // The running burst owns the intensity target; remember where to
            // land once it ends.
            self.baseline = v;
            return;
        }
        *self.target.slot(field) = v;
        if field == UniformField::Intensity {
            self.baseline = v;
        }
    }

    pub fn set_color_target(&mut self, color: Vec3) {
        if color.is_finite() {
            self.target.color = color;
        }
    }

    /// Progress of the running burst in `[0, 1)`, or 0 when idle.
    pub fn burst_progress(&self) -> f32 {
        self.burst.map(|b| b.elapsed).unwrap_or(0.0)
    }

    pub fn burst_active(&self) -> bool {
        self.burst.is_some()
    }

    /// Start a one-shot burst: intensity targets `peak` until the timer
    /// reaches 1, then returns to the baseline. Ignored while a burst runs.
    pub fn trigger_burst(&mut self, peak: f32, speed: f32) -> bool {
        if self.burst.is_some() {
            log::trace!("burst ignored: already running");
            return false;
        }
        if !(speed.is_finite() && speed > 0.0) {
            log::warn!("burst ignored: speed {speed} is not positive");
            return false;
        }
        self.baseline = self.target.intensity;
        self.target.intensity = UniformField::Intensity.clamp(peak);
        self.burst = Some(Burst {
            elapsed: 0.0,
            speed,
        });
        true
    }

    /// Jump `current.intensity` to `value` without touching the target; the
    /// next ticks decay it back. The only direct write allowed after init.
    pub fn impact_flash(&mut self, value: f32) {
        self.current.intensity = UniformField::Intensity.clamp(value);
    }

    pub fn tick(&mut self, dt: f32) {
        if !dt.is_finite() || dt < 0.0 {
            return;
        }
        self.current.time += dt;

        if let Some(burst) = self.burst.as_mut() {
            burst.elapsed += dt * burst.speed;
            if burst.elapsed >= 1.0 {
                self.burst = None;
                self.target.intensity = self.baseline;
            }
        }

        let a = self.smoothing.alpha(dt);
        for field in [
            UniformField::Progress,
            UniformField::Intensity,
            UniformField::Instability,
        ] {
            let target = self.target.get(field);
            approach(self.current.slot(field), target, a);
        }
        let c = &mut self.current.color;
        let t = self.target.color;
        approach(&mut c.x, t.x, a);
        approach(&mut c.y, t.y, a);
        approach(&mut c.z, t.z, a);
    }

    pub fn is_settled(&self) -> bool {
        self.burst.is_none()
            && self.current.progress == self.target.progress
            && self.current.intensity == self.target.intensity
            && self.current.instability == self.target.instability
            && self.current.color == self.target.color
    }

    /// Back to the initial record, current and target alike.
    pub fn reset(&mut self) {
        let time = self.current.time;
        self.current = UniformState {
            time,
            ..self.initial
        };
        self.target = self.initial;
        self.baseline = self.initial.intensity;
        self.burst = None;
    }

    /// Reset targets only; current values glide back.
    pub fn reset_targets(&mut self) {
        self.target = self.initial;
        self.baseline = self.initial.intensity;
        self.burst = None;
    }
}

impl Default for LerpController {
    fn default() -> Self {
        Self::new(UniformState::default(), Smoothing::default())
    }
}

#[inline]
fn approach(value: &mut f32, target: f32, alpha: f32) {
    let next = *value + (target - *value) * alpha;
    *value = if (target - next).abs() <= LERP_SNAP_EPSILON {
        target
    } else {
        next
    };
}
