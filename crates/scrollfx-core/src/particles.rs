//! Particle formation: a fixed pool that converges onto an outline, holds,
//! and disperses again.
//!
//! Morph and disperse each run as one pool-wide tween. Particles may start
//! late by up to `stagger` seconds, but every leg ends exactly when the tween
//! does, so the shape always completes on the same frame.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DISPERSE_RADIUS_GAIN, HIDDEN_SCALE, IDLE_REVERSE_MAX, IDLE_REVERSE_MIN, IDLE_WANDER_RADIUS,
    IDLE_WANDER_SPEED, MAX_STAGGER, MORPH_DURATION,
};
use crate::ease::{lerp, Easing};
use crate::error::{FxError, FxResult};
use crate::outline::Outline;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Index into the current outline while morphed onto it.
    pub morph_target_index: Option<usize>,
    pub opacity: f32,
    pub scale: f32,
    home: Vec2,
    reverse_in: f32,
}

impl Particle {
    /// Rest point of the idle walk.
    pub fn home(&self) -> Vec2 {
        self.home
    }

    pub fn is_visible(&self) -> bool {
        self.opacity > 1e-3
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParticleFieldParams {
    pub count: usize,
    /// Center of the scatter annulus, in the same space as outlines. When
    /// unset, scenes center it on the particle outline's centroid.
    pub center: Option<[f32; 2]>,
    pub inner_radius: f32,
    pub outer_radius: f32,
    /// Seconds from first move to last arrival.
    pub duration: f32,
    /// Spread of per-particle start delays, seconds.
    pub stagger: f32,
    pub easing: Easing,
    pub seed: u64,
}

impl Default for ParticleFieldParams {
    fn default() -> Self {
        Self {
            count: 120,
            center: None,
            inner_radius: 120.0,
            outer_radius: 260.0,
            duration: MORPH_DURATION,
            stagger: 0.2,
            easing: Easing::InOutCubic,
            seed: 7,
        }
    }
}

impl ParticleFieldParams {
    pub fn validate(&self) -> FxResult<()> {
        if self.count == 0 {
            return Err(FxError::invalid_config("particle count must be positive"));
        }
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(FxError::invalid_config(format!(
                "particle tween duration must be positive, got {}",
                self.duration
            )));
        }
        if !(self.inner_radius.is_finite()
            && self.outer_radius.is_finite()
            && self.inner_radius >= 0.0
            && self.outer_radius >= self.inner_radius)
        {
            return Err(FxError::invalid_config(
                "particle annulus needs 0 <= innerRadius <= outerRadius",
            ));
        }
        Ok(())
    }

    /// Annulus center, the origin when unset.
    pub fn center(&self) -> Vec2 {
        self.center.map(Vec2::from_array).unwrap_or(Vec2::ZERO)
    }

    /// Effective stagger: never more than the global cap or half the tween.
    pub fn effective_stagger(&self) -> f32 {
        self.stagger.clamp(0.0, MAX_STAGGER.min(self.duration * 0.5))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    Scattered,
    Morphing,
    Formed,
    Dispersing,
}

#[derive(Debug, Clone, Copy)]
struct Leg {
    from_pos: Vec2,
    to_pos: Vec2,
    from_opacity: f32,
    to_opacity: f32,
    from_scale: f32,
    to_scale: f32,
    delay: f32,
}

#[derive(Debug, Clone)]
struct Tween {
    elapsed: f32,
    legs: Vec<Leg>,
}

pub struct ParticleField {
    params: ParticleFieldParams,
    particles: Vec<Particle>,
    outline: Vec<Vec2>,
    state: FieldState,
    tween: Option<Tween>,
    rng: StdRng,
}

impl ParticleField {
    pub fn new(params: ParticleFieldParams) -> FxResult<Self> {
        params.validate()?;
        let mut rng = StdRng::seed_from_u64(params.seed);
        let center = params.center();
        let particles = (0..params.count)
            .map(|_| {
                let position = annulus_point(
                    &mut rng,
                    center,
                    params.inner_radius,
                    params.outer_radius,
                );
                let opacity = 0.2 + 0.4 * rng.gen::<f32>();
                let scale = 0.3 + 0.5 * rng.gen::<f32>();
                Particle {
                    position,
                    velocity: random_dir(&mut rng) * IDLE_WANDER_SPEED,
                    morph_target_index: None,
                    opacity,
                    scale,
                    home: position,
                    reverse_in: reverse_interval(&mut rng),
                }
            })
            .collect();
        Ok(Self {
            params,
            particles,
            outline: Vec::new(),
            state: FieldState::Scattered,
            tween: None,
            rng,
        })
    }

    pub fn params(&self) -> &ParticleFieldParams {
        &self.params
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn state(&self) -> FieldState {
        self.state
    }

    pub fn is_tweening(&self) -> bool {
        self.tween.is_some()
    }

    /// Outline points currently targeted (truncated to the pool size).
    pub fn outline(&self) -> &[Vec2] {
        &self.outline
    }

    /// Converge onto `outline`. The first `min(N, len)` particles take a
    /// point each; the rest fade out and shrink where they are.
    pub fn morph(&mut self, outline: &Outline) {
        let n = self.particles.len();
        let used = n.min(outline.len());
        self.outline = outline.points()[..used].to_vec();
        let delays = self.delays();
        let legs = self
            .particles
            .iter_mut()
            .enumerate()
            .map(|(i, p)| {
                let (to_pos, to_opacity, to_scale) = if i < used {
                    p.morph_target_index = Some(i);
                    (self.outline[i], 1.0, 1.0)
                } else {
                    p.morph_target_index = None;
                    (p.position, 0.0, HIDDEN_SCALE)
                };
                Leg {
                    from_pos: p.position,
                    to_pos,
                    from_opacity: p.opacity,
                    to_opacity,
                    from_scale: p.scale,
                    to_scale,
                    delay: delays[i],
                }
            })
            .collect();
        self.tween = Some(Tween { elapsed: 0.0, legs });
        self.state = FieldState::Morphing;
        log::debug!("particle morph: {used} of {n} particles onto outline");
    }

    /// Send every particle to a fresh random far position, fading out.
    pub fn disperse(&mut self) {
        let center = self.params.center();
        let inner = self.params.outer_radius.max(1.0) * DISPERSE_RADIUS_GAIN * 0.6;
        let outer = self.params.outer_radius.max(1.0) * DISPERSE_RADIUS_GAIN;
        let delays = self.delays();
        let mut legs = Vec::with_capacity(self.particles.len());
        for (i, p) in self.particles.iter_mut().enumerate() {
            let to_pos = annulus_point(&mut self.rng, center, inner, outer);
            p.morph_target_index = None;
            legs.push(Leg {
                from_pos: p.position,
                to_pos,
                from_opacity: p.opacity,
                to_opacity: 0.0,
                from_scale: p.scale,
                to_scale: p.scale,
                delay: delays[i],
            });
        }
        self.outline.clear();
        self.tween = Some(Tween { elapsed: 0.0, legs });
        self.state = FieldState::Dispersing;
        log::debug!("particle disperse: {} particles", self.particles.len());
    }

    pub fn tick(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        if let Some(tween) = self.tween.as_mut() {
            tween.elapsed += dt;
            let duration = self.params.duration;
            let leg_len = duration - self.params.effective_stagger();
            if tween.elapsed >= duration {
                for (p, leg) in self.particles.iter_mut().zip(&tween.legs) {
                    p.position = leg.to_pos;
                    p.opacity = leg.to_opacity;
                    p.scale = leg.to_scale;
                    p.home = leg.to_pos;
                }
                self.tween = None;
                self.state = match self.state {
                    FieldState::Morphing => FieldState::Formed,
                    _ => FieldState::Scattered,
                };
            } else {
                for (p, leg) in self.particles.iter_mut().zip(&tween.legs) {
                    let local = ((tween.elapsed - leg.delay) / leg_len).clamp(0.0, 1.0);
                    let e = self.params.easing.apply(local);
                    p.position = leg.from_pos.lerp(leg.to_pos, e);
                    // Opacity and scale use the unshaped progress so overshooting
                    // easings never push them out of range.
                    p.opacity = lerp(leg.from_opacity, leg.to_opacity, local).clamp(0.0, 1.0);
                    p.scale = lerp(leg.from_scale, leg.to_scale, local).max(0.0);
                }
            }
            return;
        }
        self.wander(dt);
    }

    /// Idle random walk around each particle's home.
    fn wander(&mut self, dt: f32) {
        for p in &mut self.particles {
            if !p.is_visible() {
                continue;
            }
            p.position += p.velocity * dt;
            p.reverse_in -= dt;
            if p.reverse_in <= 0.0 {
                let turn = (self.rng.gen::<f32>() - 0.5) * std::f32::consts::FRAC_PI_2;
                p.velocity = Vec2::from_angle(turn).rotate(-p.velocity);
                p.reverse_in = reverse_interval(&mut self.rng);
            }
            let offset = p.position - p.home;
            if offset.length() > IDLE_WANDER_RADIUS {
                p.position = p.home + offset.clamp_length_max(IDLE_WANDER_RADIUS);
                p.velocity = -p.velocity;
            }
        }
    }

    /// Per-particle start delays in `[0, stagger]`.
    fn delays(&mut self) -> Vec<f32> {
        let s = self.params.effective_stagger();
        (0..self.particles.len())
            .map(|_| self.rng.gen::<f32>() * s)
            .collect()
    }
}

fn annulus_point(rng: &mut StdRng, center: Vec2, inner: f32, outer: f32) -> Vec2 {
    // Area-uniform radius; the formula form tolerates inner == outer.
    let u: f32 = rng.gen();
    let r = (inner * inner + u * (outer * outer - inner * inner)).sqrt();
    center + random_dir(rng) * r
}

fn random_dir(rng: &mut StdRng) -> Vec2 {
    Vec2::from_angle(rng.gen::<f32>() * std::f32::consts::TAU)
}

fn reverse_interval(rng: &mut StdRng) -> f32 {
    IDLE_REVERSE_MIN + rng.gen::<f32>() * (IDLE_REVERSE_MAX - IDLE_REVERSE_MIN)
}
