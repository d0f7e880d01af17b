//! Deterministic hash and value noise.
//!
//! The same formulas live in `shaders/common.wgsl`; keep both in sync so CPU
//! overlays line up with what the GPU draws.

use glam::Vec2;

#[inline]
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// 1D hash to `[0, 1)`.
pub fn hash11(p: f32) -> f32 {
    let mut p = fract(p * 0.1031);
    p *= p + 33.33;
    p *= p + p;
    fract(p)
}

/// 2D hash to `[0, 1)`.
pub fn hash21(p: Vec2) -> f32 {
    let mut x = fract(p.x * 0.1031);
    let mut y = fract(p.y * 0.1030);
    let mut z = fract(p.x * 0.0973);
    let d = x * (y + 33.33) + y * (z + 33.33) + z * (x + 33.33);
    x += d;
    y += d;
    z += d;
    fract((x + y) * z)
}

/// Signed jitter in `[-1, 1)` derived from an integer-ish seed.
#[inline]
pub fn jitter(seed: f32) -> f32 {
    hash11(seed) * 2.0 - 1.0
}

#[inline]
fn fade(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Value noise in `[0, 1]`.
pub fn noise1(x: f32) -> f32 {
    let i = x.floor();
    let f = x - i;
    let a = hash11(i);
    let b = hash11(i + 1.0);
    a + (b - a) * fade(f)
}

/// Value noise in `[0, 1]`.
pub fn noise2(p: Vec2) -> f32 {
    let i = p.floor();
    let f = p - i;
    let a = hash21(i);
    let b = hash21(i + Vec2::X);
    let c = hash21(i + Vec2::Y);
    let d = hash21(i + Vec2::ONE);
    let u = fade(f.x);
    let v = fade(f.y);
    let ab = a + (b - a) * u;
    let cd = c + (d - c) * u;
    ab + (cd - ab) * v
}

/// Fractal sum of `noise1`, normalized back to `[0, 1]`.
pub fn fbm1(x: f32, octaves: u32) -> f32 {
    let mut sum = 0.0;
    let mut norm = 0.0;
    let mut amp = 0.5;
    let mut freq = 1.0;
    for _ in 0..octaves.max(1) {
        sum += amp * noise1(x * freq);
        norm += amp;
        amp *= 0.5;
        freq *= 2.0;
    }
    sum / norm
}

/// Fractal sum of `noise2`, normalized back to `[0, 1]`.
pub fn fbm2(p: Vec2, octaves: u32) -> f32 {
    let mut sum = 0.0;
    let mut norm = 0.0;
    let mut amp = 0.5;
    let mut q = p;
    for _ in 0..octaves.max(1) {
        sum += amp * noise2(q);
        norm += amp;
        amp *= 0.5;
        q *= 2.0;
    }
    sum / norm
}

/// Centered noise in `[-1, 1]` used for wobble displacement.
#[inline]
pub fn signed_fbm1(x: f32, octaves: u32) -> f32 {
    fbm1(x, octaves) * 2.0 - 1.0
}
