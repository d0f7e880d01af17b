use glam::Vec2;
use smallvec::SmallVec;

pub type CurvePoints = SmallVec<[Vec2; 32]>;

#[inline]
pub fn quad_bezier(p0: Vec2, p1: Vec2, p2: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u) + p1 * (2.0 * u * t) + p2 * (t * t)
}

/// Uniform Catmull-Rom segment between `p1` and `p2`.
#[inline]
pub fn catmull_rom(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (p2 - p0) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
}

/// Unit left-hand normal of `a -> b`, or zero when the points coincide.
#[inline]
pub fn perpendicular(a: Vec2, b: Vec2) -> Vec2 {
    (b - a).perp().normalize_or_zero()
}

pub fn sample_quad(p0: Vec2, p1: Vec2, p2: Vec2, samples: usize) -> CurvePoints {
    let n = samples.max(2);
    (0..n)
        .map(|i| quad_bezier(p0, p1, p2, i as f32 / (n - 1) as f32))
        .collect()
}

/// Sample a Catmull-Rom spline through `points`, with the end points
/// duplicated so the curve passes through both.
pub fn sample_spline(points: &[Vec2], samples: usize) -> CurvePoints {
    match points.len() {
        0 => CurvePoints::new(),
        1 => smallvec::smallvec![points[0]],
        _ => {
            let n = samples.max(2);
            let segs = points.len() - 1;
            (0..n)
                .map(|i| {
                    let u = i as f32 / (n - 1) as f32 * segs as f32;
                    let seg = (u.floor() as usize).min(segs - 1);
                    let t = u - seg as f32;
                    let p0 = points[seg.saturating_sub(1)];
                    let p1 = points[seg];
                    let p2 = points[seg + 1];
                    let p3 = points[(seg + 2).min(points.len() - 1)];
                    catmull_rom(p0, p1, p2, p3, t)
                })
                .collect()
        }
    }
}

pub fn polyline_length(points: &[Vec2]) -> f32 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}
