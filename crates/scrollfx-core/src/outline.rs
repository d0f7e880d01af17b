use glam::Vec2;

use crate::error::{FxError, FxResult};

/// Fixed array of 2D points a particle pool can morph onto.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    points: Vec<Vec2>,
}

impl Outline {
    pub fn from_points(name: &str, points: Vec<Vec2>) -> FxResult<Self> {
        if points.is_empty() {
            return Err(FxError::EmptyOutline(name.to_string()));
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(FxError::invalid_config(format!(
                "outline `{name}` has non-finite points"
            )));
        }
        Ok(Self { points })
    }

    pub fn circle(center: Vec2, radius: f32, count: usize) -> Self {
        let n = count.max(1);
        let points = (0..n)
            .map(|i| {
                let a = i as f32 / n as f32 * std::f32::consts::TAU;
                center + Vec2::from_angle(a) * radius
            })
            .collect();
        Self { points }
    }

    /// `count` points spread evenly along the perimeter of a regular polygon.
    pub fn regular_polygon(center: Vec2, radius: f32, sides: usize, count: usize) -> Self {
        let sides = sides.max(3);
        let mut corners: Vec<Vec2> = (0..sides)
            .map(|i| {
                let a = i as f32 / sides as f32 * std::f32::consts::TAU
                    - std::f32::consts::FRAC_PI_2;
                center + Vec2::from_angle(a) * radius
            })
            .collect();
        corners.push(corners[0]);
        let mut points = resample_polyline(&corners, count.max(1) + 1);
        points.pop();
        Self { points }
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn centroid(&self) -> Vec2 {
        if self.points.is_empty() {
            return Vec2::ZERO;
        }
        self.points.iter().copied().sum::<Vec2>() / self.points.len() as f32
    }

    /// Axis-aligned bounds as `(min, max)`.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        self.points.iter().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(lo, hi), p| (lo.min(*p), hi.max(*p)),
        )
    }

    /// Uniformly scale and translate so the outline fits centered in the box,
    /// keeping its aspect ratio.
    pub fn fit_to(&self, min: Vec2, max: Vec2) -> Self {
        let (lo, hi) = self.bounds();
        let size = hi - lo;
        let target = max - min;
        let scale = match (size.x > f32::EPSILON, size.y > f32::EPSILON) {
            (true, true) => (target.x / size.x).min(target.y / size.y),
            (true, false) => target.x / size.x,
            (false, true) => target.y / size.y,
            (false, false) => 1.0,
        };
        let from_center = (lo + hi) * 0.5;
        let to_center = (min + max) * 0.5;
        let points = self
            .points
            .iter()
            .map(|p| to_center + (*p - from_center) * scale)
            .collect();
        Self { points }
    }

    /// Resample along arc length to exactly `count` points.
    pub fn resampled(&self, count: usize) -> Self {
        Self {
            points: resample_polyline(&self.points, count),
        }
    }
}

/// Walk `points` and emit `count` points evenly spaced by arc length,
/// including both ends.
pub fn resample_polyline(points: &[Vec2], count: usize) -> Vec<Vec2> {
    if points.is_empty() || count == 0 {
        return Vec::new();
    }
    if points.len() == 1 || count == 1 {
        return vec![points[0]; count];
    }
    let total = crate::curve::polyline_length(points);
    if total <= f32::EPSILON {
        return vec![points[0]; count];
    }
    let step = total / (count - 1) as f32;
    let mut out = Vec::with_capacity(count);
    out.push(points[0]);
    let mut seg = 0;
    let mut seg_start = 0.0;
    for k in 1..count - 1 {
        let want = step * k as f32;
        while seg < points.len() - 2
            && seg_start + points[seg].distance(points[seg + 1]) < want
        {
            seg_start += points[seg].distance(points[seg + 1]);
            seg += 1;
        }
        let a = points[seg];
        let b = points[seg + 1];
        let len = a.distance(b);
        let t = if len > f32::EPSILON {
            ((want - seg_start) / len).clamp(0.0, 1.0)
        } else {
            0.0
        };
        out.push(a.lerp(b, t));
    }
    out.push(points[points.len() - 1]);
    out
}
