// Pure pointer helpers for the overlay: coordinate mapping, node/cable picking
// and hover transitions. No DOM access, so host tests can include this file.

use glam::Vec2;

/// Pickable disc in surface space (CSS px, origin top-left of the surface).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitDisc {
    pub index: usize,
    pub center: Vec2,
    pub radius: f32,
}

/// Map a client-space pointer position into a surface rect. `None` when the
/// rect is empty or the point lies outside it.
#[inline]
pub fn client_to_surface(client: Vec2, rect_origin: Vec2, rect_size: Vec2) -> Option<Vec2> {
    if !(rect_size.x > 0.0 && rect_size.y > 0.0) || !client.is_finite() {
        return None;
    }
    let p = client - rect_origin;
    (p.x >= 0.0 && p.y >= 0.0 && p.x <= rect_size.x && p.y <= rect_size.y).then_some(p)
}

/// Closest disc containing `p` (radius grown by `slop`), by distance to its
/// center.
pub fn pick_disc(discs: &[HitDisc], p: Vec2, slop: f32) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for d in discs {
        let dist = d.center.distance(p);
        if dist <= d.radius + slop.max(0.0) {
            match best {
                Some((_, bd)) if dist >= bd => {}
                _ => best = Some((d.index, dist)),
            }
        }
    }
    best.map(|(i, _)| i)
}

#[inline]
pub fn distance_to_segment(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= f32::EPSILON {
        return a.distance(p);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    (a + ab * t).distance(p)
}

pub fn distance_to_polyline(points: &[Vec2], p: Vec2) -> f32 {
    match points {
        [] => f32::INFINITY,
        [only] => only.distance(p),
        _ => points
            .windows(2)
            .map(|w| distance_to_segment(w[0], w[1], p))
            .fold(f32::INFINITY, f32::min),
    }
}

/// Nearest polyline within `tolerance` of `p`.
pub fn pick_polyline<'a>(
    lines: impl IntoIterator<Item = (usize, &'a [Vec2])>,
    p: Vec2,
    tolerance: f32,
) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, points) in lines {
        let d = distance_to_polyline(points, p);
        if d <= tolerance {
            match best {
                Some((_, bd)) if d >= bd => {}
                _ => best = Some((index, d)),
            }
        }
    }
    best.map(|(i, _)| i)
}

/// Hover edges produced by moving from `prev` to `next`: the id left (if any)
/// and the id entered (if any). Unchanged targets produce neither.
#[inline]
pub fn hover_transition<'a>(
    prev: Option<&'a str>,
    next: Option<&'a str>,
) -> (Option<&'a str>, Option<&'a str>) {
    if prev == next {
        (None, None)
    } else {
        (prev, next)
    }
}

/// Backing-store size for a CSS box at a device pixel ratio, at least 1x1.
#[inline]
pub fn backing_size(css_width: f64, css_height: f64, dpr: f64, max_dpr: f64) -> (u32, u32) {
    let dpr = if dpr.is_finite() && dpr > 0.0 {
        dpr.min(max_dpr)
    } else {
        1.0
    };
    let w = (css_width.max(0.0) * dpr).round() as u32;
    let h = (css_height.max(0.0) * dpr).round() as u32;
    (w.max(1), h.max(1))
}
