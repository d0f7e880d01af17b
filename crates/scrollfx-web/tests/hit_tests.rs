// Host-side tests for overlay hit-testing.
// The web crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}
mod hit {
    include!("../src/hit.rs");
}

use constants::*;
use glam::Vec2;
use hit::*;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

#[test]
fn client_points_map_into_the_surface_rect() {
    let origin = Vec2::new(100.0, 50.0);
    let size = Vec2::new(400.0, 300.0);
    assert_eq!(
        client_to_surface(Vec2::new(150.0, 80.0), origin, size),
        Some(Vec2::new(50.0, 30.0))
    );
    // Edges are inside.
    assert_eq!(client_to_surface(origin, origin, size), Some(Vec2::ZERO));
    assert_eq!(client_to_surface(origin + size, origin, size), Some(size));
    // Outside or degenerate.
    assert_eq!(client_to_surface(Vec2::new(99.0, 80.0), origin, size), None);
    assert_eq!(client_to_surface(Vec2::new(150.0, 351.0), origin, size), None);
    assert_eq!(client_to_surface(Vec2::new(150.0, 80.0), origin, Vec2::ZERO), None);
    assert_eq!(
        client_to_surface(Vec2::new(f32::NAN, 80.0), origin, size),
        None
    );
}

#[test]
fn pick_disc_prefers_the_nearest_center() {
    let discs = [
        HitDisc {
            index: 0,
            center: Vec2::new(0.0, 0.0),
            radius: 20.0,
        },
        HitDisc {
            index: 1,
            center: Vec2::new(30.0, 0.0),
            radius: 20.0,
        },
    ];
    // Inside both; closer to disc 1.
    assert_eq!(pick_disc(&discs, Vec2::new(18.0, 0.0), 0.0), Some(1));
    assert_eq!(pick_disc(&discs, Vec2::new(12.0, 0.0), 0.0), Some(0));
    // Only the slop reaches it.
    assert_eq!(pick_disc(&discs, Vec2::new(-24.0, 0.0), 0.0), None);
    assert_eq!(
        pick_disc(&discs, Vec2::new(-24.0, 0.0), NODE_HIT_SLOP_PX),
        Some(0)
    );
    // Negative slop is treated as none.
    assert_eq!(pick_disc(&discs, Vec2::new(-19.0, 0.0), -50.0), Some(0));
    assert_eq!(pick_disc(&[], Vec2::ZERO, 10.0), None);
}

#[test]
fn segment_distance_clamps_to_endpoints() {
    let a = Vec2::new(0.0, 0.0);
    let b = Vec2::new(10.0, 0.0);
    assert!(approx(distance_to_segment(a, b, Vec2::new(5.0, 3.0)), 3.0));
    assert!(approx(distance_to_segment(a, b, Vec2::new(-4.0, 3.0)), 5.0));
    assert!(approx(distance_to_segment(a, b, Vec2::new(13.0, 4.0)), 5.0));
    // Degenerate segment is a point.
    assert!(approx(distance_to_segment(a, a, Vec2::new(3.0, 4.0)), 5.0));
}

#[test]
fn polyline_distance_uses_the_closest_piece() {
    let pts = [
        Vec2::new(0.0, 0.0),
        Vec2::new(10.0, 0.0),
        Vec2::new(10.0, 10.0),
    ];
    assert!(approx(distance_to_polyline(&pts, Vec2::new(12.0, 5.0)), 2.0));
    assert!(approx(distance_to_polyline(&pts, Vec2::new(5.0, -1.0)), 1.0));
    assert!(approx(
        distance_to_polyline(&pts[..1], Vec2::new(3.0, 4.0)),
        5.0
    ));
    assert!(distance_to_polyline(&[], Vec2::ZERO).is_infinite());
}

#[test]
fn pick_polyline_returns_the_nearest_line_in_tolerance() {
    let upper = [Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0)];
    let lower = [Vec2::new(0.0, 10.0), Vec2::new(100.0, 10.0)];
    let lines = || [(3usize, &upper[..]), (7usize, &lower[..])];

    assert_eq!(
        pick_polyline(lines(), Vec2::new(50.0, 3.0), CABLE_HIT_TOLERANCE_PX),
        Some(3)
    );
    assert_eq!(
        pick_polyline(lines(), Vec2::new(50.0, 8.0), CABLE_HIT_TOLERANCE_PX),
        Some(7)
    );
    assert_eq!(
        pick_polyline(lines(), Vec2::new(50.0, 40.0), CABLE_HIT_TOLERANCE_PX),
        None
    );
    // Empty geometry never matches.
    let empty: [(usize, &[Vec2]); 1] = [(0, &[])];
    assert_eq!(pick_polyline(empty, Vec2::ZERO, 1000.0), None);
}

#[test]
fn hover_transition_emits_edges_only_on_change() {
    assert_eq!(hover_transition(None, None), (None, None));
    assert_eq!(hover_transition(Some("a"), Some("a")), (None, None));
    assert_eq!(hover_transition(None, Some("a")), (None, Some("a")));
    assert_eq!(hover_transition(Some("a"), None), (Some("a"), None));
    assert_eq!(hover_transition(Some("a"), Some("b")), (Some("a"), Some("b")));
}

#[test]
fn backing_size_caps_dpr_and_never_collapses() {
    assert_eq!(backing_size(400.0, 300.0, 1.0, MAX_DEVICE_PIXEL_RATIO), (400, 300));
    assert_eq!(backing_size(400.0, 300.0, 1.5, MAX_DEVICE_PIXEL_RATIO), (600, 450));
    assert_eq!(backing_size(400.0, 300.0, 3.0, MAX_DEVICE_PIXEL_RATIO), (800, 600));
    // Bad DPR falls back to 1.
    assert_eq!(backing_size(400.0, 300.0, 0.0, MAX_DEVICE_PIXEL_RATIO), (400, 300));
    assert_eq!(
        backing_size(400.0, 300.0, f64::NAN, MAX_DEVICE_PIXEL_RATIO),
        (400, 300)
    );
    // Hidden element still gets a valid surface.
    assert_eq!(backing_size(0.0, -5.0, 2.0, MAX_DEVICE_PIXEL_RATIO), (1, 1));
}
