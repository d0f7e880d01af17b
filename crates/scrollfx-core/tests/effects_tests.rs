// Host-side tests for the shader effect family: uniform packing, CPU mirrors
// of the shader math, and per-effect behavior.

use glam::Vec2;
use scrollfx_core::effects::helix::strand_offset;
use scrollfx_core::effects::lightning::{bolt_offset, bolt_points};
use scrollfx_core::effects::ring::{ring_radius, ring_thickness};
use scrollfx_core::effects::shockwave::ring_profile;
use scrollfx_core::effects::{
    burst_envelope, Effect, EffectConfig, EffectContext, EffectKind, EffectUniforms,
    EnergyRingEffect, EnergyRingParams, HelixEffect, HelixParams, HelixState, LightningEffect,
    LightningParams, ShockwaveEffect, ShockwaveMode, ShockwaveParams,
};
use scrollfx_core::lerp::UniformField;

#[test]
fn uniform_block_layout() {
    assert_eq!(std::mem::size_of::<EffectUniforms>(), 80);
    let u = EffectUniforms {
        intensity: 1.0,
        ..Default::default()
    };
    let bytes = bytemuck::bytes_of(&u);
    // intensity sits right after the vec3 color.
    assert_eq!(&bytes[28..32], &1.0f32.to_ne_bytes());
}

#[test]
fn every_kind_has_its_shader_entry() {
    for kind in EffectKind::ALL {
        let src = kind.shader_source();
        assert!(src.contains("fn vs_fullscreen"));
        assert!(src.contains(&format!("fn {}", kind.fragment_entry())));
    }
}

#[test]
fn config_defaults_and_validation() {
    let c: EffectConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(c, EffectConfig::default());
    assert_eq!(c.cycle_duration, 4.0);
    assert_eq!(c.burst_duration, 0.5);
    assert_eq!(c.scale_override, 1.0);
    assert!(c.fade_edges);
    assert!(c.validate().is_ok());

    let bad: EffectConfig =
        serde_json::from_str("{\"cycleDuration\": 1.0, \"burstDuration\": 2.0}").unwrap();
    assert!(bad.validate().is_err());
    let bad_scale: EffectConfig = serde_json::from_str("{\"scaleOverride\": 0.0}").unwrap();
    assert!(bad_scale.validate().is_err());
}

#[test]
fn uniforms_carry_config() {
    let config = EffectConfig {
        scale_override: 1.5,
        fade_edges: false,
        ..Default::default()
    };
    let e = LightningEffect::new(config, LightningParams::default());
    let u = e.uniforms([640.0, 480.0]);
    assert_eq!(u.resolution, [640.0, 480.0]);
    assert_eq!(u.scale, 1.5);
    assert_eq!(u.fade_edges, 0.0);
}

#[test]
fn zero_instability_is_static() {
    // With no resting jag, the bolt is the plain base curve at any time.
    for s in [0.1, 0.5, 0.9] {
        assert_eq!(bolt_offset(s, 0.0, 0.0, 1.0, 0.0), 0.0);
        assert_eq!(bolt_offset(s, 9.0, 0.0, 1.0, 0.0), 0.0);
    }
    assert_eq!(ring_radius(1.0, 0.5, 3.0, 0.0), 0.5);
    assert_eq!(ring_thickness(0.04, 0.0), 0.04);
    assert!(ring_thickness(0.04, 1.0) > 0.04);
}

#[test]
fn instability_moves_shapes_over_time() {
    let a = (0..16).any(|i| {
        let t = i as f32 * 0.3;
        (bolt_offset(0.5, t, 1.0, 1.0, 0.0) - bolt_offset(0.5, t + 0.5, 1.0, 1.0, 0.0)).abs() > 1e-4
    });
    assert!(a);
    let r = ring_radius(0.7, 0.5, 2.0, 1.0);
    assert!((r - 0.5).abs() <= 0.5 * 0.08 + 1e-6);
}

#[test]
fn bolt_is_pinned_at_both_ends() {
    let start = Vec2::new(-0.8, 0.0);
    let end = Vec2::new(0.8, 0.1);
    let pts = bolt_points(start, end, 0.2, 0.1, 3.0, 1.0, 1.0, 20);
    assert_eq!(pts.len(), 20);
    assert!(pts[0].distance(start) < 1e-4);
    assert!(pts[19].distance(end) < 1e-4);
}

#[test]
fn ring_profile_peaks_on_the_ring() {
    assert_eq!(ring_profile(0.5, 0.5, 0.1), 1.0);
    assert_eq!(ring_profile(0.7, 0.5, 0.1), 0.0);
    assert!(ring_profile(0.55, 0.5, 0.1) > 0.0);
    assert_eq!(ring_profile(0.5, 0.5, 0.0), 0.0);
}

#[test]
fn one_shot_shockwave_fires_once_until_done() {
    let params = ShockwaveParams {
        mode: ShockwaveMode::OneShot,
        speed: 2.0,
        ..Default::default()
    };
    let mut wave = ShockwaveEffect::new(EffectConfig::default(), params);
    let ctx = EffectContext::default();
    wave.update(0.016, &ctx);
    assert!(wave.ring().is_none());

    assert!(wave.fire());
    assert!(!wave.fire());
    wave.update(0.1, &ctx);
    let (r, t) = wave.ring().unwrap();
    assert!(r > 0.0 && t > 0.0);

    for _ in 0..10 {
        wave.update(0.1, &ctx);
    }
    assert!(wave.ring().is_none());
    assert!(wave.fire());
}

#[test]
fn hover_raises_instability_target() {
    let mut e = LightningEffect::new(EffectConfig::default(), LightningParams::default());
    e.update(
        0.016,
        &EffectContext {
            engaged: true,
            ..Default::default()
        },
    );
    let hovered = e.controller().target().instability;
    e.update(0.016, &EffectContext::default());
    let rest = e.controller().target().instability;
    assert!(hovered > rest);
    // The timeline may still write between hover edges.
    e.controller_mut().set_target(UniformField::Instability, 0.4);
    e.update(0.016, &EffectContext::default());
    assert_eq!(e.controller().target().instability, 0.4);
}

#[test]
fn reset_while_hovered_keeps_hover_instability() {
    let engaged = EffectContext {
        engaged: true,
        ..Default::default()
    };
    let config = EffectConfig::default;
    let mut effects: Vec<Box<dyn Effect>> = vec![
        Box::new(LightningEffect::new(config(), LightningParams::default())),
        Box::new(EnergyRingEffect::new(config(), EnergyRingParams::default())),
        Box::new(ShockwaveEffect::new(config(), ShockwaveParams::default())),
        Box::new(HelixEffect::new(config(), HelixParams::default())),
    ];
    for e in effects.iter_mut() {
        e.update(0.016, &engaged);
        let hovered = e.controller().target().instability;
        e.reset();
        e.update(0.016, &engaged);
        assert_eq!(
            e.controller().target().instability,
            hovered,
            "{}",
            e.kind().label()
        );
    }
}

#[test]
fn ring_burst_uses_the_shared_envelope() {
    let mut ring = EnergyRingEffect::new(EffectConfig::default(), EnergyRingParams::default());
    assert_eq!(ring.burst(), 0.0);
    assert!(ring.fire());
    assert_eq!(burst_envelope(ring.controller()), 1.0);
    assert_eq!(ring.burst(), 1.0);
    ring.reset();
    assert_eq!(burst_envelope(ring.controller()), 0.0);
}

#[test]
fn helix_vibrates_while_engaged() {
    let mut h = HelixEffect::new(EffectConfig::default(), HelixParams::default());
    h.set_started(true);
    let idle = EffectContext::default();
    let engaged = EffectContext {
        engaged: true,
        ..Default::default()
    };
    for _ in 0..30 {
        h.update(0.016, &idle);
    }
    assert_eq!(h.state(), HelixState::Breathing);
    for _ in 0..30 {
        h.update(0.016, &engaged);
        assert_eq!(h.pose().scale, 1.0);
    }
    assert_eq!(h.state(), HelixState::Vibrating);
    assert_eq!(h.uniforms([1.0, 1.0]).params[1][0], 1.0);
}

#[test]
fn helix_strands_are_half_a_turn_apart() {
    let a = strand_offset(0.3, 0, 0.5, 4.0, 0.3, 0.0, 0.0);
    let b = strand_offset(0.3, 1, 0.5, 4.0, 0.3, 0.0, 0.0);
    assert!((a + b).abs() < 1e-5);
}
