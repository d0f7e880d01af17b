// Host-side tests for the charge/discharge conductor and the effects that
// follow it.

use scrollfx_core::conductor::{
    burst_intensity, input_intensity, shockwave, Conductor, ConductorPhase,
};
use scrollfx_core::effects::{
    Effect, EffectConfig, EffectContext, EnergyRingEffect, EnergyRingParams, ShockwaveEffect,
    ShockwaveParams,
};

#[test]
fn discharge_at_3_6_seconds() {
    let c = Conductor::new(3.5, 0.5).unwrap();
    for t in [3.6, 7.6, 11.6] {
        let s = c.sample(t);
        assert_eq!(s.phase, ConductorPhase::Discharge, "t = {t}");
        assert!((s.burst_progress - 0.2).abs() < 1e-3, "t = {t}: {}", s.burst_progress);
    }
    let s = c.sample(1.75);
    assert_eq!(s.phase, ConductorPhase::Accumulation);
    assert!((s.charge_progress - 0.5).abs() < 1e-5);
    assert_eq!(s.burst_progress, 0.0);
}

#[test]
fn effects_sharing_a_conductor_stay_in_lockstep() {
    // Same timestamp reached through very different frame pacing.
    let mut smooth = Conductor::new(3.5, 0.5).unwrap();
    let mut hitchy = Conductor::new(3.5, 0.5).unwrap();
    for _ in 0..360 {
        smooth.advance(0.01);
    }
    hitchy.advance(1.0);
    hitchy.advance(2.5);
    hitchy.advance(0.1);

    let a = smooth.sample(smooth.clock());
    let b = hitchy.sample(hitchy.clock());
    assert_eq!(a.phase, ConductorPhase::Discharge);
    assert_eq!(a.phase, b.phase);
    assert!((a.burst_progress - b.burst_progress).abs() < 1e-2);

    let config = EffectConfig::default();
    let mut ring_a = EnergyRingEffect::new(config.clone(), EnergyRingParams::default());
    let mut ring_b = EnergyRingEffect::new(config, EnergyRingParams::default());
    let shared = Conductor::new(3.5, 0.5).unwrap();
    for i in 0..400 {
        let t = i as f32 * 0.02;
        let ctx = EffectContext {
            cycle: shared.sample(t),
            engaged: false,
        };
        ring_a.update(0.02, &ctx);
        ring_b.update(0.02, &ctx);
        assert_eq!(ring_a.phase(), ring_b.phase());
        assert_eq!(ring_a.input_levels(), ring_b.input_levels());
    }
}

#[test]
fn rejects_non_positive_durations() {
    assert!(Conductor::new(0.0, 0.5).is_err());
    assert!(Conductor::new(3.0, -1.0).is_err());
    assert!(Conductor::new(f32::NAN, 0.5).is_err());
    let mut c = Conductor::new(1.0, 1.0).unwrap();
    assert!(c.set_durations(2.0, 0.0).is_err());
    assert_eq!(c.cycle_duration(), 2.0);
    c.set_durations(3.0, 1.0).unwrap();
    assert_eq!(c.cycle_duration(), 4.0);
}

#[test]
fn from_config_splits_the_cycle() {
    let c = Conductor::from_config(&EffectConfig::default()).unwrap();
    assert_eq!(c.charge_duration(), 3.5);
    assert_eq!(c.burst_duration(), 0.5);
}

#[test]
fn negative_time_wraps() {
    let c = Conductor::new(1.0, 1.0).unwrap();
    let s = c.sample(-0.5);
    assert_eq!(s.phase, ConductorPhase::Discharge);
    assert!((s.burst_progress - 0.5).abs() < 1e-5);
}

#[test]
fn inputs_ramp_then_cut() {
    let c = Conductor::new(4.0, 1.0).unwrap();
    let early = c.sample(1.0);
    let late = c.sample(3.9);
    for i in 0..4 {
        let a = input_intensity(&early, i, 2.0);
        let b = input_intensity(&late, i, 2.0);
        assert!(a < b, "input {i} should be charging");
        assert!((0.0..=1.0).contains(&a) && (0.0..=1.0).contains(&b));
    }
    let discharge = c.sample(4.5);
    assert_eq!(input_intensity(&discharge, 0, 2.0), 0.0);
}

#[test]
fn burst_and_shockwave_decay() {
    let c = Conductor::new(1.0, 1.0).unwrap();
    assert_eq!(burst_intensity(&c.sample(0.5), 2.0), 0.0);
    assert!((burst_intensity(&c.sample(1.0), 2.0) - 2.0).abs() < 1e-5);
    assert!((burst_intensity(&c.sample(1.5), 2.0) - 0.5).abs() < 1e-4);

    let (r0, t0) = shockwave(0.0);
    let (r1, t1) = shockwave(1.0);
    assert_eq!(r0, 0.0);
    assert!(t0 > 0.0);
    assert!(r1 > r0);
    assert_eq!(t1, 0.0);
}

#[test]
fn conductor_shockwave_follows_discharge() {
    let c = Conductor::new(1.0, 1.0).unwrap();
    let mut wave = ShockwaveEffect::new(EffectConfig::default(), ShockwaveParams::default());
    wave.update(
        0.016,
        &EffectContext {
            cycle: c.sample(0.5),
            engaged: false,
        },
    );
    assert!(wave.wave_progress().is_none());
    wave.update(
        0.016,
        &EffectContext {
            cycle: c.sample(1.25),
            engaged: false,
        },
    );
    assert!((wave.wave_progress().unwrap() - 0.25).abs() < 1e-4);
}
