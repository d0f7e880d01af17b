// Host-side tests for the scroll timeline director.

use glam::Vec3;
use scrollfx_core::error::{FxError, SkipReason};
use scrollfx_core::lerp::UniformField;
use scrollfx_core::measure::{Rect, StaticMeasure, Viewport};
use scrollfx_core::timeline::{
    scroll_progress, Director, FlagKind, ScrollTrigger, SegmentTarget, TargetSink, TargetWrite,
    Timeline, TimelineSegment,
};
use scrollfx_core::Easing;

#[derive(Debug, Clone, PartialEq)]
enum Rec {
    Uniform(String, UniformField, f32),
    Color(String, Vec3),
    Flag(FlagKind, String, bool),
    Fire(String, bool),
}

#[derive(Default)]
struct RecordingSink {
    writes: Vec<Rec>,
    reverse_completes: usize,
}

impl RecordingSink {
    fn last_uniform(&self, id: &str) -> Option<f32> {
        self.writes.iter().rev().find_map(|w| match w {
            Rec::Uniform(c, _, v) if c == id => Some(*v),
            _ => None,
        })
    }

    fn fires(&self) -> Vec<(String, bool)> {
        self.writes
            .iter()
            .filter_map(|w| match w {
                Rec::Fire(c, s) => Some((c.clone(), *s)),
                _ => None,
            })
            .collect()
    }

    fn flags(&self) -> Vec<bool> {
        self.writes
            .iter()
            .filter_map(|w| match w {
                Rec::Flag(_, _, v) => Some(*v),
                _ => None,
            })
            .collect()
    }
}

impl TargetSink for RecordingSink {
    fn write(&mut self, write: TargetWrite<'_>) {
        self.writes.push(match write {
            TargetWrite::Uniform {
                component,
                field,
                value,
            } => Rec::Uniform(component.to_string(), field, value),
            TargetWrite::Color { component, value } => Rec::Color(component.to_string(), value),
            TargetWrite::Flag { kind, id, value } => Rec::Flag(kind, id.to_string(), value),
            TargetWrite::Fire {
                component,
                skipped_through,
            } => Rec::Fire(component.to_string(), skipped_through),
        });
    }

    fn reverse_complete(&mut self) {
        self.reverse_completes += 1;
    }
}

fn uniform(id: &str, field: UniformField) -> SegmentTarget {
    SegmentTarget::Uniform {
        component: id.into(),
        field,
        from: 0.0,
        to: 1.0,
    }
}

fn fire(id: &str) -> SegmentTarget {
    SegmentTarget::Fire {
        component: id.into(),
    }
}

fn director(segments: Vec<TimelineSegment>) -> Director {
    Director::new(
        ScrollTrigger::new("section", 0.5),
        Timeline::new(segments).unwrap(),
    )
}

#[test]
fn progress_is_reference_line_over_height() {
    assert_eq!(scroll_progress(400.0, 200.0, 400.0), Some(0.5));
    assert_eq!(scroll_progress(400.0, 900.0, 400.0), Some(0.0));
    assert_eq!(scroll_progress(400.0, -900.0, 400.0), Some(1.0));
    assert_eq!(scroll_progress(400.0, 200.0, 0.0), None);
}

#[test]
fn evaluate_measures_the_trigger_element() {
    let mut m = StaticMeasure::new(Viewport::new(800.0, 600.0));
    m.insert("section", Rect::new(0.0, 600.0, 800.0, 600.0));
    let mut d = director(vec![
        TimelineSegment::new(0.0, 1.0).with_target(uniform("ring", UniformField::Progress))
    ]);
    let mut sink = RecordingSink::default();

    let ev = d.evaluate(&m, &mut sink).unwrap();
    assert_eq!(ev.progress, 0.0);

    m.set_scroll(600.0);
    let ev = d.evaluate(&m, &mut sink).unwrap();
    assert!((ev.progress - 0.5).abs() < 1e-6);
    assert!((sink.last_uniform("ring").unwrap() - 0.5).abs() < 1e-6);
}

#[test]
fn unusable_layout_skips_without_writes() {
    let mut sink = RecordingSink::default();
    let mut d = director(vec![
        TimelineSegment::new(0.0, 1.0).with_target(uniform("ring", UniformField::Progress))
    ]);

    let mut m = StaticMeasure::new(Viewport::new(800.0, 600.0));
    assert_eq!(d.evaluate(&m, &mut sink), Err(SkipReason::MissingReference));

    m.insert("section", Rect::new(0.0, 100.0, 800.0, 0.0));
    assert_eq!(d.evaluate(&m, &mut sink), Err(SkipReason::MeasurementNotReady));

    m.insert("section", Rect::new(0.0, 100.0, 800.0, 400.0));
    m.set_viewport(Viewport::new(0.0, 0.0));
    assert_eq!(d.evaluate(&m, &mut sink), Err(SkipReason::MeasurementNotReady));

    assert!(sink.writes.is_empty());
    assert_eq!(d.progress(), None);
}

#[test]
fn uniforms_interpolate_with_segment_easing() {
    let mut d = director(vec![
        TimelineSegment::new(0.5, 0.9).with_target(uniform("bolt", UniformField::Intensity)),
        TimelineSegment::new(0.5, 0.9)
            .with_easing(Easing::InQuad)
            .with_target(uniform("quad", UniformField::Intensity)),
    ]);
    let mut sink = RecordingSink::default();
    d.apply_progress(0.7, &mut sink);
    assert!((sink.last_uniform("bolt").unwrap() - 0.5).abs() < 1e-5);
    assert!((sink.last_uniform("quad").unwrap() - 0.25).abs() < 1e-5);
}

#[test]
fn colors_interpolate_componentwise() {
    let mut d = director(vec![TimelineSegment::new(0.0, 1.0).with_target(
        SegmentTarget::Color {
            component: "ring".into(),
            from: [0.0, 0.0, 1.0],
            to: [1.0, 0.0, 0.0],
        },
    )]);
    let mut sink = RecordingSink::default();
    d.apply_progress(0.5, &mut sink);
    match sink.writes.last() {
        Some(Rec::Color(id, v)) => {
            assert_eq!(id, "ring");
            assert!((*v - Vec3::new(0.5, 0.0, 0.5)).length() < 1e-5);
        }
        other => panic!("expected a color write, got {other:?}"),
    }
}

#[test]
fn fast_scroll_settles_and_fires_only_non_skippable() {
    let mut d = director(vec![
        TimelineSegment::new(0.0, 1.0).with_target(uniform("bg", UniformField::Progress)),
        TimelineSegment::new(0.4, 0.5).with_target(fire("shock")).non_skippable(),
        TimelineSegment::new(0.45, 0.55).with_target(fire("spark")),
        TimelineSegment::new(0.35, 0.45).with_target(uniform("bolt", UniformField::Intensity)),
        TimelineSegment::new(0.6, 0.8).with_target(fire("late")),
    ]);
    let mut sink = RecordingSink::default();
    d.apply_progress(0.3, &mut sink);
    assert!(sink.fires().is_empty());
    assert_eq!(sink.last_uniform("bolt"), None);

    let ev = d.apply_progress(0.7, &mut sink);
    assert_eq!(ev.fired, 2);
    assert_eq!(
        sink.fires(),
        vec![("shock".to_string(), true), ("late".to_string(), false)]
    );
    assert_eq!(sink.last_uniform("bolt"), Some(1.0));
    assert!((sink.last_uniform("bg").unwrap() - 0.7).abs() < 1e-6);
}

#[test]
fn incremental_scroll_fires_once_per_forward_crossing() {
    let mut d = director(vec![
        TimelineSegment::new(0.4, 0.5).with_target(fire("shock"))
    ]);
    let mut sink = RecordingSink::default();
    for i in 0..=20 {
        d.apply_progress(i as f32 * 0.05, &mut sink);
    }
    assert_eq!(sink.fires().len(), 1);

    // Back up and cross again slowly.
    for i in (0..=6).rev() {
        d.apply_progress(i as f32 * 0.05, &mut sink);
    }
    for i in 6..=12 {
        d.apply_progress(i as f32 * 0.05, &mut sink);
    }
    assert_eq!(sink.fires().len(), 2);
}

#[test]
fn first_evaluation_settles_behind_but_never_fires() {
    let mut d = director(vec![
        TimelineSegment::new(0.1, 0.2)
            .with_target(uniform("early", UniformField::Intensity))
            .with_target(fire("shock"))
            .non_skippable(),
        TimelineSegment::new(0.8, 0.9).with_target(uniform("later", UniformField::Intensity)),
    ]);
    let mut sink = RecordingSink::default();
    let ev = d.apply_progress(0.5, &mut sink);
    assert_eq!(ev.fired, 0);
    assert_eq!(sink.last_uniform("early"), Some(1.0));
    assert_eq!(sink.last_uniform("later"), None);
}

#[test]
fn backward_scroll_settles_segments_at_zero() {
    let mut d = director(vec![
        TimelineSegment::new(0.2, 0.4).with_target(uniform("bolt", UniformField::Intensity))
    ]);
    let mut sink = RecordingSink::default();
    d.apply_progress(0.5, &mut sink);
    assert_eq!(sink.last_uniform("bolt"), Some(1.0));
    let ev = d.apply_progress(0.1, &mut sink);
    assert_eq!(ev.fired, 0);
    assert_eq!(sink.last_uniform("bolt"), Some(0.0));
    assert!(sink.fires().is_empty());
}

#[test]
fn unchanged_progress_writes_nothing() {
    let mut d = director(vec![
        TimelineSegment::new(0.0, 1.0).with_target(uniform("bg", UniformField::Progress))
    ]);
    let mut sink = RecordingSink::default();
    assert!(d.apply_progress(0.3, &mut sink).changed);
    let n = sink.writes.len();
    let ev = d.apply_progress(0.3, &mut sink);
    assert!(!ev.changed);
    assert_eq!(sink.writes.len(), n);
}

#[test]
fn flags_are_written_on_change_only() {
    let mut d = director(vec![TimelineSegment::new(0.1, 0.3).with_target(
        SegmentTarget::Reveal {
            node: "core".into(),
        },
    )]);
    let mut sink = RecordingSink::default();
    d.apply_progress(0.2, &mut sink);
    d.apply_progress(0.25, &mut sink);
    d.apply_progress(0.28, &mut sink);
    assert_eq!(sink.flags(), vec![true]);
    d.apply_progress(0.05, &mut sink);
    d.apply_progress(0.2, &mut sink);
    assert_eq!(sink.flags(), vec![true, false, true]);
}

#[test]
fn reverse_complete_resets_when_enabled() {
    let segs = vec![TimelineSegment::new(0.0, 0.5).with_target(uniform("bg", UniformField::Progress))];

    let mut d = Director::new(
        ScrollTrigger::new("section", 0.5),
        Timeline::new(segs.clone())
            .unwrap()
            .with_reset_on_reverse_complete(true),
    );
    let mut sink = RecordingSink::default();
    d.apply_progress(0.6, &mut sink);
    let ev = d.apply_progress(0.0, &mut sink);
    assert!(ev.reverse_completed);
    assert_eq!(sink.reverse_completes, 1);
    assert!(!d.apply_progress(0.0, &mut sink).reverse_completed);
    assert_eq!(sink.reverse_completes, 1);

    let mut d = director(segs);
    let mut sink = RecordingSink::default();
    d.apply_progress(0.6, &mut sink);
    assert!(!d.apply_progress(0.0, &mut sink).reverse_completed);
    assert_eq!(sink.reverse_completes, 0);
}

#[test]
fn rewind_makes_the_next_evaluation_a_first_one() {
    let mut d = director(vec![
        TimelineSegment::new(0.2, 0.3).with_target(fire("shock")).non_skippable()
    ]);
    let mut sink = RecordingSink::default();
    d.apply_progress(0.1, &mut sink);
    d.rewind();
    assert_eq!(d.progress(), None);
    d.apply_progress(0.9, &mut sink);
    assert!(sink.fires().is_empty());
}

#[test]
fn invalid_segments_are_rejected() {
    let bad = [
        TimelineSegment::new(0.6, 0.4),
        TimelineSegment::new(0.2, 1.2),
        TimelineSegment::new(-0.1, 0.5),
        TimelineSegment::new(f32::NAN, 0.5),
        TimelineSegment::new(0.1, 0.2).with_easing(Easing::Power(0.0)),
    ];
    for seg in bad {
        let ok = TimelineSegment::new(0.0, 1.0);
        match Timeline::new(vec![ok, seg]) {
            Err(FxError::InvalidSegment { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected InvalidSegment, got {other:?}"),
        }
    }
}

#[test]
fn segments_are_ordered_by_start() {
    let t = Timeline::new(vec![
        TimelineSegment::new(0.5, 0.6),
        TimelineSegment::new(0.1, 0.9),
        TimelineSegment::new(0.3, 0.3),
    ])
    .unwrap();
    let starts: Vec<f32> = t.segments().iter().map(|s| s.start).collect();
    assert_eq!(starts, vec![0.1, 0.3, 0.5]);
}

#[test]
fn segments_deserialize_from_json() {
    let json = r#"[
        {"start": 0.1, "end": 0.4, "easing": "outCubic",
         "targets": [{"kind": "uniform", "component": "bolt", "field": "intensity", "from": 0, "to": 1}]},
        {"start": 0.5, "end": 0.5, "nonSkippable": true,
         "targets": [{"kind": "fire", "component": "shock"}]}
    ]"#;
    let segs: Vec<TimelineSegment> = serde_json::from_str(json).unwrap();
    assert_eq!(segs[0].easing, Easing::OutCubic);
    assert!(segs[1].non_skippable);
    assert_eq!(segs[1].targets[0].component(), "shock");
}
