// Host-side tests for scene assembly and the per-frame update order.

use scrollfx_core::error::{FxError, SkipReason};
use scrollfx_core::guide::GuideEvent;
use scrollfx_core::measure::{Rect, StaticMeasure, Viewport};
use scrollfx_core::particles::FieldState;
use scrollfx_core::scene::{Scene, SceneInput};

const DT: f32 = 1.0 / 60.0;

const SCENE: &str = r#"{
    "trigger": { "elementId": "section" },
    "conductor": { "cycleDuration": 4.0, "burstDuration": 0.5 },
    "effects": [
        { "id": "bolt", "kind": "lightning" },
        { "id": "shock", "kind": "shockwave", "params": { "mode": "oneShot" } }
    ],
    "particles": [
        { "id": "logo", "params": { "count": 30 },
          "outline": { "type": "circle", "center": [0, 0], "radius": 50, "count": 40 } }
    ],
    "spinners": [ { "id": "fan", "mode": "spinUp" } ],
    "nodes": [
        { "id": "core", "kind": "center", "position": [400, 300], "guideIndex": -1 },
        { "id": "a", "position": [600, 300], "guideIndex": 0 },
        { "id": "b", "position": [400, 100, 0], "guideIndex": 1 }
    ],
    "cables": [
        { "id": "core-a", "from": "core", "to": "a", "guideIndex": -1 },
        { "id": "a-b", "from": "a", "to": "b", "guideIndex": 0,
          "shape": { "type": "corner", "corner": [600, 100, 0] } }
    ],
    "guide": { "totalSteps": 2 },
    "resetOnReverseComplete": true,
    "timeline": [
        { "start": 0.0, "end": 1.0,
          "targets": [ { "kind": "uniform", "component": "bolt", "field": "intensity", "from": 0, "to": 1 } ] },
        { "start": 0.2, "end": 0.3, "nonSkippable": true,
          "targets": [ { "kind": "fire", "component": "shock" } ] },
        { "start": 0.4, "end": 0.6,
          "targets": [ { "kind": "morph", "component": "logo" } ] },
        { "start": 0.0, "end": 0.2,
          "targets": [ { "kind": "start", "component": "fan" } ] }
    ]
}"#;

/// 800x600 viewport; the section is 1000px tall and starts one screen down,
/// so scroll `y` maps to progress `(y - 300) / 1000`.
fn layout() -> StaticMeasure {
    let mut m = StaticMeasure::new(Viewport::new(800.0, 600.0));
    m.insert("section", Rect::new(0.0, 600.0, 800.0, 1000.0));
    m
}

fn scroll_to(scene: &mut Scene, m: &mut StaticMeasure, y: f32) {
    m.set_scroll(y);
    scene.request_evaluation();
}

#[test]
fn builds_every_component_from_json() {
    let scene = Scene::from_json(SCENE).unwrap();
    for id in ["bolt", "shock", "logo", "fan", "core", "a", "b", "core-a", "a-b"] {
        assert!(scene.has_component(id), "missing {id}");
    }
    assert_eq!(scene.effects().len(), 2);
    assert_eq!(scene.graph().cables().len(), 2);
    assert_eq!(scene.guide().map(|g| g.step_index()), Some(-1));
    assert_eq!(scene.director().map(|d| d.timeline().segments().len()), Some(4));
}

#[test]
fn unknown_or_mismatched_targets_are_rejected() {
    let json = SCENE.replace(r#""component": "logo""#, r#""component": "nope""#);
    match Scene::from_json(&json) {
        Err(FxError::UnknownComponent(id)) => assert_eq!(id, "nope"),
        Err(e) => panic!("unexpected error {e}"),
        Ok(_) => panic!("expected an error"),
    }

    let json = SCENE.replace(r#""component": "logo""#, r#""component": "bolt""#);
    assert!(matches!(
        Scene::from_json(&json),
        Err(FxError::InvalidSegment { .. })
    ));

    let json = SCENE.replace(r#""trigger": { "elementId": "section" },"#, "");
    assert!(matches!(
        Scene::from_json(&json),
        Err(FxError::InvalidConfig(_))
    ));

    let json = SCENE.replace(r#""id": "b","#, r#""id": "a","#);
    assert!(matches!(
        Scene::from_json(&json),
        Err(FxError::DuplicateComponent(_))
    ));

    assert!(matches!(Scene::from_json("{ not json"), Err(FxError::Parse(_))));
}

#[test]
fn timeline_writes_land_before_the_same_frame_tick() {
    let mut scene = Scene::from_json(SCENE).unwrap();
    let mut m = layout();

    let report = scene.frame(DT, &m);
    assert!(report.evaluated);
    assert_eq!(report.progress, Some(0.0));

    scroll_to(&mut scene, &mut m, 800.0);
    let report = scene.frame(DT, &m);
    assert!((report.progress.unwrap() - 0.5).abs() < 1e-6);
    assert!(report.fired.iter().any(|f| f == "shock"));

    let bolt = scene.effect("bolt").unwrap().controller();
    assert!((bolt.target().intensity - 0.5).abs() < 1e-5);
    assert!(bolt.current().intensity > 0.0);

    let logo = scene.particle_field("logo").unwrap();
    assert_eq!(logo.state(), FieldState::Morphing);
    assert!(logo.is_tweening());

    let fan = scene.spinner("fan").unwrap();
    assert!(fan.integrator.has_started());
    assert!(fan.integrator.speed() > 0.0);

    assert!(scene.effect("shock").unwrap().controller().burst_active());
}

#[test]
fn scroll_back_to_top_resets_components() {
    let mut scene = Scene::from_json(SCENE).unwrap();
    let mut m = layout();
    scene.frame(DT, &m);
    scroll_to(&mut scene, &mut m, 800.0);
    scene.frame(DT, &m);

    scroll_to(&mut scene, &mut m, 0.0);
    let report = scene.frame(DT, &m);
    assert!(report.reverse_completed);
    assert_eq!(report.progress, Some(0.0));
    assert!(!scene.spinner("fan").unwrap().integrator.has_started());
    assert_eq!(
        scene.particle_field("logo").unwrap().state(),
        FieldState::Dispersing
    );
    assert!(!scene.effect("shock").unwrap().controller().burst_active());
    assert_eq!(scene.effect("bolt").unwrap().controller().target().intensity, 0.0);
    // The guide entry point stays revealed.
    let core = scene.graph().node_id("core").unwrap();
    assert!(scene.graph().node(core).unwrap().revealed);
}

#[test]
fn missing_layout_skips_then_recovers() {
    let mut scene = Scene::from_json(SCENE).unwrap();
    let mut m = StaticMeasure::new(Viewport::new(800.0, 600.0));

    let report = scene.frame(DT, &m);
    assert!(!report.evaluated);
    assert_eq!(report.skipped_for("timeline"), Some(SkipReason::MissingReference));

    m.insert("section", Rect::new(0.0, 0.0, 800.0, 1000.0));
    let report = scene.frame(DT, &m);
    assert!(report.evaluated);
    assert_eq!(report.skipped_for("timeline"), None);
    assert!((report.progress.unwrap() - 0.3).abs() < 1e-6);
}

#[test]
fn zero_sized_surface_skips_cables() {
    let json = SCENE.replace(
        r#""trigger": { "elementId": "section" },"#,
        r#""trigger": { "elementId": "section" }, "surfaceId": "stage","#,
    );
    let mut scene = Scene::from_json(&json).unwrap();
    let mut m = layout();
    let report = scene.frame(DT, &m);
    assert_eq!(report.cables_drawn, 0);
    assert_eq!(report.skipped_for("core-a"), Some(SkipReason::MeasurementNotReady));

    m.insert("stage", Rect::new(0.0, 0.0, 800.0, 600.0));
    let report = scene.frame(DT, &m);
    assert_eq!(report.cables_drawn, 2);
    assert!(report.skipped.is_empty());
}

#[test]
fn guide_walk_reveals_in_order_and_runs_finale_once() {
    let mut scene = Scene::from_json(SCENE).unwrap();
    let m = layout();
    let graph_node = |s: &Scene, id: &str| {
        let n = s.graph().node_id(id).unwrap();
        s.graph().node(n).unwrap().revealed
    };
    assert!(graph_node(&scene, "core"));
    assert!(!graph_node(&scene, "a"));

    // Hovering ahead of the guide does nothing.
    scene.set_hover("a", true);
    let report = scene.frame(DT, &m);
    assert_eq!(report.guide_events.as_slice(), &[GuideEvent::Ignored]);
    assert!(!graph_node(&scene, "a"));

    scene.set_hover("core", true);
    let report = scene.frame(DT, &m);
    assert_eq!(
        report.guide_events.as_slice(),
        &[GuideEvent::Advanced { from: -1, to: 0 }]
    );
    assert!(report.fired.iter().any(|f| f == "core-a"));
    assert!(graph_node(&scene, "a"));
    assert!(!graph_node(&scene, "b"));

    // Staying on an element is not a new hover.
    scene.set_hover("core", true);
    let report = scene.frame(DT, &m);
    assert!(report.guide_events.is_empty());

    scene.set_hover("a", false);
    scene.set_hover("a", true);
    let report = scene.frame(DT, &m);
    assert_eq!(
        report.guide_events.as_slice(),
        &[GuideEvent::Advanced { from: 0, to: 1 }]
    );
    assert!(report.fired.iter().any(|f| f == "a-b"));
    assert!(graph_node(&scene, "b"));

    scene.set_hover("b", true);
    let report = scene.frame(DT, &m);
    assert_eq!(
        report.guide_events.as_slice(),
        &[GuideEvent::FinaleStarted { from: 1 }]
    );
    assert!(scene.graph().finale_started());
    assert!(scene.guide().unwrap().is_complete());

    scene.trigger_finale();
    let report = scene.frame(DT, &m);
    assert_eq!(report.skipped_for("finale"), Some(SkipReason::ReentrantTrigger));

    scene.reset_guide();
    scene.frame(DT, &m);
    assert_eq!(scene.guide().unwrap().step_index(), -1);
    assert!(!scene.graph().finale_started());
    assert!(graph_node(&scene, "core"));
    assert!(!graph_node(&scene, "a"));
    assert!(!graph_node(&scene, "b"));
}

#[test]
fn scroll_back_to_top_keeps_a_finished_guide_finale() {
    let mut scene = Scene::from_json(SCENE).unwrap();
    let mut m = layout();
    for id in ["core", "a", "b"] {
        scene.set_hover(id, true);
        scene.frame(DT, &m);
    }
    assert!(scene.graph().finale_started());
    for _ in 0..120 {
        scene.frame(DT, &m);
    }

    scroll_to(&mut scene, &mut m, 800.0);
    scene.frame(DT, &m);
    scroll_to(&mut scene, &mut m, 0.0);
    let report = scene.frame(DT, &m);
    assert!(report.reverse_completed);
    assert!(scene.guide().unwrap().is_complete());
    assert!(scene.graph().finale_started());
    for id in ["core", "a", "b"] {
        let n = scene.graph().node_id(id).unwrap();
        assert!(scene.graph().node(n).unwrap().revealed, "{id}");
    }

    scene.trigger_finale();
    let report = scene.frame(DT, &m);
    assert_eq!(report.skipped_for("finale"), Some(SkipReason::ReentrantTrigger));
    assert!(scene.graph().finale_started());

    scene.reset_guide();
    scene.frame(DT, &m);
    assert!(!scene.graph().finale_started());
}

#[test]
fn scroll_back_to_top_while_hovered_keeps_instability_raised() {
    let mut scene = Scene::from_json(SCENE).unwrap();
    let mut m = layout();
    scene.frame(DT, &m);
    scene.set_hover("bolt", true);
    scroll_to(&mut scene, &mut m, 800.0);
    scene.frame(DT, &m);

    scroll_to(&mut scene, &mut m, 0.0);
    let report = scene.frame(DT, &m);
    assert!(report.reverse_completed);
    let target = scene.effect("bolt").unwrap().controller().target().instability;
    assert!(target > 0.5);

    scene.push_input(SceneInput::HoverClear);
    scene.frame(DT, &m);
    let target = scene.effect("bolt").unwrap().controller().target().instability;
    assert!(target < 0.5);
}

#[test]
fn hover_raises_effect_instability() {
    let mut scene = Scene::from_json(SCENE).unwrap();
    let m = layout();
    scene.frame(DT, &m);
    scene.set_hover("bolt", true);
    scene.frame(DT, &m);
    let target = scene.effect("bolt").unwrap().controller().target().instability;
    assert!(target > 0.5);

    scene.push_input(SceneInput::HoverClear);
    scene.frame(DT, &m);
    let target = scene.effect("bolt").unwrap().controller().target().instability;
    assert!(target < 0.5);
}

#[test]
fn refiring_a_running_pulse_is_reported() {
    let mut scene = Scene::from_json(SCENE).unwrap();
    let m = layout();
    scene.fire("shock");
    scene.fire("shock");
    scene.fire("ghost");
    let report = scene.frame(DT, &m);
    assert_eq!(report.fired.as_slice(), &["shock".to_string()]);
    assert_eq!(report.skipped_for("shock"), Some(SkipReason::ReentrantTrigger));
    assert_eq!(report.skipped_for("ghost"), Some(SkipReason::MissingReference));
}

#[test]
fn external_trigger_fires_on_rising_edge_only() {
    let mut scene = Scene::from_json(SCENE).unwrap();
    let m = layout();
    let trigger = |value| SceneInput::Trigger {
        component: "core-a".into(),
        value,
    };
    scene.push_input(trigger(true));
    scene.push_input(trigger(true));
    let report = scene.frame(DT, &m);
    assert_eq!(report.fired.len(), 1);
    assert!(report.skipped.is_empty());

    scene.push_input(trigger(true));
    let report = scene.frame(DT, &m);
    assert!(report.fired.is_empty());
}

#[test]
fn cable_trigger_edge_while_blast_decays_is_reported() {
    let mut scene = Scene::from_json(SCENE).unwrap();
    let mut m = layout();
    let trigger = |value| SceneInput::Trigger {
        component: "core-a".into(),
        value,
    };
    scene.frame(DT, &m);
    scene.push_input(trigger(true));
    let report = scene.frame(DT, &m);
    assert_eq!(report.fired.as_slice(), &["core-a".to_string()]);

    scene.push_input(trigger(false));
    scene.push_input(trigger(true));
    let report = scene.frame(DT, &m);
    assert!(report.fired.is_empty());
    assert_eq!(report.skipped_for("core-a"), Some(SkipReason::ReentrantTrigger));

    // A level still held high across a scroll reset is not a new edge.
    scroll_to(&mut scene, &mut m, 800.0);
    scene.frame(DT, &m);
    scroll_to(&mut scene, &mut m, 0.0);
    assert!(scene.frame(DT, &m).reverse_completed);
    scene.push_input(trigger(true));
    let report = scene.frame(DT, &m);
    assert!(report.fired.is_empty());
    assert!(report.skipped.is_empty());
}

#[test]
fn particle_scatter_centers_on_the_outline_by_default() {
    let json = SCENE.replace(r#""center": [0, 0]"#, r#""center": [300, 200]"#);
    let scene = Scene::from_json(&json).unwrap();
    let field = scene.particle_field("logo").unwrap();
    let p = field.params();
    let center = p.center();
    assert!((center.x - 300.0).abs() < 1e-3 && (center.y - 200.0).abs() < 1e-3);
    for particle in field.particles() {
        let r = particle.position.distance(center);
        assert!(r >= p.inner_radius - 1e-2 && r <= p.outer_radius + 1e-2);
    }

    let json = SCENE.replace(
        r#""params": { "count": 30 }"#,
        r#""params": { "count": 30, "center": [10, 20] }"#,
    );
    let scene = Scene::from_json(&json).unwrap();
    let p = scene.particle_field("logo").unwrap().params();
    assert_eq!(p.center, Some([10.0, 20.0]));
}

#[test]
fn teardown_stops_all_work() {
    let mut scene = Scene::from_json(SCENE).unwrap();
    let m = layout();
    scene.frame(DT, &m);
    let time = scene.effect("bolt").unwrap().controller().current().time;

    scene.teardown();
    scene.fire("shock");
    let report = scene.frame(DT, &m);
    assert!(!report.alive);
    assert!(report.fired.is_empty());
    assert!(!scene.is_alive());
    assert_eq!(scene.effect("bolt").unwrap().controller().current().time, time);
    assert!(!scene.effect("shock").unwrap().controller().burst_active());
}
