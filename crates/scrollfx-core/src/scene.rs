//! One animated section: every component instance plus the per-frame
//! update that drives them in a fixed order.
//!
//! Frame order: queued inputs, timeline, conductor, effects, spinners,
//! particles, graph. Inputs and timeline only write targets, so everything
//! that smooths or renders sees this frame's writes.

use std::collections::VecDeque;

use fnv::FnvHashMap;
use glam::Vec3;
use smallvec::SmallVec;

use crate::conductor::{Conductor, CycleSample};
use crate::effects::{Effect, EffectContext, EffectKind, EffectUniforms};
use crate::error::{FxError, FxResult, SkipReason};
use crate::graph::{CableGraph, CableId, NodeId};
use crate::guide::{GuideEvent, GuideState};
use crate::interaction::{HoverChange, InteractionContext};
use crate::lerp::UniformField;
use crate::measure::{Measure, Viewport};
use crate::outline::Outline;
use crate::particles::{FieldState, ParticleField};
use crate::physics::{Pose, RotationIntegrator};
use crate::projection::Projector;
use crate::timeline::{Director, FlagKind, TargetSink, TargetWrite};
use crate::trigger::RisingEdge;

/// Frames longer than this are treated as a hitch and clamped.
const MAX_FRAME_DT: f32 = 0.1;

pub struct EffectSlot {
    pub id: String,
    pub effect: Box<dyn Effect>,
    /// Element whose hover engages the effect.
    pub hover_id: String,
}

pub struct ParticleSlot {
    pub id: String,
    pub field: ParticleField,
    pub outline: Outline,
}

pub struct SpinnerSlot {
    pub id: String,
    pub hover_id: String,
    pub integrator: RotationIntegrator,
    pub pose: Pose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ComponentRef {
    Effect(usize),
    Particles(usize),
    Spinner(usize),
    Node(NodeId),
    Cable(CableId),
}

/// Host events, queued and applied at the start of the next frame.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneInput {
    Hover { id: String, hovered: bool },
    /// Pointer left the whole section.
    HoverClear,
    Fire { component: String },
    /// External boolean; only its false -> true edge fires.
    Trigger { component: String, value: bool },
    ResetGuide,
    Finale,
}

/// What happened in one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub alive: bool,
    pub progress: Option<f32>,
    pub evaluated: bool,
    pub reverse_completed: bool,
    pub fired: SmallVec<[String; 4]>,
    pub guide_events: SmallVec<[GuideEvent; 2]>,
    pub skipped: Vec<(String, SkipReason)>,
    pub cables_drawn: usize,
    pub cycle: Option<CycleSample>,
}

impl FrameReport {
    fn skip(&mut self, what: impl Into<String>, reason: SkipReason) {
        self.skipped.push((what.into(), reason));
    }

    pub fn skipped_for(&self, what: &str) -> Option<SkipReason> {
        self.skipped
            .iter()
            .find(|(w, _)| w == what)
            .map(|(_, r)| *r)
    }
}

pub struct Scene {
    pub(crate) director: Option<Director>,
    pub(crate) effects: Vec<EffectSlot>,
    pub(crate) particles: Vec<ParticleSlot>,
    pub(crate) spinners: Vec<SpinnerSlot>,
    pub(crate) graph: CableGraph,
    pub(crate) guide: Option<GuideState>,
    pub(crate) interaction: InteractionContext,
    pub(crate) conductor: Conductor,
    pub(crate) projector: Box<dyn Projector>,
    /// Element whose rect sizes the overlay; the viewport when unset.
    pub(crate) surface_id: Option<String>,
    pub(crate) index: FnvHashMap<String, ComponentRef>,
    /// Edge state for effect triggers. Cables keep their own.
    edges: FnvHashMap<String, RisingEdge>,
    pending: VecDeque<SceneInput>,
    needs_evaluation: bool,
    alive: bool,
}

impl Scene {
    pub fn new(conductor: Conductor, projector: Box<dyn Projector>) -> Self {
        Self {
            director: None,
            effects: Vec::new(),
            particles: Vec::new(),
            spinners: Vec::new(),
            graph: CableGraph::new(),
            guide: None,
            interaction: InteractionContext::new(),
            conductor,
            projector,
            surface_id: None,
            index: FnvHashMap::default(),
            edges: FnvHashMap::default(),
            pending: VecDeque::new(),
            needs_evaluation: true,
            alive: true,
        }
    }

    fn register(&mut self, id: &str, r: ComponentRef) -> FxResult<()> {
        if self.index.contains_key(id) {
            return Err(FxError::DuplicateComponent(id.to_string()));
        }
        self.index.insert(id.to_string(), r);
        Ok(())
    }

    pub fn set_director(&mut self, director: Director) {
        self.director = Some(director);
        self.needs_evaluation = true;
    }

    pub fn set_surface_id(&mut self, id: Option<String>) {
        self.surface_id = id;
    }

    pub fn add_effect(
        &mut self,
        id: impl Into<String>,
        effect: Box<dyn Effect>,
        hover_id: Option<String>,
    ) -> FxResult<()> {
        let id = id.into();
        self.register(&id, ComponentRef::Effect(self.effects.len()))?;
        let hover_id = hover_id.unwrap_or_else(|| id.clone());
        self.effects.push(EffectSlot {
            id,
            effect,
            hover_id,
        });
        Ok(())
    }

    pub fn add_particles(
        &mut self,
        id: impl Into<String>,
        field: ParticleField,
        outline: Outline,
    ) -> FxResult<()> {
        let id = id.into();
        self.register(&id, ComponentRef::Particles(self.particles.len()))?;
        self.particles.push(ParticleSlot { id, field, outline });
        Ok(())
    }

    pub fn add_spinner(
        &mut self,
        id: impl Into<String>,
        integrator: RotationIntegrator,
        hover_id: Option<String>,
    ) -> FxResult<()> {
        let id = id.into();
        self.register(&id, ComponentRef::Spinner(self.spinners.len()))?;
        let hover_id = hover_id.unwrap_or_else(|| id.clone());
        let pose = integrator.pose();
        self.spinners.push(SpinnerSlot {
            id,
            hover_id,
            integrator,
            pose,
        });
        Ok(())
    }

    pub fn add_node(&mut self, node: crate::graph::Node) -> FxResult<NodeId> {
        let name = node.name.clone();
        if self.index.contains_key(&name) {
            return Err(FxError::DuplicateComponent(name));
        }
        let id = self.graph.add_node(node)?;
        self.index.insert(name, ComponentRef::Node(id));
        Ok(id)
    }

    pub fn add_cable(
        &mut self,
        name: &str,
        from: &str,
        to: &str,
        shape: crate::graph::CableShape,
        uniforms: crate::lerp::LerpController,
        guide_index: Option<i32>,
    ) -> FxResult<CableId> {
        if self.index.contains_key(name) {
            return Err(FxError::DuplicateComponent(name.to_string()));
        }
        let a = self.graph.node_id(from).ok_or_else(|| FxError::unknown(from))?;
        let b = self.graph.node_id(to).ok_or_else(|| FxError::unknown(to))?;
        let id = self.graph.add_cable(name, a, b, shape, uniforms)?;
        if let Some(g) = guide_index {
            self.graph.set_cable_guide_index(id, g);
        }
        self.index.insert(name.to_string(), ComponentRef::Cable(id));
        Ok(id)
    }

    /// Enable the guided walkthrough and reveal its entry point.
    pub fn set_guide(&mut self, guide: GuideState) {
        self.guide = Some(guide);
        self.sync_guide_reveal();
    }

    pub fn has_component(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub(crate) fn component(&self, id: &str) -> Option<ComponentRef> {
        self.index.get(id).copied()
    }

    // --- host input -------------------------------------------------------

    pub fn push_input(&mut self, input: SceneInput) {
        if self.alive {
            self.pending.push_back(input);
        }
    }

    pub fn set_hover(&mut self, id: impl Into<String>, hovered: bool) {
        self.push_input(SceneInput::Hover {
            id: id.into(),
            hovered,
        });
    }

    pub fn fire(&mut self, component: impl Into<String>) {
        self.push_input(SceneInput::Fire {
            component: component.into(),
        });
    }

    pub fn reset_guide(&mut self) {
        self.push_input(SceneInput::ResetGuide);
    }

    pub fn trigger_finale(&mut self) {
        self.push_input(SceneInput::Finale);
    }

    /// Scroll or resize happened; re-run the timeline on the next frame.
    pub fn request_evaluation(&mut self) {
        self.needs_evaluation = true;
    }

    /// Stop all work. Later frames and inputs are no-ops.
    pub fn teardown(&mut self) {
        if !self.alive {
            return;
        }
        self.alive = false;
        self.pending.clear();
        log::debug!(
            "scene torn down ({} effects, {} particle fields)",
            self.effects.len(),
            self.particles.len()
        );
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    // --- frame ------------------------------------------------------------

    pub fn frame(&mut self, dt: f32, measure: &dyn Measure) -> FrameReport {
        let mut report = FrameReport {
            alive: self.alive,
            ..Default::default()
        };
        if !self.alive {
            return report;
        }
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };

        while let Some(input) = self.pending.pop_front() {
            self.apply_input(input, &mut report);
        }

        if self.needs_evaluation {
            self.evaluate_timeline(measure, &mut report);
        }

        let cycle = self.conductor.advance(dt);
        report.cycle = Some(cycle);

        for slot in &mut self.effects {
            let ctx = EffectContext {
                cycle,
                engaged: self.interaction.is_hovered(&slot.hover_id),
            };
            slot.effect.update(dt, &ctx);
        }

        for slot in &mut self.spinners {
            slot.integrator
                .set_engaged(self.interaction.is_hovered(&slot.hover_id));
            slot.pose = slot.integrator.step(dt);
        }

        for slot in &mut self.particles {
            slot.field.tick(dt);
        }

        self.graph.tick(dt);
        let surface = self.surface(measure);
        let graph_report = self.graph.recompute(self.projector.as_ref(), surface);
        report.cables_drawn = graph_report.drawn;
        for (id, reason) in graph_report.skipped {
            if let Some(c) = self.graph.cable(id) {
                report.skip(c.name.clone(), reason);
            }
        }
        report
    }

    fn surface(&self, measure: &dyn Measure) -> Viewport {
        match &self.surface_id {
            Some(id) => measure
                .measure(id)
                .map(|r| Viewport::new(r.width, r.height))
                .unwrap_or_default(),
            None => measure.viewport(),
        }
    }

    fn evaluate_timeline(&mut self, measure: &dyn Measure, report: &mut FrameReport) {
        let Some(director) = self.director.as_mut() else {
            self.needs_evaluation = false;
            return;
        };
        let mut sink = SceneSink {
            effects: &mut self.effects,
            particles: &mut self.particles,
            spinners: &mut self.spinners,
            graph: &mut self.graph,
            index: &self.index,
            fired: &mut report.fired,
            skipped: &mut report.skipped,
        };
        match director.evaluate(measure, &mut sink) {
            Ok(ev) => {
                self.needs_evaluation = false;
                report.evaluated = ev.changed;
                report.progress = Some(ev.progress);
                report.reverse_completed = ev.reverse_completed;
                if ev.reverse_completed {
                    self.sync_guide_reveal();
                }
            }
            Err(reason) => {
                // Keep the flag so the next frame retries.
                log::trace!("timeline skipped: {reason}");
                report.skip("timeline", reason);
                report.progress = director.progress();
            }
        }
    }

    fn apply_input(&mut self, input: SceneInput, report: &mut FrameReport) {
        match input {
            SceneInput::Hover { id, hovered } => self.apply_hover(&id, hovered, report),
            SceneInput::HoverClear => {
                for id in self.interaction.clear_hover() {
                    if let Some(ComponentRef::Node(n)) = self.component(&id) {
                        self.graph.set_active(n, false);
                    }
                }
            }
            SceneInput::Fire { component } => self.apply_fire(&component, report),
            SceneInput::Trigger { component, value } => {
                if let Some(ComponentRef::Cable(c)) = self.component(&component) {
                    match self.graph.set_blast_trigger(c, value) {
                        Ok(true) => report.fired.push(component),
                        Ok(false) => {}
                        Err(reason) => report.skip(component, reason),
                    }
                } else {
                    let edge = self.edges.entry(component.clone()).or_default();
                    if edge.update(value) {
                        self.apply_fire(&component, report);
                    }
                }
            }
            SceneInput::ResetGuide => self.apply_reset_guide(),
            SceneInput::Finale => {
                let start = match self.guide.as_mut() {
                    Some(g) => g.trigger_finale(),
                    None => true,
                };
                self.sync_guide_reveal();
                if !(start && self.graph.start_finale()) {
                    report.skip("finale", SkipReason::ReentrantTrigger);
                }
            }
        }
    }

    fn apply_hover(&mut self, id: &str, hovered: bool, report: &mut FrameReport) {
        let change = self.interaction.set_hovered(id, hovered);
        let target = self.component(id);
        if let Some(ComponentRef::Node(n)) = target {
            self.graph.set_active(n, hovered);
        }
        if change != HoverChange::Entered {
            return;
        }
        let guide_index = match target {
            Some(ComponentRef::Node(n)) => self.graph.node(n).and_then(|n| n.guide_index),
            Some(ComponentRef::Cable(c)) => self.graph.cable(c).and_then(|c| c.guide_index),
            _ => None,
        };
        let (Some(index), Some(guide)) = (guide_index, self.guide.as_mut()) else {
            return;
        };
        let event = guide.hover(index);
        match event {
            GuideEvent::Advanced { from, .. } => {
                self.sync_guide_reveal();
                self.blast_guide_cables(from, report);
            }
            GuideEvent::FinaleStarted { from } => {
                self.sync_guide_reveal();
                self.blast_guide_cables(from, report);
                self.graph.start_finale();
            }
            GuideEvent::Ignored | GuideEvent::AlreadyComplete => {}
        }
        report.guide_events.push(event);
    }

    fn blast_guide_cables(&mut self, index: i32, report: &mut FrameReport) {
        let ids: SmallVec<[CableId; 4]> = self
            .graph
            .cables()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.guide_index == Some(index))
            .map(|(i, _)| CableId(i))
            .collect();
        for id in ids {
            match self.graph.trigger_blast(id) {
                Ok(()) => {
                    if let Some(c) = self.graph.cable(id) {
                        report.fired.push(c.name.clone());
                    }
                }
                Err(reason) => {
                    if let Some(c) = self.graph.cable(id) {
                        report.skip(c.name.clone(), reason);
                    }
                }
            }
        }
    }

    fn apply_fire(&mut self, component: &str, report: &mut FrameReport) {
        let result = match self.component(component) {
            Some(ComponentRef::Effect(i)) => {
                if self.effects[i].effect.fire() {
                    Ok(())
                } else {
                    Err(SkipReason::ReentrantTrigger)
                }
            }
            Some(ComponentRef::Cable(c)) => self.graph.trigger_blast(c),
            _ => Err(SkipReason::MissingReference),
        };
        match result {
            Ok(()) => report.fired.push(component.to_string()),
            Err(reason) => {
                log::trace!("fire `{component}` skipped: {reason}");
                report.skip(component, reason);
            }
        }
    }

    fn apply_reset_guide(&mut self) {
        if let Some(g) = self.guide.as_mut() {
            g.reset();
        }
        self.graph.clear_finale();
        let ids: Vec<NodeId> = (0..self.graph.nodes().len()).map(NodeId).collect();
        for id in ids {
            self.graph.set_revealed(id, false);
            self.graph.set_active(id, false);
        }
        self.sync_guide_reveal();
        log::debug!("guide reset");
    }

    /// Reveal every node whose guide index is unlocked.
    fn sync_guide_reveal(&mut self) {
        let Some(guide) = self.guide.as_ref() else {
            return;
        };
        let unlocked: Vec<NodeId> = self
            .graph
            .nodes()
            .iter()
            .enumerate()
            .filter(|(_, n)| n.guide_index.is_some_and(|g| guide.is_revealed(g)))
            .map(|(i, _)| NodeId(i))
            .collect();
        for id in unlocked {
            self.graph.set_revealed(id, true);
        }
    }

    // --- read side --------------------------------------------------------

    pub fn effects(&self) -> &[EffectSlot] {
        &self.effects
    }

    pub fn effect(&self, id: &str) -> Option<&dyn Effect> {
        match self.component(id) {
            Some(ComponentRef::Effect(i)) => Some(self.effects[i].effect.as_ref()),
            _ => None,
        }
    }

    /// Uniform blocks for every effect, in draw order.
    pub fn effect_uniforms(&self, resolution: [f32; 2]) -> Vec<(EffectKind, EffectUniforms)> {
        self.effects
            .iter()
            .map(|s| (s.effect.kind(), s.effect.uniforms(resolution)))
            .collect()
    }

    pub fn particles(&self) -> &[ParticleSlot] {
        &self.particles
    }

    pub fn particle_field(&self, id: &str) -> Option<&ParticleField> {
        match self.component(id) {
            Some(ComponentRef::Particles(i)) => Some(&self.particles[i].field),
            _ => None,
        }
    }

    pub fn spinners(&self) -> &[SpinnerSlot] {
        &self.spinners
    }

    pub fn spinner(&self, id: &str) -> Option<&SpinnerSlot> {
        match self.component(id) {
            Some(ComponentRef::Spinner(i)) => Some(&self.spinners[i]),
            _ => None,
        }
    }

    pub fn graph(&self) -> &CableGraph {
        &self.graph
    }

    pub fn guide(&self) -> Option<&GuideState> {
        self.guide.as_ref()
    }

    pub fn interaction(&self) -> &InteractionContext {
        &self.interaction
    }

    pub fn conductor(&self) -> &Conductor {
        &self.conductor
    }

    pub fn director(&self) -> Option<&Director> {
        self.director.as_ref()
    }

    pub fn projector(&self) -> &dyn Projector {
        self.projector.as_ref()
    }
}

/// Routes director writes to the scene's components. Holds disjoint borrows
/// so the director itself can stay borrowed during evaluation.
struct SceneSink<'a> {
    effects: &'a mut [EffectSlot],
    particles: &'a mut [ParticleSlot],
    spinners: &'a mut [SpinnerSlot],
    graph: &'a mut CableGraph,
    index: &'a FnvHashMap<String, ComponentRef>,
    fired: &'a mut SmallVec<[String; 4]>,
    skipped: &'a mut Vec<(String, SkipReason)>,
}

impl SceneSink<'_> {
    fn set_uniform(&mut self, component: &str, field: UniformField, value: f32) {
        match self.index.get(component) {
            Some(ComponentRef::Effect(i)) => self.effects[*i]
                .effect
                .controller_mut()
                .set_target(field, value),
            Some(ComponentRef::Cable(c)) => {
                if let Some(cable) = self.graph.cable_mut(*c) {
                    cable.uniforms.set_target(field, value);
                }
            }
            _ => log::trace!("uniform write to unknown `{component}`"),
        }
    }

    fn set_color(&mut self, component: &str, value: Vec3) {
        match self.index.get(component) {
            Some(ComponentRef::Effect(i)) => self.effects[*i]
                .effect
                .controller_mut()
                .set_color_target(value),
            Some(ComponentRef::Cable(c)) => {
                if let Some(cable) = self.graph.cable_mut(*c) {
                    cable.uniforms.set_color_target(value);
                }
            }
            _ => log::trace!("color write to unknown `{component}`"),
        }
    }
}

impl TargetSink for SceneSink<'_> {
    fn write(&mut self, write: TargetWrite<'_>) {
        match write {
            TargetWrite::Uniform {
                component,
                field,
                value,
            } => self.set_uniform(component, field, value),
            TargetWrite::Color { component, value } => self.set_color(component, value),
            TargetWrite::Flag { kind, id, value } => match (kind, self.index.get(id)) {
                (FlagKind::Reveal, Some(ComponentRef::Node(n))) => {
                    self.graph.set_revealed(*n, value)
                }
                (FlagKind::Morph, Some(ComponentRef::Particles(i))) => {
                    let slot = &mut self.particles[*i];
                    if value {
                        slot.field.morph(&slot.outline);
                    } else {
                        slot.field.disperse();
                    }
                }
                (FlagKind::Start, Some(ComponentRef::Spinner(i))) => {
                    self.spinners[*i].integrator.set_started(value)
                }
                (FlagKind::Start, Some(ComponentRef::Effect(i))) => {
                    self.effects[*i].effect.set_started(value)
                }
                _ => log::trace!("{kind:?} flag on unknown `{id}`"),
            },
            TargetWrite::Fire {
                component,
                skipped_through,
            } => {
                let ok = match self.index.get(component) {
                    Some(ComponentRef::Effect(i)) => self.effects[*i].effect.fire(),
                    Some(ComponentRef::Cable(c)) => self.graph.trigger_blast(*c).is_ok(),
                    _ => false,
                };
                if ok {
                    if skipped_through {
                        log::debug!("fired `{component}` after fast scroll past its segment");
                    }
                    self.fired.push(component.to_string());
                } else {
                    self.skipped
                        .push((component.to_string(), SkipReason::ReentrantTrigger));
                }
            }
        }
    }

    fn reverse_complete(&mut self) {
        for slot in self.effects.iter_mut() {
            slot.effect.reset();
        }
        for slot in self.particles.iter_mut() {
            if matches!(slot.field.state(), FieldState::Formed | FieldState::Morphing) {
                slot.field.disperse();
            }
        }
        for slot in self.spinners.iter_mut() {
            slot.integrator.set_started(false);
        }
        self.graph.reset();
    }
}
