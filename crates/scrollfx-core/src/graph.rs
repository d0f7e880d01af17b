//! Nodes connected by curved cables.
//!
//! Cable geometry is derived every frame from the endpoints' live projected
//! positions; nothing carries over between frames except uniforms and blast
//! life. A cable that cannot be placed this frame has no geometry and is not
//! drawn.

use fnv::FnvHashMap;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use crate::constants::{
    BLAST_DURATION, BLAST_GAIN, CABLE_SAMPLES, CABLE_WOBBLE_PX, FINALE_DURATION, FINALE_PULL,
    MIN_CABLE_LENGTH, SPLINE_NUDGE,
};
use crate::curve::{polyline_length, quad_bezier, sample_spline, CurvePoints};
use crate::ease::Easing;
use crate::effects::wobble;
use crate::error::{FxError, FxResult, SkipReason};
use crate::lerp::LerpController;
use crate::measure::Viewport;
use crate::noise::signed_fbm1;
use crate::projection::Projector;
use crate::trigger::{Blast, RisingEdge};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CableId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// Hub the finale pulls everything toward.
    Center,
    #[default]
    Corner,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    /// Rest position in layout space.
    pub home: Vec3,
    /// Live position, moved by the finale pull.
    pub position: Vec3,
    /// Visual radius in pixels; cables stop at the rim.
    pub radius: f32,
    pub revealed: bool,
    pub active: bool,
    /// Guide step that unlocks this node; -1 marks the entry point.
    pub guide_index: Option<i32>,
    projected: Option<Vec2>,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind, home: Vec3, radius: f32) -> Self {
        Self {
            name: name.into(),
            kind,
            home,
            position: home,
            radius: radius.max(0.0),
            revealed: false,
            active: false,
            guide_index: None,
            projected: None,
        }
    }

    pub fn with_guide_index(mut self, index: i32) -> Self {
        self.guide_index = Some(index);
        self
    }

    /// Screen position from the last recompute.
    pub fn projected(&self) -> Option<Vec2> {
        self.projected
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CableShape {
    /// Quadratic passing through `corner` (layout space).
    Corner { corner: Vec3 },
    /// Smooth curve bowed sideways by `nudge` times its length.
    Spline {
        #[serde(default = "default_nudge")]
        nudge: f32,
    },
}

fn default_nudge() -> f32 {
    SPLINE_NUDGE
}

impl Default for CableShape {
    fn default() -> Self {
        CableShape::Spline {
            nudge: SPLINE_NUDGE,
        }
    }
}

/// Screen-space geometry of one cable for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CableGeometry {
    /// Rim-to-rim endpoints.
    pub start: Vec2,
    pub end: Vec2,
    pub controls: SmallVec<[Vec2; 4]>,
    pub points: CurvePoints,
    pub length: f32,
}

#[derive(Debug, Clone)]
pub struct Cable {
    pub name: String,
    pub from: NodeId,
    pub to: NodeId,
    pub shape: CableShape,
    pub guide_index: Option<i32>,
    pub uniforms: LerpController,
    blast: Blast,
    edge: RisingEdge,
    geometry: Option<CableGeometry>,
    skip: Option<SkipReason>,
    seed: f32,
}

impl Cable {
    pub fn geometry(&self) -> Option<&CableGeometry> {
        self.geometry.as_ref()
    }

    /// Why the cable has no geometry this frame.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        self.skip
    }

    pub fn blast(&self) -> &Blast {
        &self.blast
    }

    /// Smoothed intensity plus the decaying blast spike.
    pub fn glow(&self) -> f32 {
        self.uniforms.current().intensity + BLAST_GAIN * self.blast.life()
    }
}

#[derive(Debug, Clone, Copy)]
struct Finale {
    elapsed: f32,
}

#[derive(Debug, Default)]
pub struct CableGraph {
    nodes: Vec<Node>,
    cables: Vec<Cable>,
    node_names: FnvHashMap<String, NodeId>,
    cable_names: FnvHashMap<String, CableId>,
    finale: Option<Finale>,
    finale_done: bool,
    time: f32,
}

/// What one recompute produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphReport {
    pub drawn: usize,
    pub skipped: SmallVec<[(CableId, SkipReason); 4]>,
}

impl CableGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) -> FxResult<NodeId> {
        if self.node_names.contains_key(&node.name) {
            return Err(FxError::DuplicateComponent(node.name));
        }
        let id = NodeId(self.nodes.len());
        self.node_names.insert(node.name.clone(), id);
        self.nodes.push(node);
        Ok(id)
    }

    pub fn add_cable(
        &mut self,
        name: impl Into<String>,
        from: NodeId,
        to: NodeId,
        shape: CableShape,
        uniforms: LerpController,
    ) -> FxResult<CableId> {
        let name = name.into();
        if self.cable_names.contains_key(&name) {
            return Err(FxError::DuplicateComponent(name));
        }
        if from.0 >= self.nodes.len() || to.0 >= self.nodes.len() {
            return Err(FxError::unknown(format!("endpoint of cable `{name}`")));
        }
        let id = CableId(self.cables.len());
        self.cable_names.insert(name.clone(), id);
        self.cables.push(Cable {
            name,
            from,
            to,
            shape,
            guide_index: None,
            uniforms,
            blast: Blast::new(BLAST_DURATION),
            edge: RisingEdge::default(),
            geometry: None,
            skip: None,
            seed: id.0 as f32 * 7.31 + 1.0,
        });
        Ok(id)
    }

    pub fn set_cable_guide_index(&mut self, id: CableId, index: i32) {
        if let Some(c) = self.cables.get_mut(id.0) {
            c.guide_index = Some(index);
        }
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.node_names.get(name).copied()
    }

    pub fn cable_id(&self, name: &str) -> Option<CableId> {
        self.cable_names.get(name).copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn cable(&self, id: CableId) -> Option<&Cable> {
        self.cables.get(id.0)
    }

    pub fn cable_mut(&mut self, id: CableId) -> Option<&mut Cable> {
        self.cables.get_mut(id.0)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn cables(&self) -> &[Cable] {
        &self.cables
    }

    pub fn cable_ids(&self) -> impl Iterator<Item = CableId> + '_ {
        (0..self.cables.len()).map(CableId)
    }

    pub fn set_revealed(&mut self, id: NodeId, revealed: bool) {
        if let Some(n) = self.nodes.get_mut(id.0) {
            if n.revealed != revealed {
                log::debug!("node `{}` revealed={revealed}", n.name);
            }
            n.revealed = revealed;
        }
    }

    pub fn set_active(&mut self, id: NodeId, active: bool) {
        if let Some(n) = self.nodes.get_mut(id.0) {
            n.active = active;
        }
    }

    /// Both endpoints revealed.
    pub fn cable_visible(&self, id: CableId) -> bool {
        self.cables.get(id.0).is_some_and(|c| {
            self.nodes[c.from.0].revealed && self.nodes[c.to.0].revealed
        })
    }

    /// Fire a cable's blast. Re-firing while it decays is ignored.
    pub fn trigger_blast(&mut self, id: CableId) -> Result<(), SkipReason> {
        let cable = self
            .cables
            .get_mut(id.0)
            .ok_or(SkipReason::MissingReference)?;
        if cable.blast.fire() {
            log::debug!("blast on cable `{}`", cable.name);
            Ok(())
        } else {
            log::trace!("blast on cable `{}` ignored: still decaying", cable.name);
            Err(SkipReason::ReentrantTrigger)
        }
    }

    /// Feed an external boolean; only its rising edge fires a blast.
    pub fn set_blast_trigger(&mut self, id: CableId, value: bool) -> Result<bool, SkipReason> {
        let cable = self
            .cables
            .get_mut(id.0)
            .ok_or(SkipReason::MissingReference)?;
        if cable.edge.update(value) {
            self.trigger_blast(id).map(|_| true)
        } else {
            Ok(false)
        }
    }

    pub fn finale_started(&self) -> bool {
        self.finale.is_some() || self.finale_done
    }

    /// Pull every non-center node toward the center node and blast all
    /// cables at once. Only the first call per cycle has any effect.
    pub fn start_finale(&mut self) -> bool {
        if self.finale_started() {
            log::trace!("finale ignored: already running");
            return false;
        }
        self.finale = Some(Finale { elapsed: 0.0 });
        for cable in &mut self.cables {
            cable.blast.fire();
        }
        log::debug!("finale: pulling {} nodes to center", self.nodes.len());
        true
    }

    /// Put nodes back home and allow another finale.
    pub fn clear_finale(&mut self) {
        self.finale = None;
        self.finale_done = false;
        for n in &mut self.nodes {
            n.position = n.home;
        }
        for c in &mut self.cables {
            c.blast.clear();
        }
    }

    fn center_home(&self) -> Option<Vec3> {
        self.nodes
            .iter()
            .find(|n| n.kind == NodeKind::Center)
            .map(|n| n.home)
    }

    /// Advance finale tween, cable uniforms and blasts.
    pub fn tick(&mut self, dt: f32) {
        if !dt.is_finite() || dt < 0.0 {
            return;
        }
        self.time += dt;
        if let Some(mut finale) = self.finale {
            finale.elapsed += dt;
            let t = (finale.elapsed / FINALE_DURATION).min(1.0);
            let pull = FINALE_PULL * Easing::OutCubic.apply(t);
            if let Some(center) = self.center_home() {
                for n in &mut self.nodes {
                    if n.kind != NodeKind::Center {
                        n.position = n.home.lerp(center, pull);
                    }
                }
            }
            if t >= 1.0 {
                self.finale = None;
                self.finale_done = true;
            } else {
                self.finale = Some(finale);
            }
        }
        for c in &mut self.cables {
            c.uniforms.tick(dt);
            c.blast.tick(dt);
        }
    }

    /// Recompute all cable geometry from current node positions.
    pub fn recompute(&mut self, projector: &dyn Projector, viewport: Viewport) -> GraphReport {
        let mut report = GraphReport::default();
        for n in &mut self.nodes {
            n.projected = projector.project(n.position, viewport);
        }
        let ready = viewport.is_ready();
        for (i, cable) in self.cables.iter_mut().enumerate() {
            let a = &self.nodes[cable.from.0];
            let b = &self.nodes[cable.to.0];
            let result = if !ready {
                Err(SkipReason::MeasurementNotReady)
            } else {
                match (a.projected, b.projected) {
                    (Some(pa), Some(pb)) => build_geometry(
                        pa,
                        pb,
                        a.radius,
                        b.radius,
                        &cable.shape,
                        projector,
                        viewport,
                        self.time,
                        cable.uniforms.current().instability,
                        cable.seed,
                    ),
                    _ => Err(SkipReason::DegenerateGeometry),
                }
            };
            match result {
                Ok(g) => {
                    cable.geometry = Some(g);
                    cable.skip = None;
                    report.drawn += 1;
                }
                Err(reason) => {
                    if cable.skip != Some(reason) {
                        log::trace!("cable `{}` skipped: {reason}", cable.name);
                    }
                    cable.geometry = None;
                    cable.skip = Some(reason);
                    report.skipped.push((CableId(i), reason));
                }
            }
        }
        report
    }

    /// Un-reveal, deactivate and drop cable targets. A finale that already
    /// started is left alone; only [`CableGraph::clear_finale`] re-arms it.
    /// Blasts are cleared unless the finale is still pulling.
    pub fn reset(&mut self) {
        for n in &mut self.nodes {
            n.revealed = false;
            n.active = false;
        }
        let pulling = self.finale.is_some();
        for c in &mut self.cables {
            c.uniforms.reset_targets();
            if !pulling {
                c.blast.clear();
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn build_geometry(
    a: Vec2,
    b: Vec2,
    ra: f32,
    rb: f32,
    shape: &CableShape,
    projector: &dyn Projector,
    viewport: Viewport,
    time: f32,
    instability: f32,
    seed: f32,
) -> Result<CableGeometry, SkipReason> {
    let d = b - a;
    let len = d.length();
    if !len.is_finite() || len < MIN_CABLE_LENGTH || ra + rb + MIN_CABLE_LENGTH > len {
        return Err(SkipReason::DegenerateGeometry);
    }
    let dir = d / len;
    let start = a + dir * ra;
    let end = b - dir * rb;
    let span = len - ra - rb;

    let (controls, mut points): (SmallVec<[Vec2; 4]>, CurvePoints) = match shape {
        CableShape::Corner { corner } => {
            let c = projector
                .project(*corner, viewport)
                .ok_or(SkipReason::DegenerateGeometry)?;
            // Control point that makes the quadratic pass through the corner
            // at its midpoint.
            let ctrl = 2.0 * c - 0.5 * (start + end);
            let pts = (0..CABLE_SAMPLES)
                .map(|i| quad_bezier(start, ctrl, end, i as f32 / (CABLE_SAMPLES - 1) as f32))
                .collect();
            (smallvec![start, ctrl, end], pts)
        }
        CableShape::Spline { nudge } => {
            let normal = dir.perp();
            let (_, speed) = wobble(instability);
            let px = CABLE_WOBBLE_PX * instability.clamp(0.0, 1.0);
            let sway = px * signed_fbm1(seed + time * speed, 2);
            let mid = (start + end) * 0.5 + normal * (nudge * span + sway);
            let mut pts = sample_spline(&[start, mid, end], CABLE_SAMPLES);
            if px > 0.0 {
                let n = pts.len();
                for (i, p) in pts.iter_mut().enumerate().take(n - 1).skip(1) {
                    let s = i as f32 / (n - 1) as f32;
                    let env = (s * std::f32::consts::PI).sin();
                    *p += normal * env * px * 0.5 * signed_fbm1(s * 8.0 + seed * 3.0 + time * speed, 2);
                }
            }
            (smallvec![start, mid, end], pts)
        }
    };
    if points.iter().any(|p| !p.is_finite()) {
        return Err(SkipReason::DegenerateGeometry);
    }
    if let Some(first) = points.first_mut() {
        *first = start;
    }
    if let Some(last) = points.last_mut() {
        *last = end;
    }
    let length = polyline_length(&points);
    Ok(CableGeometry {
        start,
        end,
        controls,
        points,
        length,
    })
}
