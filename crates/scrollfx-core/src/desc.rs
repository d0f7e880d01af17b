//! Serializable scene description (camelCase JSON) and the builder that
//! turns it into a runtime [`Scene`].

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::conductor::Conductor;
use crate::constants::{DEFAULT_BURST_DURATION, DEFAULT_CYCLE_DURATION};
use crate::effects::{
    Effect, EffectConfig, EffectKind, EnergyRingEffect, HelixEffect, LightningEffect,
    ShockwaveEffect,
};
use crate::error::{FxError, FxResult};
use crate::graph::{CableShape, Node, NodeKind};
use crate::guide::GuideState;
use crate::lerp::{LerpController, Smoothing, UniformState};
use crate::outline::Outline;
use crate::particles::{ParticleField, ParticleFieldParams};
use crate::physics::{RotationIntegrator, SpinMode, SpinParams};
use crate::projection::{Camera, Projector, ScreenProjector};
use crate::scene::{ComponentRef, Scene};
use crate::timeline::{Director, ScrollTrigger, SegmentTarget, Timeline, TimelineSegment};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConductorDesc {
    pub cycle_duration: f32,
    pub burst_duration: f32,
}

impl Default for ConductorDesc {
    fn default() -> Self {
        Self {
            cycle_duration: DEFAULT_CYCLE_DURATION,
            burst_duration: DEFAULT_BURST_DURATION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectDesc {
    pub id: String,
    pub kind: EffectKind,
    #[serde(default)]
    pub hover_id: Option<String>,
    #[serde(default)]
    pub config: EffectConfig,
    /// Kind-specific parameters; defaults when absent.
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutlineDesc {
    Points {
        points: Vec<[f32; 2]>,
        #[serde(default)]
        resample: Option<usize>,
    },
    Circle {
        center: [f32; 2],
        radius: f32,
        count: usize,
    },
    Polygon {
        center: [f32; 2],
        radius: f32,
        sides: usize,
        count: usize,
    },
}

impl OutlineDesc {
    pub fn build(&self, name: &str) -> FxResult<Outline> {
        match self {
            OutlineDesc::Points { points, resample } => {
                let outline = Outline::from_points(
                    name,
                    points.iter().map(|p| Vec2::from_array(*p)).collect(),
                )?;
                Ok(match resample {
                    Some(n) if *n > 0 => outline.resampled(*n),
                    _ => outline,
                })
            }
            OutlineDesc::Circle {
                center,
                radius,
                count,
            } => {
                if *count == 0 {
                    return Err(FxError::EmptyOutline(name.to_string()));
                }
                Ok(Outline::circle(Vec2::from_array(*center), *radius, *count))
            }
            OutlineDesc::Polygon {
                center,
                radius,
                sides,
                count,
            } => {
                if *count == 0 {
                    return Err(FxError::EmptyOutline(name.to_string()));
                }
                Ok(Outline::regular_polygon(
                    Vec2::from_array(*center),
                    *radius,
                    *sides,
                    *count,
                ))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticleDesc {
    pub id: String,
    #[serde(default)]
    pub params: ParticleFieldParams,
    pub outline: OutlineDesc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinnerDesc {
    pub id: String,
    #[serde(default)]
    pub hover_id: Option<String>,
    #[serde(default = "default_spin_mode")]
    pub mode: SpinMode,
    /// Overrides the preset for `mode`.
    #[serde(default)]
    pub params: Option<SpinParams>,
}

fn default_spin_mode() -> SpinMode {
    SpinMode::Struggle
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDesc {
    pub id: String,
    #[serde(default)]
    pub kind: NodeKind,
    /// `[x, y]` or `[x, y, z]`.
    pub position: Vec<f32>,
    #[serde(default = "default_node_radius")]
    pub radius: f32,
    #[serde(default)]
    pub guide_index: Option<i32>,
    #[serde(default)]
    pub revealed: bool,
}

fn default_node_radius() -> f32 {
    12.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CableDesc {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub shape: CableShape,
    #[serde(default)]
    pub guide_index: Option<i32>,
    #[serde(default)]
    pub color: Option<[f32; 3]>,
    #[serde(default)]
    pub intensity: f32,
    #[serde(default)]
    pub instability: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideDesc {
    pub total_steps: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProjectionDesc {
    Screen {
        #[serde(default)]
        normalized: bool,
    },
    Camera(Camera),
}

impl Default for ProjectionDesc {
    fn default() -> Self {
        ProjectionDesc::Screen { normalized: false }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SceneDesc {
    pub trigger: Option<ScrollTrigger>,
    /// Element sizing the overlay; nodes are projected into its rect.
    pub surface_id: Option<String>,
    pub conductor: ConductorDesc,
    pub projection: ProjectionDesc,
    pub effects: Vec<EffectDesc>,
    pub particles: Vec<ParticleDesc>,
    pub spinners: Vec<SpinnerDesc>,
    pub nodes: Vec<NodeDesc>,
    pub cables: Vec<CableDesc>,
    pub guide: Option<GuideDesc>,
    pub timeline: Vec<TimelineSegment>,
    pub reset_on_reverse_complete: bool,
}

impl SceneDesc {
    pub fn from_json(json: &str) -> FxResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn params_or_default<T>(value: &serde_json::Value) -> FxResult<T>
where
    T: Default + serde::de::DeserializeOwned,
{
    if value.is_null() {
        Ok(T::default())
    } else {
        Ok(serde_json::from_value(value.clone())?)
    }
}

fn build_effect(desc: &EffectDesc) -> FxResult<Box<dyn Effect>> {
    desc.config.validate()?;
    let config = desc.config.clone();
    let effect: Box<dyn Effect> = match desc.kind {
        EffectKind::Lightning => Box::new(LightningEffect::new(config, params_or_default(&desc.params)?)),
        EffectKind::EnergyRing => {
            Box::new(EnergyRingEffect::new(config, params_or_default(&desc.params)?))
        }
        EffectKind::Shockwave => {
            Box::new(ShockwaveEffect::new(config, params_or_default(&desc.params)?))
        }
        EffectKind::Helix => Box::new(HelixEffect::new(config, params_or_default(&desc.params)?)),
    };
    Ok(effect)
}

fn node_position(desc: &NodeDesc) -> FxResult<Vec3> {
    let p = match desc.position.as_slice() {
        [x, y] => Vec3::new(*x, *y, 0.0),
        [x, y, z] => Vec3::new(*x, *y, *z),
        _ => {
            return Err(FxError::invalid_config(format!(
                "node `{}` position needs 2 or 3 coordinates",
                desc.id
            )))
        }
    };
    if !p.is_finite() {
        return Err(FxError::invalid_config(format!(
            "node `{}` position is not finite",
            desc.id
        )));
    }
    Ok(p)
}

impl Scene {
    pub fn from_json(json: &str) -> FxResult<Self> {
        Self::from_desc(&SceneDesc::from_json(json)?)
    }

    pub fn from_desc(desc: &SceneDesc) -> FxResult<Self> {
        let c = &desc.conductor;
        let conductor = Conductor::new(c.cycle_duration - c.burst_duration, c.burst_duration)?;
        let projector: Box<dyn Projector> = match &desc.projection {
            ProjectionDesc::Screen { normalized } => Box::new(ScreenProjector {
                normalized: *normalized,
            }),
            ProjectionDesc::Camera(cam) => Box::new(cam.clone()),
        };
        let mut scene = Scene::new(conductor, projector);
        scene.set_surface_id(desc.surface_id.clone());

        for e in &desc.effects {
            scene.add_effect(e.id.clone(), build_effect(e)?, e.hover_id.clone())?;
        }
        for p in &desc.particles {
            let outline = p.outline.build(&p.id)?;
            let mut params = p.params.clone();
            if params.center.is_none() {
                params.center = Some(outline.centroid().to_array());
            }
            let field = ParticleField::new(params)?;
            scene.add_particles(p.id.clone(), field, outline)?;
        }
        for s in &desc.spinners {
            let params = s.params.clone().unwrap_or_else(|| SpinParams::for_mode(s.mode));
            scene.add_spinner(s.id.clone(), RotationIntegrator::new(params), s.hover_id.clone())?;
        }
        for n in &desc.nodes {
            let mut node = Node::new(n.id.clone(), n.kind, node_position(n)?, n.radius);
            node.guide_index = n.guide_index;
            node.revealed = n.revealed;
            scene.add_node(node)?;
        }
        for cd in &desc.cables {
            let color = cd.color.map(Vec3::from_array).unwrap_or(Vec3::ONE);
            let uniforms = LerpController::new(
                UniformState {
                    color,
                    intensity: cd.intensity.max(0.0),
                    instability: cd.instability.clamp(0.0, 1.0),
                    ..Default::default()
                },
                Smoothing::default(),
            );
            scene.add_cable(&cd.id, &cd.from, &cd.to, cd.shape.clone(), uniforms, cd.guide_index)?;
        }
        if let Some(g) = &desc.guide {
            scene.set_guide(GuideState::new(g.total_steps));
        }

        let timeline = Timeline::new(desc.timeline.clone())?
            .with_reset_on_reverse_complete(desc.reset_on_reverse_complete);
        for (i, seg) in timeline.segments().iter().enumerate() {
            for target in &seg.targets {
                check_target(&scene, i, target)?;
            }
        }
        match &desc.trigger {
            Some(trigger) => scene.set_director(Director::new(trigger.clone(), timeline)),
            None if !timeline.segments().is_empty() => {
                return Err(FxError::invalid_config("timeline given without a trigger"));
            }
            None => {}
        }

        log::info!(
            "scene built: {} effects, {} particle fields, {} spinners, {} nodes, {} cables, {} segments",
            desc.effects.len(),
            desc.particles.len(),
            desc.spinners.len(),
            desc.nodes.len(),
            desc.cables.len(),
            desc.timeline.len()
        );
        Ok(scene)
    }
}

fn check_target(scene: &Scene, index: usize, target: &SegmentTarget) -> FxResult<()> {
    let id = target.component();
    let found = scene.component(id).ok_or_else(|| FxError::unknown(id))?;
    let ok = match target {
        SegmentTarget::Uniform { .. } | SegmentTarget::Color { .. } | SegmentTarget::Fire { .. } => {
            matches!(found, ComponentRef::Effect(_) | ComponentRef::Cable(_))
        }
        SegmentTarget::Reveal { .. } => matches!(found, ComponentRef::Node(_)),
        SegmentTarget::Morph { .. } => matches!(found, ComponentRef::Particles(_)),
        SegmentTarget::Start { .. } => {
            matches!(found, ComponentRef::Spinner(_) | ComponentRef::Effect(_))
        }
    };
    if ok {
        Ok(())
    } else {
        Err(FxError::invalid_segment(
            index,
            format!("target `{id}` does not accept this kind of write"),
        ))
    }
}
