//! Platform-free core of the scroll-synchronized animation engine.
//!
//! Everything in this crate is instance-scoped state plus per-frame update
//! functions. Nothing here touches the DOM, a GPU device or a clock: frontends
//! feed in `dt`, measurements and pointer events, and read back uniforms and
//! geometry to draw.

pub mod conductor;
pub mod constants;
pub mod curve;
pub mod desc;
pub mod ease;
pub mod effects;
pub mod error;
pub mod graph;
pub mod guide;
pub mod interaction;
pub mod lerp;
pub mod measure;
pub mod noise;
pub mod outline;
pub mod particles;
pub mod physics;
pub mod projection;
pub mod scene;
pub mod timeline;
pub mod trigger;

pub use conductor::{Conductor, ConductorPhase, CycleSample};
pub use constants::*;
pub use desc::SceneDesc;
pub use ease::Easing;
pub use effects::{Effect, EffectConfig, EffectContext, EffectKind, EffectUniforms};
pub use error::{FxError, FxResult, SkipReason};
pub use graph::{Cable, CableGeometry, CableGraph, CableId, CableShape, Node, NodeId, NodeKind};
pub use guide::{GuideEvent, GuideState};
pub use interaction::{HoverChange, InteractionContext, InteractionState};
pub use lerp::{LerpController, Smoothing, UniformField, UniformState};
pub use measure::{Measure, Rect, StaticMeasure, Viewport};
pub use outline::Outline;
pub use particles::{FieldState, Particle, ParticleField, ParticleFieldParams};
pub use physics::{Pose, RotationIntegrator, SpinMode, SpinParams};
pub use projection::{Camera, Projector, ScreenProjector};
pub use scene::{FrameReport, Scene, SceneInput};
pub use timeline::{Director, ScrollTrigger, SegmentTarget, TargetSink, TargetWrite, Timeline, TimelineSegment};
pub use trigger::{Blast, RisingEdge};

// Shaders bundled as string constants. Every effect module is prefixed with the
// shared prelude (uniform block, fullscreen vertex stage, noise kernel).
pub static COMMON_WGSL: &str = include_str!("../shaders/common.wgsl");
pub static LIGHTNING_WGSL: &str = concat!(
    include_str!("../shaders/common.wgsl"),
    include_str!("../shaders/lightning.wgsl")
);
pub static ENERGY_RING_WGSL: &str = concat!(
    include_str!("../shaders/common.wgsl"),
    include_str!("../shaders/energy_ring.wgsl")
);
pub static SHOCKWAVE_WGSL: &str = concat!(
    include_str!("../shaders/common.wgsl"),
    include_str!("../shaders/shockwave.wgsl")
);
pub static HELIX_WGSL: &str = concat!(
    include_str!("../shaders/common.wgsl"),
    include_str!("../shaders/helix.wgsl")
);
