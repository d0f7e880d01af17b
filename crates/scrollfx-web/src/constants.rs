// Browser-side tuning constants

// Backing-store resolution cap; higher DPRs cost fill rate for no visible gain
pub const MAX_DEVICE_PIXEL_RATIO: f64 = 2.0;

// Extra pick radius around a node, CSS px
pub const NODE_HIT_SLOP_PX: f32 = 6.0;

// Max distance from a cable's polyline that still counts as hovering it, CSS px
pub const CABLE_HIT_TOLERANCE_PX: f32 = 8.0;

// Overlay stroke widths (CSS px)
pub const CABLE_BASE_WIDTH: f64 = 1.5;
pub const CABLE_GLOW_WIDTH: f64 = 4.0; // added per unit of glow
pub const CABLE_MAX_WIDTH: f64 = 10.0;
pub const NODE_RING_WIDTH: f64 = 2.0;

// Particle dot radius at scale 1 (CSS px)
pub const PARTICLE_RADIUS_PX: f64 = 2.2;

// Canvas shadow blur for glowing strokes
pub const GLOW_BLUR_PX: f64 = 12.0;

// Particle dot color (linear RGB)
pub const PARTICLE_COLOR: [f32; 3] = [0.82, 0.93, 1.0];
