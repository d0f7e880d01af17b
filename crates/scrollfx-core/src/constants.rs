// Shared tuning constants for the engine. Frontends read these too.

// Uniform smoothing
pub const DEFAULT_LERP_RATE: f32 = 6.0; // per-second approach rate for uniforms
pub const LERP_SNAP_EPSILON: f32 = 1e-4; // below this distance current snaps to target
pub const DEFAULT_BURST_SPEED: f32 = 2.0; // burst timer units per second
pub const IMPACT_FLASH_INTENSITY: f32 = 2.5; // intensity written by an impact flash

// Conductor defaults
pub const DEFAULT_CYCLE_DURATION: f32 = 4.0; // seconds, charge + burst
pub const DEFAULT_BURST_DURATION: f32 = 0.5; // seconds of discharge per cycle
pub const DEFAULT_CHARGE_EXPONENT: f32 = 2.0; // shapes input ramp as p^k
pub const INPUT_JITTER: f32 = 0.08; // per-input random intensity spread
pub const BURST_PEAK_SCALE: f32 = 1.6; // output intensity at the start of a discharge
pub const SHOCKWAVE_MAX_RADIUS: f32 = 0.9; // in effect-local units (1.0 = half short edge)
pub const SHOCKWAVE_BASE_THICKNESS: f32 = 0.12;
pub const MAX_RING_INPUTS: usize = 4; // input arcs packed into the uniform block

// Instability wobble
pub const WOBBLE_AMPLITUDE: f32 = 0.08; // displacement at instability = 1
pub const WOBBLE_BASE_SPEED: f32 = 1.5;
pub const WOBBLE_SPEED_GAIN: f32 = 10.0; // extra speed at instability = 1
pub const WOBBLE_THICKEN: f32 = 1.5; // thickness multiplier at instability = 1

// Particles
pub const MORPH_DURATION: f32 = 1.2; // seconds for one morph/disperse tween
pub const MAX_STAGGER: f32 = 0.3; // total per-particle delay spread, seconds
pub const IDLE_WANDER_SPEED: f32 = 6.0; // px/s for the idle random walk
pub const IDLE_WANDER_RADIUS: f32 = 4.0; // px the walk may stray from home
pub const IDLE_REVERSE_MIN: f32 = 0.4; // seconds between velocity reversals
pub const IDLE_REVERSE_MAX: f32 = 1.6;
pub const DISPERSE_RADIUS_GAIN: f32 = 2.5; // disperse targets land this far out vs. the annulus
pub const HIDDEN_SCALE: f32 = 0.05; // "approximately zero" scale for unused particles

// Spinners
pub const STRUGGLE_FAST_SPEED: f32 = 2.4; // rad/s when free
pub const STRUGGLE_SLOW_SPEED: f32 = 0.25; // rad/s while fighting the pull
pub const SPIN_IDLE_SPEED: f32 = 0.3; // rad/s coasting
pub const SPIN_CAP_SPEED: f32 = 9.0; // rad/s on hover
pub const TENSION_JITTER_FREQ: f32 = 38.0; // Hz-ish, rad multiplier on time
pub const TENSION_JITTER_AMPLITUDE: f32 = 0.035; // rad
pub const BREATHE_SPEED: f32 = 1.7;
pub const BREATHE_AMPLITUDE: f32 = 0.04;

// Cables
pub const MIN_CABLE_LENGTH: f32 = 4.0; // px; shorter cables are not drawn
pub const CABLE_SAMPLES: usize = 24; // polyline points per cable
pub const SPLINE_NUDGE: f32 = 0.18; // midpoint offset as a fraction of length
pub const CABLE_WOBBLE_PX: f32 = 6.0; // lateral noise at instability = 1
pub const BLAST_DURATION: f32 = 0.6; // seconds for a blast to decay
pub const BLAST_GAIN: f32 = 2.0; // intensity added at full blast life
pub const FINALE_PULL: f32 = 0.65; // fraction of the way nodes travel toward center
pub const FINALE_DURATION: f32 = 1.4; // seconds for the pull tween

// Timeline
pub const PROGRESS_EPSILON: f32 = 1e-6;
