//! Centralised movement and idle-production constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place.  Every constant is mirrored by a field on
//! [`crate::config::GameConfig`] and can be overridden from `assets/game.toml`.
//!
//! ## Units
//!
//! World space is +Y up.  Velocities are world units per **second**.  Values
//! that were originally tuned per physics step are converted at 60 steps/s.

// ── World ─────────────────────────────────────────────────────────────────────

/// Downward gravity applied through `RapierConfiguration` (u/s²).
///
/// Together with the jump force table this sets the arc height:
/// `h = v² / 2g` ≈ 120 u for the first jump, ≈ 200 u for the third.
pub const GRAVITY: f32 = 1500.0;

// ── Player Body ───────────────────────────────────────────────────────────────

/// Player collider half-extents (world units).
pub const PLAYER_HALF_WIDTH: f32 = 16.0;
pub const PLAYER_HALF_HEIGHT: f32 = 24.0;

/// Contact friction on the player collider.  Kept low so the body does not
/// stick to platform sides; horizontal speed is driven by the velocity blend.
pub const PLAYER_FRICTION: f32 = 0.05;

/// Where the player spawns relative to the world origin.
pub const PLAYER_SPAWN_X: f32 = -300.0;
pub const PLAYER_SPAWN_Y: f32 = 120.0;

// ── Ground Detection ──────────────────────────────────────────────────────────

/// Vertical band (u) around a surface top within which the feet count as touching.
///
/// Tested range: 3.0–8.0.  Below ~3 the solver's resting jitter produces
/// one-frame false negatives; above ~8 the player "lands" visibly in mid-air.
pub const GROUND_TOLERANCE: f32 = 5.0;

/// The feet probe sits this far above the collider's bottom edge.
pub const FEET_INSET: f32 = 2.0;

/// Horizontal margin trimmed from each side of a surface before the player's
/// centre is considered "over" it.  Stops edge-hanging from counting as support.
pub const SURFACE_EDGE_MARGIN: f32 = 4.0;

/// Grace period (s) after walking off a surface during which the player still
/// counts as grounded.
pub const COYOTE_TIME: f32 = 0.100;

/// How long (s) an unhonoured jump press is remembered before landing.
pub const JUMP_BUFFER_TIME: f32 = 0.150;

/// Post-landing window (s) with reduced control and no buffered jumps.
pub const LANDING_RECOVERY_TIME: f32 = 0.080;

/// Max-speed multiplier applied while landing recovery is active.
pub const LANDING_SPEED_DAMPING: f32 = 0.85;

/// Downward speed (u/s) at touchdown above which a `LandImpact` event fires.
pub const HARD_LANDING_SPEED: f32 = 700.0;

// ── Jump State Machine ────────────────────────────────────────────────────────

/// Upward speed (u/s) above which a grounded player is considered to be rising.
pub const RISE_VELOCITY_THRESHOLD: f32 = 30.0;

/// Half-width (u/s) of the band around zero vertical speed that marks the apex.
pub const PEAK_VELOCITY_BAND: f32 = 120.0;

/// Downward speed (u/s) past which a player at the apex is considered falling.
pub const FALL_VELOCITY_THRESHOLD: f32 = 30.0;

// ── Jumping ───────────────────────────────────────────────────────────────────

/// Jumps available between landings.
pub const MAX_JUMPS: u32 = 3;

/// Upward velocity (u/s) set by each jump, indexed by jump number − 1.
///
/// Each jump is stronger than the last so the third one feels climactic.
pub const JUMP_FORCES: [f32; 3] = [600.0, 690.0, 780.0];

/// Fraction of the current horizontal velocity added on take-off.
pub const JUMP_HORIZONTAL_BOOST: f32 = 0.1;

// ── Horizontal Movement ───────────────────────────────────────────────────────

/// Target horizontal speed (u/s) on the ground and in the air.
pub const GROUND_MAX_SPEED: f32 = 300.0;
pub const AIR_MAX_SPEED: f32 = 270.0;

/// Per-frame (60 Hz) blend factors toward the target horizontal velocity.
///
/// `*_REVERSE_SNAP` applies when input opposes the current motion,
/// `*_SNAP` when it continues it, `*_STOP_SNAP` when there is no input.
pub const GROUND_REVERSE_SNAP: f32 = 0.5;
pub const GROUND_SNAP: f32 = 0.2;
pub const GROUND_STOP_SNAP: f32 = 0.3;
pub const AIR_REVERSE_SNAP: f32 = 0.15;
pub const AIR_SNAP: f32 = 0.08;
pub const AIR_STOP_SNAP: f32 = 0.03;

// ── Self-Righting ─────────────────────────────────────────────────────────────

/// Rotation (rad) tolerated before the righting correction kicks in.
pub const UPRIGHT_TOLERANCE: f32 = 0.05;

/// Angular velocity (rad/s) applied per radian of tilt to bring the body upright.
pub const RIGHTING_RATE: f32 = 8.0;

// ── Idle Production: Decay ────────────────────────────────────────────────────

/// Fraction of a lane's rate lost per hour at zero stability.
pub const DECAY_RATE_PER_HOUR: f64 = 0.02;

/// How strongly stability dampens decay: `effective = rate × (1 − stability × k)`.
pub const STABILITY_DECAY_DAMPING: f64 = 0.5;

/// Minimum fraction of the base rate a lane can decay to.
pub const DECAY_FLOOR: f64 = 0.6;

// ── Idle Production: Offline ──────────────────────────────────────────────────

/// Maximum offline time (hours) credited on catch-up.
pub const OFFLINE_CAP_HOURS: f64 = 10.0;

/// A restored snapshot older than this (s) triggers offline catch-up.
pub const OFFLINE_TRIGGER_SECS: f64 = 60.0;

// ── Idle Production: Scheduling ───────────────────────────────────────────────

/// Seconds between production accruals while the game is running.
pub const PRODUCTION_TICK_SECS: f32 = 1.0;

/// Seconds between periodic expired-boost sweeps.
pub const BOOST_SWEEP_SECS: f32 = 5.0;

/// Seconds between ledger autosaves.
pub const AUTOSAVE_SECS: f32 = 30.0;

// ── Idle Production: Forging ──────────────────────────────────────────────────

/// Base production rate range (units/s) for a freshly forged lane.
pub const FORGE_BASE_RATE_MIN: f64 = 0.5;
pub const FORGE_BASE_RATE_MAX: f64 = 2.0;

/// Multiplier and duration of the debug global boost (B key).
pub const DEBUG_BOOST_MULTIPLIER: f64 = 2.0;
pub const DEBUG_BOOST_SECS: f64 = 60.0;
