//! Runtime gameplay configuration loaded from `assets/game.toml`.
//!
//! [`GameConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_game_config`] reads
//! `assets/game.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the constants you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<GameConfig>` to any system parameter list and read values
//! with `config.ground_tolerance`, `config.jump_forces`, etc.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `GameConfig::default()`.

use crate::constants::*;
use crate::idle::LedgerTuning;
use bevy::prelude::*;
use serde::Deserialize;

/// Runtime-tunable movement and idle-production configuration.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── World ─────────────────────────────────────────────────────────────────
    pub gravity: f32,

    // ── Player Body ───────────────────────────────────────────────────────────
    pub player_half_width: f32,
    pub player_half_height: f32,
    pub player_friction: f32,
    pub player_spawn: [f32; 2],

    // ── Ground Detection ──────────────────────────────────────────────────────
    pub ground_tolerance: f32,
    pub feet_inset: f32,
    pub surface_edge_margin: f32,
    pub coyote_time: f32,
    pub jump_buffer_time: f32,
    pub landing_recovery_time: f32,
    pub landing_speed_damping: f32,
    pub hard_landing_speed: f32,

    // ── Jump State Machine ────────────────────────────────────────────────────
    pub rise_velocity_threshold: f32,
    pub peak_velocity_band: f32,
    pub fall_velocity_threshold: f32,

    // ── Jumping ───────────────────────────────────────────────────────────────
    pub max_jumps: u32,
    pub jump_forces: Vec<f32>,
    pub jump_horizontal_boost: f32,

    // ── Horizontal Movement ───────────────────────────────────────────────────
    pub ground_max_speed: f32,
    pub air_max_speed: f32,
    pub ground_reverse_snap: f32,
    pub ground_snap: f32,
    pub ground_stop_snap: f32,
    pub air_reverse_snap: f32,
    pub air_snap: f32,
    pub air_stop_snap: f32,

    // ── Self-Righting ─────────────────────────────────────────────────────────
    pub upright_tolerance: f32,
    pub righting_rate: f32,

    // ── Idle Production ───────────────────────────────────────────────────────
    pub decay_rate_per_hour: f64,
    pub stability_decay_damping: f64,
    pub decay_floor: f64,
    pub offline_cap_hours: f64,
    pub offline_trigger_secs: f64,
    pub production_tick_secs: f32,
    pub boost_sweep_secs: f32,
    pub autosave_secs: f32,
    pub forge_base_rate_min: f64,
    pub forge_base_rate_max: f64,
    pub debug_boost_multiplier: f64,
    pub debug_boost_secs: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            // World
            gravity: GRAVITY,
            // Player Body
            player_half_width: PLAYER_HALF_WIDTH,
            player_half_height: PLAYER_HALF_HEIGHT,
            player_friction: PLAYER_FRICTION,
            player_spawn: [PLAYER_SPAWN_X, PLAYER_SPAWN_Y],
            // Ground Detection
            ground_tolerance: GROUND_TOLERANCE,
            feet_inset: FEET_INSET,
            surface_edge_margin: SURFACE_EDGE_MARGIN,
            coyote_time: COYOTE_TIME,
            jump_buffer_time: JUMP_BUFFER_TIME,
            landing_recovery_time: LANDING_RECOVERY_TIME,
            landing_speed_damping: LANDING_SPEED_DAMPING,
            hard_landing_speed: HARD_LANDING_SPEED,
            // Jump State Machine
            rise_velocity_threshold: RISE_VELOCITY_THRESHOLD,
            peak_velocity_band: PEAK_VELOCITY_BAND,
            fall_velocity_threshold: FALL_VELOCITY_THRESHOLD,
            // Jumping
            max_jumps: MAX_JUMPS,
            jump_forces: JUMP_FORCES.to_vec(),
            jump_horizontal_boost: JUMP_HORIZONTAL_BOOST,
            // Horizontal Movement
            ground_max_speed: GROUND_MAX_SPEED,
            air_max_speed: AIR_MAX_SPEED,
            ground_reverse_snap: GROUND_REVERSE_SNAP,
            ground_snap: GROUND_SNAP,
            ground_stop_snap: GROUND_STOP_SNAP,
            air_reverse_snap: AIR_REVERSE_SNAP,
            air_snap: AIR_SNAP,
            air_stop_snap: AIR_STOP_SNAP,
            // Self-Righting
            upright_tolerance: UPRIGHT_TOLERANCE,
            righting_rate: RIGHTING_RATE,
            // Idle Production
            decay_rate_per_hour: DECAY_RATE_PER_HOUR,
            stability_decay_damping: STABILITY_DECAY_DAMPING,
            decay_floor: DECAY_FLOOR,
            offline_cap_hours: OFFLINE_CAP_HOURS,
            offline_trigger_secs: OFFLINE_TRIGGER_SECS,
            production_tick_secs: PRODUCTION_TICK_SECS,
            boost_sweep_secs: BOOST_SWEEP_SECS,
            autosave_secs: AUTOSAVE_SECS,
            forge_base_rate_min: FORGE_BASE_RATE_MIN,
            forge_base_rate_max: FORGE_BASE_RATE_MAX,
            debug_boost_multiplier: DEBUG_BOOST_MULTIPLIER,
            debug_boost_secs: DEBUG_BOOST_SECS,
        }
    }
}

impl GameConfig {
    /// Upward velocity for the given 1-based jump number.
    ///
    /// Jump numbers past the end of the table reuse the last entry so a raised
    /// `max_jumps` never indexes out of bounds.
    pub fn jump_force(&self, jump_number: u32) -> f32 {
        let idx = jump_number.saturating_sub(1) as usize;
        self.jump_forces
            .get(idx)
            .or_else(|| self.jump_forces.last())
            .copied()
            .unwrap_or(JUMP_FORCES[0])
    }

    /// The idle-ledger subset of this configuration.
    pub fn ledger_tuning(&self) -> LedgerTuning {
        LedgerTuning {
            decay_rate_per_hour: self.decay_rate_per_hour,
            stability_decay_damping: self.stability_decay_damping,
            decay_floor: self.decay_floor,
            offline_cap_hours: self.offline_cap_hours,
            offline_trigger_secs: self.offline_trigger_secs,
        }
    }
}

/// Startup system: attempt to load `assets/game.toml` and overwrite the
/// `GameConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  TOML parse errors are logged
/// but do not abort the game.  A missing file is not an error.
pub fn load_game_config(mut config: ResMut<GameConfig>) {
    let path = "assets/game.toml";
    match std::fs::read_to_string(path) {
        Ok(contents) => match parse_game_config(&contents) {
            Ok(loaded) => {
                *config = loaded;
                println!("✓ Loaded game config from {path}");
            }
            Err(e) => {
                warn!("Failed to parse {path}: {e}; using defaults");
            }
        },
        Err(_) => {
            println!("ℹ No {path} found; using compiled defaults");
        }
    }
}

/// Parse a (possibly partial) TOML document into a [`GameConfig`].
pub fn parse_game_config(contents: &str) -> Result<GameConfig, toml::de::Error> {
    toml::from_str::<GameConfig>(contents)
}
