//! Per-tick movement update: ground contact, coyote time, landing, jumping,
//! the jump-state machine and horizontal control.
//!
//! ## Tick order
//!
//! 1. Advance timers by `dt`.
//! 2. Raw ground detection, then coyote time on top of it.
//! 3. Landing on a false → true transition of the effective grounded flag.
//! 4. Horizontal velocity blend toward the input target.
//! 5. Jump command: honour it, or buffer it when no jumps are left.
//! 6. Buffered jump, once grounded and out of landing recovery.
//! 7. Jump-state machine.
//! 8. Self-righting correction.
//!
//! [`PlayerMotion::step`] is pure apart from mutating `self`; the Bevy system
//! in [`super::control`] feeds it a [`BodySample`] and writes the outcome back
//! to the rigid body.

use bevy::prelude::*;

use super::ground::{detect_ground, BodySample, MainGround, SurfaceRect};
use super::state::{JumpState, MotionInput, PlayerMotion};
use crate::config::GameConfig;
use crate::events::PlayerEventKind;

/// One lifecycle event produced during a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionEvent {
    pub kind: PlayerEventKind,
    pub jump_number: u32,
    /// Body velocity at the moment the event was raised.
    pub velocity: Vec2,
}

/// Result of a single [`PlayerMotion::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Linear velocity to write back to the body.
    pub linvel: Vec2,
    /// Angular velocity override, present only while the body is tilted.
    pub angvel: Option<f32>,
    pub events: Vec<MotionEvent>,
    /// Number of jump velocity-sets performed this tick (0 or 1).
    pub jumps_executed: u32,
}

impl StepOutcome {
    fn push(&mut self, kind: PlayerEventKind, jump_number: u32) {
        self.events.push(MotionEvent {
            kind,
            jump_number,
            velocity: self.linvel,
        });
    }

    pub fn has(&self, kind: PlayerEventKind) -> bool {
        self.events.iter().any(|e| e.kind == kind)
    }
}

/// Per-60 Hz-frame blend factor converted to an arbitrary `dt`.
#[inline]
fn frame_blend(snap: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    1.0 - (1.0 - snap.clamp(0.0, 1.0)).powf(dt * 60.0)
}

impl PlayerMotion {
    /// Advance the motion state by one tick.
    pub fn step(
        &mut self,
        body: &BodySample,
        surfaces: &[SurfaceRect],
        main_ground: Option<MainGround>,
        input: MotionInput,
        dt: f32,
        config: &GameConfig,
    ) -> StepOutcome {
        let mut out = StepOutcome {
            linvel: body.velocity,
            angvel: None,
            events: Vec::new(),
            jumps_executed: 0,
        };

        self.advance_timers(dt);
        self.update_ground_contact(body, surfaces, main_ground, config, &mut out);

        let dir = input.direction_sign();
        out.linvel.x = self.blend_horizontal(out.linvel.x, dir, dt, config);
        if dir != 0 && dir != self.last_move_dir {
            out.push(PlayerEventKind::Moved, 0);
        }
        self.last_move_dir = dir;

        let mut jumped = false;
        if input.jump_pressed {
            if self.can_jump() {
                self.execute_jump(config, &mut out);
                jumped = true;
            } else {
                self.jump_buffer_timer = config.jump_buffer_time;
            }
        }

        if !jumped
            && self.jump_buffered()
            && self.grounded
            && !self.landing_recovery_active()
            && self.can_jump()
        {
            self.execute_jump(config, &mut out);
            jumped = true;
        }

        self.update_jump_state(jumped, config, &mut out);

        if body.rotation.abs() > config.upright_tolerance {
            out.angvel = Some(-body.rotation * config.righting_rate);
            self.righting = true;
        } else if self.righting {
            // Back inside the band: cancel the correction spin once.
            out.angvel = Some(0.0);
            self.righting = false;
        }

        out
    }

    fn advance_timers(&mut self, dt: f32) {
        self.coyote_timer = (self.coyote_timer - dt).max(0.0);
        self.jump_buffer_timer = (self.jump_buffer_timer - dt).max(0.0);
        self.landing_recovery_timer = (self.landing_recovery_timer - dt).max(0.0);
    }

    fn update_ground_contact(
        &mut self,
        body: &BodySample,
        surfaces: &[SurfaceRect],
        main_ground: Option<MainGround>,
        config: &GameConfig,
        out: &mut StepOutcome,
    ) {
        let raw = detect_ground(body, surfaces, main_ground, config);

        if raw {
            self.coyote_timer = 0.0;
        } else if self.was_raw_grounded && self.jumps_used == 0 {
            // Walked off an edge; a take-off jump never earns coyote time.
            self.coyote_timer = config.coyote_time;
        }
        self.was_raw_grounded = raw;

        let was_grounded = self.grounded;
        self.grounded = raw || self.coyote_timer > 0.0;

        if self.grounded && !was_grounded {
            self.land(config, out);
        }
    }

    fn land(&mut self, config: &GameConfig, out: &mut StepOutcome) {
        self.jumps_used = 0;
        self.jump_state = JumpState::Grounded;
        self.landing_recovery_timer = config.landing_recovery_time;

        out.push(PlayerEventKind::Landed, 0);
        if -out.linvel.y >= config.hard_landing_speed {
            out.push(PlayerEventKind::LandImpact, 0);
        }
    }

    fn blend_horizontal(&self, vx: f32, dir: i8, dt: f32, config: &GameConfig) -> f32 {
        let (max_speed, reverse, same, stop) = if self.grounded {
            (
                config.ground_max_speed,
                config.ground_reverse_snap,
                config.ground_snap,
                config.ground_stop_snap,
            )
        } else {
            (
                config.air_max_speed,
                config.air_reverse_snap,
                config.air_snap,
                config.air_stop_snap,
            )
        };

        let max_speed = if self.landing_recovery_active() {
            max_speed * config.landing_speed_damping
        } else {
            max_speed
        };

        let target = dir as f32 * max_speed;
        let snap = if dir == 0 {
            stop
        } else if vx.abs() > 1.0 && vx.signum() as i8 != dir {
            reverse
        } else {
            same
        };

        vx + (target - vx) * frame_blend(snap, dt)
    }

    /// Set (not add) the jump velocity for the next jump number and carry
    /// horizontal momentum into it.
    fn execute_jump(&mut self, config: &GameConfig, out: &mut StepOutcome) {
        let jump_number = self.jumps_used + 1;
        out.linvel.y = config.jump_force(jump_number);
        out.linvel.x += out.linvel.x * config.jump_horizontal_boost;

        self.jumps_used = jump_number;
        self.jump_buffer_timer = 0.0;
        self.coyote_timer = 0.0;
        // Left the ground by choice; a blocked take-off must still register a
        // fresh landing next tick so the counter resets.
        self.grounded = false;
        out.jumps_executed += 1;
    }

    fn update_jump_state(&mut self, jumped: bool, config: &GameConfig, out: &mut StepOutcome) {
        if jumped {
            // Every jump restarts the arc, including mid-air ones.
            self.jump_state = JumpState::Rising;
            out.push(PlayerEventKind::JumpStarted, self.jumps_used);
            return;
        }

        if self.grounded || self.jumps_used == 0 {
            return;
        }

        let vy = out.linvel.y;
        match self.jump_state {
            JumpState::Grounded if vy > config.rise_velocity_threshold => {
                self.jump_state = JumpState::Rising;
                out.push(PlayerEventKind::JumpStarted, self.jumps_used);
            }
            JumpState::Rising if vy <= config.peak_velocity_band => {
                self.jump_state = JumpState::Peak;
                out.push(PlayerEventKind::JumpPeaked, self.jumps_used);
            }
            JumpState::Peak if vy < -config.fall_velocity_threshold => {
                self.jump_state = JumpState::Falling;
                out.push(PlayerEventKind::JumpFalling, self.jumps_used);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    /// Minimal stand-in for the physics step: gravity, integration, and a
    /// solid floor that zeroes downward velocity on contact.
    struct Sim {
        config: GameConfig,
        motion: PlayerMotion,
        body: BodySample,
        floor: SurfaceRect,
    }

    impl Sim {
        fn on_floor() -> Self {
            let config = GameConfig::default();
            let floor = SurfaceRect {
                center: Vec2::new(0.0, -10.0),
                half_extents: Vec2::new(2000.0, 10.0),
            };
            let half = Vec2::new(config.player_half_width, config.player_half_height);
            let body = BodySample {
                position: Vec2::new(0.0, floor.top() + half.y),
                velocity: Vec2::ZERO,
                rotation: 0.0,
                half_extents: half,
            };
            let motion = PlayerMotion::from_config(&config);
            let mut sim = Self {
                config,
                motion,
                body,
                floor,
            };
            // Settle: first tick registers the landing, then wait out recovery.
            for _ in 0..10 {
                sim.tick(MotionInput::default());
            }
            sim
        }

        fn rest_y(&self) -> f32 {
            self.floor.top() + self.body.half_extents.y
        }

        fn tick(&mut self, input: MotionInput) -> StepOutcome {
            let out = self
                .motion
                .step(&self.body, &[self.floor], None, input, DT, &self.config);
            self.body.velocity = out.linvel;
            self.body.velocity.y -= self.config.gravity * DT;
            self.body.position += self.body.velocity * DT;
            let rest_y = self.rest_y();
            if self.body.position.y <= rest_y {
                self.body.position.y = rest_y;
                self.body.velocity.y = self.body.velocity.y.max(0.0);
            }
            out
        }

        fn jump() -> MotionInput {
            MotionInput {
                jump_pressed: true,
                ..Default::default()
            }
        }
    }

    #[test]
    fn settled_player_is_grounded_with_no_jumps_used() {
        let sim = Sim::on_floor();
        assert!(sim.motion.grounded);
        assert_eq!(sim.motion.jumps_used, 0);
        assert_eq!(sim.motion.jump_state, JumpState::Grounded);
    }

    #[test]
    fn jump_cap_allows_exactly_max_jumps() {
        let mut sim = Sim::on_floor();
        let mut velocity_sets = 0;
        for _ in 0..4 {
            velocity_sets += sim.tick(Sim::jump()).jumps_executed;
        }
        assert_eq!(velocity_sets, 3);
        assert_eq!(sim.motion.jumps_used, 3);
        assert_eq!(sim.motion.jumps_remaining(), 0);
        assert!(!sim.motion.can_jump());
        assert!(sim.motion.jump_buffered(), "fourth press should be buffered");
    }

    #[test]
    fn successive_jumps_report_numbers_and_rising_forces() {
        let mut sim = Sim::on_floor();
        let mut starts = Vec::new();
        for _ in 0..3 {
            let out = sim.tick(Sim::jump());
            starts.extend(
                out.events
                    .into_iter()
                    .filter(|e| e.kind == PlayerEventKind::JumpStarted),
            );
        }
        let numbers: Vec<u32> = starts.iter().map(|e| e.jump_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(starts[0].velocity.y < starts[1].velocity.y);
        assert!(starts[1].velocity.y < starts[2].velocity.y);
        assert_eq!(starts[2].velocity.y, sim.config.jump_force(3));
    }

    #[test]
    fn jump_sets_velocity_instead_of_adding() {
        let config = GameConfig::default();
        let mut motion = PlayerMotion::from_config(&config);
        motion.jumps_used = 1;
        motion.jump_state = JumpState::Falling;
        let body = BodySample {
            position: Vec2::new(0.0, 500.0),
            velocity: Vec2::new(0.0, -400.0),
            rotation: 0.0,
            half_extents: Vec2::new(16.0, 24.0),
        };
        let out = motion.step(&body, &[], None, Sim::jump(), DT, &config);
        assert_eq!(out.jumps_executed, 1);
        assert_eq!(out.linvel.y, config.jump_force(2));
    }

    #[test]
    fn landing_resets_jump_count() {
        let mut sim = Sim::on_floor();
        for _ in 0..3 {
            sim.tick(Sim::jump());
        }
        assert_eq!(sim.motion.jumps_used, 3);

        let mut landed = false;
        for _ in 0..600 {
            if sim.tick(MotionInput::default()).has(PlayerEventKind::Landed) {
                landed = true;
                break;
            }
        }
        assert!(landed, "player never landed");
        assert_eq!(sim.motion.jumps_used, 0);
        assert_eq!(sim.motion.jump_state, JumpState::Grounded);
    }

    #[test]
    fn single_arc_visits_states_in_order() {
        let mut sim = Sim::on_floor();
        let mut seen = vec![sim.motion.jump_state];
        sim.tick(Sim::jump());
        seen.push(sim.motion.jump_state);
        for _ in 0..600 {
            sim.tick(MotionInput::default());
            if *seen.last().unwrap() != sim.motion.jump_state {
                seen.push(sim.motion.jump_state);
            }
            if sim.motion.jump_state == JumpState::Grounded && seen.len() > 1 {
                break;
            }
        }
        assert_eq!(
            seen,
            vec![
                JumpState::Grounded,
                JumpState::Rising,
                JumpState::Peak,
                JumpState::Falling,
                JumpState::Grounded,
            ]
        );
    }

    #[test]
    fn arc_emits_peak_then_fall_once() {
        let mut sim = Sim::on_floor();
        let mut kinds = Vec::new();
        kinds.extend(sim.tick(Sim::jump()).events.iter().map(|e| e.kind));
        for _ in 0..600 {
            let out = sim.tick(MotionInput::default());
            kinds.extend(out.events.iter().map(|e| e.kind));
            if out.has(PlayerEventKind::Landed) {
                break;
            }
        }
        assert_eq!(
            kinds,
            vec![
                PlayerEventKind::JumpStarted,
                PlayerEventKind::JumpPeaked,
                PlayerEventKind::JumpFalling,
                PlayerEventKind::Landed,
            ]
        );
    }

    #[test]
    fn coyote_time_keeps_player_grounded_briefly() {
        let config = GameConfig::default();
        let mut motion = PlayerMotion::from_config(&config);
        motion.grounded = true;
        motion.was_raw_grounded = true;
        let airborne = BodySample {
            position: Vec2::new(0.0, 1000.0),
            velocity: Vec2::new(0.0, -50.0),
            rotation: 0.0,
            half_extents: Vec2::new(16.0, 24.0),
        };

        motion.step(&airborne, &[], None, MotionInput::default(), DT, &config);
        assert!(motion.grounded, "coyote time should hold grounded");
        assert!(motion.coyote_timer > 0.0);

        let out = motion.step(&airborne, &[], None, Sim::jump(), DT, &config);
        assert_eq!(out.jumps_executed, 1);
        assert_eq!(out.linvel.y, config.jump_force(1));
        assert_eq!(motion.coyote_timer, 0.0);
    }

    #[test]
    fn coyote_time_expires() {
        let config = GameConfig::default();
        let mut motion = PlayerMotion::from_config(&config);
        motion.grounded = true;
        motion.was_raw_grounded = true;
        let airborne = BodySample {
            position: Vec2::new(0.0, 1000.0),
            velocity: Vec2::new(0.0, -50.0),
            rotation: 0.0,
            half_extents: Vec2::new(16.0, 24.0),
        };
        let ticks = (config.coyote_time / DT).ceil() as usize + 2;
        for _ in 0..ticks {
            motion.step(&airborne, &[], None, MotionInput::default(), DT, &config);
        }
        assert!(!motion.grounded);
    }

    #[test]
    fn take_off_does_not_start_coyote_time() {
        let mut sim = Sim::on_floor();
        sim.tick(Sim::jump());
        sim.tick(MotionInput::default());
        assert!(!sim.motion.grounded);
        assert_eq!(sim.motion.coyote_timer, 0.0);
    }

    #[test]
    fn buffered_jump_fires_after_landing_recovery() {
        let config = GameConfig::default();
        let mut motion = PlayerMotion::from_config(&config);
        motion.jumps_used = config.max_jumps;
        motion.jump_state = JumpState::Falling;
        let floor = SurfaceRect {
            center: Vec2::ZERO,
            half_extents: Vec2::new(500.0, 10.0),
        };
        let half = Vec2::new(16.0, 24.0);
        let falling = BodySample {
            position: Vec2::new(0.0, 200.0),
            velocity: Vec2::new(0.0, -300.0),
            rotation: 0.0,
            half_extents: half,
        };
        let resting = BodySample {
            position: Vec2::new(0.0, floor.top() + half.y),
            velocity: Vec2::ZERO,
            ..falling
        };

        let out = motion.step(&falling, &[floor], None, Sim::jump(), DT, &config);
        assert_eq!(out.jumps_executed, 0);
        assert!(motion.jump_buffered());

        let out = motion.step(&resting, &[floor], None, MotionInput::default(), DT, &config);
        assert!(out.has(PlayerEventKind::Landed));
        assert_eq!(out.jumps_executed, 0, "recovery suppresses the buffer");

        let out = motion.step(&resting, &[floor], None, MotionInput::default(), 0.05, &config);
        assert_eq!(out.jumps_executed, 0);

        let out = motion.step(&resting, &[floor], None, MotionInput::default(), 0.05, &config);
        assert_eq!(out.jumps_executed, 1);
        assert!(out
            .events
            .iter()
            .any(|e| e.kind == PlayerEventKind::JumpStarted && e.jump_number == 1));
        assert!(!motion.jump_buffered());
    }

    #[test]
    fn stale_buffer_is_dropped() {
        let config = GameConfig::default();
        let mut motion = PlayerMotion::from_config(&config);
        motion.jumps_used = config.max_jumps;
        let floor = SurfaceRect {
            center: Vec2::ZERO,
            half_extents: Vec2::new(500.0, 10.0),
        };
        let half = Vec2::new(16.0, 24.0);
        let falling = BodySample {
            position: Vec2::new(0.0, 200.0),
            velocity: Vec2::new(0.0, -300.0),
            rotation: 0.0,
            half_extents: half,
        };
        motion.step(&falling, &[floor], None, Sim::jump(), DT, &config);
        motion.step(&falling, &[floor], None, MotionInput::default(), 0.2, &config);
        assert!(!motion.jump_buffered());
    }

    #[test]
    fn hard_landing_raises_impact() {
        let config = GameConfig::default();
        let mut motion = PlayerMotion::from_config(&config);
        motion.jumps_used = 2;
        let floor = SurfaceRect {
            center: Vec2::ZERO,
            half_extents: Vec2::new(500.0, 10.0),
        };
        let body = BodySample {
            position: Vec2::new(0.0, floor.top() + 24.0),
            velocity: Vec2::new(0.0, -(config.hard_landing_speed + 50.0)),
            rotation: 0.0,
            half_extents: Vec2::new(16.0, 24.0),
        };
        let out = motion.step(&body, &[floor], None, MotionInput::default(), DT, &config);
        assert!(out.has(PlayerEventKind::Landed));
        assert!(out.has(PlayerEventKind::LandImpact));
    }

    #[test]
    fn landing_recovery_dampens_ground_speed() {
        let config = GameConfig::default();
        let right = MotionInput {
            direction: 1.0,
            ..Default::default()
        };
        let mut sim = Sim::on_floor();
        sim.body.velocity.x = config.ground_max_speed;
        let free = sim.tick(right).linvel.x;

        let mut recovering = Sim::on_floor();
        recovering.body.velocity.x = config.ground_max_speed;
        recovering.motion.landing_recovery_timer = 1.0;
        let damped = recovering.tick(right).linvel.x;

        assert!((free - config.ground_max_speed).abs() < 1e-3);
        assert!(damped < free);
    }

    #[test]
    fn ground_reversal_is_snappier_than_air_reversal() {
        let config = GameConfig::default();
        let left = MotionInput {
            direction: -1.0,
            ..Default::default()
        };
        let mut ground = Sim::on_floor();
        ground.body.velocity.x = 200.0;
        let ground_vx = ground.tick(left).linvel.x;

        let mut air = PlayerMotion::from_config(&config);
        air.jumps_used = 1;
        let body = BodySample {
            position: Vec2::new(0.0, 1000.0),
            velocity: Vec2::new(200.0, -10.0),
            rotation: 0.0,
            half_extents: Vec2::new(16.0, 24.0),
        };
        let air_vx = air.step(&body, &[], None, left, DT, &config).linvel.x;

        assert!(ground_vx < air_vx);
    }

    #[test]
    fn take_off_carries_horizontal_momentum() {
        let right = MotionInput {
            direction: 1.0,
            ..Default::default()
        };
        let jump_right = MotionInput {
            direction: 1.0,
            jump_pressed: true,
        };
        let mut walk = Sim::on_floor();
        walk.body.velocity.x = 200.0;
        let walked = walk.tick(right).linvel.x;

        let mut hop = Sim::on_floor();
        hop.body.velocity.x = 200.0;
        let hopped = hop.tick(jump_right).linvel.x;

        assert!(hopped > walked);
    }

    #[test]
    fn tilt_produces_righting_spin() {
        let config = GameConfig::default();
        let mut motion = PlayerMotion::from_config(&config);
        let body = BodySample {
            position: Vec2::new(0.0, 1000.0),
            velocity: Vec2::ZERO,
            rotation: 0.3,
            half_extents: Vec2::new(16.0, 24.0),
        };
        let out = motion.step(&body, &[], None, MotionInput::default(), DT, &config);
        assert!(out.angvel.is_some_and(|w| w < 0.0));

        let upright = BodySample {
            rotation: 0.0,
            ..body
        };
        let out = motion.step(&upright, &[], None, MotionInput::default(), DT, &config);
        assert_eq!(out.angvel, Some(0.0));
        let out = motion.step(&upright, &[], None, MotionInput::default(), DT, &config);
        assert_eq!(out.angvel, None);
    }

    #[test]
    fn righting_spin_settles_inside_tolerance() {
        let config = GameConfig::default();
        let mut motion = PlayerMotion::from_config(&config);
        let mut body = BodySample {
            position: Vec2::new(0.0, 1000.0),
            velocity: Vec2::ZERO,
            rotation: 0.3,
            half_extents: Vec2::new(16.0, 24.0),
        };

        // Integrate the written spin; keep the last one when none is written.
        let mut angvel = 0.0;
        let mut crossings = 0;
        for _ in 0..240 {
            let out = motion.step(&body, &[], None, MotionInput::default(), DT, &config);
            if let Some(w) = out.angvel {
                angvel = w;
            }
            let next = body.rotation + angvel * DT;
            if next.signum() != body.rotation.signum() {
                crossings += 1;
            }
            body.rotation = next;
        }

        assert_eq!(angvel, 0.0);
        assert!(body.rotation.abs() <= config.upright_tolerance);
        assert!(body.rotation > 0.0);
        assert_eq!(crossings, 0);
    }

    #[test]
    fn moved_fires_on_start_and_reversal_only() {
        let mut sim = Sim::on_floor();
        let right = MotionInput {
            direction: 1.0,
            ..Default::default()
        };
        let left = MotionInput {
            direction: -1.0,
            ..Default::default()
        };
        assert!(sim.tick(right).has(PlayerEventKind::Moved));
        assert!(!sim.tick(right).has(PlayerEventKind::Moved));
        assert!(sim.tick(left).has(PlayerEventKind::Moved));
    }
}
