//! Geometric ground-contact detection.
//!
//! Rapier exposes positions, velocities and contact pairs, but not a stable
//! "standing on something" signal for a dynamic body.  Support is inferred
//! here instead: the player is grounded when its feet sit within
//! `ground_tolerance` of the top edge of a static surface it is horizontally
//! over, and it is not moving upward.
//!
//! Everything in this module is pure so it can be tested without a physics
//! world.

use bevy::prelude::*;

use crate::config::GameConfig;

/// A static surface the player can stand on.
///
/// Attached to fixed rigid bodies by the level spawner; the entity's
/// `Transform` gives the centre.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub half_extents: Vec2,
}

/// The implicit main ground plane.
///
/// Tested after every explicit surface, with no horizontal bound, so the
/// player cannot fall through gaps between floor segments.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct MainGround {
    /// World-space y of the walkable top edge.
    pub top: f32,
}

/// World-space axis-aligned rectangle of a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRect {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl SurfaceRect {
    #[inline]
    pub fn top(&self) -> f32 {
        self.center.y + self.half_extents.y
    }

    /// Whether `x` lies over the surface once `margin` is trimmed from both ends.
    #[inline]
    pub fn spans(&self, x: f32, margin: f32) -> bool {
        let half = (self.half_extents.x - margin).max(0.0);
        (x - self.center.x).abs() <= half
    }
}

/// The subset of the player's rigid-body state that ground detection reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySample {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Rotation about Z in radians.
    pub rotation: f32,
    pub half_extents: Vec2,
}

impl BodySample {
    /// Y of the feet probe: the collider bottom raised by `inset`.
    #[inline]
    pub fn feet_y(&self, inset: f32) -> f32 {
        self.position.y - self.half_extents.y + inset
    }
}

/// Whether the feet rest on a top edge at `top`, ignoring horizontal extent.
#[inline]
fn feet_on(feet_y: f32, top: f32, tolerance: f32) -> bool {
    (feet_y - top).abs() <= tolerance
}

/// Raw (pre-coyote) support test for this tick.
///
/// Explicit surfaces are scanned first and the scan stops at the first hit;
/// the main ground plane is the fallback.  Upward motion always reads as
/// airborne, so a jump never re-grounds itself on the take-off frame.
pub fn detect_ground(
    body: &BodySample,
    surfaces: &[SurfaceRect],
    main_ground: Option<MainGround>,
    config: &GameConfig,
) -> bool {
    if body.velocity.y > 0.0 {
        return false;
    }

    let feet_y = body.feet_y(config.feet_inset);

    let on_surface = surfaces.iter().any(|surface| {
        surface.spans(body.position.x, config.surface_edge_margin)
            && feet_on(feet_y, surface.top(), config.ground_tolerance)
    });
    if on_surface {
        return true;
    }

    main_ground.is_some_and(|ground| feet_on(feet_y, ground.top, config.ground_tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform() -> SurfaceRect {
        SurfaceRect {
            center: Vec2::new(0.0, 0.0),
            half_extents: Vec2::new(100.0, 10.0),
        }
    }

    /// A body whose feet probe sits `offset` above the platform top.
    fn body_with_feet_offset(config: &GameConfig, x: f32, offset: f32, vy: f32) -> BodySample {
        let half = Vec2::new(config.player_half_width, config.player_half_height);
        let feet_target = platform().top() + offset;
        BodySample {
            position: Vec2::new(x, feet_target + half.y - config.feet_inset),
            velocity: Vec2::new(0.0, vy),
            rotation: 0.0,
            half_extents: half,
        }
    }

    #[test]
    fn feet_inside_tolerance_band_are_grounded() {
        let config = GameConfig::default();
        for offset in [0.0, 2.5, -2.5, config.ground_tolerance, -config.ground_tolerance] {
            let body = body_with_feet_offset(&config, 0.0, offset, 0.0);
            assert!(
                detect_ground(&body, &[platform()], None, &config),
                "offset {offset} should be grounded"
            );
        }
    }

    #[test]
    fn one_unit_past_tolerance_is_airborne() {
        let config = GameConfig::default();
        let above = body_with_feet_offset(&config, 0.0, config.ground_tolerance + 1.0, 0.0);
        let below = body_with_feet_offset(&config, 0.0, -config.ground_tolerance - 1.0, 0.0);
        assert!(!detect_ground(&above, &[platform()], None, &config));
        assert!(!detect_ground(&below, &[platform()], None, &config));
    }

    #[test]
    fn moving_upward_is_never_grounded() {
        let config = GameConfig::default();
        let body = body_with_feet_offset(&config, 0.0, 0.0, 1.0);
        assert!(!detect_ground(&body, &[platform()], None, &config));
    }

    #[test]
    fn falling_onto_surface_is_grounded() {
        let config = GameConfig::default();
        let body = body_with_feet_offset(&config, 0.0, 1.0, -250.0);
        assert!(detect_ground(&body, &[platform()], None, &config));
    }

    #[test]
    fn edge_margin_excludes_overhanging_centre() {
        let config = GameConfig::default();
        let inside = 100.0 - config.surface_edge_margin;
        let outside = inside + 1.0;
        let on_edge = body_with_feet_offset(&config, inside, 0.0, 0.0);
        let past_edge = body_with_feet_offset(&config, outside, 0.0, 0.0);
        assert!(detect_ground(&on_edge, &[platform()], None, &config));
        assert!(!detect_ground(&past_edge, &[platform()], None, &config));
    }

    #[test]
    fn main_ground_plane_catches_any_x() {
        let config = GameConfig::default();
        let body = body_with_feet_offset(&config, 5000.0, 0.0, 0.0);
        let ground = MainGround {
            top: platform().top(),
        };
        assert!(!detect_ground(&body, &[], None, &config));
        assert!(detect_ground(&body, &[], Some(ground), &config));
    }

    #[test]
    fn any_matching_surface_is_enough() {
        let config = GameConfig::default();
        let far = SurfaceRect {
            center: Vec2::new(1000.0, 500.0),
            half_extents: Vec2::new(50.0, 10.0),
        };
        let body = body_with_feet_offset(&config, 0.0, 0.0, 0.0);
        assert!(detect_ground(&body, &[far, platform()], None, &config));
    }
}
