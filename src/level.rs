//! Level layout: static ground and platforms.
//!
//! A layout is a flat list of [`PlatformSpec`]s read from `assets/level.toml`
//! (or the built-in [`LevelLayout::default`]).  Each entry becomes a fixed
//! Rapier cuboid tagged with [`Surface`] so ground detection can see it.
//!
//! ```toml
//! [[platforms]]
//! kind = "ground"
//! x = 0.0
//! y = -40.0
//! width = 4000.0
//! height = 80.0
//! ```
//!
//! Entries with an unknown `kind` are logged and skipped; the rest of the
//! level still loads.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use serde::Deserialize;

use crate::error::{GameError, GameResult};
use crate::movement::{MainGround, Surface};

/// One static block in the level.  `x`/`y` are the centre.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlatformSpec {
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// What a [`PlatformSpec::kind`] resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformKind {
    /// The main floor.  Its top edge also becomes the [`MainGround`] plane.
    Ground,
    Platform,
}

impl PlatformKind {
    pub fn parse(kind: &str) -> GameResult<Self> {
        match kind {
            "ground" => Ok(Self::Ground),
            "platform" => Ok(Self::Platform),
            other => Err(GameError::UnknownPlatformKind {
                kind: other.to_string(),
            }),
        }
    }

    fn color(self) -> Color {
        match self {
            Self::Ground => Color::srgb(0.22, 0.2, 0.24),
            Self::Platform => Color::srgb(0.45, 0.35, 0.6),
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
pub struct LevelLayout {
    pub platforms: Vec<PlatformSpec>,
}

impl Default for LevelLayout {
    fn default() -> Self {
        let spec = |kind: &str, x: f32, y: f32, width: f32, height: f32| PlatformSpec {
            kind: kind.to_string(),
            x,
            y,
            width,
            height,
        };
        Self {
            platforms: vec![
                spec("ground", 0.0, -40.0, 4000.0, 80.0),
                spec("platform", -100.0, 100.0, 200.0, 20.0),
                spec("platform", 200.0, 220.0, 160.0, 20.0),
                spec("platform", 480.0, 360.0, 160.0, 20.0),
                spec("platform", 150.0, 500.0, 220.0, 20.0),
            ],
        }
    }
}

impl LevelLayout {
    /// Resolve every entry's kind, dropping (and logging) the ones that fail.
    pub fn resolved(&self) -> Vec<(PlatformKind, &PlatformSpec)> {
        self.platforms
            .iter()
            .filter_map(|spec| match PlatformKind::parse(&spec.kind) {
                Ok(kind) => Some((kind, spec)),
                Err(e) => {
                    warn!("Skipping platform at ({}, {}): {e}", spec.x, spec.y);
                    None
                }
            })
            .collect()
    }

    /// Top edge of the highest-priority ground entry, if the layout has one.
    pub fn main_ground(&self) -> Option<MainGround> {
        self.resolved()
            .into_iter()
            .find(|(kind, _)| *kind == PlatformKind::Ground)
            .map(|(_, spec)| MainGround {
                top: spec.y + spec.height * 0.5,
            })
    }
}

/// Startup system: load `assets/level.toml` into [`LevelLayout`], keeping the
/// built-in layout when the file is missing or malformed.
pub fn load_level_layout(mut commands: Commands) {
    let path = "assets/level.toml";
    let layout = match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<LevelLayout>(&contents) {
            Ok(layout) => {
                println!("✓ Loaded level layout from {path}");
                layout
            }
            Err(e) => {
                warn!("Failed to parse {path}: {e}; using built-in layout");
                LevelLayout::default()
            }
        },
        Err(_) => LevelLayout::default(),
    };
    commands.insert_resource(layout);
}

/// Spawn every resolvable platform as a fixed collider with a [`Surface`].
pub fn spawn_level(mut commands: Commands, layout: Res<LevelLayout>) {
    let resolved = layout.resolved();
    for (kind, spec) in &resolved {
        let half = Vec2::new(spec.width * 0.5, spec.height * 0.5);
        commands.spawn((
            Surface { half_extents: half },
            RigidBody::Fixed,
            Collider::cuboid(half.x, half.y),
            Friction::coefficient(0.0),
            Sprite::from_color(kind.color(), half * 2.0),
            Transform::from_xyz(spec.x, spec.y, 0.0),
        ));
    }

    if let Some(ground) = layout.main_ground() {
        commands.insert_resource(ground);
    }

    println!("✓ Level spawned with {} surfaces", resolved.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_is_rejected() {
        assert_eq!(PlatformKind::parse("ground"), Ok(PlatformKind::Ground));
        assert_eq!(
            PlatformKind::parse("lava"),
            Err(GameError::UnknownPlatformKind {
                kind: "lava".to_string()
            })
        );
    }

    #[test]
    fn layout_skips_unknown_entries() {
        let layout: LevelLayout = toml::from_str(
            r#"
            [[platforms]]
            kind = "ground"
            x = 0.0
            y = -40.0
            width = 1000.0
            height = 80.0

            [[platforms]]
            kind = "spikes"
            x = 50.0
            y = 100.0
            width = 40.0
            height = 10.0
            "#,
        )
        .unwrap();
        assert_eq!(layout.resolved().len(), 1);
        assert_eq!(layout.main_ground(), Some(MainGround { top: 0.0 }));
    }

    #[test]
    fn default_layout_has_a_floor_at_zero() {
        let layout = LevelLayout::default();
        assert_eq!(layout.main_ground().map(|g| g.top), Some(0.0));
        assert_eq!(layout.resolved().len(), layout.platforms.len());
    }
}
