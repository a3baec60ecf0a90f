//! WynIsBuff2 core library.
//!
//! A 2D platformer whose hero has a three-stage jump, plus an idle ledger of
//! clone production lanes that keeps working while the game is closed.
//!
//! - [`movement`]: ground contact, the jump-state machine and air control
//! - [`level`]: static ground and platforms from `assets/level.toml`
//! - [`idle`]: production lanes, boosts, decay and offline catch-up
//! - [`events`]: typed lifecycle messages published by both

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod graphics;
pub mod idle;
pub mod level;
pub mod movement;
