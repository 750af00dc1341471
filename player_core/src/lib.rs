#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core player logic (hardware-agnostic).
//!
//! This crate provides the control logic for one motorized, limit-switch
//! bounded carriage. All hardware interactions go through
//! `player_traits::Motor`, `player_traits::DigitalIo` and
//! `player_traits::Clock`.
//!
//! ## Architecture
//!
//! - **Input**: stable-interval debouncing of the two buttons (`debounce` module)
//! - **Speed**: hit-window accumulation with friction decay (`speed` module)
//! - **Motion**: limit switches arbitrate every motor command (`PlayerController`)
//! - **Position**: five-phase state machine (`state` module)
//! - **Configuration**: runtime config structs (`config` module)
//!
//! The controller never loops or sleeps on its own; callers drive it with one
//! `update()` per tick.

pub mod builder;
pub mod config;
pub mod conversions;
pub mod core;
pub mod debounce;
pub mod error;
pub mod hw_error;
pub mod speed;
pub mod state;

pub use crate::builder::{Missing, Player, PlayerBuilder, PlayerG, Set, build_player};
pub use crate::config::{DEFAULT_MAX_SPEED, HomingCfg, InputCfg, MotionCfg, PlayerPins};
pub use crate::core::PlayerController;
pub use crate::debounce::ButtonDebouncer;
pub use crate::error::{BuildError, PlayerError, Result};
pub use crate::speed::SpeedModel;
pub use crate::state::{LimitReading, PositionState, Transition};
