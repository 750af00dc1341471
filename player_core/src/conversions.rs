//! `From` implementations bridging `player_config` types to `player_core` types.

use crate::config::{HomingCfg, InputCfg, MotionCfg, PlayerPins};

// ── PlayerPins ───────────────────────────────────────────────────────────────

impl From<&player_config::Pins> for PlayerPins {
    fn from(c: &player_config::Pins) -> Self {
        Self {
            top_limit: c.top_limit,
            bottom_limit: c.bottom_limit,
            output: c.output,
            up_button: c.up_button,
            down_button: c.down_button,
        }
    }
}

// ── MotionCfg ────────────────────────────────────────────────────────────────

impl From<&player_config::MotionCfg> for MotionCfg {
    fn from(c: &player_config::MotionCfg) -> Self {
        Self {
            max_speed: c.max_speed,
            friction_pct: c.friction_pct,
            acceleration: c.acceleration,
            hit_window_ms: c.hit_window_ms,
        }
    }
}

// ── InputCfg ─────────────────────────────────────────────────────────────────

impl From<&player_config::InputCfg> for InputCfg {
    fn from(c: &player_config::InputCfg) -> Self {
        Self {
            debounce_ms: c.debounce_ms,
        }
    }
}

// ── HomingCfg ────────────────────────────────────────────────────────────────

impl From<&player_config::HomingCfg> for HomingCfg {
    fn from(c: &player_config::HomingCfg) -> Self {
        Self {
            speed: c.speed,
            pulse_ms: c.pulse_ms,
        }
    }
}
