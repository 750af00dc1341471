//! Configuration types for the player controller.
//!
//! These are the runtime configuration structs used by `PlayerController`.
//! They are separate from the TOML-deserialized config in `player_config`.

use std::time::Duration;

use player_traits::PinId;

/// Full-speed drive command and clamp bound.
pub const DEFAULT_MAX_SPEED: i16 = 255;

/// Fixed pin identities for one mechanism, bound at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerPins {
    pub top_limit: PinId,
    pub bottom_limit: PinId,
    pub output: PinId,
    pub up_button: PinId,
    pub down_button: PinId,
}

impl PlayerPins {
    /// Input lines in configuration order: limits first, then buttons.
    pub fn inputs(&self) -> [PinId; 4] {
        [
            self.top_limit,
            self.bottom_limit,
            self.up_button,
            self.down_button,
        ]
    }

    /// True when two roles share the same line.
    pub fn has_duplicates(&self) -> bool {
        let all = [
            self.top_limit,
            self.bottom_limit,
            self.output,
            self.up_button,
            self.down_button,
        ];
        all.iter()
            .enumerate()
            .any(|(i, p)| all.iter().skip(i + 1).any(|q| q == p))
    }
}

/// Speed model tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionCfg {
    /// Clamp bound for the signed speed; at most 255.
    pub max_speed: i16,
    /// Percent of speed kept at each window fold. Must be < 100 so speed
    /// decays toward zero without input.
    pub friction_pct: i16,
    /// Speed delta contributed by each debounced press.
    pub acceleration: i16,
    /// Length of the hit window in milliseconds.
    pub hit_window_ms: u64,
}

impl Default for MotionCfg {
    fn default() -> Self {
        Self {
            max_speed: DEFAULT_MAX_SPEED,
            friction_pct: 80,
            acceleration: 25,
            hit_window_ms: 100,
        }
    }
}

/// Button input conditioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputCfg {
    /// Stable-interval debounce time in milliseconds.
    pub debounce_ms: u64,
}

impl Default for InputCfg {
    fn default() -> Self {
        Self { debounce_ms: 10 }
    }
}

/// Re-homing behavior used by `reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomingCfg {
    /// Magnitude of the lift pulse and the return nudge.
    pub speed: i16,
    /// Duration of the lift pulse in milliseconds.
    pub pulse_ms: u64,
}

impl Default for HomingCfg {
    fn default() -> Self {
        Self {
            speed: DEFAULT_MAX_SPEED / 4,
            pulse_ms: 750,
        }
    }
}

impl HomingCfg {
    pub fn pulse(&self) -> Duration {
        Duration::from_millis(self.pulse_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pins() -> PlayerPins {
        PlayerPins {
            top_limit: 17,
            bottom_limit: 27,
            output: 22,
            up_button: 5,
            down_button: 6,
        }
    }

    #[test]
    fn distinct_pins_pass() {
        assert!(!pins().has_duplicates());
    }

    #[test]
    fn shared_line_is_detected() {
        let p = PlayerPins {
            down_button: 17,
            ..pins()
        };
        assert!(p.has_duplicates());
    }

    #[test]
    fn homing_defaults_to_quarter_speed() {
        assert_eq!(HomingCfg::default().speed, 63);
        assert_eq!(HomingCfg::default().pulse(), Duration::from_millis(750));
    }
}
