#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the player controller.
//!
//! `Config` and its sections are deserialized from TOML and then checked by
//! `Config::validate`. Every section except `[pins]` is optional and falls
//! back to the defaults below.
use serde::Deserialize;
use std::path::Path;

/// Pin assignment (BCM numbering on the Pi backend).
#[derive(Debug, Deserialize, Clone)]
pub struct Pins {
    pub top_limit: u8,
    pub bottom_limit: u8,
    pub output: u8,
    pub up_button: u8,
    pub down_button: u8,
    /// H-bridge enable line, driven with PWM.
    pub motor_pwm: u8,
    /// H-bridge direction inputs.
    pub motor_in1: u8,
    pub motor_in2: u8,
}

impl Pins {
    fn all(&self) -> [(&'static str, u8); 8] {
        [
            ("top_limit", self.top_limit),
            ("bottom_limit", self.bottom_limit),
            ("output", self.output),
            ("up_button", self.up_button),
            ("down_button", self.down_button),
            ("motor_pwm", self.motor_pwm),
            ("motor_in1", self.motor_in1),
            ("motor_in2", self.motor_in2),
        ]
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MotionCfg {
    /// Clamp bound and full-speed reference (<= 255)
    pub max_speed: i16,
    /// Percent of speed kept per window (< 100)
    pub friction_pct: i16,
    /// Speed delta per debounced press
    pub acceleration: i16,
    /// Hit window length (ms)
    pub hit_window_ms: u64,
}

impl Default for MotionCfg {
    fn default() -> Self {
        Self {
            max_speed: 255,
            friction_pct: 80,
            acceleration: 25,
            hit_window_ms: 100,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputCfg {
    pub debounce_ms: u64,
}

impl Default for InputCfg {
    fn default() -> Self {
        Self { debounce_ms: 10 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HomingCfg {
    /// Lift pulse and return nudge magnitude
    pub speed: i16,
    /// Lift pulse length (ms)
    pub pulse_ms: u64,
}

impl Default for HomingCfg {
    fn default() -> Self {
        Self {
            speed: 63,
            pulse_ms: 750,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RunnerCfg {
    /// Period between `update()` calls (ms)
    pub tick_ms: u64,
    /// Abort a round after this many ticks (0 = unbounded)
    pub max_ticks: u64,
}

impl Default for RunnerCfg {
    fn default() -> Self {
        Self {
            tick_ms: 5,
            max_ticks: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Hardware {
    /// Software PWM frequency on the motor enable line
    pub pwm_frequency_hz: f64,
}

impl Default for Hardware {
    fn default() -> Self {
        Self {
            pwm_frequency_hz: 1000.0,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub pins: Pins,
    #[serde(default)]
    pub motion: MotionCfg,
    #[serde(default)]
    pub input: InputCfg,
    #[serde(default)]
    pub homing: HomingCfg,
    #[serde(default)]
    pub runner: RunnerCfg,
    #[serde(default)]
    pub hardware: Hardware,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Pins
        let pins = self.pins.all();
        for (i, (name, pin)) in pins.iter().enumerate() {
            if let Some((other, _)) = pins.iter().skip(i + 1).find(|(_, p)| p == pin) {
                eyre::bail!("pins.{name} and pins.{other} share line {pin}");
            }
        }

        // Motion
        if self.motion.max_speed < 1 || self.motion.max_speed > 255 {
            eyre::bail!("motion.max_speed must be in [1, 255]");
        }
        if self.motion.friction_pct < 0 || self.motion.friction_pct >= 100 {
            eyre::bail!("motion.friction_pct must be in [0, 100)");
        }
        if self.motion.acceleration < 0 {
            eyre::bail!("motion.acceleration must be >= 0");
        }
        if self.motion.hit_window_ms == 0 {
            eyre::bail!("motion.hit_window_ms must be >= 1");
        }
        if self.motion.hit_window_ms > 60 * 1000 {
            eyre::bail!("motion.hit_window_ms is unreasonably large (>60s)");
        }

        // Input
        if self.input.debounce_ms > 1000 {
            eyre::bail!("input.debounce_ms is unreasonably large (>1s)");
        }

        // Homing
        if self.homing.speed < 1 || self.homing.speed > self.motion.max_speed {
            eyre::bail!("homing.speed must be in [1, motion.max_speed]");
        }
        if self.homing.pulse_ms > 10 * 1000 {
            eyre::bail!("homing.pulse_ms is unreasonably large (>10s)");
        }

        // Runner
        if self.runner.tick_ms == 0 {
            eyre::bail!("runner.tick_ms must be >= 1");
        }

        // Hardware
        if !(self.hardware.pwm_frequency_hz.is_finite() && self.hardware.pwm_frequency_hz > 0.0) {
            eyre::bail!("hardware.pwm_frequency_hz must be > 0");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
