//! Type-state builder for `Player` and generic `build_player` constructor.
//!
//! The builder enforces at compile time that Motor, DigitalIo, and pins are
//! provided before `build()` is available. `try_build()` is always available
//! for dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;

use player_traits::clock::{Clock, MonotonicClock};
use player_traits::{DigitalIo, Motor};

use crate::config::{HomingCfg, InputCfg, MotionCfg, PlayerPins};
use crate::core::PlayerController;
use crate::error::{BuildError, Result};
use crate::state::{PositionState, Transition};

// ── Public dynamic-dispatch wrapper ──────────────────────────────────────────

/// Public dynamic (boxed) player controller.
pub struct Player {
    pub(crate) inner: PlayerController<Box<dyn Motor>, Box<dyn DigitalIo>>,
}

impl core::fmt::Debug for Player {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Player")
            .field("state", &self.inner.state)
            .field("speed", &self.inner.current_speed())
            .field("controls_enabled", &self.inner.controls_enabled)
            .finish()
    }
}

impl Player {
    /// Start building a Player.
    pub fn builder() -> PlayerBuilder<Missing, Missing, Missing> {
        PlayerBuilder::default()
    }

    /// One tick of the control loop.
    pub fn update(&mut self) -> Result<Option<Transition>> {
        self.inner.update()
    }

    /// Re-run start-up initialization.
    pub fn initialize(&mut self, configure_pins: bool) -> Result<()> {
        self.inner.initialize(configure_pins)
    }

    pub fn state(&self) -> PositionState {
        self.inner.state()
    }

    /// Human-readable label for the current phase.
    pub fn state_label(&self) -> &'static str {
        self.inner.state_label()
    }

    pub fn is_on_mark(&self) -> bool {
        self.inner.is_on_mark()
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    pub fn set_out(&mut self, value: bool) -> Result<()> {
        self.inner.set_out(value)
    }

    pub fn set_controls(&mut self, enabled: bool) {
        self.inner.set_controls(enabled);
    }

    pub fn controls_enabled(&self) -> bool {
        self.inner.controls_enabled()
    }

    /// Brake immediately, bypassing arbitration.
    pub fn stop_motors(&mut self) -> Result<()> {
        self.inner.stop_motors()
    }

    /// Re-arm for a new round and send the carriage home.
    pub fn reset(&mut self) -> Result<()> {
        self.inner.reset()
    }

    /// Explicit speed override, arbitrated against the limit switches.
    pub fn move_at(&mut self, speed: i16) -> Result<()> {
        self.inner.move_at(speed)
    }

    pub fn current_speed(&self) -> i16 {
        self.inner.current_speed()
    }

    pub fn pending_hits(&self) -> (u32, u32) {
        self.inner.pending_hits()
    }

    pub fn pins(&self) -> &PlayerPins {
        self.inner.pins()
    }
}

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `Player`. All fields are validated on `build()`.
pub struct PlayerBuilder<M, D, P> {
    motor: Option<Box<dyn Motor>>,
    io: Option<Box<dyn DigitalIo>>,
    pins: Option<PlayerPins>,
    motion: Option<MotionCfg>,
    input: Option<InputCfg>,
    homing: Option<HomingCfg>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    pins_preconfigured: bool,
    _m: PhantomData<M>,
    _d: PhantomData<D>,
    _p: PhantomData<P>,
}

impl Default for PlayerBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            motor: None,
            io: None,
            pins: None,
            motion: None,
            input: None,
            homing: None,
            clock: None,
            pins_preconfigured: false,
            _m: PhantomData,
            _d: PhantomData,
            _p: PhantomData,
        }
    }
}

/// Validate configuration, construct a `PlayerController` and run
/// `initialize` on it.
///
/// This is the single source of truth for validation and construction,
/// used by both `PlayerBuilder::try_build()` and `build_player()`.
#[allow(clippy::too_many_arguments)]
fn validate_and_build<M: Motor, D: DigitalIo>(
    motor: M,
    io: D,
    pins: PlayerPins,
    motion: MotionCfg,
    input: InputCfg,
    homing: HomingCfg,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    pins_preconfigured: bool,
) -> Result<PlayerController<M, D>> {
    // ── Validation ───────────────────────────────────────────────────────────
    if pins.has_duplicates() {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "each pin role needs its own line",
        )));
    }
    if !(1..=255).contains(&motion.max_speed) {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "max_speed must be in 1..=255",
        )));
    }
    if !(0..100).contains(&motion.friction_pct) {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "friction_pct must be in 0..100",
        )));
    }
    if motion.acceleration < 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "acceleration must be >= 0",
        )));
    }
    if motion.hit_window_ms == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "hit_window_ms must be >= 1",
        )));
    }
    if !(1..=motion.max_speed).contains(&homing.speed) {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "homing speed must be in 1..=max_speed",
        )));
    }

    // ── Construction ─────────────────────────────────────────────────────────
    let clock: Arc<dyn Clock + Send + Sync> = match clock {
        Some(c) => Arc::from(c),
        None => Arc::new(MonotonicClock::new()),
    };
    let mut core = PlayerController::new(motor, io, pins, motion, input, homing, clock);
    core.initialize(!pins_preconfigured)?;
    Ok(core)
}

impl<M, D, P> PlayerBuilder<M, D, P> {
    /// Validate and build regardless of type-state; missing parts are
    /// reported as `BuildError`.
    pub fn try_build(self) -> Result<Player> {
        let motor = self
            .motor
            .ok_or_else(|| eyre::Report::new(BuildError::MissingMotor))?;
        let io = self
            .io
            .ok_or_else(|| eyre::Report::new(BuildError::MissingIo))?;
        let pins = self
            .pins
            .ok_or_else(|| eyre::Report::new(BuildError::MissingPins))?;
        let inner = validate_and_build(
            motor,
            io,
            pins,
            self.motion.unwrap_or_default(),
            self.input.unwrap_or_default(),
            self.homing.unwrap_or_default(),
            self.clock,
            self.pins_preconfigured,
        )?;
        Ok(Player { inner })
    }

    pub fn with_motion(mut self, motion: MotionCfg) -> Self {
        self.motion = Some(motion);
        self
    }
    pub fn with_input(mut self, input: InputCfg) -> Self {
        self.input = Some(input);
        self
    }
    pub fn with_homing(mut self, homing: HomingCfg) -> Self {
        self.homing = Some(homing);
        self
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
    /// Skip pin direction setup in `initialize` (lines configured elsewhere).
    pub fn with_pins_preconfigured(mut self) -> Self {
        self.pins_preconfigured = true;
        self
    }

    fn retype<M2, D2, P2>(self) -> PlayerBuilder<M2, D2, P2> {
        PlayerBuilder {
            motor: self.motor,
            io: self.io,
            pins: self.pins,
            motion: self.motion,
            input: self.input,
            homing: self.homing,
            clock: self.clock,
            pins_preconfigured: self.pins_preconfigured,
            _m: PhantomData,
            _d: PhantomData,
            _p: PhantomData,
        }
    }
}

// Setters that advance type-state
impl<D, P> PlayerBuilder<Missing, D, P> {
    pub fn with_motor(mut self, motor: impl Motor + 'static) -> PlayerBuilder<Set, D, P> {
        self.motor = Some(Box::new(motor));
        self.retype()
    }
}

impl<M, P> PlayerBuilder<M, Missing, P> {
    pub fn with_io(mut self, io: impl DigitalIo + 'static) -> PlayerBuilder<M, Set, P> {
        self.io = Some(Box::new(io));
        self.retype()
    }
}

impl<M, D> PlayerBuilder<M, D, Missing> {
    pub fn with_pins(mut self, pins: PlayerPins) -> PlayerBuilder<M, D, Set> {
        self.pins = Some(pins);
        self.retype()
    }
}

impl PlayerBuilder<Set, Set, Set> {
    /// Validate and build the Player. Only available when Motor, DigitalIo and pins are set.
    pub fn build(self) -> Result<Player> {
        self.try_build()
    }
}

/// Generic, statically-dispatched alias using the unified core.
pub type PlayerG<M, D> = PlayerController<M, D>;

/// Build a generic, statically-dispatched `PlayerG` from a concrete motor and
/// IO backend.
///
/// Delegates to the shared `validate_and_build`.
#[allow(clippy::too_many_arguments)]
pub fn build_player<M, D>(
    motor: M,
    io: D,
    pins: PlayerPins,
    motion: Option<MotionCfg>,
    input: Option<InputCfg>,
    homing: Option<HomingCfg>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    pins_preconfigured: bool,
) -> Result<PlayerG<M, D>>
where
    M: Motor,
    D: DigitalIo,
{
    validate_and_build(
        motor,
        io,
        pins,
        motion.unwrap_or_default(),
        input.unwrap_or_default(),
        homing.unwrap_or_default(),
        clock,
        pins_preconfigured,
    )
}
