//! The player control loop (`PlayerController`).
//!
//! One `update()` per caller-driven tick: debounce the buttons, fold hits into
//! the speed model, let the limit switches arbitrate the motor command, then
//! step the position state machine.

use std::sync::Arc;
use std::time::Instant;

use eyre::WrapErr;
use player_traits::clock::Clock;
use player_traits::{DigitalIo, Motor, PinId, PinMode};

use crate::config::{HomingCfg, InputCfg, MotionCfg, PlayerPins};
use crate::debounce::ButtonDebouncer;
use crate::error::Result;
use crate::hw_error::map_hw_error;
use crate::speed::SpeedModel;
use crate::state::{LimitReading, PositionState, Transition};

/// Unified core for both dynamic (boxed) and generic (static dispatch) variants.
pub struct PlayerController<M: Motor, D: DigitalIo> {
    pub(crate) motor: M,
    pub(crate) io: D,
    pub(crate) pins: PlayerPins,
    pub(crate) homing: HomingCfg,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) epoch: Instant,

    pub(crate) state: PositionState,
    pub(crate) previous_state: PositionState,
    pub(crate) controls_enabled: bool,
    pub(crate) speed: SpeedModel,
    pub(crate) up: ButtonDebouncer,
    pub(crate) down: ButtonDebouncer,
}

impl<M: Motor, D: DigitalIo> core::fmt::Debug for PlayerController<M, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PlayerController")
            .field("state", &self.state)
            .field("speed", &self.speed.speed())
            .field("controls_enabled", &self.controls_enabled)
            .finish()
    }
}

impl<M: Motor, D: DigitalIo> PlayerController<M, D> {
    /// Assemble a controller without touching hardware. Call `initialize`
    /// before the first `update`.
    pub(crate) fn new(
        motor: M,
        io: D,
        pins: PlayerPins,
        motion: MotionCfg,
        input: InputCfg,
        homing: HomingCfg,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        let epoch = clock.now();
        Self {
            motor,
            io,
            pins,
            homing,
            clock,
            epoch,
            state: PositionState::Offmark,
            previous_state: PositionState::Finished,
            controls_enabled: false,
            speed: SpeedModel::new(motion),
            up: ButtonDebouncer::new(pins.up_button, input.debounce_ms),
            down: ButtonDebouncer::new(pins.down_button, input.debounce_ms),
        }
    }

    /// Bring the controller to its start-up state.
    ///
    /// Configures pin directions unless `configure_pins` is false (lines set
    /// up elsewhere), seeds both debouncers with the current button levels,
    /// zeroes speed and hit counters, opens the hit window and puts the state
    /// machine at `Offmark`. The previous state is set to `Finished` so the
    /// first `update` reports a transition.
    pub fn initialize(&mut self, configure_pins: bool) -> Result<()> {
        if configure_pins {
            for pin in self.pins.inputs() {
                self.configure(pin, PinMode::Input)?;
            }
            self.configure(self.pins.output, PinMode::Output)?;
        }

        self.epoch = self.clock.now();
        let now = self.now_ms();
        let up_level = self.read(self.up.pin())?;
        let down_level = self.read(self.down.pin())?;
        self.up.attach(up_level, now);
        self.down.attach(down_level, now);

        self.speed.restart(now);
        self.controls_enabled = false;
        self.state = PositionState::Offmark;
        self.previous_state = PositionState::Finished;
        tracing::debug!(pins = ?self.pins, configure_pins, "player initialized");
        Ok(())
    }

    /// One tick of the control loop. Returns the state change observed during
    /// this tick, if any.
    pub fn update(&mut self) -> Result<Option<Transition>> {
        let now = self.now_ms();
        let up_level = self.read(self.up.pin())?;
        let down_level = self.read(self.down.pin())?;
        self.up.update(up_level, now);
        self.down.update(down_level, now);

        if self.controls_enabled {
            self.speed.record(self.up.rose(), self.down.rose());
            self.speed.tick(now);
        }

        let limits = self.read_limits()?;
        self.arbitrate(limits)?;
        self.state = self.state.next(limits);

        if self.state == self.previous_state {
            return Ok(None);
        }
        let transition = Transition {
            from: self.previous_state,
            to: self.state,
        };
        self.previous_state = self.state;
        tracing::info!(from = %transition.from, to = %transition.to, "player state changed");
        Ok(Some(transition))
    }

    /// Current phase.
    pub fn state(&self) -> PositionState {
        self.state
    }

    /// Human-readable label for the current phase.
    pub fn state_label(&self) -> &'static str {
        self.state.label()
    }

    pub fn is_on_mark(&self) -> bool {
        self.state == PositionState::Onmark
    }

    pub fn is_finished(&self) -> bool {
        self.state == PositionState::Finished
    }

    /// Drive the output line directly.
    pub fn set_out(&mut self, value: bool) -> Result<()> {
        let pin = self.pins.output;
        self.io
            .write(pin, value)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err_with(|| format!("write output pin {pin}"))
    }

    /// Gate button input. Limit switch arbitration stays active either way.
    pub fn set_controls(&mut self, enabled: bool) {
        if self.controls_enabled != enabled {
            tracing::info!(enabled, "player controls toggled");
        }
        self.controls_enabled = enabled;
    }

    pub fn controls_enabled(&self) -> bool {
        self.controls_enabled
    }

    /// Brake immediately, bypassing arbitration.
    pub fn stop_motors(&mut self) -> Result<()> {
        self.brake().wrap_err("stop_motors")
    }

    /// Re-arm for a new round and send the carriage home.
    ///
    /// Disables controls, clears the output and forces `Offmark`. Unless the
    /// carriage already sits at the top stop, a timed lift pulse at homing
    /// speed is issued first; then the carriage is driven back down at homing
    /// speed until the bottom stop brakes it.
    pub fn reset(&mut self) -> Result<()> {
        self.set_controls(false);
        self.set_out(false)?;
        self.state = PositionState::Offmark;

        let top = self.read(self.pins.top_limit)?;
        if !top {
            let (speed, pulse) = (self.homing.speed, self.homing.pulse());
            tracing::trace!(speed, pulse_ms = self.homing.pulse_ms, "motor drive_for");
            self.motor
                .drive_for(speed, pulse)
                .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
                .wrap_err("homing pulse")?;
        }
        tracing::info!(at_top = top, "player reset");
        self.move_at(-self.homing.speed)
    }

    /// Set the speed explicitly (clamped) and arbitrate it against the limit
    /// switches right away.
    pub fn move_at(&mut self, speed: i16) -> Result<()> {
        self.speed.set_speed(speed);
        let limits = self.read_limits()?;
        self.arbitrate(limits)
    }

    /// Signed speed currently commanded.
    pub fn current_speed(&self) -> i16 {
        self.speed.speed()
    }

    /// Hits accumulated in the open window as `(up, down)`.
    pub fn pending_hits(&self) -> (u32, u32) {
        self.speed.hits()
    }

    pub fn pins(&self) -> &PlayerPins {
        &self.pins
    }

    pub fn motor(&self) -> &M {
        &self.motor
    }

    pub fn io(&self) -> &D {
        &self.io
    }

    /// Limit switches get the final word over the speed model: driving
    /// further into an active stop brakes and zeroes the speed.
    fn arbitrate(&mut self, limits: LimitReading) -> Result<()> {
        let speed = self.speed.speed();
        if (limits.top && speed > 0) || (limits.bottom && speed < 0) {
            tracing::debug!(speed, top = limits.top, bottom = limits.bottom, "limit override");
            self.speed.set_speed(0);
            self.brake()
        } else if speed != 0 {
            tracing::trace!(speed, "motor drive");
            self.motor
                .drive(speed)
                .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
                .wrap_err("motor drive")
        } else {
            self.brake()
        }
    }

    fn brake(&mut self) -> Result<()> {
        tracing::trace!("motor brake");
        self.motor
            .brake()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("motor brake")
    }

    fn read_limits(&mut self) -> Result<LimitReading> {
        Ok(LimitReading {
            top: self.read(self.pins.top_limit)?,
            bottom: self.read(self.pins.bottom_limit)?,
        })
    }

    fn read(&mut self, pin: PinId) -> Result<bool> {
        self.io
            .read(pin)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err_with(|| format!("read pin {pin}"))
    }

    fn configure(&mut self, pin: PinId, mode: PinMode) -> Result<()> {
        self.io
            .configure(pin, mode)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err_with(|| format!("configure pin {pin} as {mode:?}"))
    }

    #[inline]
    fn now_ms(&self) -> u64 {
        self.clock.ms_since(self.epoch)
    }
}
