//! Simulated carriage rig.
//!
//! One shared model backs both the motor and the digital lines: the motor
//! command moves the carriage along its rail, the limit switches read from
//! its position, and the buttons are set by whoever scripts the player.
//! Time is virtual (`ManualClock`), so a timed pulse completes by advancing
//! the clock instead of sleeping.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use player_traits::{BoxError, Clock, DigitalIo, ManualClock, Motor, PinId, PinMode};

use crate::error::HwError;

/// Lines the simulator knows about.
#[derive(Debug, Clone, Copy)]
pub struct SimPins {
    pub top_limit: PinId,
    pub bottom_limit: PinId,
    pub output: PinId,
    pub up_button: PinId,
    pub down_button: PinId,
}

/// Rail geometry and motor response.
#[derive(Debug, Clone, Copy)]
pub struct SimPhysics {
    /// Distance between the bottom and top stops.
    pub travel_mm: f64,
    /// Carriage speed at a drive command of 255.
    pub full_speed_mm_s: f64,
    /// Distance from a stop within which its switch reads active.
    pub switch_band_mm: f64,
    /// Start position, 0 = resting on the bottom stop.
    pub start_mm: f64,
}

impl Default for SimPhysics {
    fn default() -> Self {
        Self {
            travel_mm: 600.0,
            full_speed_mm_s: 400.0,
            switch_band_mm: 1.0,
            start_mm: 0.0,
        }
    }
}

/// A command observed by the simulated motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorCommand {
    Drive(i16),
    DriveFor(i16, Duration),
    Brake,
}

#[derive(Debug)]
struct SimState {
    pins: SimPins,
    physics: SimPhysics,
    clock: ManualClock,
    last: Duration,
    position_mm: f64,
    command: i16,
    up: bool,
    down: bool,
    output: bool,
    modes: HashMap<PinId, PinMode>,
    history: Vec<MotorCommand>,
}

impl SimState {
    /// Move the carriage for the time elapsed since the last call.
    fn integrate(&mut self) {
        let now = self.clock.elapsed();
        let dt = now.saturating_sub(self.last).as_secs_f64();
        self.last = now;
        let v = f64::from(self.command) / 255.0 * self.physics.full_speed_mm_s;
        self.position_mm = (self.position_mm + v * dt).clamp(0.0, self.physics.travel_mm);
    }

    fn top_active(&self) -> bool {
        self.position_mm >= self.physics.travel_mm - self.physics.switch_band_mm
    }

    fn bottom_active(&self) -> bool {
        self.position_mm <= self.physics.switch_band_mm
    }

    fn is_known(&self, pin: PinId) -> bool {
        let p = self.pins;
        [p.top_limit, p.bottom_limit, p.output, p.up_button, p.down_button].contains(&pin)
    }
}

/// Shared simulated rig; hand out `motor()` and `io()` to the controller and
/// keep the rig to script buttons and observe the carriage.
#[derive(Debug, Clone)]
pub struct SimRig {
    state: Rc<RefCell<SimState>>,
}

impl SimRig {
    pub fn new(pins: SimPins, physics: SimPhysics, clock: ManualClock) -> Self {
        let last = clock.elapsed();
        let start = physics.start_mm.clamp(0.0, physics.travel_mm);
        SimRig {
            state: Rc::new(RefCell::new(SimState {
                pins,
                physics,
                clock,
                last,
                position_mm: start,
                command: 0,
                up: false,
                down: false,
                output: false,
                modes: HashMap::new(),
                history: Vec::new(),
            })),
        }
    }

    pub fn motor(&self) -> SimMotor {
        SimMotor {
            state: Rc::clone(&self.state),
        }
    }

    pub fn io(&self) -> SimIo {
        SimIo {
            state: Rc::clone(&self.state),
        }
    }

    /// Handle to the rig's virtual clock.
    pub fn clock(&self) -> ManualClock {
        self.state.borrow().clock.clone()
    }

    pub fn set_up(&self, pressed: bool) {
        self.state.borrow_mut().up = pressed;
    }

    pub fn set_down(&self, pressed: bool) {
        self.state.borrow_mut().down = pressed;
    }

    /// Current carriage position after integrating up to now.
    pub fn position_mm(&self) -> f64 {
        let mut s = self.state.borrow_mut();
        s.integrate();
        s.position_mm
    }

    /// Teleport the carriage (test setup).
    pub fn place_at(&self, mm: f64) {
        let mut s = self.state.borrow_mut();
        s.integrate();
        s.position_mm = mm.clamp(0.0, s.physics.travel_mm);
    }

    pub fn output(&self) -> bool {
        self.state.borrow().output
    }

    /// Signed drive currently applied to the carriage.
    pub fn command(&self) -> i16 {
        self.state.borrow().command
    }

    /// Every motor command received so far, oldest first.
    pub fn history(&self) -> Vec<MotorCommand> {
        self.state.borrow().history.clone()
    }

    pub fn pin_mode(&self, pin: PinId) -> Option<PinMode> {
        self.state.borrow().modes.get(&pin).copied()
    }
}

/// Motor half of the rig.
#[derive(Debug)]
pub struct SimMotor {
    state: Rc<RefCell<SimState>>,
}

impl Motor for SimMotor {
    fn drive(&mut self, speed: i16) -> Result<(), BoxError> {
        let mut s = self.state.borrow_mut();
        s.integrate();
        s.command = speed;
        if s.history.last() != Some(&MotorCommand::Drive(speed)) {
            s.history.push(MotorCommand::Drive(speed));
        }
        Ok(())
    }

    fn drive_for(&mut self, speed: i16, duration: Duration) -> Result<(), BoxError> {
        let mut s = self.state.borrow_mut();
        s.integrate();
        s.history.push(MotorCommand::DriveFor(speed, duration));
        s.command = speed;
        // The pulse runs to completion in virtual time.
        s.clock.sleep(duration);
        s.integrate();
        s.command = 0;
        tracing::debug!(speed, ?duration, position_mm = s.position_mm, "simulated pulse done");
        Ok(())
    }

    fn brake(&mut self) -> Result<(), BoxError> {
        let mut s = self.state.borrow_mut();
        s.integrate();
        s.command = 0;
        if s.history.last() != Some(&MotorCommand::Brake) {
            s.history.push(MotorCommand::Brake);
        }
        Ok(())
    }
}

/// Digital-line half of the rig.
#[derive(Debug)]
pub struct SimIo {
    state: Rc<RefCell<SimState>>,
}

impl DigitalIo for SimIo {
    fn configure(&mut self, pin: PinId, mode: PinMode) -> Result<(), BoxError> {
        let mut s = self.state.borrow_mut();
        if !s.is_known(pin) {
            return Err(Box::new(HwError::UnknownPin(pin)));
        }
        s.modes.insert(pin, mode);
        Ok(())
    }

    fn read(&mut self, pin: PinId) -> Result<bool, BoxError> {
        let mut s = self.state.borrow_mut();
        s.integrate();
        let p = s.pins;
        let level = if pin == p.top_limit {
            s.top_active()
        } else if pin == p.bottom_limit {
            s.bottom_active()
        } else if pin == p.up_button {
            s.up
        } else if pin == p.down_button {
            s.down
        } else if pin == p.output {
            s.output
        } else {
            return Err(Box::new(HwError::UnknownPin(pin)));
        };
        Ok(level)
    }

    fn write(&mut self, pin: PinId, high: bool) -> Result<(), BoxError> {
        let mut s = self.state.borrow_mut();
        if pin != s.pins.output {
            if s.is_known(pin) {
                return Err(Box::new(HwError::Gpio(format!("pin {pin} is an input"))));
            }
            return Err(Box::new(HwError::UnknownPin(pin)));
        }
        s.output = high;
        Ok(())
    }
}
