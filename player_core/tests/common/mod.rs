//! Fakes shared by the integration tests: a motor spy, a scripted set of
//! digital lines and a rig that ties them to a `Player` on a manual clock.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::rc::Rc;
use std::time::Duration;

use player_core::{InputCfg, MotionCfg, Player, PlayerPins, Transition};
use player_traits::{DigitalIo, ManualClock, Motor, PinId, PinMode};

pub const PINS: PlayerPins = PlayerPins {
    top_limit: 17,
    bottom_limit: 27,
    output: 22,
    up_button: 5,
    down_button: 6,
};

pub const DEBOUNCE_MS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmd {
    Drive(i16),
    DriveFor(i16, Duration),
    Brake,
}

/// Motor that records every command.
#[derive(Clone, Default)]
pub struct SpyMotor {
    log: Rc<RefCell<Vec<Cmd>>>,
}

impl SpyMotor {
    pub fn log(&self) -> Vec<Cmd> {
        self.log.borrow().clone()
    }
    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
    pub fn last(&self) -> Option<Cmd> {
        self.log.borrow().last().copied()
    }
}

impl Motor for SpyMotor {
    fn drive(&mut self, speed: i16) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.log.borrow_mut().push(Cmd::Drive(speed));
        Ok(())
    }
    fn drive_for(
        &mut self,
        speed: i16,
        duration: Duration,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.log.borrow_mut().push(Cmd::DriveFor(speed, duration));
        Ok(())
    }
    fn brake(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.log.borrow_mut().push(Cmd::Brake);
        Ok(())
    }
}

/// Digital lines whose levels the test sets directly. Unset lines read low.
#[derive(Clone, Default)]
pub struct Lines {
    levels: Rc<RefCell<HashMap<PinId, bool>>>,
    configured: Rc<RefCell<Vec<(PinId, PinMode)>>>,
    writes: Rc<RefCell<Vec<(PinId, bool)>>>,
}

impl Lines {
    pub fn set(&self, pin: PinId, level: bool) {
        self.levels.borrow_mut().insert(pin, level);
    }
    pub fn get(&self, pin: PinId) -> bool {
        self.levels.borrow().get(&pin).copied().unwrap_or(false)
    }
    pub fn configured(&self) -> Vec<(PinId, PinMode)> {
        self.configured.borrow().clone()
    }
    pub fn writes(&self) -> Vec<(PinId, bool)> {
        self.writes.borrow().clone()
    }
}

impl DigitalIo for Lines {
    fn configure(&mut self, pin: PinId, mode: PinMode) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.configured.borrow_mut().push((pin, mode));
        Ok(())
    }
    fn read(&mut self, pin: PinId) -> Result<bool, Box<dyn Error + Send + Sync>> {
        Ok(self.get(pin))
    }
    fn write(&mut self, pin: PinId, high: bool) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.writes.borrow_mut().push((pin, high));
        self.set(pin, high);
        Ok(())
    }
}

pub struct Rig {
    pub player: Player,
    pub motor: SpyMotor,
    pub lines: Lines,
    pub clock: ManualClock,
}

pub fn rig() -> Rig {
    rig_with(MotionCfg::default())
}

pub fn rig_with(motion: MotionCfg) -> Rig {
    let motor = SpyMotor::default();
    let lines = Lines::default();
    let clock = ManualClock::new();
    let player = Player::builder()
        .with_motor(motor.clone())
        .with_io(lines.clone())
        .with_pins(PINS)
        .with_motion(motion)
        .with_input(InputCfg {
            debounce_ms: DEBOUNCE_MS,
        })
        .with_clock(Box::new(clock.clone()))
        .build()
        .expect("player build");
    Rig {
        player,
        motor,
        lines,
        clock,
    }
}

impl Rig {
    pub fn limits(&self, top: bool, bottom: bool) {
        self.lines.set(PINS.top_limit, top);
        self.lines.set(PINS.bottom_limit, bottom);
    }

    /// Advance the clock and run one update.
    pub fn tick(&mut self, ms: u64) -> Option<Transition> {
        self.clock.advance_ms(ms);
        self.player.update().expect("update")
    }

    /// One debounced press and release; takes `2 * (DEBOUNCE_MS + 1)` ms.
    pub fn tap(&mut self, pin: PinId) {
        self.lines.set(pin, true);
        self.tick(1);
        self.tick(DEBOUNCE_MS);
        self.lines.set(pin, false);
        self.tick(1);
        self.tick(DEBOUNCE_MS);
    }

    pub fn tap_up(&mut self) {
        self.tap(PINS.up_button);
    }

    pub fn tap_down(&mut self) {
        self.tap(PINS.down_button);
    }
}
