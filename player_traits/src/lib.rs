//! Collaborator contracts consumed by the player controller.
//!
//! The controller never talks to pins or motor drivers directly; it goes
//! through these traits so the same logic runs against real GPIO, the
//! simulator, or a test fake.

pub mod clock;

pub use clock::{Clock, MonotonicClock};

#[cfg(any(test, feature = "manual-clock"))]
pub use clock::manual::ManualClock;

use std::time::Duration;

/// Error type used at every trait boundary in the workspace.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Identity of a single digital line (BCM numbering on the Pi backend).
pub type PinId = u8;

/// Direction a pin is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input,
    Output,
}

/// Signed DC motor driver.
///
/// Positive speeds move the carriage toward the top limit switch.
pub trait Motor {
    /// Drive continuously at `speed` until the next command.
    fn drive(&mut self, speed: i16) -> Result<(), BoxError>;

    /// Drive at `speed` for `duration`, then stop. Completion is the driver's
    /// responsibility; callers do not track the pulse.
    fn drive_for(&mut self, speed: i16, duration: Duration) -> Result<(), BoxError>;

    /// Stop immediately. Calling it on a stopped motor is a no-op.
    fn brake(&mut self) -> Result<(), BoxError>;
}

/// Level access to the limit switches, buttons and output line.
pub trait DigitalIo {
    fn configure(&mut self, pin: PinId, mode: PinMode) -> Result<(), BoxError>;

    /// Returns `true` when the line reads high (active).
    fn read(&mut self, pin: PinId) -> Result<bool, BoxError>;

    fn write(&mut self, pin: PinId, high: bool) -> Result<(), BoxError>;
}

impl<M: Motor + ?Sized> Motor for Box<M> {
    fn drive(&mut self, speed: i16) -> Result<(), BoxError> {
        (**self).drive(speed)
    }
    fn drive_for(&mut self, speed: i16, duration: Duration) -> Result<(), BoxError> {
        (**self).drive_for(speed, duration)
    }
    fn brake(&mut self) -> Result<(), BoxError> {
        (**self).brake()
    }
}

impl<D: DigitalIo + ?Sized> DigitalIo for Box<D> {
    fn configure(&mut self, pin: PinId, mode: PinMode) -> Result<(), BoxError> {
        (**self).configure(pin, mode)
    }
    fn read(&mut self, pin: PinId) -> Result<bool, BoxError> {
        (**self).read(pin)
    }
    fn write(&mut self, pin: PinId, high: bool) -> Result<(), BoxError> {
        (**self).write(pin, high)
    }
}
