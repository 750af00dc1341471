//! Raspberry Pi backend on top of `rppal`.

use std::collections::HashMap;
use std::thread::sleep;
use std::time::Duration;

use player_traits::{BoxError, DigitalIo, Motor, PinId, PinMode};
use rppal::gpio::{Gpio, InputPin, OutputPin};
use tracing::trace;

use crate::error::{HwError, Result};

fn gpio_err(e: rppal::gpio::Error) -> HwError {
    HwError::Gpio(e.to_string())
}

enum Line {
    Input(InputPin),
    Output(OutputPin),
}

/// Limit switches, buttons and the output line on the Pi header.
///
/// Lines are claimed on `configure`; reading a line that was never
/// configured claims it as an input on first use.
pub struct GpioIo {
    gpio: Gpio,
    lines: HashMap<PinId, Line>,
}

impl GpioIo {
    pub fn new() -> Result<Self> {
        Ok(Self {
            gpio: Gpio::new().map_err(gpio_err)?,
            lines: HashMap::new(),
        })
    }

    fn claim(&mut self, pin: PinId, mode: PinMode) -> Result<()> {
        // rppal keeps a line busy while its handle lives; drop it before re-claiming.
        self.lines.remove(&pin);
        let raw = self.gpio.get(pin).map_err(gpio_err)?;
        let line = match mode {
            PinMode::Input => Line::Input(raw.into_input()),
            PinMode::Output => Line::Output(raw.into_output_low()),
        };
        self.lines.insert(pin, line);
        Ok(())
    }
}

impl DigitalIo for GpioIo {
    fn configure(&mut self, pin: PinId, mode: PinMode) -> std::result::Result<(), BoxError> {
        self.claim(pin, mode)?;
        trace!(pin, ?mode, "gpio configured");
        Ok(())
    }

    fn read(&mut self, pin: PinId) -> std::result::Result<bool, BoxError> {
        if !self.lines.contains_key(&pin) {
            self.claim(pin, PinMode::Input)?;
        }
        match self.lines.get(&pin) {
            Some(Line::Input(p)) => Ok(p.is_high()),
            Some(Line::Output(p)) => Ok(p.is_set_high()),
            None => Err(Box::new(HwError::UnknownPin(pin))),
        }
    }

    fn write(&mut self, pin: PinId, high: bool) -> std::result::Result<(), BoxError> {
        if !self.lines.contains_key(&pin) {
            self.claim(pin, PinMode::Output)?;
        }
        match self.lines.get_mut(&pin) {
            Some(Line::Output(p)) => {
                if high {
                    p.set_high();
                } else {
                    p.set_low();
                }
                Ok(())
            }
            Some(Line::Input(_)) => Err(Box::new(HwError::Gpio(format!(
                "pin {pin} is configured as input"
            )))),
            None => Err(Box::new(HwError::UnknownPin(pin))),
        }
    }
}

/// DC motor on an H-bridge (L298N style): two direction inputs and a PWM
/// enable line.
pub struct HBridgeMotor {
    pwm: OutputPin,
    in1: OutputPin,
    in2: OutputPin,
    frequency_hz: f64,
}

impl HBridgeMotor {
    pub fn new(pwm_pin: u8, in1_pin: u8, in2_pin: u8, frequency_hz: f64) -> Result<Self> {
        let gpio = Gpio::new().map_err(gpio_err)?;
        let open = |pin: u8| -> Result<OutputPin> {
            Ok(gpio.get(pin).map_err(gpio_err)?.into_output_low())
        };
        Ok(Self {
            pwm: open(pwm_pin)?,
            in1: open(in1_pin)?,
            in2: open(in2_pin)?,
            frequency_hz,
        })
    }

    fn apply(&mut self, speed: i16) -> Result<()> {
        if speed > 0 {
            self.in1.set_high();
            self.in2.set_low();
        } else {
            self.in1.set_low();
            self.in2.set_high();
        }
        let duty = f64::from(speed.unsigned_abs().min(255)) / 255.0;
        self.pwm
            .set_pwm_frequency(self.frequency_hz, duty)
            .map_err(gpio_err)?;
        trace!(speed, duty, "h-bridge drive");
        Ok(())
    }
}

impl Motor for HBridgeMotor {
    fn drive(&mut self, speed: i16) -> std::result::Result<(), BoxError> {
        if speed == 0 {
            return self.brake();
        }
        self.apply(speed)?;
        Ok(())
    }

    fn drive_for(&mut self, speed: i16, duration: Duration) -> std::result::Result<(), BoxError> {
        self.drive(speed)?;
        sleep(duration);
        self.brake()
    }

    fn brake(&mut self) -> std::result::Result<(), BoxError> {
        // Both inputs equal with enable high shorts the motor windings.
        self.in1.set_high();
        self.in2.set_high();
        self.pwm.clear_pwm().map_err(gpio_err)?;
        self.pwm.set_high();
        trace!("h-bridge brake");
        Ok(())
    }
}
