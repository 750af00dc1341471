//! Motor and digital-line backends for the player controller.
//!
//! - `sim`: a virtual-time carriage model, always available.
//! - `hardware` (feature `hardware`, Linux): Raspberry Pi GPIO via `rppal`.
pub mod error;
pub mod sim;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod hardware;

pub use sim::{MotorCommand, SimIo, SimMotor, SimPhysics, SimPins, SimRig};

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use player_traits::{Clock, DigitalIo, ManualClock, Motor, PinMode};
    use std::time::Duration;

    const PINS: SimPins = SimPins {
        top_limit: 17,
        bottom_limit: 27,
        output: 22,
        up_button: 5,
        down_button: 6,
    };

    fn rig() -> SimRig {
        SimRig::new(PINS, SimPhysics::default(), ManualClock::new())
    }

    #[test]
    fn carriage_starts_on_bottom_stop() {
        let rig = rig();
        let mut io = rig.io();
        assert!(io.read(PINS.bottom_limit).unwrap());
        assert!(!io.read(PINS.top_limit).unwrap());
    }

    #[rstest]
    #[case::resting_on_bottom(0.0, false, true)]
    #[case::inside_bottom_band(1.0, false, true)]
    #[case::mid_rail(300.0, false, false)]
    #[case::inside_top_band(599.5, true, false)]
    #[case::clamped_past_top(900.0, true, false)]
    fn switches_follow_position(#[case] mm: f64, #[case] top: bool, #[case] bottom: bool) {
        let rig = rig();
        let mut io = rig.io();
        rig.place_at(mm);
        assert_eq!(io.read(PINS.top_limit).unwrap(), top);
        assert_eq!(io.read(PINS.bottom_limit).unwrap(), bottom);
    }

    #[test]
    fn full_speed_reaches_top_and_stops_there() {
        let rig = rig();
        let clock = rig.clock();
        let mut motor = rig.motor();
        let mut io = rig.io();
        motor.drive(255).unwrap();
        clock.advance(Duration::from_secs(1));
        assert!((rig.position_mm() - 400.0).abs() < 1e-6);
        clock.advance(Duration::from_secs(5));
        assert!(io.read(PINS.top_limit).unwrap());
        assert_eq!(rig.position_mm(), 600.0);
    }

    #[test]
    fn pulse_advances_virtual_time_and_stops() {
        let rig = rig();
        let clock = rig.clock();
        let epoch = clock.now();
        let mut motor = rig.motor();
        motor.drive_for(255, Duration::from_millis(500)).unwrap();
        assert_eq!(clock.ms_since(epoch), 500);
        assert_eq!(rig.command(), 0);
        assert!((rig.position_mm() - 200.0).abs() < 1e-6);
        assert_eq!(
            rig.history(),
            vec![MotorCommand::DriveFor(255, Duration::from_millis(500))]
        );
    }

    #[test]
    fn repeated_drives_are_recorded_once() {
        let rig = rig();
        let mut motor = rig.motor();
        for _ in 0..3 {
            motor.drive(40).unwrap();
        }
        motor.drive(50).unwrap();
        motor.drive(40).unwrap();
        assert_eq!(
            rig.history(),
            vec![
                MotorCommand::Drive(40),
                MotorCommand::Drive(50),
                MotorCommand::Drive(40)
            ]
        );
        assert_eq!(rig.command(), 40);
    }

    #[test]
    fn repeated_brakes_are_recorded_once() {
        let rig = rig();
        let mut motor = rig.motor();
        motor.brake().unwrap();
        motor.brake().unwrap();
        motor.drive(-10).unwrap();
        motor.brake().unwrap();
        assert_eq!(
            rig.history(),
            vec![
                MotorCommand::Brake,
                MotorCommand::Drive(-10),
                MotorCommand::Brake
            ]
        );
    }

    #[test]
    fn unknown_and_input_pins_reject_writes() {
        let rig = rig();
        let mut io = rig.io();
        let err = io.write(40, true).unwrap_err();
        assert!(err.to_string().contains("not wired"));
        let err = io.write(PINS.up_button, true).unwrap_err();
        assert!(err.to_string().contains("input"));
        io.write(PINS.output, true).unwrap();
        assert!(rig.output());
    }

    #[test]
    fn configure_records_modes() {
        let rig = rig();
        let mut io = rig.io();
        io.configure(PINS.output, PinMode::Output).unwrap();
        assert_eq!(rig.pin_mode(PINS.output), Some(PinMode::Output));
        assert!(io.configure(99, PinMode::Input).is_err());
    }
}
