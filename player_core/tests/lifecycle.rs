mod common;

use std::time::Duration;

use common::{Cmd, Lines, PINS, SpyMotor, rig};
use player_core::{HomingCfg, Player, PositionState, build_player};
use player_traits::{ManualClock, PinMode};

#[test]
fn build_configures_inputs_then_output() {
    let r = rig();
    let configured = r.lines.configured();
    assert_eq!(
        configured,
        vec![
            (PINS.top_limit, PinMode::Input),
            (PINS.bottom_limit, PinMode::Input),
            (PINS.up_button, PinMode::Input),
            (PINS.down_button, PinMode::Input),
            (PINS.output, PinMode::Output),
        ]
    );
}

#[test]
fn preconfigured_pins_are_left_alone() {
    let lines = Lines::default();
    let player = Player::builder()
        .with_motor(SpyMotor::default())
        .with_io(lines.clone())
        .with_pins(PINS)
        .with_clock(Box::new(ManualClock::new()))
        .with_pins_preconfigured()
        .build()
        .unwrap();
    assert!(lines.configured().is_empty());
    assert_eq!(player.state(), PositionState::Offmark);
    assert!(!player.controls_enabled());
    assert_eq!(player.current_speed(), 0);
}

#[test]
fn reset_away_from_top_pulses_up_then_heads_down() {
    let mut r = rig();
    r.player.set_controls(true);
    r.motor.clear();
    r.player.reset().unwrap();
    assert_eq!(
        r.motor.log(),
        vec![
            Cmd::DriveFor(63, Duration::from_millis(750)),
            Cmd::Drive(-63)
        ]
    );
    assert!(!r.player.controls_enabled());
    assert_eq!(r.player.state(), PositionState::Offmark);
    assert_eq!(r.player.current_speed(), -63);
    assert_eq!(r.lines.writes().last(), Some(&(PINS.output, false)));
}

#[test]
fn reset_at_top_skips_the_pulse() {
    let mut r = rig();
    r.limits(true, false);
    r.motor.clear();
    r.player.reset().unwrap();
    assert_eq!(r.motor.log(), vec![Cmd::Drive(-63)]);
}

#[test]
fn reset_on_bottom_pulses_then_brakes() {
    let mut r = rig();
    r.limits(false, true);
    r.motor.clear();
    r.player.reset().unwrap();
    assert_eq!(
        r.motor.log(),
        vec![Cmd::DriveFor(63, Duration::from_millis(750)), Cmd::Brake]
    );
    assert_eq!(r.player.current_speed(), 0);
}

#[test]
fn reset_uses_configured_homing() {
    let motor = SpyMotor::default();
    let mut player = Player::builder()
        .with_motor(motor.clone())
        .with_io(Lines::default())
        .with_pins(PINS)
        .with_homing(HomingCfg {
            speed: 90,
            pulse_ms: 300,
        })
        .with_clock(Box::new(ManualClock::new()))
        .build()
        .unwrap();
    motor.clear();
    player.reset().unwrap();
    assert_eq!(
        motor.log(),
        vec![
            Cmd::DriveFor(90, Duration::from_millis(300)),
            Cmd::Drive(-90)
        ]
    );
}

#[test]
fn set_out_drives_the_output_line() {
    let mut r = rig();
    r.player.set_out(true).unwrap();
    assert!(r.lines.get(PINS.output));
    r.player.set_out(false).unwrap();
    assert!(!r.lines.get(PINS.output));
}

#[test]
fn initialize_clears_motion_state() {
    let mut r = rig();
    r.player.set_controls(true);
    r.player.move_at(200).unwrap();
    r.tap_up();
    r.player.initialize(false).unwrap();
    assert_eq!(r.player.current_speed(), 0);
    assert_eq!(r.player.pending_hits(), (0, 0));
    assert!(!r.player.controls_enabled());
    assert_eq!(r.player.state(), PositionState::Offmark);
}

#[test]
fn button_held_at_start_is_not_a_hit() {
    let lines = Lines::default();
    lines.set(PINS.up_button, true);
    let clock = ManualClock::new();
    let mut player = Player::builder()
        .with_motor(SpyMotor::default())
        .with_io(lines)
        .with_pins(PINS)
        .with_clock(Box::new(clock.clone()))
        .build()
        .unwrap();
    player.set_controls(true);
    for _ in 0..5 {
        clock.advance_ms(20);
        player.update().unwrap();
    }
    assert_eq!(player.pending_hits(), (0, 0));
}

#[test]
fn generic_player_exposes_backends() {
    let clock = ManualClock::new();
    let mut player = build_player(
        SpyMotor::default(),
        Lines::default(),
        PINS,
        None,
        None,
        None,
        Some(Box::new(clock.clone())),
        false,
    )
    .unwrap();
    player.move_at(10).unwrap();
    assert_eq!(player.motor().last(), Some(Cmd::Drive(10)));
    assert_eq!(player.io().configured().len(), 5);
    clock.advance_ms(1);
    assert!(player.update().unwrap().is_some());
}
