mod common;

use common::{Lines, PINS, SpyMotor};
use player_core::{BuildError, HomingCfg, MotionCfg, Player, PlayerPins};
use player_traits::ManualClock;
use rstest::rstest;

fn build_error(r: player_core::Result<Player>) -> BuildError {
    let e = r.expect_err("build should fail");
    e.downcast_ref::<BuildError>()
        .cloned()
        .unwrap_or_else(|| panic!("not a BuildError: {e:?}"))
}

#[test]
fn missing_motor() {
    let r = Player::builder()
        .with_io(Lines::default())
        .with_pins(PINS)
        .try_build();
    assert!(matches!(build_error(r), BuildError::MissingMotor));
}

#[test]
fn missing_io() {
    let r = Player::builder()
        .with_motor(SpyMotor::default())
        .with_pins(PINS)
        .try_build();
    assert!(matches!(build_error(r), BuildError::MissingIo));
}

#[test]
fn missing_pins() {
    let r = Player::builder()
        .with_motor(SpyMotor::default())
        .with_io(Lines::default())
        .try_build();
    assert!(matches!(build_error(r), BuildError::MissingPins));
}

#[test]
fn duplicate_pins_are_rejected() {
    let pins = PlayerPins {
        down_button: PINS.up_button,
        ..PINS
    };
    let r = Player::builder()
        .with_motor(SpyMotor::default())
        .with_io(Lines::default())
        .with_pins(pins)
        .try_build();
    assert!(matches!(build_error(r), BuildError::InvalidConfig(_)));
}

#[rstest]
#[case::zero_max(MotionCfg { max_speed: 0, ..MotionCfg::default() })]
#[case::max_above_pwm_range(MotionCfg { max_speed: 300, ..MotionCfg::default() })]
#[case::full_friction(MotionCfg { friction_pct: 100, ..MotionCfg::default() })]
#[case::negative_friction(MotionCfg { friction_pct: -1, ..MotionCfg::default() })]
#[case::negative_accel(MotionCfg { acceleration: -5, ..MotionCfg::default() })]
#[case::empty_window(MotionCfg { hit_window_ms: 0, ..MotionCfg::default() })]
fn invalid_motion_is_rejected(#[case] motion: MotionCfg) {
    let r = Player::builder()
        .with_motor(SpyMotor::default())
        .with_io(Lines::default())
        .with_pins(PINS)
        .with_motion(motion)
        .with_clock(Box::new(ManualClock::new()))
        .build();
    assert!(matches!(build_error(r), BuildError::InvalidConfig(_)));
}

#[rstest]
#[case(0)]
#[case(-63)]
#[case(256)]
fn homing_speed_outside_range_is_rejected(#[case] speed: i16) {
    let r = Player::builder()
        .with_motor(SpyMotor::default())
        .with_io(Lines::default())
        .with_pins(PINS)
        .with_homing(HomingCfg {
            speed,
            ..HomingCfg::default()
        })
        .build();
    assert!(matches!(build_error(r), BuildError::InvalidConfig(_)));
}

#[test]
fn homing_speed_bounded_by_configured_max() {
    let r = Player::builder()
        .with_motor(SpyMotor::default())
        .with_io(Lines::default())
        .with_pins(PINS)
        .with_motion(MotionCfg {
            max_speed: 50,
            ..MotionCfg::default()
        })
        .build();
    assert!(matches!(build_error(r), BuildError::InvalidConfig(_)));
}

#[test]
fn error_messages_are_readable() {
    assert_eq!(BuildError::MissingMotor.to_string(), "missing motor");
    assert_eq!(
        BuildError::InvalidConfig("hit_window_ms must be >= 1").to_string(),
        "invalid config: hit_window_ms must be >= 1"
    );
}
