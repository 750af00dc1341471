use player_config::{load_file, load_toml};
use rstest::rstest;
use std::fs;
use tempfile::tempdir;

const PINS: &str = r#"
[pins]
top_limit = 17
bottom_limit = 27
output = 22
up_button = 5
down_button = 6
motor_pwm = 12
motor_in1 = 23
motor_in2 = 24
"#;

#[test]
fn pins_only_config_uses_defaults() {
    let cfg = load_toml(PINS).expect("parse TOML");
    cfg.validate().expect("defaults should pass");
    assert_eq!(cfg.motion.max_speed, 255);
    assert_eq!(cfg.motion.friction_pct, 80);
    assert_eq!(cfg.homing.speed, 63);
    assert_eq!(cfg.homing.pulse_ms, 750);
    assert_eq!(cfg.runner.tick_ms, 5);
}

#[test]
fn missing_pins_section_is_a_parse_error() {
    let err = load_toml("[motion]\nmax_speed = 200\n").expect_err("pins are required");
    assert!(format!("{err}").contains("pins"));
}

#[test]
fn rejects_shared_pin() {
    let toml = PINS.replace("down_button = 6", "down_button = 17");
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject shared line");
    let msg = format!("{err}");
    assert!(msg.contains("top_limit") && msg.contains("down_button"), "{msg}");
}

#[rstest]
#[case("[motion]\nfriction_pct = 100\n", "friction_pct")]
#[case("[motion]\nfriction_pct = -1\n", "friction_pct")]
#[case("[motion]\nmax_speed = 300\n", "max_speed")]
#[case("[motion]\nmax_speed = 0\n", "max_speed")]
#[case("[motion]\nacceleration = -5\n", "acceleration")]
#[case("[motion]\nhit_window_ms = 0\n", "hit_window_ms")]
#[case("[homing]\nspeed = 0\n", "homing.speed")]
#[case("[motion]\nmax_speed = 50\n[homing]\nspeed = 63\n", "homing.speed")]
#[case("[runner]\ntick_ms = 0\n", "tick_ms")]
#[case("[hardware]\npwm_frequency_hz = 0.0\n", "pwm_frequency_hz")]
#[case("[logging]\nrotation = \"weekly\"\n", "rotation")]
fn rejects_out_of_range_values(#[case] extra: &str, #[case] needle: &str) {
    let toml = format!("{PINS}\n{extra}");
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(format!("{err}").contains(needle), "{err} should mention {needle}");
}

#[test]
fn load_file_reads_and_validates() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("good.toml");
    fs::write(&good, format!("{PINS}\n[input]\ndebounce_ms = 20\n")).unwrap();
    let cfg = load_file(&good).expect("valid file");
    assert_eq!(cfg.input.debounce_ms, 20);

    let bad = dir.path().join("bad.toml");
    fs::write(&bad, format!("{PINS}\n[runner]\ntick_ms = 0\n")).unwrap();
    assert!(load_file(&bad).is_err());

    let missing = dir.path().join("nope.toml");
    let err = load_file(&missing).expect_err("missing file");
    assert!(format!("{err}").contains("read config"));
}
