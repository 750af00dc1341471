//! Human-readable error descriptions and structured JSON error formatting.

use crate::run::{RoundAbort, RoundReport};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use player_core::error::{BuildError, PlayerError};

    // Typed matches first
    if let Some(abort) = err.downcast_ref::<RoundAbort>() {
        return match abort {
            RoundAbort::Interrupted => "What happened: The round was interrupted.\nLikely causes: Ctrl-C or a termination signal.\nHow to fix: Start a new round; the carriage will home first.".to_string(),
            RoundAbort::MaxTicks(n) => format!(
                "What happened: The round did not finish within {n} ticks.\nLikely causes: Nobody played, the carriage is stuck, or a limit switch never triggers.\nHow to fix: Check the limit switch wiring, or raise runner.max_ticks / --max-ticks."
            ),
        };
    }

    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingMotor => {
                "What happened: No motor was provided to the player.\nLikely causes: Motor driver failed to initialize or was not wired into the builder.\nHow to fix: Ensure the H-bridge is created successfully and passed via with_motor(...).".to_string()
            }
            BuildError::MissingIo => {
                "What happened: No digital IO was provided to the player.\nLikely causes: GPIO failed to initialize or was not wired into the builder.\nHow to fix: Ensure the GPIO backend is created successfully and passed via with_io(...).".to_string()
            }
            BuildError::MissingPins => {
                "What happened: No pin assignment was provided to the player.\nLikely causes: The builder was not given the [pins] section.\nHow to fix: Pass the pins via with_pins(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(pe) = err.downcast_ref::<PlayerError>() {
        return match pe {
            PlayerError::HardwareFault(msg) => format!(
                "What happened: GPIO fault ({msg}).\nLikely causes: Insufficient GPIO permissions or a line claimed by another process.\nHow to fix: Run with access to /dev/gpiomem and check nothing else holds the pins."
            ),
            PlayerError::Config(msg) => format!(
                "What happened: Pin setup failed ({msg}).\nLikely causes: A [pins] entry that does not exist on this backend.\nHow to fix: Fix the [pins] values in the config."
            ),
            PlayerError::Hardware(msg) => format!(
                "What happened: {msg}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err
        .chain()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ");
    let lower = msg.to_ascii_lowercase();

    if lower.contains("read config") {
        return format!(
            "What happened: Could not read the config file.\nLikely causes: Wrong --config path.\nHow to fix: Point --config at an existing TOML file. Original: {msg}"
        );
    }

    if lower.contains("parse config") || lower.contains("load config") {
        let detail = err
            .chain()
            .last()
            .map(ToString::to_string)
            .unwrap_or_default();
        return format!(
            "What happened: Configuration is invalid or incomplete ({detail}).\nLikely causes: Missing [pins] (top_limit, bottom_limit, output, up_button, down_button, motor_pwm, motor_in1, motor_in2), or out-of-range values.\nHow to fix: Edit the TOML config and try again."
        );
    }

    if lower.contains("open gpio") || lower.contains("open motor pins") {
        return "What happened: Failed to initialize hardware pins.\nLikely causes: Incorrect pin numbers or insufficient GPIO permissions.\nHow to fix: Fix the [pins] values in the config; ensure the process has permission to access GPIO.".to_string();
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.chain().nth(1) {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Map RoundAbort (if present) to stable exit codes; other errors return 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<RoundAbort>() {
        Some(RoundAbort::Interrupted) => 2,
        Some(RoundAbort::MaxTicks(_)) => 4,
        None => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = err
        .downcast_ref::<RoundAbort>()
        .map_or("Error", |a| a.name());
    json!({ "reason": reason, "message": humanize(err) }).to_string()
}

/// One JSON line summarizing a round; `abort_reason` is null on success.
pub fn format_report_json(report: &RoundReport, abort: Option<&eyre::Report>) -> String {
    use serde_json::json;

    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0);
    let transitions: Vec<_> = report
        .transitions
        .iter()
        .map(|(tick, t)| json!({ "tick": tick, "from": t.from.label(), "to": t.to.label() }))
        .collect();
    let abort_reason = abort.map(|e| {
        e.downcast_ref::<RoundAbort>()
            .map_or("Error", |a| a.name())
    });
    json!({
        "timestamp": timestamp,
        "ticks": report.ticks,
        "duration_ms": report.duration_ms,
        "transitions": transitions,
        "finished": abort.is_none(),
        "abort_reason": abort_reason,
    })
    .to_string()
}
