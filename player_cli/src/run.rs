//! Round execution: backend assembly, the tick loop and the scripted player
//! used with the simulator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use eyre::WrapErr;
use player_core::{Player, PositionState, Transition};
use player_traits::Clock;

/// Why a round stopped before the carriage finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RoundAbort {
    #[error("round interrupted by signal")]
    Interrupted,
    #[error("round exceeded max ticks ({0})")]
    MaxTicks(u64),
}

impl RoundAbort {
    pub fn name(self) -> &'static str {
        match self {
            RoundAbort::Interrupted => "Interrupted",
            RoundAbort::MaxTicks(_) => "MaxTicks",
        }
    }
}

/// What happened during a round, filled in as it runs so a partial report
/// survives an abort.
#[derive(Debug, Default, Clone)]
pub struct RoundReport {
    pub transitions: Vec<(u64, Transition)>,
    pub ticks: u64,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct RoundParams {
    pub tick: Duration,
    /// 0 = unbounded
    pub max_ticks: u64,
}

/// Hook run before every tick; the simulator uses it to press buttons.
pub trait Script {
    fn before_tick(&mut self, player: &Player, now_ms: u64);
}

/// Real buttons, nothing to script.
pub struct NoScript;

impl Script for NoScript {
    fn before_tick(&mut self, _player: &Player, _now_ms: u64) {}
}

/// Taps "up" until the carriage reaches the top, then taps "down".
/// Each press and each release lasts `press_ms`. Buttons stay released while
/// controls are disabled.
#[cfg_attr(all(feature = "hardware", target_os = "linux"), allow(dead_code))]
pub struct ScriptedPlayer {
    rig: player_hardware::SimRig,
    press_ms: u64,
}

#[cfg_attr(all(feature = "hardware", target_os = "linux"), allow(dead_code))]
impl ScriptedPlayer {
    pub fn new(rig: player_hardware::SimRig, press_ms: u64) -> Self {
        Self {
            rig,
            press_ms: press_ms.max(1),
        }
    }
}

impl Script for ScriptedPlayer {
    fn before_tick(&mut self, player: &Player, now_ms: u64) {
        let pressed = player.controls_enabled() && (now_ms / self.press_ms) % 2 == 0;
        let heading_up = !matches!(
            player.state(),
            PositionState::Halfway | PositionState::Finished
        );
        self.rig.set_up(pressed && heading_up);
        self.rig.set_down(pressed && !heading_up);
    }
}

/// A controller plus the clock that paces it and the script for its buttons.
pub struct Backend {
    pub name: &'static str,
    pub player: Player,
    pub clock: Box<dyn Clock + Send + Sync>,
    pub script: Box<dyn Script>,
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
pub fn make_backend(cfg: &player_config::Config, sim_press_ms: u64) -> eyre::Result<Backend> {
    use player_hardware::{SimPhysics, SimPins, SimRig};
    use player_traits::ManualClock;

    let pins = SimPins {
        top_limit: cfg.pins.top_limit,
        bottom_limit: cfg.pins.bottom_limit,
        output: cfg.pins.output,
        up_button: cfg.pins.up_button,
        down_button: cfg.pins.down_button,
    };
    let clock = ManualClock::new();
    let rig = SimRig::new(pins, SimPhysics::default(), clock.clone());
    let player = Player::builder()
        .with_motor(rig.motor())
        .with_io(rig.io())
        .with_pins((&cfg.pins).into())
        .with_motion((&cfg.motion).into())
        .with_input((&cfg.input).into())
        .with_homing((&cfg.homing).into())
        .with_clock(Box::new(clock.clone()))
        .build()
        .wrap_err("build simulated player")?;
    Ok(Backend {
        name: "sim",
        player,
        clock: Box::new(clock),
        script: Box::new(ScriptedPlayer::new(rig, sim_press_ms)),
    })
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub fn make_backend(cfg: &player_config::Config, _sim_press_ms: u64) -> eyre::Result<Backend> {
    use player_hardware::hardware::{GpioIo, HBridgeMotor};
    use player_traits::MonotonicClock;

    let io = GpioIo::new().wrap_err("open gpio")?;
    let motor = HBridgeMotor::new(
        cfg.pins.motor_pwm,
        cfg.pins.motor_in1,
        cfg.pins.motor_in2,
        cfg.hardware.pwm_frequency_hz,
    )
    .wrap_err("open motor pins")?;
    let player = Player::builder()
        .with_motor(motor)
        .with_io(io)
        .with_pins((&cfg.pins).into())
        .with_motion((&cfg.motion).into())
        .with_input((&cfg.input).into())
        .with_homing((&cfg.homing).into())
        .build()
        .wrap_err("build hardware player")?;
    Ok(Backend {
        name: "hardware",
        player,
        clock: Box::new(MonotonicClock::new()),
        script: Box::new(NoScript),
    })
}

/// Home the carriage, wait for it to settle on its mark, then hand the
/// controls to the player until the round is finished. The output line is
/// raised and the motors stopped at the end.
///
/// Motors are stopped on every early exit.
pub fn run_round(
    backend: &mut Backend,
    params: RoundParams,
    shutdown: &AtomicBool,
    report: &mut RoundReport,
) -> eyre::Result<()> {
    let result = play(backend, params, shutdown, report);
    if result.is_err()
        && let Err(e) = backend.player.stop_motors()
    {
        tracing::warn!(error = %e, "failed to stop motors after aborted round");
    }
    result
}

fn play(
    backend: &mut Backend,
    params: RoundParams,
    shutdown: &AtomicBool,
    report: &mut RoundReport,
) -> eyre::Result<()> {
    let start = backend.clock.now();
    backend.player.reset().wrap_err("reset")?;
    tracing::info!(backend = backend.name, "homing");
    tick_until(backend, params, shutdown, report, start, Player::is_on_mark)?;

    backend.player.set_controls(true);
    tracing::info!("controls enabled, round on");
    tick_until(backend, params, shutdown, report, start, Player::is_finished)?;

    backend.player.set_out(true)?;
    backend.player.stop_motors()?;
    report.duration_ms = backend.clock.ms_since(start);
    tracing::info!(
        ticks = report.ticks,
        duration_ms = report.duration_ms,
        "round finished"
    );
    Ok(())
}

fn tick_until(
    backend: &mut Backend,
    params: RoundParams,
    shutdown: &AtomicBool,
    report: &mut RoundReport,
    start: std::time::Instant,
    done: fn(&Player) -> bool,
) -> eyre::Result<()> {
    while !done(&backend.player) {
        if shutdown.load(Ordering::Relaxed) {
            return Err(RoundAbort::Interrupted.into());
        }
        if params.max_ticks > 0 && report.ticks >= params.max_ticks {
            return Err(RoundAbort::MaxTicks(params.max_ticks).into());
        }
        backend.clock.sleep(params.tick);
        let now_ms = backend.clock.ms_since(start);
        backend.script.before_tick(&backend.player, now_ms);
        report.ticks += 1;
        report.duration_ms = now_ms;
        if let Some(t) = backend.player.update()? {
            report.transitions.push((report.ticks, t));
        }
    }
    Ok(())
}
