//! Control loop task
//!
//! Runs the controller at the configured tick interval until the mission
//! ends. The stop button preempts the next tick.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{with_timeout, Duration, Ticker, Timer};

use ridgeback_core::config::RobotConfig;
use ridgeback_core::output::Telemetry;
use ridgeback_core::safety::{ExitStatus, Fault, Shutdown, StopReason};
use ridgeback_core::ControlLoop;

use crate::board::{Board, EmbassyClock};
use crate::channels::{ESTOP, GYRO_READY};

/// Gyro calibration wait before starting anyway
const GYRO_READY_TIMEOUT_MS: u64 = 5000;

type Control = ControlLoop<Board, EmbassyClock>;

/// Control task - owns the board for the whole mission
#[embassy_executor::task]
pub async fn control_task(board: Board, config: RobotConfig) {
    info!("Control task started");

    // The startup frame captures the gyro baseline
    if with_timeout(
        Duration::from_millis(GYRO_READY_TIMEOUT_MS),
        GYRO_READY.wait(),
    )
    .await
    .is_err()
    {
        warn!("Gyro not ready after {} ms", GYRO_READY_TIMEOUT_MS);
    }

    let tick_ms = config.timing.tick_interval_ms as u64;

    let mut control = match ControlLoop::start(board, EmbassyClock::new(), config) {
        Ok(control) => control,
        // Outputs have never been driven, so the motors are already off
        Err(shutdown) => halt(shutdown),
    };
    info!("Mission started, tick {} ms", tick_ms);

    let mut ticker = Ticker::every(Duration::from_millis(tick_ms));

    let shutdown = loop {
        match select(ticker.next(), ESTOP.wait()).await {
            Either::First(()) => {
                if let Err(e) = control.platform_mut().update_drives() {
                    break control.emergency_stop(StopReason::Fault(Fault::ActuatorFailure(e)));
                }
                match control.step() {
                    Ok(report) => {
                        for event in report.output.telemetry() {
                            log_telemetry(report.now_ms, event);
                        }
                    }
                    Err(shutdown) => break shutdown,
                }
            }
            Either::Second(()) => {
                warn!("Stop button pressed");
                break control.emergency_stop(StopReason::Operator);
            }
        }
    };

    finish(&mut control, shutdown).await
}

/// Push the stopped state to the hardware and end the mission
async fn finish(control: &mut Control, shutdown: Shutdown) -> ! {
    if let Err(e) = control.platform_mut().update_drives() {
        error!("Failed to apply stop: {:?}", e);
    }

    match shutdown.exit_status() {
        ExitStatus::Success => {
            Timer::after_millis(control.settle_delay_ms() as u64).await;
            info!("Mission ended by operator");
            loop {
                cortex_m::asm::wfi();
            }
        }
        ExitStatus::Failure => halt(shutdown),
    }
}

fn halt(shutdown: Shutdown) -> ! {
    if shutdown.failed_stops > 0 {
        error!("{} actuators failed to stop", shutdown.failed_stops);
    }
    defmt::panic!("Mission aborted: {:?}", shutdown.reason)
}

fn log_telemetry(now_ms: u32, event: &Telemetry) {
    match *event {
        Telemetry::PhaseChanged { from, to } => {
            info!("[{}] {:?} -> {:?}", now_ms, from, to)
        }
        Telemetry::SlopeEntered { drift, kp } => {
            info!("[{}] Slope entered: drift={} kp={}", now_ms, drift, kp)
        }
        Telemetry::SlopeExited { drift, kp, count } => {
            info!(
                "[{}] Slope exited #{}: drift={} kp={}",
                now_ms, count, drift, kp
            )
        }
        Telemetry::EncodersZeroed => debug!("[{}] Encoders zeroed", now_ms),
        Telemetry::StairStep { ordinal } => info!("[{}] Stair step {}", now_ms, ordinal),
        Telemetry::LineReacquired => info!("[{}] Line reacquired", now_ms),
        Telemetry::TargetCandidate {
            range_mm,
            left_pos,
            right_pos,
        } => debug!(
            "[{}] Closest so far: {} mm at ({}, {})",
            now_ms, range_mm, left_pos, right_pos
        ),
        Telemetry::GripperClosed { left_pos } => {
            info!("[{}] Gripper closing at left={}", now_ms, left_pos)
        }
        Telemetry::PickupProgress {
            left_pos,
            right_pos,
            range_mm,
        } => trace!(
            "[{}] Pickup: ({}, {}) range {} mm",
            now_ms,
            left_pos,
            right_pos,
            range_mm
        ),
        Telemetry::TickOverrun { period_ms } => {
            warn!("[{}] Tick overrun: {} ms", now_ms, period_ms)
        }
    }
}
