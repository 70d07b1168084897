//! Inter-task communication
//!
//! Sensor tasks publish their latest value into atomics that the control
//! task samples once per tick. Each published value carries a timestamp
//! so the board can tell a stale sensor from a quiet one.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicBool, AtomicI32, AtomicU16, AtomicU32};

/// Stop button pressed
pub static ESTOP: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Gyro bias calibration finished
pub static GYRO_READY: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Raw quadrature counts
pub static LEFT_COUNT: AtomicI32 = AtomicI32::new(0);
pub static RIGHT_COUNT: AtomicI32 = AtomicI32::new(0);

/// Integrated pitch angle (degrees)
pub static GYRO_ANGLE: AtomicI32 = AtomicI32::new(0);
/// Uptime of the last good gyro sample (ms)
pub static GYRO_STAMP_MS: AtomicU32 = AtomicU32::new(0);
/// Gyro failed to initialize
pub static GYRO_FAULT: AtomicBool = AtomicBool::new(false);

/// Latest ultrasonic range (mm)
pub static RANGE_MM: AtomicU16 = AtomicU16::new(0);
/// Uptime of the last ranging cycle (ms)
pub static RANGE_STAMP_MS: AtomicU32 = AtomicU32::new(0);
