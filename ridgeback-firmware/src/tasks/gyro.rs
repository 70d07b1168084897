//! Gyro sampling task
//!
//! Measures the resting bias, then integrates pitch rate into an angle
//! published for the controller.

use defmt::*;
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::{Duration, Instant, Ticker, Timer};
use heapless::Vec;
use portable_atomic::Ordering;

use ridgeback_drivers::sensor::{HeadingIntegrator, Mpu6050};

use crate::board::uptime_ms;
use crate::channels::{GYRO_ANGLE, GYRO_FAULT, GYRO_READY, GYRO_STAMP_MS};

/// Sample period (ms)
const SAMPLE_MS: u64 = 5;

/// Resting samples averaged into the bias
const CALIBRATION_SAMPLES: usize = 64;

pub type Gyro = Mpu6050<I2c<'static, I2C0, Blocking>>;

#[embassy_executor::task]
pub async fn gyro_task(mut gyro: Gyro) {
    if let Err(e) = gyro.init() {
        error!("Gyro init failed: {:?}", e);
        GYRO_FAULT.store(true, Ordering::Relaxed);
        return;
    }

    let mut heading = HeadingIntegrator::new();
    let mut samples: Vec<i32, CALIBRATION_SAMPLES> = Vec::new();
    while !samples.is_full() {
        match gyro.read_rate_mdps() {
            Ok(rate) => {
                let _ = samples.push(rate);
            }
            Err(e) => warn!("Gyro calibration read failed: {:?}", e),
        }
        Timer::after_millis(SAMPLE_MS).await;
    }
    heading.calibrate(&samples);
    info!("Gyro calibrated");

    GYRO_STAMP_MS.store(uptime_ms(), Ordering::Relaxed);
    GYRO_READY.signal(());

    let mut ticker = Ticker::every(Duration::from_millis(SAMPLE_MS));
    let mut last = Instant::now();

    loop {
        ticker.next().await;

        let now = Instant::now();
        let dt_ms = (now - last).as_millis() as u32;
        last = now;

        match gyro.read_rate_mdps() {
            Ok(rate) => {
                heading.update(rate, dt_ms);
                GYRO_ANGLE.store(heading.angle_deg(), Ordering::Relaxed);
                GYRO_STAMP_MS.store(uptime_ms(), Ordering::Relaxed);
            }
            Err(e) => warn!("Gyro read failed: {:?}", e),
        }
    }
}
