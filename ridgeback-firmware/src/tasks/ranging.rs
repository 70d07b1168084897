//! Ultrasonic ranging task

use embassy_rp::gpio::{Input, Output};
use embassy_time::{with_timeout, Duration, Instant, Ticker, Timer};
use portable_atomic::Ordering;

use ridgeback_drivers::sensor::hcsr04::{echo_to_mm, ECHO_TIMEOUT_US, TRIGGER_PULSE_US};

use crate::board::uptime_ms;
use crate::channels::{RANGE_MM, RANGE_STAMP_MS};

/// Ranging period; leaves time for echoes to die out
const RANGING_PERIOD_MS: u64 = 60;

#[embassy_executor::task]
pub async fn ranging_task(mut trigger: Output<'static>, mut echo: Input<'static>) {
    let mut ticker = Ticker::every(Duration::from_millis(RANGING_PERIOD_MS));
    let timeout = Duration::from_micros(ECHO_TIMEOUT_US as u64);

    loop {
        ticker.next().await;

        trigger.set_high();
        Timer::after_micros(TRIGGER_PULSE_US as u64).await;
        trigger.set_low();

        let echo_us = match with_timeout(timeout, echo.wait_for_high()).await {
            Ok(()) => {
                let start = Instant::now();
                match with_timeout(timeout, echo.wait_for_low()).await {
                    Ok(()) => Some(start.elapsed().as_micros() as u32),
                    Err(_) => None,
                }
            }
            Err(_) => None,
        };

        RANGE_MM.store(echo_to_mm(echo_us), Ordering::Relaxed);
        RANGE_STAMP_MS.store(uptime_ms(), Ordering::Relaxed);
    }
}
