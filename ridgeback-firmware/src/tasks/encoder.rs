//! Wheel encoder counting
//!
//! Counts both edges of channel A, with channel B giving direction.
//! This is 2x decoding: counts per revolution are twice the encoder's
//! line count.

use embassy_rp::gpio::Input;
use portable_atomic::{AtomicI32, Ordering};

#[embassy_executor::task(pool_size = 2)]
pub async fn encoder_task(mut a: Input<'static>, b: Input<'static>, count: &'static AtomicI32) {
    loop {
        a.wait_for_any_edge().await;
        let step = if a.is_high() == b.is_high() { 1 } else { -1 };
        count.fetch_add(step, Ordering::Relaxed);
    }
}
