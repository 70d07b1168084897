//! Stop button

use defmt::*;
use embassy_rp::gpio::Input;

use crate::channels::ESTOP;

/// Wait for the (active-low) stop button once
#[embassy_executor::task]
pub async fn estop_task(mut button: Input<'static>) {
    info!("Stop button armed");
    button.wait_for_falling_edge().await;
    ESTOP.signal(());
}
