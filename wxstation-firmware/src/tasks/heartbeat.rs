//! Heartbeat LED task

use embassy_rp::gpio::Output;
use embassy_time::{Duration, Ticker};

/// Toggle the status LED every `period_ms`
#[embassy_executor::task]
pub async fn heartbeat_task(mut led: Output<'static>, period_ms: u32) {
    defmt::info!("Heartbeat task started");

    let mut ticker = Ticker::every(Duration::from_millis(period_ms as u64));

    loop {
        ticker.next().await;
        led.toggle();
    }
}
