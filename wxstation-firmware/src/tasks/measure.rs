//! Periodic temperature measurement task
//!
//! Every interval the task queues a conversion, waits the conversion time
//! (aborting early if the session faults), then queues the scratchpad
//! read and waits for the interrupt handler to report the result.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{with_timeout, Duration, Ticker, Timer};

use wxstation_core::session::SessionError;
use wxstation_core::traits::SensorError;
use wxstation_drivers::Reading;

use crate::channels::{TEMPERATURE, THERMOMETER};

/// Scratchpad reads take about 8 ms on the wire
const READ_TIMEOUT_MS: u64 = 100;

/// Measurement task settings
#[derive(Debug, Clone, Copy, Format)]
pub struct MeasureConfig {
    /// Time between measurements (s)
    pub interval_s: u32,
    /// Conversion time of the configured resolution (ms)
    pub conversion_time_ms: u32,
}

/// Measure the temperature once per interval, starting immediately
#[embassy_executor::task]
pub async fn measure_task(config: MeasureConfig) {
    info!("Measure task started: every {}s", config.interval_s);

    let mut ticker = Ticker::every(Duration::from_secs(config.interval_s as u64));

    loop {
        match measure(&config).await {
            Ok(reading) => info!(
                "Temperature: {} dC ({} F, raw {})",
                reading.celsius_x10(),
                reading.whole_fahrenheit(),
                reading.raw()
            ),
            Err(e) => warn!("Measurement failed: {}", e),
        }

        ticker.next().await;
    }
}

/// Errors seen by the measurement cycle
#[derive(Debug, Clone, Copy, Format)]
enum MeasureError {
    Session(SessionError),
    Sensor(SensorError),
    Timeout,
    NotInitialized,
}

impl From<SessionError> for MeasureError {
    fn from(e: SessionError) -> Self {
        MeasureError::Session(e)
    }
}

impl From<SensorError> for MeasureError {
    fn from(e: SensorError) -> Self {
        MeasureError::Sensor(e)
    }
}

async fn measure(config: &MeasureConfig) -> Result<Reading, MeasureError> {
    TEMPERATURE.reset();
    THERMOMETER.lock(|cell| {
        let mut state = cell.borrow_mut();
        let thermometer = state.as_mut().ok_or(MeasureError::NotInitialized)?;
        thermometer
            .sensor
            .initiate_measurement(&mut thermometer.bus)
            .map_err(MeasureError::from)
    })?;

    // Only a fault (e.g. no presence pulse) is reported during conversion
    let conversion = Timer::after_millis(config.conversion_time_ms as u64);
    if let Either::First(result) = select(TEMPERATURE.wait(), conversion).await {
        result?;
    }

    TEMPERATURE.reset();
    THERMOMETER.lock(|cell| {
        let mut state = cell.borrow_mut();
        let thermometer = state.as_mut().ok_or(MeasureError::NotInitialized)?;
        thermometer
            .sensor
            .read_scratchpad(&mut thermometer.bus)
            .map_err(MeasureError::from)
    })?;

    let result = with_timeout(Duration::from_millis(READ_TIMEOUT_MS), TEMPERATURE.wait())
        .await
        .map_err(|_| MeasureError::Timeout)?;
    Ok(result?)
}
