//! wxstation - Weather Station Firmware
//!
//! Main firmware binary for RP2040-based weather station nodes. A DS18B20
//! thermometer on a software One-Wire bus and an RDA1846 transceiver on
//! I2C are both driven from TIMER alarm interrupts, so no bus transfer
//! ever blocks a task.
//!
//! Pin assignments (Raspberry Pi Pico):
//! - GPIO15: One-Wire data (4.7 kΩ pull-up to 3.3 V)
//! - GPIO4 / GPIO5: I2C0 SDA / SCL to the RDA1846
//! - GPIO25: status LED

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Flex, Level, Output};
use embassy_rp::i2c::{self, I2c};
use embassy_time::{with_timeout, Duration};
use {defmt_rtt as _, panic_probe as _};

use wxstation_core::command::CommandQueue;
use wxstation_core::config::StationConfig;
use wxstation_core::onewire::Encoder;
use wxstation_core::scheduler::Scheduler;
use wxstation_drivers::{Ds18b20, Rda1846};
use wxstation_hal::I2cRegisterBus;
use wxstation_hal_rp2040::{AlarmTimer, FlexBusLine, HalI2c, TimerAlarm};

use crate::channels::{Radio, Thermometer, RADIO, RADIO_IDLE, RADIO_READY, THERMOMETER};
use crate::tasks::MeasureConfig;

mod channels;
mod interrupts;
mod tasks;

/// Time allowed for the radio's power-on programming
const RADIO_INIT_TIMEOUT_MS: u64 = 2_000;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let config = StationConfig::default();
    info!("{} firmware starting...", config.label.as_str());

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // One-Wire thermometer
    let line = FlexBusLine::new(Flex::new(p.PIN_15));
    let bus = Scheduler::new(line, AlarmTimer::new(TimerAlarm::Alarm1), config.scheduler);
    let sensor = Ds18b20::new(config.thermometer, Encoder::new(config.onewire));

    // Radio on blocking I2C0
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = config.radio.bus_frequency_hz;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config);
    let registers = match I2cRegisterBus::new(HalI2c::new(i2c), config.radio.i2c_address) {
        Ok(registers) => registers,
        Err(_) => {
            error!("Invalid radio address {}", config.radio.i2c_address);
            return;
        }
    };
    let queue = CommandQueue::new(
        registers,
        AlarmTimer::new(TimerAlarm::Alarm2),
        config.command_queue,
    );

    THERMOMETER.lock(|cell| {
        cell.replace(Some(Thermometer { bus, sensor }));
    });
    RADIO.lock(|cell| {
        cell.replace(Some(Radio {
            queue,
            radio: Rda1846::new(config.radio),
        }));
    });

    interrupts::enable();

    THERMOMETER.lock(|cell| {
        if let Some(thermometer) = cell.borrow_mut().as_mut() {
            thermometer.bus.start();
        }
    });
    RADIO.lock(|cell| {
        if let Some(radio) = cell.borrow_mut().as_mut() {
            radio.radio.init(&mut radio.queue);
        }
    });
    info!("Bus schedulers started");

    let led = Output::new(p.PIN_25, Level::Low);
    unwrap!(spawner.spawn(tasks::heartbeat_task(led, config.heartbeat_ms)));

    // Register writes run inside the radio interrupt's critical section and
    // would stretch One-Wire slots, so measuring starts once the radio is idle
    let radio_init = async {
        RADIO_READY.wait().await;
        RADIO_IDLE.wait().await;
    };
    match with_timeout(Duration::from_millis(RADIO_INIT_TIMEOUT_MS), radio_init).await {
        Ok(()) => info!("Radio ready at {} kHz", config.radio.frequency_khz),
        Err(_) => warn!("Radio did not finish initialization"),
    }

    let measure = MeasureConfig {
        interval_s: config.measurement_interval_s,
        conversion_time_ms: config.thermometer.conversion_time_ms(),
    };
    unwrap!(spawner.spawn(tasks::measure_task(measure)));
}
