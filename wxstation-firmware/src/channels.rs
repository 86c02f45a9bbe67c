//! Shared bus state and inter-task signals
//!
//! Each bus scheduler lives in a critical-section mutex together with the
//! device session it serves. The timer interrupt locks it to run one
//! action; tasks lock it only to append a sequence. Results travel back
//! to tasks through signals.

use core::cell::RefCell;

use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

use wxstation_core::command::CommandQueue;
use wxstation_core::config::{BUS_QUEUE_CAPACITY, COMMAND_QUEUE_CAPACITY};
use wxstation_core::scheduler::Scheduler;
use wxstation_core::traits::SensorError;
use wxstation_drivers::{Ds18b20, Ds18b20Token, RadioStage, Rda1846, Reading};
use wxstation_hal::I2cRegisterBus;
use wxstation_hal_rp2040::{AlarmTimer, FlexBusLine, HalI2c};

/// One-Wire action scheduler on its TIMER alarm
pub type OneWireBus =
    Scheduler<FlexBusLine<'static>, AlarmTimer, Ds18b20Token, BUS_QUEUE_CAPACITY>;

/// Radio register access over blocking I2C0
pub type RadioRegisters = I2cRegisterBus<HalI2c<I2c<'static, I2C0, Blocking>>>;

/// Radio command queue on its TIMER alarm
pub type RadioQueue = CommandQueue<RadioRegisters, AlarmTimer, RadioStage, COMMAND_QUEUE_CAPACITY>;

/// Thermometer session and the bus it runs on
pub struct Thermometer {
    pub bus: OneWireBus,
    pub sensor: Ds18b20,
}

/// Radio driver and its command queue
pub struct Radio {
    pub queue: RadioQueue,
    pub radio: Rda1846,
}

/// Thermometer state, serviced by `TIMER_IRQ_1`
pub static THERMOMETER: Mutex<CriticalSectionRawMutex, RefCell<Option<Thermometer>>> =
    Mutex::new(RefCell::new(None));

/// Radio state, serviced by `TIMER_IRQ_2`
pub static RADIO: Mutex<CriticalSectionRawMutex, RefCell<Option<Radio>>> =
    Mutex::new(RefCell::new(None));

/// Outcome of the current thermometer sequence
pub static TEMPERATURE: Signal<CriticalSectionRawMutex, Result<Reading, SensorError>> =
    Signal::new();

/// Radio finished its power-on programming
pub static RADIO_READY: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Radio command queue ran empty
pub static RADIO_IDLE: Signal<CriticalSectionRawMutex, ()> = Signal::new();
