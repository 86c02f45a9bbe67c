//! TIMER alarm interrupt handlers
//!
//! Each handler runs exactly one queued action and passes any completion
//! to the owning session. Everything here executes inside a critical
//! section and must stay short.

use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};

use wxstation_core::command::CommandEvent;
use wxstation_drivers::RadioEvent;

use crate::channels::{RADIO, RADIO_IDLE, RADIO_READY, TEMPERATURE, THERMOMETER};

/// Unmask the bus alarm interrupts
///
/// Call after the shared state has been populated.
pub fn enable() {
    interrupt::TIMER_IRQ_1.set_priority(Priority::P1);
    interrupt::TIMER_IRQ_2.set_priority(Priority::P2);

    // SAFETY: both handlers only touch state behind critical-section mutexes
    unsafe {
        interrupt::TIMER_IRQ_1.enable();
        interrupt::TIMER_IRQ_2.enable();
    }
}

#[interrupt]
fn TIMER_IRQ_1() {
    THERMOMETER.lock(|cell| {
        let mut state = cell.borrow_mut();
        let Some(thermometer) = state.as_mut() else {
            return;
        };

        if let Some(completion) = thermometer.bus.on_timer_expiry() {
            if let Some(result) = thermometer.sensor.handle(completion) {
                TEMPERATURE.signal(result);
            }
        }
    });
}

#[interrupt]
fn TIMER_IRQ_2() {
    RADIO.lock(|cell| {
        let mut state = cell.borrow_mut();
        let Some(radio) = state.as_mut() else {
            return;
        };

        let Some(event) = radio.queue.on_timer_expiry() else {
            return;
        };

        if matches!(event, CommandEvent::Drained(None)) {
            RADIO_IDLE.signal(());
        }

        if let Some(RadioEvent::Initialized) = radio.radio.handle(event, &mut radio.queue) {
            RADIO_READY.signal(());
        }
    });
}
