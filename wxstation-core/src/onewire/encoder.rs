//! One-Wire protocol encoder
//!
//! Turns bus primitives into ordered [`TimedAction`] sequences. Each slot
//! is described by what happens at its start and how long the line then
//! stays put:
//!
//! ```text
//! reset:    low 480 | release 70 | sample 410
//! write 0:  low 60  | release 10
//! write 1:  low 5   | release 65
//! read:     low 5   | release 10 | sample 55
//! ```
//!
//! Bytes go out and come in LSB first.

use crate::config::OneWireTiming;
use crate::scheduler::{ActionKind, ActionSink, TimedAction};

/// Actions queued by [`Encoder::reset`]
pub const RESET_ACTIONS: usize = 3;
/// Actions queued by [`Encoder::write_bit`]
pub const WRITE_BIT_ACTIONS: usize = 2;
/// Actions queued by [`Encoder::write_byte`]
pub const WRITE_BYTE_ACTIONS: usize = 8 * WRITE_BIT_ACTIONS;
/// Actions queued by [`Encoder::read_bit`]
pub const READ_BIT_ACTIONS: usize = 3;
/// Actions queued by [`Encoder::read_byte`]
pub const READ_BYTE_ACTIONS: usize = 1 + 8 * READ_BIT_ACTIONS + 1;
/// Actions queued by [`Encoder::wait_for_bus_high`]
pub const WAIT_ACTIONS: usize = 1;

/// One-Wire action sequence builder
#[derive(Debug, Clone, Copy, Default)]
pub struct Encoder {
    timing: OneWireTiming,
}

impl Encoder {
    /// Create an encoder with the given slot timing
    pub const fn new(timing: OneWireTiming) -> Self {
        Self { timing }
    }

    /// Slot timing in use
    pub fn timing(&self) -> &OneWireTiming {
        &self.timing
    }

    /// Reset pulse followed by a presence sample
    ///
    /// The raw line level is reported with `notify`: 0 means a device
    /// answered with a presence pulse.
    pub fn reset<T, S: ActionSink<T>>(&self, sink: &mut S, notify: Option<T>) {
        let t = &self.timing;
        sink.push_action(TimedAction::new(ActionKind::BusLow, t.reset_low_us.into()));
        sink.push_action(TimedAction::new(
            ActionKind::ReleaseBus,
            t.presence_wait_us.into(),
        ));
        sink.push_action(TimedAction {
            kind: ActionKind::SampleBit,
            hold_us: t.presence_hold_us.into(),
            notify,
        });
    }

    /// Write one bit
    pub fn write_bit<T, S: ActionSink<T>>(&self, sink: &mut S, bit: bool) {
        let slot = if bit {
            self.timing.write_one
        } else {
            self.timing.write_zero
        };
        sink.push_action(TimedAction::new(ActionKind::BusLow, slot.low_us.into()));
        sink.push_action(TimedAction::new(ActionKind::ReleaseBus, slot.release_us.into()));
    }

    /// Write one byte, LSB first
    pub fn write_byte<T, S: ActionSink<T>>(&self, sink: &mut S, byte: u8) {
        for i in 0..8 {
            self.write_bit(sink, (byte >> i) & 0x01 != 0);
        }
    }

    /// Write several bytes in order
    pub fn write_bytes<T, S: ActionSink<T>>(&self, sink: &mut S, bytes: &[u8]) {
        for &byte in bytes {
            self.write_byte(sink, byte);
        }
    }

    /// Read one bit; the sampled level is shifted into the shift register
    pub fn read_bit<T, S: ActionSink<T>>(&self, sink: &mut S, notify: Option<T>) {
        let t = &self.timing;
        sink.push_action(TimedAction::new(ActionKind::BusLow, t.read_low_us.into()));
        sink.push_action(TimedAction::new(
            ActionKind::ReleaseBus,
            t.read_sample_delay_us.into(),
        ));
        sink.push_action(TimedAction {
            kind: ActionKind::SampleBit,
            hold_us: t.read_recovery_us.into(),
            notify,
        });
    }

    /// Read one byte, LSB first, reporting it with `notify`
    pub fn read_byte<T, S: ActionSink<T>>(&self, sink: &mut S, notify: Option<T>) {
        sink.push_action(TimedAction::new(ActionKind::ClearShiftRegister, 0));
        for _ in 0..8 {
            self.read_bit(sink, None);
        }
        sink.push_action(TimedAction {
            kind: ActionKind::TransferByte,
            hold_us: 0,
            notify,
        });
    }

    /// Release the line and poll until it reads high
    ///
    /// Polls once per `release_poll_us`, at most `polls` times.
    pub fn wait_for_bus_high<T, S: ActionSink<T>>(
        &self,
        sink: &mut S,
        polls: u16,
        notify: Option<T>,
    ) {
        sink.push_action(TimedAction {
            kind: ActionKind::WaitForBusHigh {
                polls_left: polls.max(1),
            },
            hold_us: self.timing.release_poll_us.into(),
            notify,
        });
    }
}
