//! Interrupt-driven action scheduler
//!
//! The scheduler owns the bus line, the one-shot timer and a bounded FIFO
//! of [`TimedAction`]s. Every timer expiry runs exactly one action:
//!
//! 1. acknowledge the timer
//! 2. pop the head and re-arm the timer for its hold time
//! 3. perform the head's effect on the line
//!
//! Because the timer is re-armed before the effect runs, the effect lands
//! at time zero of its slot and the hold time measures the whole slot.
//! With nothing queued the timer keeps ticking at the idle poll interval so
//! newly appended actions are picked up without an explicit kick.

use heapless::Deque;
use wxstation_hal::{BusLine, OneShotTimer};

use super::action::{ActionKind, ActionSink, Completion, TimedAction};
use crate::config::{SchedulerConfig, BUS_QUEUE_CAPACITY};

/// Bit-level bus action scheduler
pub struct Scheduler<B, M, T, const N: usize = BUS_QUEUE_CAPACITY> {
    bus: B,
    timer: M,
    config: SchedulerConfig,
    queue: Deque<TimedAction<T>, N>,
    shift: u8,
    /// Set when the last expiry executed an action
    active: bool,
    dropped: u32,
}

impl<B, M, T, const N: usize> Scheduler<B, M, T, N>
where
    B: BusLine,
    M: OneShotTimer,
    T: Copy,
{
    /// Create a scheduler with an empty queue
    ///
    /// The line is released so the bus idles high. Call [`start`](Self::start)
    /// once the timer interrupt is enabled.
    pub fn new(mut bus: B, timer: M, config: SchedulerConfig) -> Self {
        bus.release();
        Self {
            bus,
            timer,
            config,
            queue: Deque::new(),
            shift: 0,
            active: false,
            dropped: 0,
        }
    }

    /// Arm the first idle poll
    pub fn start(&mut self) {
        self.timer.arm_us(self.config.idle_poll_us);
    }

    /// Append an action
    ///
    /// A full queue drops the action; the loss is counted and logged.
    pub fn enqueue(&mut self, action: TimedAction<T>) {
        if self.queue.push_back(action).is_err() {
            self.dropped = self.dropped.saturating_add(1);
            crate::log_warn!("bus queue full, dropped {} actions", self.dropped);
        }
    }

    /// Number of queued actions
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if no action is queued
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Free queue slots
    pub fn remaining_capacity(&self) -> usize {
        N - self.queue.len()
    }

    /// Actions lost to a full queue since creation
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Current shift register contents
    pub fn shift_register(&self) -> u8 {
        self.shift
    }

    /// Scheduler configuration
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Get the bus line
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Get the timer
    pub fn timer(&self) -> &M {
        &self.timer
    }

    /// Service a timer expiry
    ///
    /// Call from the timer interrupt handler. Returns the completion of
    /// the executed action, if it carried a token.
    pub fn on_timer_expiry(&mut self) -> Option<Completion<T>> {
        self.timer.acknowledge();

        let Some(action) = self.queue.pop_front() else {
            self.timer.arm_us(self.config.idle_poll_us);
            if self.active {
                self.active = false;
                return Some(Completion::Drained);
            }
            return None;
        };

        self.active = true;
        self.timer.arm_us(action.hold_us.max(self.config.min_hold_us));
        self.execute(action)
    }

    fn execute(&mut self, action: TimedAction<T>) -> Option<Completion<T>> {
        match action.kind {
            ActionKind::BusLow => {
                self.bus.drive_low();
                None
            }
            ActionKind::ReleaseBus => {
                self.bus.release();
                None
            }
            ActionKind::ClearShiftRegister => {
                self.shift = 0;
                None
            }
            ActionKind::SampleBit => {
                let bit = u8::from(self.bus.sample());
                self.shift = (self.shift >> 1) | (bit << 7);
                action.notify.map(|token| Completion::Sampled { token, bit })
            }
            ActionKind::TransferByte => {
                let byte = self.shift;
                action.notify.map(|token| Completion::Byte { token, byte })
            }
            ActionKind::WaitForBusHigh { polls_left } => {
                self.bus.release();
                if self.bus.sample() {
                    return action
                        .notify
                        .map(|token| Completion::BusHigh { token, released: true });
                }

                let polls_left = polls_left.saturating_sub(1);
                if polls_left > 0 {
                    let retry = TimedAction {
                        kind: ActionKind::WaitForBusHigh { polls_left },
                        ..action
                    };
                    // The slot freed by the pop above is still free
                    let _ = self.queue.push_front(retry);
                    return None;
                }

                crate::log_warn!("bus held low past release timeout");
                action
                    .notify
                    .map(|token| Completion::BusHigh { token, released: false })
            }
        }
    }
}

impl<B, M, T, const N: usize> ActionSink<T> for Scheduler<B, M, T, N>
where
    B: BusLine,
    M: OneShotTimer,
    T: Copy,
{
    fn push_action(&mut self, action: TimedAction<T>) {
        self.enqueue(action);
    }

    fn remaining_capacity(&self) -> usize {
        Scheduler::remaining_capacity(self)
    }
}
