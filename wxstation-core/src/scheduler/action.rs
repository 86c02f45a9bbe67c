//! Timed bus actions
//!
//! A [`TimedAction`] is one step of a bit-level protocol: an immediate
//! effect on the bus line, followed by a hold time during which nothing
//! else happens. Sessions tag the actions they care about with a token of
//! their own type `T`; the scheduler hands the token back inside a
//! [`Completion`] once the action has run.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Effect performed at the start of an action slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ActionKind {
    /// Drive the line low
    BusLow,
    /// Release the line to the pull-up
    ReleaseBus,
    /// Sample the line and shift the bit into the shift register
    SampleBit,
    /// Deliver the assembled shift register byte
    TransferByte,
    /// Wait until the released line reads high, polling up to `polls_left` times
    WaitForBusHigh {
        /// Remaining polls before giving up
        polls_left: u16,
    },
    /// Zero the shift register
    ClearShiftRegister,
}

/// One queued bus action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimedAction<T> {
    /// Immediate effect
    pub kind: ActionKind,
    /// Time to remain in the entered state (µs)
    pub hold_us: u32,
    /// Token returned with the completion, if any
    pub notify: Option<T>,
}

impl<T> TimedAction<T> {
    /// Create an action without a completion token
    pub const fn new(kind: ActionKind, hold_us: u32) -> Self {
        Self {
            kind,
            hold_us,
            notify: None,
        }
    }

    /// Create an action that reports back with `token`
    pub const fn notifying(kind: ActionKind, hold_us: u32, token: T) -> Self {
        Self {
            kind,
            hold_us,
            notify: Some(token),
        }
    }
}

/// Result of a terminal action, returned from the timer interrupt
///
/// Completions are produced in interrupt context. Whatever consumes them
/// runs there too and must not block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Completion<T> {
    /// A sampled line level (1 = high)
    Sampled { token: T, bit: u8 },
    /// A byte assembled from eight samples, LSB first
    Byte { token: T, byte: u8 },
    /// Outcome of a wait for the released line
    BusHigh { token: T, released: bool },
    /// The queue ran empty after executing actions
    Drained,
}

impl<T: Copy> Completion<T> {
    /// Token carried by this completion
    pub fn token(&self) -> Option<T> {
        match *self {
            Self::Sampled { token, .. } | Self::Byte { token, .. } | Self::BusHigh { token, .. } => {
                Some(token)
            }
            Self::Drained => None,
        }
    }
}

/// Anything that accepts timed actions in order
pub trait ActionSink<T> {
    /// Append an action
    fn push_action(&mut self, action: TimedAction<T>);

    /// Free slots left
    fn remaining_capacity(&self) -> usize;
}

/// Recording sink for inspecting encoder output
///
/// Keeps no drop count. Callers check [`ActionSink::remaining_capacity`]
/// first; an action pushed past capacity is logged and discarded.
impl<T, const N: usize> ActionSink<T> for heapless::Vec<TimedAction<T>, N> {
    fn push_action(&mut self, action: TimedAction<T>) {
        if self.push(action).is_err() {
            crate::log_warn!("action sink full, action dropped");
        }
    }

    fn remaining_capacity(&self) -> usize {
        N - self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_keeps_first_actions_when_full() {
        let mut sink: heapless::Vec<TimedAction<u8>, 2> = heapless::Vec::new();
        sink.push_action(TimedAction::new(ActionKind::BusLow, 480));
        sink.push_action(TimedAction::new(ActionKind::ReleaseBus, 70));
        assert_eq!(ActionSink::remaining_capacity(&sink), 0);

        sink.push_action(TimedAction::notifying(ActionKind::SampleBit, 410, 1));
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0].kind, ActionKind::BusLow);
        assert_eq!(sink[1].kind, ActionKind::ReleaseBus);
    }
}
