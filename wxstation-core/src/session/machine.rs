//! Device session state machine
//!
//! A thermometer session walks the bus through reset, addressing and a
//! function command. A read cycle then collects the scratchpad byte by
//! byte. Transitions are a pure function of the current state and an
//! event, driven by scheduler completions.

use super::events::SessionEvent;

/// Session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// Nothing queued
    #[default]
    Idle,
    /// Reset pulse queued, waiting for the presence sample
    Resetting,
    /// Device answered; ROM and function command bytes on the wire
    Addressing,
    /// Function command delivered, device working (e.g. converting)
    Commanding,
    /// Scratchpad bytes arriving
    ReadingScratchpad,
    /// Scratchpad complete
    Complete,
    /// Session failed
    Fault(SessionFault),
}

/// Reasons a session can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionFault {
    /// No presence pulse after reset
    NoDevice,
    /// Line did not return high within the poll budget
    BusStuckLow,
    /// Scratchpad CRC-8 mismatch
    CrcMismatch,
}

/// Errors returned when starting a session operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError {
    /// Not enough free queue slots for the whole sequence; nothing queued
    QueueFull,
    /// A previous sequence is still on the bus
    Busy,
}

impl SessionState {
    /// Check if a sequence is still in flight on the bus
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SessionState::Resetting | SessionState::Addressing | SessionState::ReadingScratchpad
        )
    }

    /// Check if this is a fault state
    pub fn is_fault(&self) -> bool {
        matches!(self, SessionState::Fault(_))
    }

    /// Process an event and return the next state
    pub fn transition(self, event: SessionEvent) -> Self {
        use SessionEvent::*;
        use SessionState::*;

        match (self, event) {
            // A new sequence may start whenever the bus is free
            (Idle | Commanding | Complete | Fault(_), BeginReset) => Resetting,

            (Resetting, PresencePulse) => Addressing,
            (Resetting, NoPresence) => Fault(SessionFault::NoDevice),

            // Function command done, no data expected
            (Addressing, CommandsSent) => Commanding,

            // First scratchpad byte
            (Addressing, ByteReceived) => ReadingScratchpad,
            (ReadingScratchpad, ByteReceived) => ReadingScratchpad,
            (ReadingScratchpad, ScratchpadFull) => Complete,

            (Idle, Failed(_)) => Idle,
            (_, Failed(fault)) => Fault(fault),

            _ => self,
        }
    }
}
