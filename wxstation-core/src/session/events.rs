//! Events that trigger session transitions

use super::machine::SessionFault;

/// Session events, derived from scheduler completions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionEvent {
    /// A reset sequence was queued
    BeginReset,
    /// Presence sample read low
    PresencePulse,
    /// Presence sample read high
    NoPresence,
    /// The bus queue drained after the command bytes
    CommandsSent,
    /// A scratchpad byte was assembled
    ByteReceived,
    /// The last scratchpad byte arrived and passed validation
    ScratchpadFull,
    /// The session failed
    Failed(SessionFault),
}

impl SessionEvent {
    /// Map a raw presence sample (0 = device present)
    pub fn from_presence(bit: u8) -> Self {
        if bit == 0 {
            SessionEvent::PresencePulse
        } else {
            SessionEvent::NoPresence
        }
    }
}
