//! Bus timing and queue configuration
//!
//! Hold times are expressed in microseconds and mean "how long to remain in
//! the state just entered", because the scheduler performs each action's
//! effect at the start of its slot and only then waits.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default capacity of the bit-level bus action queue
pub const BUS_QUEUE_CAPACITY: usize = 500;

/// Default capacity of the register command queue
pub const COMMAND_QUEUE_CAPACITY: usize = 100;

/// Smallest hold time the one-shot timer is ever armed with (µs)
pub const MIN_HOLD_US: u32 = 5;

/// Idle poll interval while the bus queue is empty (µs)
pub const IDLE_POLL_US: u32 = 1_000;

/// Smallest post-command delay of the command queue (ms)
pub const MIN_POST_DELAY_MS: u16 = 1;

/// Low/release pair for a single write slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SlotTiming {
    /// Time the line stays low (µs)
    pub low_us: u16,
    /// Time the line stays released afterwards (µs)
    pub release_us: u16,
}

impl SlotTiming {
    /// Total slot length (µs)
    pub const fn total_us(&self) -> u32 {
        self.low_us as u32 + self.release_us as u32
    }
}

/// One-Wire standard-speed timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OneWireTiming {
    /// Reset pulse: line low (µs)
    pub reset_low_us: u16,
    /// Reset: released before the presence sample (µs)
    pub presence_wait_us: u16,
    /// Reset: remainder of the presence window after sampling (µs)
    pub presence_hold_us: u16,
    /// Write slot for a 0 bit
    pub write_zero: SlotTiming,
    /// Write slot for a 1 bit
    pub write_one: SlotTiming,
    /// Read slot: initiating low pulse (µs)
    pub read_low_us: u16,
    /// Read slot: released before sampling (µs)
    pub read_sample_delay_us: u16,
    /// Read slot: recovery after sampling (µs)
    pub read_recovery_us: u16,
    /// Poll period of a wait-for-bus-high action (µs)
    pub release_poll_us: u16,
}

impl Default for OneWireTiming {
    fn default() -> Self {
        Self {
            reset_low_us: 480,
            presence_wait_us: 70,
            presence_hold_us: 410,
            write_zero: SlotTiming {
                low_us: 60,
                release_us: 10,
            },
            write_one: SlotTiming {
                low_us: 5,
                release_us: 65,
            },
            read_low_us: 5,
            read_sample_delay_us: 10,
            read_recovery_us: 55,
            release_poll_us: 1_000,
        }
    }
}

impl OneWireTiming {
    /// Total reset sequence length (µs)
    pub const fn reset_total_us(&self) -> u32 {
        self.reset_low_us as u32 + self.presence_wait_us as u32 + self.presence_hold_us as u32
    }

    /// Total read slot length (µs)
    pub const fn read_slot_us(&self) -> u32 {
        self.read_low_us as u32 + self.read_sample_delay_us as u32 + self.read_recovery_us as u32
    }
}

/// Bus action scheduler configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SchedulerConfig {
    /// Floor applied to every armed hold time (µs)
    pub min_hold_us: u32,
    /// Re-arm interval while the queue is empty (µs)
    pub idle_poll_us: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_hold_us: MIN_HOLD_US,
            idle_poll_us: IDLE_POLL_US,
        }
    }
}

/// Register command queue configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CommandQueueConfig {
    /// Floor applied to every post-command delay (ms)
    pub min_post_delay_ms: u16,
    /// Delay between the first enqueue and the first command (ms)
    pub start_delay_ms: u16,
}

impl Default for CommandQueueConfig {
    fn default() -> Self {
        Self {
            min_post_delay_ms: MIN_POST_DELAY_MS,
            start_delay_ms: 1,
        }
    }
}
