//! One-shot countdown on an RP2040 TIMER alarm
//!
//! The RP2040 timer counts microseconds. An alarm fires when the low 32
//! bits of the counter equal its target, raising `TIMER_IRQ_n`. Arming
//! writes `now + us` as the target; a target already passed by the time
//! it is written is forced instead of waiting for the counter to wrap.

use embassy_rp::pac;
use wxstation_hal::OneShotTimer;

/// TIMER alarms available to bus schedulers
///
/// Alarm 0 is taken by the embassy time driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerAlarm {
    /// Alarm 1, `TIMER_IRQ_1`
    Alarm1,
    /// Alarm 2, `TIMER_IRQ_2`
    Alarm2,
    /// Alarm 3, `TIMER_IRQ_3`
    Alarm3,
}

impl TimerAlarm {
    const fn index(self) -> usize {
        match self {
            Self::Alarm1 => 1,
            Self::Alarm2 => 2,
            Self::Alarm3 => 3,
        }
    }
}

/// One-shot timer on a TIMER alarm
///
/// Owns one alarm; construct at most one per [`TimerAlarm`]. The matching
/// `TIMER_IRQ_n` must be unmasked in the NVIC by the firmware.
pub struct AlarmTimer {
    alarm: usize,
}

impl AlarmTimer {
    /// Claim an alarm and enable its interrupt
    pub fn new(alarm: TimerAlarm) -> Self {
        let n = alarm.index();
        let timer = pac::TIMER;
        timer.intr().write(|w| w.set_alarm(n, true));
        timer.inte().modify(|w| w.set_alarm(n, true));
        Self { alarm: n }
    }

    /// Current counter value (µs, low 32 bits)
    pub fn now_us() -> u32 {
        pac::TIMER.timerawl().read()
    }

    /// Check if the countdown is still running
    pub fn is_armed(&self) -> bool {
        pac::TIMER.armed().read().armed() & (1 << self.alarm) != 0
    }
}

impl OneShotTimer for AlarmTimer {
    fn arm_us(&mut self, us: u32) {
        let timer = pac::TIMER;
        let start = timer.timerawl().read();
        timer.alarm(self.alarm).write_value(start.wrapping_add(us));

        // Missed the target while writing it
        if timer.timerawl().read().wrapping_sub(start) >= us {
            timer.armed().write(|w| w.set_armed(1 << self.alarm));
            timer.intf().modify(|w| w.set_alarm(self.alarm, true));
        }
    }

    fn acknowledge(&mut self) {
        let timer = pac::TIMER;
        timer.intf().modify(|w| w.set_alarm(self.alarm, false));
        timer.intr().write(|w| w.set_alarm(self.alarm, true));
    }
}
