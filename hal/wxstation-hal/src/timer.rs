//! One-shot hardware timer abstraction
//!
//! The bus schedulers do all of their waiting by arming a single one-shot
//! countdown and returning. The interrupt raised at expiry calls back into
//! the scheduler, which acknowledges it and arms the next countdown.

/// Interrupt-raising one-shot countdown timer
///
/// Implementations convert microseconds into hardware ticks
/// (`us × ticks_per_us`) and raise their interrupt once the countdown
/// reaches zero. Arming an already-armed timer restarts the countdown.
pub trait OneShotTimer {
    /// Arm the countdown for `us` microseconds
    fn arm_us(&mut self, us: u32);

    /// Arm the countdown for `ms` milliseconds
    fn arm_ms(&mut self, ms: u32) {
        self.arm_us(ms.saturating_mul(1_000));
    }

    /// Acknowledge (clear) a pending expiry interrupt
    ///
    /// Called first thing from the expiry handler.
    fn acknowledge(&mut self);
}

impl<T: OneShotTimer + ?Sized> OneShotTimer for &mut T {
    fn arm_us(&mut self, us: u32) {
        (**self).arm_us(us)
    }

    fn arm_ms(&mut self, ms: u32) {
        (**self).arm_ms(ms)
    }

    fn acknowledge(&mut self) {
        (**self).acknowledge()
    }
}
