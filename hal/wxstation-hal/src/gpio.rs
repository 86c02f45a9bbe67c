//! GPIO bus line abstraction
//!
//! A One-Wire style bus is a single open-drain conductor with an external
//! pull-up. The controller never drives it high: it either pulls it low or
//! lets go and reads whatever level the pull-up and the devices produce.

/// Open-drain single-wire bus line
///
/// At idle the line is configured as an input (released, pulled high
/// externally). It is only ever driven as an output to pull it low.
pub trait BusLine {
    /// Pull the line low
    fn drive_low(&mut self);

    /// Stop driving the line (high impedance, pulled up externally)
    fn release(&mut self);

    /// Sample the current logic level of the line
    ///
    /// Returns `true` if the line reads high. Takes `&mut self` because
    /// some ports need to switch direction before reading.
    fn sample(&mut self) -> bool;
}

impl<T: BusLine + ?Sized> BusLine for &mut T {
    fn drive_low(&mut self) {
        (**self).drive_low()
    }

    fn release(&mut self) {
        (**self).release()
    }

    fn sample(&mut self) -> bool {
        (**self).sample()
    }
}
