//! Open-drain bus line on a `Flex` GPIO
//!
//! The pin's output latch is held low permanently; driving the line is
//! switching the pin to output, releasing it is switching back to input
//! with the pull-up enabled. The pin never drives the line high.

use embassy_rp::gpio::{Flex, Pull};
use wxstation_hal::BusLine;

/// One-Wire style open-drain line
pub struct FlexBusLine<'d> {
    pin: Flex<'d>,
}

impl<'d> FlexBusLine<'d> {
    /// Take over a pin and release the line
    ///
    /// The internal pull-up assists the external one (4.7 kΩ typical).
    pub fn new(mut pin: Flex<'d>) -> Self {
        pin.set_low();
        pin.set_pull(Pull::Up);
        pin.set_as_input();
        Self { pin }
    }
}

impl BusLine for FlexBusLine<'_> {
    #[inline(always)]
    fn drive_low(&mut self) {
        self.pin.set_as_output();
    }

    #[inline(always)]
    fn release(&mut self) {
        self.pin.set_as_input();
    }

    #[inline(always)]
    fn sample(&mut self) -> bool {
        self.pin.is_high()
    }
}
