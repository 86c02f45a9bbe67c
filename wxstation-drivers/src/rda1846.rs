//! RDA1846 VHF/UHF transceiver
//!
//! The transceiver is configured entirely through 16-bit registers. Every
//! operation here only queues register writes on a [`CommandQueue`]; the
//! queue's timer interrupt performs them with the required settling
//! delays. Initialization finishes asynchronously: [`Rda1846::init`]
//! registers [`RadioStage::Init`] as the drain token, and when the queue
//! reports that drain, [`Rda1846::handle`] tunes the radio and switches it
//! to receive.

use wxstation_core::command::{Command, CommandEvent, CommandQueue, UNMASKED};
use wxstation_core::config::RadioConfig;
use wxstation_hal::{OneShotTimer, RegisterBus};

/// Register addresses
pub mod reg {
    /// Crystal clock mode
    pub const CLK_MODE: u8 = 0x04;
    /// Volume (bits 7:4 and 3:0)
    pub const RX_VOLUME: u8 = 0x44;
    /// GPIO function select
    pub const GPIO_MODE: u8 = 0x1F;
    /// Frequency, high bits
    pub const FREQ_HI: u8 = 0x29;
    /// Frequency, low word
    pub const FREQ_LO: u8 = 0x2A;
    /// Main control
    pub const CTL: u8 = 0x30;
    /// Transmit voice source
    pub const TX_VOICE: u8 = 0x3A;
    /// Register page select
    pub const PAGE: u8 = 0x7F;
}

/// Control register bits
pub mod ctl {
    /// Squelch enable
    pub const SQUELCH: u16 = 1 << 3;
    /// Receive enable
    pub const RX: u16 = 1 << 5;
    /// Transmit enable
    pub const TX: u16 = 1 << 6;
}

/// GPIO mode register bits
pub mod gpio {
    /// GPIO4 output
    pub const GPIO4: u16 = 1 << 9;
    /// GPIO5 output
    pub const GPIO5: u16 = 1 << 11;
}

/// Settling delay after soft reset and calibration steps (ms)
const SETTLE_MS: u16 = 100;

/// Delay after switching the antenna GPIOs (ms)
const SWITCH_MS: u16 = 50;

/// Soft reset
const SOFT_RESET: [Command; 2] = [
    Command::write(reg::CTL, 0x0001, SETTLE_MS),
    Command::write(reg::CTL, 0x0004, 0),
];

/// Power-on register table
const INIT_TABLE: [Command; 18] = [
    Command::write(0x09, 0x03AC, 0), // GPIO voltage 3.3 V
    Command::write(0x0A, 0x47E0, 0), // PGA gain
    Command::write(0x13, 0xA100, 0),
    Command::write(0x1F, 0x5001, 0), // GPIO7 VOX, GPIO0 CTCSS/DCS
    Command::write(0x31, 0x0031, 0),
    Command::write(0x33, 0x0AF2, 0), // AGC
    Command::write(0x41, 0x067F, 0), // voice gain
    Command::write(0x44, 0x02FF, 0), // TX gain
    Command::write(0x47, 0x7F2F, 0),
    Command::write(0x4F, 0x2C62, 0),
    Command::write(0x53, 0x0094, 0), // compressor update time
    Command::write(0x54, 0x2A18, 0),
    Command::write(0x55, 0x0081, 0),
    Command::write(0x56, 0x0B22, 0), // squelch detection time
    Command::write(0x57, 0x1C00, 0),
    Command::write(0x58, 0x800D, 0),
    Command::write(0x5A, 0x0EDB, 0), // noise detection time
    Command::write(0x63, 0x3FFF, 0), // pre-emphasis bypass
];

/// Calibration sequence
const CALIBRATION: [Command; 3] = [
    Command::write(reg::CTL, 0x00A4, SETTLE_MS),
    Command::write(reg::CTL, 0x00A6, SETTLE_MS),
    Command::write(reg::CTL, 0x0006, SETTLE_MS),
];

/// 12.5 kHz channel spacing
const NARROW_BAND: [Command; 13] = [
    Command::write(0x11, 0x3D37, 0),
    Command::write(0x12, 0x0100, 0),
    Command::write(0x15, 0x1100, 0),
    Command::write(0x32, 0x4495, 0),
    Command::write(0x34, 0x2B8E, 0),
    Command::write(0x3A, 0x40C3, 0),
    Command::write(0x3C, 0x0F1E, 0),
    Command::write(0x3F, 0x28D0, 0),
    Command::write(0x48, 0x20BE, 0),
    Command::write(0x60, 0x1BB7, 0),
    Command::write(0x62, 0x0A10, 0),
    Command::write(0x65, 0x2494, 0),
    Command::write(0x66, 0xEB2E, 0),
];

/// AGC table, written on register page 1
const AGC_TABLE: [Command; 18] = [
    Command::write(reg::PAGE, 0x0001, 0),
    Command::write(0x05, 0x000C, 0),
    Command::write(0x06, 0x020C, 0),
    Command::write(0x07, 0x030C, 0),
    Command::write(0x08, 0x0324, 0),
    Command::write(0x09, 0x1344, 0),
    Command::write(0x0A, 0x3F44, 0),
    Command::write(0x0B, 0x3F44, 0),
    Command::write(0x0C, 0x3F44, 0),
    Command::write(0x0D, 0x3F44, 0),
    Command::write(0x0E, 0x3F44, 0),
    Command::write(0x0F, 0x3F44, 0),
    Command::write(0x12, 0xE0ED, 0),
    Command::write(0x13, 0xF2FE, 0),
    Command::write(0x14, 0x0A16, 0),
    Command::write(0x15, 0x2424, 0),
    Command::write(0x16, 0x2424, 0),
    Command::write(0x17, 0x2424, 0),
];

/// Back to page 0; the AGC table needs time to settle
const AGC_END: Command = Command::write(reg::PAGE, 0x0000, SETTLE_MS);

/// Number of commands queued by [`Rda1846::init`]
pub const INIT_COMMANDS: usize =
    SOFT_RESET.len() + INIT_TABLE.len() + CALIBRATION.len() + NARROW_BAND.len() + AGC_TABLE.len() + 1;

/// Drain tokens used by the radio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioStage {
    /// Power-on register programming
    Init,
}

/// Transceiver operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioMode {
    /// Not yet initialized
    Off,
    /// Receiving
    Rx,
    /// Transmitting
    Tx,
}

/// Notable outcomes of [`Rda1846::handle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioEvent {
    /// Register programming finished; tuning and RX queued
    Initialized,
    /// A register write failed
    WriteFailed { address: u8 },
}

/// Crystal clock mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockMode {
    /// 12 – 14 MHz crystal
    Low,
    /// 24 – 28 MHz crystal
    High,
}

/// Frequency register pair for a carrier in kHz
///
/// The chip counts in 1/8 kHz steps across two registers.
pub const fn frequency_registers(khz: u32) -> (u16, u16) {
    let raw = khz.wrapping_mul(8);
    (((raw >> 16) & 0x3FFF) as u16, (raw & 0xFFFF) as u16)
}

/// RDA1846 transceiver driver
pub struct Rda1846 {
    config: RadioConfig,
    mode: RadioMode,
    write_failures: u32,
}

impl Rda1846 {
    /// Create a driver; nothing is sent until [`init`](Self::init)
    pub fn new(config: RadioConfig) -> Self {
        Self {
            config,
            mode: RadioMode::Off,
            write_failures: 0,
        }
    }

    /// Radio configuration
    pub fn config(&self) -> &RadioConfig {
        &self.config
    }

    /// Current (or pending) operating mode
    pub fn mode(&self) -> RadioMode {
        self.mode
    }

    /// Register writes that failed since creation
    pub fn write_failures(&self) -> u32 {
        self.write_failures
    }

    /// Queue the complete power-on sequence
    ///
    /// Soft reset, register table, calibration, narrow band and AGC. The
    /// queue reports [`RadioStage::Init`] when done.
    pub fn init<R, M, const N: usize>(&mut self, queue: &mut CommandQueue<R, M, RadioStage, N>)
    where
        R: RegisterBus,
        M: OneShotTimer,
    {
        queue.set_drain_notify(Some(RadioStage::Init));
        queue.enqueue_all(&SOFT_RESET);
        queue.enqueue_all(&INIT_TABLE);
        queue.enqueue_all(&CALIBRATION);
        queue.enqueue_all(&NARROW_BAND);
        queue.enqueue_all(&AGC_TABLE);
        queue.enqueue(AGC_END);
        wxstation_core::log_info!("rda1846: init queued, {} commands", INIT_COMMANDS);
    }

    /// Feed a command queue event into the driver
    ///
    /// Runs in interrupt context.
    pub fn handle<R, M, const N: usize>(
        &mut self,
        event: CommandEvent<RadioStage, R::Error>,
        queue: &mut CommandQueue<R, M, RadioStage, N>,
    ) -> Option<RadioEvent>
    where
        R: RegisterBus,
        M: OneShotTimer,
    {
        match event {
            CommandEvent::Drained(Some(RadioStage::Init)) => {
                queue.set_drain_notify(None);
                self.set_frequency_khz(queue, self.config.frequency_khz);
                if self.config.squelch {
                    self.set_squelch(queue, true);
                }
                self.set_rx(queue);
                wxstation_core::log_info!("rda1846: ready at {} kHz", self.config.frequency_khz);
                Some(RadioEvent::Initialized)
            }
            CommandEvent::Drained(None) => None,
            CommandEvent::Failed { address, .. } => {
                self.write_failures = self.write_failures.saturating_add(1);
                Some(RadioEvent::WriteFailed { address })
            }
        }
    }

    /// Tune to a carrier frequency
    pub fn set_frequency_khz<R, M, const N: usize>(
        &mut self,
        queue: &mut CommandQueue<R, M, RadioStage, N>,
        khz: u32,
    ) where
        R: RegisterBus,
        M: OneShotTimer,
    {
        let (hi, lo) = frequency_registers(khz);
        queue.enqueue(Command::write(reg::FREQ_HI, hi, 0));
        queue.enqueue(Command::write(reg::FREQ_LO, lo, 0));
        self.config.frequency_khz = khz;
    }

    /// Switch to receive
    pub fn set_rx<R, M, const N: usize>(&mut self, queue: &mut CommandQueue<R, M, RadioStage, N>)
    where
        R: RegisterBus,
        M: OneShotTimer,
    {
        queue.enqueue(Command::masked(reg::CTL, 0, !ctl::TX, 0));
        queue.enqueue(Command::masked(reg::GPIO_MODE, 0, !gpio::GPIO5, 0));
        queue.enqueue(Command::masked(reg::GPIO_MODE, 0, !gpio::GPIO4, SWITCH_MS));
        queue.enqueue(Command::masked(reg::CTL, ctl::RX, !ctl::RX, 0));
        self.mode = RadioMode::Rx;
    }

    /// Switch to transmit
    pub fn set_tx<R, M, const N: usize>(&mut self, queue: &mut CommandQueue<R, M, RadioStage, N>)
    where
        R: RegisterBus,
        M: OneShotTimer,
    {
        queue.enqueue(Command::masked(reg::CTL, 0, !ctl::RX, 0));
        queue.enqueue(Command::masked(reg::GPIO_MODE, gpio::GPIO5, !gpio::GPIO5, 0));
        queue.enqueue(Command::masked(reg::GPIO_MODE, 0, !gpio::GPIO4, SWITCH_MS));
        queue.enqueue(Command::masked(reg::CTL, ctl::TX, !ctl::TX, 0));
        self.mode = RadioMode::Tx;
    }

    /// Enable or disable squelch
    pub fn set_squelch<R, M, const N: usize>(
        &mut self,
        queue: &mut CommandQueue<R, M, RadioStage, N>,
        on: bool,
    ) where
        R: RegisterBus,
        M: OneShotTimer,
    {
        let data = if on { ctl::SQUELCH } else { 0 };
        queue.enqueue(Command::masked(reg::CTL, data, !ctl::SQUELCH, 0));
        self.config.squelch = on;
    }

    /// Select the crystal clock mode
    pub fn set_clock_mode<R, M, const N: usize>(
        &mut self,
        queue: &mut CommandQueue<R, M, RadioStage, N>,
        mode: ClockMode,
    ) where
        R: RegisterBus,
        M: OneShotTimer,
    {
        let value = match mode {
            ClockMode::Low => 0x0FD0,
            ClockMode::High => 0x0FD1,
        };
        queue.enqueue(Command::write(reg::CLK_MODE, value, 0));
    }

    /// Take transmit audio from the PWM/microphone input
    pub fn set_transmit_source_pwm_mic<R, M, const N: usize>(
        &mut self,
        queue: &mut CommandQueue<R, M, RadioStage, N>,
    ) where
        R: RegisterBus,
        M: OneShotTimer,
    {
        queue.enqueue(Command::write(reg::TX_VOICE, 0x0004, 0));
    }

    /// Set both receive volume stages (0–15 each)
    pub fn set_volume<R, M, const N: usize>(
        &mut self,
        queue: &mut CommandQueue<R, M, RadioStage, N>,
        volume1: u8,
        volume2: u8,
    ) where
        R: RegisterBus,
        M: OneShotTimer,
    {
        let data = (u16::from(volume1 & 0x0F) << 4) | u16::from(volume2 & 0x0F);
        queue.enqueue(Command::masked(reg::RX_VOLUME, data, 0xFF00, 0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;
    use wxstation_core::config::CommandQueueConfig;

    struct MockRegs {
        registers: [u16; 256],
        writes: Vec<(u8, u16)>,
    }

    impl MockRegs {
        fn new() -> Self {
            Self {
                registers: [0; 256],
                writes: Vec::new(),
            }
        }
    }

    impl RegisterBus for MockRegs {
        type Error = ();

        fn read_register(&mut self, reg: u8) -> Result<u16, ()> {
            Ok(self.registers[reg as usize])
        }

        fn write_register(&mut self, reg: u8, value: u16) -> Result<(), ()> {
            self.registers[reg as usize] = value;
            self.writes.push((reg, value));
            Ok(())
        }
    }

    struct NullTimer;

    impl OneShotTimer for NullTimer {
        fn arm_us(&mut self, _us: u32) {}

        fn acknowledge(&mut self) {}
    }

    type Queue = CommandQueue<MockRegs, NullTimer, RadioStage, 100>;

    fn queue() -> Queue {
        CommandQueue::new(MockRegs::new(), NullTimer, CommandQueueConfig::default())
    }

    /// Run the queue to completion, routing events through the driver
    fn run(radio: &mut Rda1846, queue: &mut Queue) -> Vec<RadioEvent> {
        let mut events = Vec::new();
        while queue.is_busy() {
            if let Some(event) = queue.on_timer_expiry() {
                events.extend(radio.handle(event, queue));
            }
        }
        events
    }

    #[test]
    fn test_frequency_registers() {
        // 144.930 MHz * 8 = 1_159_440 = 0x0011_B110
        assert_eq!(frequency_registers(144_930), (0x0011, 0xB110));
    }

    #[test]
    fn test_init_sequence() {
        let mut radio = Rda1846::new(RadioConfig::default());
        let mut queue = queue();

        radio.init(&mut queue);
        assert_eq!(queue.len(), INIT_COMMANDS);

        let events = run(&mut radio, &mut queue);
        assert_eq!(events, [RadioEvent::Initialized]);

        let writes = &queue.bus().writes;
        assert_eq!(writes[0], (reg::CTL, 0x0001));
        assert_eq!(writes[1], (reg::CTL, 0x0004));
        assert_eq!(writes[INIT_COMMANDS - 1], (reg::PAGE, 0x0000));

        // Tuned and switched to RX after the drain
        assert_eq!(writes[INIT_COMMANDS], (reg::FREQ_HI, 0x0011));
        assert_eq!(writes[INIT_COMMANDS + 1], (reg::FREQ_LO, 0xB110));
        assert_eq!(radio.mode(), RadioMode::Rx);
        assert_eq!(queue.drain_notify(), None);
    }

    #[test]
    fn test_rx_tx_switching() {
        let mut radio = Rda1846::new(RadioConfig::default());
        let mut queue = queue();

        radio.set_tx(&mut queue);
        run(&mut radio, &mut queue);
        let ctl_value = queue.bus().registers[reg::CTL as usize];
        let gpio_value = queue.bus().registers[reg::GPIO_MODE as usize];
        assert_eq!(ctl_value & (ctl::TX | ctl::RX), ctl::TX);
        assert_eq!(gpio_value & gpio::GPIO5, gpio::GPIO5);
        assert_eq!(radio.mode(), RadioMode::Tx);

        radio.set_rx(&mut queue);
        run(&mut radio, &mut queue);
        let ctl_value = queue.bus().registers[reg::CTL as usize];
        let gpio_value = queue.bus().registers[reg::GPIO_MODE as usize];
        assert_eq!(ctl_value & (ctl::TX | ctl::RX), ctl::RX);
        assert_eq!(gpio_value & gpio::GPIO5, 0);
    }

    #[test]
    fn test_squelch_preserves_other_bits() {
        let mut radio = Rda1846::new(RadioConfig::default());
        let mut queue = queue();

        radio.set_rx(&mut queue);
        radio.set_squelch(&mut queue, true);
        run(&mut radio, &mut queue);
        assert_eq!(
            queue.bus().registers[reg::CTL as usize],
            ctl::RX | ctl::SQUELCH
        );

        radio.set_squelch(&mut queue, false);
        run(&mut radio, &mut queue);
        assert_eq!(queue.bus().registers[reg::CTL as usize], ctl::RX);
    }

    #[test]
    fn test_volume() {
        let mut radio = Rda1846::new(RadioConfig::default());
        let mut regs = MockRegs::new();
        regs.registers[reg::RX_VOLUME as usize] = 0x02FF;
        let mut queue: Queue = CommandQueue::new(regs, NullTimer, CommandQueueConfig::default());

        radio.set_volume(&mut queue, 0xA, 0x5);
        run(&mut radio, &mut queue);
        assert_eq!(queue.bus().registers[reg::RX_VOLUME as usize], 0x02A5);
    }
}
