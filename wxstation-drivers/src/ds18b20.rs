//! DS18B20 One-Wire digital thermometer
//!
//! A measurement takes two bus sequences with the conversion time in
//! between:
//!
//! ```text
//! initiate_measurement:  [guard] reset  skip-ROM  convert-T
//!            ... wait conversion_time_ms ...
//! read_scratchpad:       [guard] reset  skip-ROM  read-scratchpad  9 × read byte
//! ```
//!
//! Both only append actions; the results come back as scheduler
//! completions, which the timer interrupt passes to [`Ds18b20::handle`].
//! Only a single device on the bus is supported (skip-ROM addressing).

use wxstation_core::config::ThermometerConfig;
use wxstation_core::onewire::{
    Encoder, READ_BYTE_ACTIONS, RESET_ACTIONS, WAIT_ACTIONS, WRITE_BYTE_ACTIONS,
};
use wxstation_core::scheduler::{ActionSink, Completion};
use wxstation_core::session::{
    Scratchpad, SessionError, SessionEvent, SessionFault, SessionState, DS18B20_SCRATCHPAD_LEN,
};
use wxstation_core::traits::{SensorError, TemperatureSensor};

/// Completion tokens used by the thermometer session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ds18b20Token {
    /// Outcome of the bus-idle guard
    BusIdle,
    /// Presence sample after a reset
    Presence,
    /// One scratchpad byte
    ScratchpadByte,
}

/// Temperature reading in raw sensor units (1/16 °C)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    raw: i16,
}

impl Reading {
    /// Wrap a raw two's-complement sensor value
    pub const fn from_raw(raw: i16) -> Self {
        Self { raw }
    }

    /// Raw sensor value (1/16 °C)
    pub const fn raw(&self) -> i16 {
        self.raw
    }

    /// Whole degrees Celsius, truncated toward zero
    pub const fn whole_celsius(&self) -> i16 {
        self.raw / 16
    }

    /// Whole degrees Fahrenheit, truncating after every step
    ///
    /// 331 (20.6875 °C) gives 20 * 9 / 5 + 32 = 68.
    pub const fn whole_fahrenheit(&self) -> i16 {
        self.whole_celsius() * 9 / 5 + 32
    }

    /// Tenths of a degree Celsius, truncated toward zero
    pub const fn celsius_x10(&self) -> i16 {
        (self.raw as i32 * 10 / 16) as i16
    }
}

/// DS18B20 thermometer session
pub struct Ds18b20 {
    config: ThermometerConfig,
    encoder: Encoder,
    state: SessionState,
    scratchpad: Scratchpad<DS18B20_SCRATCHPAD_LEN>,
    presence: Option<bool>,
    last: Result<Reading, SensorError>,
}

impl Ds18b20 {
    /// Create an idle session
    pub fn new(config: ThermometerConfig, encoder: Encoder) -> Self {
        Self {
            config,
            encoder,
            state: SessionState::Idle,
            scratchpad: Scratchpad::new(),
            presence: None,
            last: Err(SensorError::NotReady),
        }
    }

    /// Session configuration
    pub fn config(&self) -> &ThermometerConfig {
        &self.config
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Scratchpad bytes received so far, kept even when the CRC fails
    pub fn scratchpad(&self) -> &Scratchpad<DS18B20_SCRATCHPAD_LEN> {
        &self.scratchpad
    }

    /// Whether the last reset saw a presence pulse
    pub fn presence(&self) -> Option<bool> {
        self.presence
    }

    /// Last measurement outcome
    pub fn last_reading(&self) -> Result<Reading, SensorError> {
        self.last
    }

    /// Time to wait between the two measurement sequences (ms)
    pub fn conversion_time_ms(&self) -> u32 {
        self.config.conversion_time_ms()
    }

    /// Queue reset, skip-ROM and convert-T
    ///
    /// Nothing is queued unless the whole sequence fits.
    pub fn initiate_measurement<S>(&mut self, sink: &mut S) -> Result<(), SessionError>
    where
        S: ActionSink<Ds18b20Token>,
    {
        self.begin(sink, 2 * WRITE_BYTE_ACTIONS)?;
        let commands = self.config.commands;
        self.encoder
            .write_bytes(sink, &[commands.skip_rom, commands.convert]);
        wxstation_core::log_debug!("ds18b20: conversion queued");
        Ok(())
    }

    /// Queue reset, skip-ROM, read-scratchpad and nine byte reads
    ///
    /// Call once the conversion time has passed.
    pub fn read_scratchpad<S>(&mut self, sink: &mut S) -> Result<(), SessionError>
    where
        S: ActionSink<Ds18b20Token>,
    {
        let reads = DS18B20_SCRATCHPAD_LEN * READ_BYTE_ACTIONS;
        self.begin(sink, 2 * WRITE_BYTE_ACTIONS + reads)?;
        let commands = self.config.commands;
        self.encoder
            .write_bytes(sink, &[commands.skip_rom, commands.read_scratchpad]);
        for _ in 0..DS18B20_SCRATCHPAD_LEN {
            self.encoder
                .read_byte(sink, Some(Ds18b20Token::ScratchpadByte));
        }
        wxstation_core::log_debug!("ds18b20: scratchpad read queued");
        Ok(())
    }

    /// Queue a write of the alarm triggers and resolution
    pub fn write_configuration<S>(&mut self, sink: &mut S) -> Result<(), SessionError>
    where
        S: ActionSink<Ds18b20Token>,
    {
        self.begin(sink, 5 * WRITE_BYTE_ACTIONS)?;
        let config = &self.config;
        self.encoder.write_bytes(
            sink,
            &[
                config.commands.skip_rom,
                config.commands.write_scratchpad,
                config.alarm_high_c as u8,
                config.alarm_low_c as u8,
                config.resolution.config_byte(),
            ],
        );
        Ok(())
    }

    /// Common prologue: check the session and capacity, queue guard and reset
    fn begin<S>(&mut self, sink: &mut S, body_actions: usize) -> Result<(), SessionError>
    where
        S: ActionSink<Ds18b20Token>,
    {
        if self.state.is_busy() {
            return Err(SessionError::Busy);
        }

        let guard = if self.config.check_bus_idle {
            WAIT_ACTIONS
        } else {
            0
        };
        if sink.remaining_capacity() < guard + RESET_ACTIONS + body_actions {
            wxstation_core::log_warn!("ds18b20: bus queue too full for sequence");
            return Err(SessionError::QueueFull);
        }

        self.scratchpad.reset();
        self.presence = None;
        self.state = self.state.transition(SessionEvent::BeginReset);

        if self.config.check_bus_idle {
            self.encoder.wait_for_bus_high(
                sink,
                self.config.bus_idle_polls,
                Some(Ds18b20Token::BusIdle),
            );
        }
        self.encoder.reset(sink, Some(Ds18b20Token::Presence));
        Ok(())
    }

    /// Feed a scheduler completion into the session
    ///
    /// Runs in interrupt context. Returns a result when a measurement
    /// finished or the session failed.
    pub fn handle(
        &mut self,
        completion: Completion<Ds18b20Token>,
    ) -> Option<Result<Reading, SensorError>> {
        match completion {
            Completion::BusHigh {
                token: Ds18b20Token::BusIdle,
                released,
            } => {
                if released {
                    None
                } else {
                    self.apply(SessionEvent::Failed(SessionFault::BusStuckLow))
                }
            }
            Completion::Sampled {
                token: Ds18b20Token::Presence,
                bit,
            } => {
                if self.state != SessionState::Resetting {
                    return None;
                }
                self.presence = Some(bit == 0);
                self.apply(SessionEvent::from_presence(bit))
            }
            Completion::Byte {
                token: Ds18b20Token::ScratchpadByte,
                byte,
            } => self.on_byte(byte),
            Completion::Drained => self.apply(SessionEvent::CommandsSent),
            _ => None,
        }
    }

    fn on_byte(&mut self, byte: u8) -> Option<Result<Reading, SensorError>> {
        if !matches!(
            self.state,
            SessionState::Addressing | SessionState::ReadingScratchpad
        ) {
            return None;
        }

        self.state = self.state.transition(SessionEvent::ByteReceived);
        if !self.scratchpad.push(byte) {
            return None;
        }

        if self.config.verify_crc && !self.scratchpad.crc_valid() {
            return self.apply(SessionEvent::Failed(SessionFault::CrcMismatch));
        }

        let raw = self.scratchpad.raw_temperature()? & self.config.resolution.raw_mask();
        let reading = Reading::from_raw(raw);
        self.state = self.state.transition(SessionEvent::ScratchpadFull);
        self.last = Ok(reading);
        wxstation_core::log_info!("ds18b20: raw {} = {} dC", raw, reading.celsius_x10());
        Some(Ok(reading))
    }

    /// Apply an event; report a failure if it moved the session into a fault
    fn apply(&mut self, event: SessionEvent) -> Option<Result<Reading, SensorError>> {
        let previous = self.state;
        self.state = previous.transition(event);

        match self.state {
            SessionState::Fault(fault) if previous != self.state => {
                wxstation_core::log_warn!("ds18b20: session fault {:?}", fault);
                let error = SensorError::from(fault);
                self.last = Err(error);
                Some(Err(error))
            }
            _ => None,
        }
    }
}

impl TemperatureSensor for Ds18b20 {
    fn read_celsius_x10(&mut self) -> Result<i16, SensorError> {
        self.last.map(|reading| reading.celsius_x10())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::vec::Vec;
    use wxstation_core::config::SchedulerConfig;
    use wxstation_core::onewire::crc8;
    use wxstation_core::scheduler::Scheduler;
    use wxstation_hal::{BusLine, OneShotTimer};

    /// Mock line replaying scripted sample levels (high once exhausted)
    #[derive(Default)]
    struct ScriptedLine {
        levels: VecDeque<bool>,
        lows: usize,
    }

    impl ScriptedLine {
        fn presence_then(bytes: &[u8]) -> Self {
            let mut levels = VecDeque::new();
            levels.push_back(false);
            for byte in bytes {
                for i in 0..8 {
                    levels.push_back((byte >> i) & 1 != 0);
                }
            }
            Self { levels, lows: 0 }
        }
    }

    impl BusLine for ScriptedLine {
        fn drive_low(&mut self) {
            self.lows += 1;
        }

        fn release(&mut self) {}

        fn sample(&mut self) -> bool {
            self.levels.pop_front().unwrap_or(true)
        }
    }

    #[derive(Default)]
    struct NullTimer;

    impl OneShotTimer for NullTimer {
        fn arm_us(&mut self, _us: u32) {}

        fn acknowledge(&mut self) {}
    }

    type Bus<const N: usize> = Scheduler<ScriptedLine, NullTimer, Ds18b20Token, N>;

    fn bus<const N: usize>(line: ScriptedLine) -> Bus<N> {
        Scheduler::new(line, NullTimer, SchedulerConfig::default())
    }

    fn sensor() -> Ds18b20 {
        Ds18b20::new(ThermometerConfig::default(), Encoder::default())
    }

    /// Run the scheduler until drained, collecting session results
    fn run<const N: usize>(
        bus: &mut Bus<N>,
        sensor: &mut Ds18b20,
    ) -> Vec<Result<Reading, SensorError>> {
        let mut results = Vec::new();
        loop {
            let completion = bus.on_timer_expiry();
            if let Some(completion) = completion {
                results.extend(sensor.handle(completion));
                if completion == Completion::Drained {
                    return results;
                }
            }
        }
    }

    fn scratchpad_with_crc(first: [u8; 8]) -> [u8; 9] {
        let mut bytes = [0u8; 9];
        bytes[..8].copy_from_slice(&first);
        bytes[8] = crc8(&first);
        bytes
    }

    #[test]
    fn test_reading_conversions() {
        let reading = Reading::from_raw(331);
        assert_eq!(reading.whole_celsius(), 20);
        assert_eq!(reading.whole_fahrenheit(), 68);
        assert_eq!(reading.celsius_x10(), 206);

        let cold = Reading::from_raw(-162);
        assert_eq!(cold.whole_celsius(), -10);
        assert_eq!(cold.celsius_x10(), -101);
    }

    #[test]
    fn test_initiate_measurement() {
        let mut bus: Bus<64> = bus(ScriptedLine::presence_then(&[]));
        let mut sensor = sensor();

        sensor.initiate_measurement(&mut bus).unwrap();
        assert_eq!(bus.len(), RESET_ACTIONS + 2 * WRITE_BYTE_ACTIONS);
        assert_eq!(sensor.state(), SessionState::Resetting);

        let results = run(&mut bus, &mut sensor);
        assert!(results.is_empty());
        assert_eq!(sensor.presence(), Some(true));
        assert_eq!(sensor.state(), SessionState::Commanding);
    }

    #[test]
    fn test_full_measurement() {
        let bytes = scratchpad_with_crc([0x4B, 0x01, 0x4B, 0x46, 0x7F, 0xFF, 0x05, 0x10]);
        let mut bus: Bus<500> = bus(ScriptedLine::presence_then(&[]));
        let mut sensor = sensor();

        sensor.initiate_measurement(&mut bus).unwrap();
        run(&mut bus, &mut sensor);

        // Second reset sees the scripted scratchpad
        bus = Scheduler::new(
            ScriptedLine::presence_then(&bytes),
            NullTimer,
            SchedulerConfig::default(),
        );
        sensor.read_scratchpad(&mut bus).unwrap();
        let results = run(&mut bus, &mut sensor);

        assert_eq!(results, [Ok(Reading::from_raw(331))]);
        assert_eq!(sensor.state(), SessionState::Complete);
        assert_eq!(sensor.scratchpad().as_slice(), &bytes);
        assert_eq!(sensor.read_celsius_x10(), Ok(206));
        assert_eq!(sensor.read_celsius(), Ok(20));
    }

    #[test]
    fn test_no_device() {
        let mut bus: Bus<500> = bus(ScriptedLine::default());
        let mut sensor = sensor();

        sensor.read_scratchpad(&mut bus).unwrap();
        let results = run(&mut bus, &mut sensor);

        assert_eq!(results, [Err(SensorError::NoDevice)]);
        assert_eq!(sensor.presence(), Some(false));
        assert_eq!(sensor.state(), SessionState::Fault(SessionFault::NoDevice));
        assert_eq!(sensor.read_celsius_x10(), Err(SensorError::NoDevice));
    }

    #[test]
    fn test_crc_mismatch_keeps_raw_bytes() {
        let mut bytes = scratchpad_with_crc([0x4B, 0x01, 0x4B, 0x46, 0x7F, 0xFF, 0x05, 0x10]);
        bytes[8] ^= 0xFF;
        let mut bus: Bus<500> = bus(ScriptedLine::presence_then(&bytes));
        let mut sensor = sensor();

        sensor.read_scratchpad(&mut bus).unwrap();
        let results = run(&mut bus, &mut sensor);

        assert_eq!(results, [Err(SensorError::CrcMismatch)]);
        assert_eq!(sensor.scratchpad().as_slice(), &bytes);
        assert_eq!(sensor.scratchpad().raw_temperature(), Some(331));
    }

    #[test]
    fn test_crc_check_disabled() {
        let bytes = [0x4B, 0x01, 0, 0, 0, 0, 0, 0, 0];
        let mut bus: Bus<500> = bus(ScriptedLine::presence_then(&bytes));
        let config = ThermometerConfig {
            verify_crc: false,
            ..ThermometerConfig::default()
        };
        let mut sensor = Ds18b20::new(config, Encoder::default());

        sensor.read_scratchpad(&mut bus).unwrap();
        assert_eq!(run(&mut bus, &mut sensor), [Ok(Reading::from_raw(331))]);
    }

    #[test]
    fn test_queue_full_queues_nothing() {
        let mut bus: Bus<64> = bus(ScriptedLine::default());
        let mut sensor = sensor();

        assert_eq!(sensor.read_scratchpad(&mut bus), Err(SessionError::QueueFull));
        assert!(bus.is_empty());
        assert_eq!(sensor.state(), SessionState::Idle);
    }

    #[test]
    fn test_busy_while_in_flight() {
        let mut bus: Bus<500> = bus(ScriptedLine::default());
        let mut sensor = sensor();

        sensor.initiate_measurement(&mut bus).unwrap();
        assert_eq!(sensor.read_scratchpad(&mut bus), Err(SessionError::Busy));
    }

    #[test]
    fn test_bus_stuck_low() {
        let line = ScriptedLine {
            levels: [false; 4].into_iter().collect(),
            lows: 0,
        };
        let mut bus: Bus<64> = bus(line);
        let config = ThermometerConfig {
            check_bus_idle: true,
            bus_idle_polls: 3,
            ..ThermometerConfig::default()
        };
        let mut sensor = Ds18b20::new(config, Encoder::default());

        sensor.initiate_measurement(&mut bus).unwrap();
        let results = run(&mut bus, &mut sensor);

        // Presence sample after the failed guard is not reported again
        assert_eq!(results, [Err(SensorError::BusStuckLow)]);
        assert_eq!(sensor.state(), SessionState::Fault(SessionFault::BusStuckLow));
    }

    #[test]
    fn test_write_configuration() {
        let mut bus: Bus<128> = bus(ScriptedLine::presence_then(&[]));
        let mut sensor = sensor();

        sensor.write_configuration(&mut bus).unwrap();
        assert_eq!(bus.len(), RESET_ACTIONS + 5 * WRITE_BYTE_ACTIONS);
        run(&mut bus, &mut sensor);
        assert_eq!(sensor.state(), SessionState::Commanding);
    }
}
