//! Queued register programming
//!
//! Devices such as radio transceivers are brought up by writing long
//! register tables, some entries followed by a settling delay. The
//! [`CommandQueue`] accepts those writes without blocking and executes
//! them one per timer expiry: each expiry performs the head command's
//! (possibly masked) register write and arms the timer for the command's
//! post-delay. The expiry after the last post-delay reports the drain.

use heapless::Deque;
use wxstation_hal::{OneShotTimer, RegisterBus};

use crate::config::{CommandQueueConfig, COMMAND_QUEUE_CAPACITY};

/// Mask value meaning "overwrite the whole register"
pub const UNMASKED: u16 = 0xFFFF;

/// One register write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command {
    /// Register address on the bound device
    pub address: u8,
    /// Value to write (bits set outside `mask` after masking)
    pub data: u16,
    /// Bits of the current value to keep; [`UNMASKED`] skips the read
    pub mask: u16,
    /// Delay after the write before the next command (ms)
    pub post_delay_ms: u16,
}

impl Command {
    /// Plain register write
    pub const fn write(address: u8, data: u16, post_delay_ms: u16) -> Self {
        Self {
            address,
            data,
            mask: UNMASKED,
            post_delay_ms,
        }
    }

    /// Read-modify-write keeping the bits set in `mask`
    pub const fn masked(address: u8, data: u16, mask: u16, post_delay_ms: u16) -> Self {
        Self {
            address,
            data,
            mask,
            post_delay_ms,
        }
    }

    /// Check if the write needs the current register value
    pub const fn is_masked(&self) -> bool {
        self.mask != UNMASKED
    }

    /// Value to write given the register's current value
    pub const fn apply(&self, current: u16) -> u16 {
        (current & self.mask) | self.data
    }
}

/// Outcome reported from a command queue timer expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandEvent<D, E> {
    /// Every queued command has run; carries the registered drain token
    Drained(Option<D>),
    /// A register transaction failed; later commands still run
    Failed { address: u8, error: E },
}

/// Timer-paced register write queue
pub struct CommandQueue<R, M, D, const N: usize = COMMAND_QUEUE_CAPACITY> {
    regs: R,
    timer: M,
    config: CommandQueueConfig,
    queue: Deque<Command, N>,
    drain_notify: Option<D>,
    busy: bool,
    dropped: u32,
}

impl<R, M, D, const N: usize> CommandQueue<R, M, D, N>
where
    R: RegisterBus,
    M: OneShotTimer,
    D: Copy,
{
    /// Create an idle queue
    pub fn new(regs: R, timer: M, config: CommandQueueConfig) -> Self {
        Self {
            regs,
            timer,
            config,
            queue: Deque::new(),
            drain_notify: None,
            busy: false,
            dropped: 0,
        }
    }

    /// Queue a register write
    ///
    /// `mask == 0xFFFF` writes `data` as is; any other mask reads the
    /// register first and writes `(current & mask) | data`.
    pub fn queue_command(&mut self, address: u8, data: u16, mask: u16, post_delay_ms: u16) {
        self.enqueue(Command::masked(address, data, mask, post_delay_ms));
    }

    /// Queue a command
    ///
    /// An idle queue starts processing after the start delay. A busy queue
    /// keeps its current timing. A full queue drops the command.
    pub fn enqueue(&mut self, command: Command) {
        if self.queue.push_back(command).is_err() {
            self.dropped = self.dropped.saturating_add(1);
            crate::log_warn!(
                "command queue full, dropped write to register {}",
                command.address
            );
            return;
        }

        if !self.busy {
            self.busy = true;
            let delay = self.config.start_delay_ms.max(1);
            self.timer.arm_ms(delay.into());
        }
    }

    /// Queue every command of a table in order
    pub fn enqueue_all(&mut self, commands: &[Command]) {
        for command in commands {
            self.enqueue(*command);
        }
    }

    /// Register the token reported when the queue drains
    ///
    /// Replaces any earlier token. `None` reports drains without a token.
    pub fn set_drain_notify(&mut self, token: Option<D>) {
        self.drain_notify = token;
    }

    /// Currently registered drain token
    pub fn drain_notify(&self) -> Option<D> {
        self.drain_notify
    }

    /// Number of pending commands
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if no command is pending
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Check if the queue is processing (timer running)
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Free queue slots
    pub fn remaining_capacity(&self) -> usize {
        N - self.queue.len()
    }

    /// Commands lost to a full queue since creation
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Get the register bus
    pub fn bus(&self) -> &R {
        &self.regs
    }

    /// Get the timer
    pub fn timer(&self) -> &M {
        &self.timer
    }

    /// Service a timer expiry
    ///
    /// Call from the timer interrupt handler. Runs at most one command.
    pub fn on_timer_expiry(&mut self) -> Option<CommandEvent<D, R::Error>> {
        self.timer.acknowledge();

        if !self.busy {
            return None;
        }

        let Some(command) = self.queue.pop_front() else {
            self.busy = false;
            crate::log_debug!("command queue drained");
            return Some(CommandEvent::Drained(self.drain_notify));
        };

        let result = self.execute(&command);
        let delay = command.post_delay_ms.max(self.config.min_post_delay_ms).max(1);
        self.timer.arm_ms(delay.into());

        match result {
            Ok(()) => None,
            Err(error) => {
                crate::log_error!("register {} write failed", command.address);
                Some(CommandEvent::Failed {
                    address: command.address,
                    error,
                })
            }
        }
    }

    fn execute(&mut self, command: &Command) -> Result<(), R::Error> {
        let value = if command.is_masked() {
            let current = self.regs.read_register(command.address)?;
            command.apply(current)
        } else {
            command.data
        };
        self.regs.write_register(command.address, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    /// Mock register file recording writes
    struct MockRegs {
        registers: [u16; 256],
        writes: Vec<(u8, u16)>,
        reads: usize,
        fail_address: Option<u8>,
    }

    impl MockRegs {
        fn new() -> Self {
            Self {
                registers: [0; 256],
                writes: Vec::new(),
                reads: 0,
                fail_address: None,
            }
        }
    }

    impl RegisterBus for MockRegs {
        type Error = ();

        fn read_register(&mut self, reg: u8) -> Result<u16, ()> {
            self.reads += 1;
            Ok(self.registers[reg as usize])
        }

        fn write_register(&mut self, reg: u8, value: u16) -> Result<(), ()> {
            if self.fail_address == Some(reg) {
                return Err(());
            }
            self.registers[reg as usize] = value;
            self.writes.push((reg, value));
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockTimer {
        armed_us: Vec<u32>,
    }

    impl OneShotTimer for MockTimer {
        fn arm_us(&mut self, us: u32) {
            self.armed_us.push(us);
        }

        fn acknowledge(&mut self) {}
    }

    type TestQueue<const N: usize> = CommandQueue<MockRegs, MockTimer, u8, N>;

    fn queue<const N: usize>(regs: MockRegs) -> TestQueue<N> {
        CommandQueue::new(regs, MockTimer::default(), CommandQueueConfig::default())
    }

    fn run_to_drain<const N: usize>(q: &mut TestQueue<N>) -> Vec<CommandEvent<u8, ()>> {
        let mut events = Vec::new();
        while q.is_busy() {
            events.extend(q.on_timer_expiry());
        }
        events
    }

    #[test]
    fn test_first_enqueue_arms_start_delay() {
        let mut q: TestQueue<4> = queue(MockRegs::new());
        q.queue_command(0x30, 0x0001, UNMASKED, 100);
        q.queue_command(0x30, 0x0004, UNMASKED, 0);

        assert!(q.is_busy());
        assert_eq!(q.timer().armed_us, [1_000]);
    }

    #[test]
    fn test_plain_write_skips_read() {
        let mut q: TestQueue<4> = queue(MockRegs::new());
        q.queue_command(0x09, 0x03AC, UNMASKED, 0);
        q.on_timer_expiry();

        assert_eq!(q.bus().writes, [(0x09, 0x03AC)]);
        assert_eq!(q.bus().reads, 0);
    }

    #[test]
    fn test_read_modify_write() {
        let mut regs = MockRegs::new();
        regs.registers[0x1F] = 0x1234;
        let mut q: TestQueue<4> = queue(regs);

        q.queue_command(0x1F, 0x0F00, 0xF0FF, 0);
        q.on_timer_expiry();

        assert_eq!(q.bus().writes, [(0x1F, 0x1F34)]);
        assert_eq!(q.bus().reads, 1);
    }

    #[test]
    fn test_post_delay_with_floor() {
        let mut q: TestQueue<4> = queue(MockRegs::new());
        q.queue_command(0x30, 0x0001, UNMASKED, 100);
        q.queue_command(0x30, 0x0004, UNMASKED, 0);
        run_to_drain(&mut q);

        assert_eq!(q.timer().armed_us, [1_000, 100_000, 1_000]);
    }

    #[test]
    fn test_drains_exactly_once() {
        let mut q: TestQueue<8> = queue(MockRegs::new());
        q.set_drain_notify(Some(42));
        for reg in 0..5 {
            q.queue_command(reg, 1, UNMASKED, 1);
        }

        let events = run_to_drain(&mut q);
        assert_eq!(events, [CommandEvent::Drained(Some(42))]);
        assert!(q.is_empty());

        // Idle expiries stay silent
        assert_eq!(q.on_timer_expiry(), None);

        // Reusable after draining
        q.queue_command(0x10, 2, UNMASKED, 1);
        let events = run_to_drain(&mut q);
        assert_eq!(events, [CommandEvent::Drained(Some(42))]);
        assert_eq!(q.bus().writes.len(), 6);
    }

    #[test]
    fn test_drain_token_replaced() {
        let mut q: TestQueue<4> = queue(MockRegs::new());
        q.set_drain_notify(Some(1));
        q.set_drain_notify(Some(2));
        q.queue_command(0x00, 0, UNMASKED, 1);

        assert_eq!(run_to_drain(&mut q), [CommandEvent::Drained(Some(2))]);
    }

    #[test]
    fn test_failure_reported_and_processing_continues() {
        let mut regs = MockRegs::new();
        regs.fail_address = Some(0x41);
        let mut q: TestQueue<4> = queue(regs);
        q.queue_command(0x41, 0x067F, UNMASKED, 1);
        q.queue_command(0x44, 0x02FF, UNMASKED, 1);

        let events = run_to_drain(&mut q);
        assert_eq!(
            events,
            [
                CommandEvent::Failed {
                    address: 0x41,
                    error: ()
                },
                CommandEvent::Drained(None),
            ]
        );
        assert_eq!(q.bus().writes, [(0x44, 0x02FF)]);
    }

    #[test]
    fn test_overflow_drops_command() {
        let mut q: TestQueue<2> = queue(MockRegs::new());
        q.queue_command(0x01, 1, UNMASKED, 1);
        q.queue_command(0x02, 2, UNMASKED, 1);
        q.queue_command(0x03, 3, UNMASKED, 1);

        assert_eq!(q.len(), 2);
        assert_eq!(q.dropped(), 1);
        run_to_drain(&mut q);
        assert_eq!(q.bus().writes, [(0x01, 1), (0x02, 2)]);
    }

    #[test]
    fn test_busy_queue_timer_untouched() {
        let mut q: TestQueue<4> = queue(MockRegs::new());
        q.queue_command(0x01, 1, UNMASKED, 50);
        q.on_timer_expiry();
        q.queue_command(0x02, 2, UNMASKED, 1);

        assert_eq!(q.timer().armed_us, [1_000, 50_000]);
    }
}
