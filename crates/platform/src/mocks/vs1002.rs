use core::cell::RefCell;
use core::convert::Infallible;

use crate::registers::{SpiRegisters, SpiStatus};
use crate::vs1002::{
    parse_sine_test_start, SciMode, SineTone, SCI_MODE, SCI_READ, SCI_REGISTER_COUNT, SCI_WRITE,
    SINE_TEST_END,
};

const EVENT_CAPACITY: usize = 256;

/// One observable event on the simulated SPI0 / P0.7 wires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    /// P0.7 driven low (xCS active, xDCS inactive).
    ChipSelectLow,
    /// P0.7 driven high (xCS inactive, xDCS active when SDISHARE is set).
    ChipSelectHigh,
    /// One byte exchanged on MOSI/MISO.
    Byte {
        /// Byte written by the master.
        mosi: u8,
        /// Byte shifted back by the chip.
        miso: u8,
    },
    /// A complete SCI read frame.
    SciRead {
        /// Register index.
        address: u8,
        /// Value returned.
        value: u16,
    },
    /// A complete SCI write frame.
    SciWrite {
        /// Register index.
        address: u8,
        /// Value stored.
        value: u16,
    },
    /// xCS released before an SCI frame was complete.
    SciFrameAborted {
        /// Bytes received so far.
        received: u8,
    },
    /// SDI sine-test start sequence accepted.
    SineTestStarted(SineTone),
    /// SDI sine-test exit sequence accepted.
    SineTestStopped,
    /// Eight SDI bytes that were not a recognised command.
    SdiData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transfer {
    Idle,
    /// Byte written; SPIF asserts after this many further status reads.
    Shifting(u32),
    /// SPIF observed by a status read; cleared by the next data access.
    Complete,
}

/// Simulated VS1002 on SPI0 with xCS on P0.7.
///
/// Wrap in a [`RefCell`] and hand out a [`MockSpi`] and a
/// [`MockChipSelect`]; both drive the same chip and event log.
///
/// Models:
/// - SCI read and write frames while P0.7 is low
/// - SDI bytes while P0.7 is high, but only once `SM_SDISHARE` is set
///   (xDCS is the inverse of xCS)
/// - recognition of the sine-test start and exit sequences (needs
///   `SM_TESTS`)
/// - transfer latency: SPIF asserts after a configurable number of status
///   reads, or never for a stalled bus
/// - protocol violations: chip select changed while a byte is still
///   shifting, data register written during a transfer
#[derive(Debug)]
pub struct SimulatedVs1002 {
    registers: [u16; SCI_REGISTER_COUNT],
    chip_select_high: bool,
    control: u8,
    clock_counter: u8,
    latency: u32,
    stalled: bool,
    transfer: Transfer,
    rx: u8,
    sci_frame: heapless::Vec<u8, 4>,
    sdi_buffer: heapless::Vec<u8, 8>,
    sine_test: Option<SineTone>,
    cs_violations: usize,
    write_collisions: usize,
    events: heapless::Vec<BusEvent, EVENT_CAPACITY>,
    dropped_events: usize,
}

impl SimulatedVs1002 {
    /// Chip with all registers zero, chip select high and SPIF asserting on
    /// the second status read after each byte.
    pub fn new() -> Self {
        Self {
            registers: [0; SCI_REGISTER_COUNT],
            chip_select_high: true,
            control: 0,
            clock_counter: 0,
            latency: 1,
            stalled: false,
            transfer: Transfer::Idle,
            rx: 0,
            sci_frame: heapless::Vec::new(),
            sdi_buffer: heapless::Vec::new(),
            sine_test: None,
            cs_violations: 0,
            write_collisions: 0,
            events: heapless::Vec::new(),
            dropped_events: 0,
        }
    }

    /// Status reads that see SPIF clear before it asserts.
    #[must_use]
    pub fn with_latency(mut self, polls: u32) -> Self {
        self.latency = polls;
        self
    }

    /// SPIF never asserts.
    #[must_use]
    pub fn stalled(mut self) -> Self {
        self.stalled = true;
        self
    }

    /// Preload an SCI register.
    #[must_use]
    pub fn with_register(mut self, address: u8, value: u16) -> Self {
        if let Some(slot) = self.registers.get_mut(usize::from(address)) {
            *slot = value;
        }
        self
    }

    /// Current value of an SCI register (`None` outside the map).
    pub fn register(&self, address: u8) -> Option<u16> {
        self.registers.get(usize::from(address)).copied()
    }

    /// Current `SCI_MODE`.
    pub fn mode(&self) -> SciMode {
        SciMode::from_bits(self.registers.first().copied().unwrap_or(0))
    }

    /// Tone currently playing, if the sine test is running.
    pub fn sine_test(&self) -> Option<SineTone> {
        self.sine_test
    }

    /// Level of P0.7.
    pub fn chip_select_high(&self) -> bool {
        self.chip_select_high
    }

    /// Last `S0SPCR` written.
    pub fn control_register(&self) -> u8 {
        self.control
    }

    /// Last `S0SPCCR` written.
    pub fn clock_counter(&self) -> u8 {
        self.clock_counter
    }

    /// Chip-select changes made while a byte was still shifting.
    pub fn chip_select_violations(&self) -> usize {
        self.cs_violations
    }

    /// Data register writes made while a byte was still shifting.
    pub fn write_collisions(&self) -> usize {
        self.write_collisions
    }

    /// Event log, oldest first.
    pub fn events(&self) -> &[BusEvent] {
        &self.events
    }

    /// Events that did not fit in the log. [`Self::events`],
    /// [`Self::wire_trace`] and [`Self::mosi_bytes`] are only complete while
    /// this is zero.
    pub fn dropped_events(&self) -> usize {
        self.dropped_events
    }

    /// Forget all recorded events.
    pub fn clear_events(&mut self) {
        self.events.clear();
        self.dropped_events = 0;
    }

    /// MOSI bytes in the log, in order.
    pub fn mosi_bytes(&self) -> heapless::Vec<u8, EVENT_CAPACITY> {
        self.events
            .iter()
            .filter_map(|e| match e {
                BusEvent::Byte { mosi, .. } => Some(*mosi),
                _ => None,
            })
            .collect()
    }

    /// The log reduced to chip-select edges and bytes.
    pub fn wire_trace(&self) -> heapless::Vec<BusEvent, EVENT_CAPACITY> {
        self.events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    BusEvent::ChipSelectLow | BusEvent::ChipSelectHigh | BusEvent::Byte { .. }
                )
            })
            .copied()
            .collect()
    }

    fn record(&mut self, event: BusEvent) {
        if self.events.push(event).is_err() {
            self.dropped_events = self.dropped_events.saturating_add(1);
        }
    }

    fn byte_in_flight(&self) -> bool {
        matches!(self.transfer, Transfer::Shifting(_))
    }

    fn set_chip_select(&mut self, high: bool) {
        if self.byte_in_flight() {
            self.cs_violations = self.cs_violations.saturating_add(1);
        }
        self.record(if high {
            BusEvent::ChipSelectHigh
        } else {
            BusEvent::ChipSelectLow
        });
        if high == self.chip_select_high {
            return;
        }
        self.chip_select_high = high;
        if high && !self.sci_frame.is_empty() {
            #[allow(clippy::cast_possible_truncation)] // at most 4
            let received = self.sci_frame.len() as u8;
            self.record(BusEvent::SciFrameAborted { received });
        }
        self.sci_frame.clear();
        self.sdi_buffer.clear();
    }

    /// Feed one MOSI byte to the chip and return the MISO byte.
    fn exchange(&mut self, mosi: u8) -> u8 {
        let miso = if self.chip_select_high {
            if self.mode().contains(SciMode::SDISHARE) {
                self.sdi_byte(mosi);
            }
            0
        } else {
            self.sci_byte(mosi)
        };
        self.record(BusEvent::Byte { mosi, miso });
        miso
    }

    fn sci_byte(&mut self, byte: u8) -> u8 {
        let index = self.sci_frame.len();
        let _ = self.sci_frame.push(byte);
        let (opcode, address) = match self.sci_frame.as_slice() {
            [op, addr, ..] => (*op, *addr),
            _ => return 0,
        };
        let current = self.register(address).unwrap_or(0);
        let [hi, lo] = current.to_be_bytes();
        let miso = match (opcode, index) {
            (SCI_READ, 2) => hi,
            (SCI_READ, 3) => lo,
            _ => 0,
        };
        if let [op, addr, b2, b3] = *self.sci_frame.as_slice() {
            match op {
                SCI_READ => self.record(BusEvent::SciRead {
                    address: addr,
                    value: current,
                }),
                SCI_WRITE => {
                    let value = u16::from_be_bytes([b2, b3]);
                    if let Some(slot) = self.registers.get_mut(usize::from(addr)) {
                        *slot = value;
                    }
                    self.record(BusEvent::SciWrite {
                        address: addr,
                        value,
                    });
                    if addr == SCI_MODE && !SciMode::from_bits(value).contains(SciMode::TESTS) {
                        self.sine_test = None;
                    }
                }
                _ => {}
            }
            self.sci_frame.clear();
        }
        miso
    }

    fn sdi_byte(&mut self, byte: u8) {
        let _ = self.sdi_buffer.push(byte);
        if !self.sdi_buffer.is_full() {
            return;
        }
        let tests_allowed = self.mode().contains(SciMode::TESTS);
        let event = match parse_sine_test_start(&self.sdi_buffer) {
            Some(tone) if tests_allowed => {
                self.sine_test = Some(tone);
                BusEvent::SineTestStarted(tone)
            }
            None if tests_allowed && self.sdi_buffer.as_slice() == SINE_TEST_END => {
                self.sine_test = None;
                BusEvent::SineTestStopped
            }
            _ => BusEvent::SdiData,
        };
        self.record(event);
        self.sdi_buffer.clear();
    }
}

impl Default for SimulatedVs1002 {
    fn default() -> Self {
        Self::new()
    }
}

/// SPI0 register block wired to a [`SimulatedVs1002`].
pub struct MockSpi<'a> {
    chip: &'a RefCell<SimulatedVs1002>,
}

impl<'a> MockSpi<'a> {
    /// Connect to a chip.
    pub fn new(chip: &'a RefCell<SimulatedVs1002>) -> Self {
        Self { chip }
    }
}

impl SpiRegisters for MockSpi<'_> {
    fn write_control(&mut self, value: u8) {
        self.chip.borrow_mut().control = value;
    }

    fn write_clock_counter(&mut self, value: u8) {
        self.chip.borrow_mut().clock_counter = value;
    }

    fn status(&mut self) -> SpiStatus {
        let mut guard = self.chip.borrow_mut();
        let chip = &mut *guard;
        let mut bits = 0;
        if chip.write_collisions > 0 {
            bits |= SpiStatus::WCOL;
        }
        match chip.transfer {
            Transfer::Shifting(_) if chip.stalled => {}
            Transfer::Shifting(0) | Transfer::Complete => {
                chip.transfer = Transfer::Complete;
                bits |= SpiStatus::SPIF;
            }
            Transfer::Shifting(n) => chip.transfer = Transfer::Shifting(n.saturating_sub(1)),
            Transfer::Idle => {}
        }
        SpiStatus::from_bits(bits)
    }

    fn write_data(&mut self, byte: u8) {
        let mut guard = self.chip.borrow_mut();
        let chip = &mut *guard;
        if chip.byte_in_flight() {
            chip.write_collisions = chip.write_collisions.saturating_add(1);
            return;
        }
        chip.rx = chip.exchange(byte);
        chip.transfer = Transfer::Shifting(chip.latency);
    }

    fn read_data(&mut self) -> u8 {
        let mut chip = self.chip.borrow_mut();
        if chip.transfer == Transfer::Complete {
            chip.transfer = Transfer::Idle;
        }
        chip.rx
    }
}

/// P0.7 wired to a [`SimulatedVs1002`].
pub struct MockChipSelect<'a> {
    chip: &'a RefCell<SimulatedVs1002>,
}

impl<'a> MockChipSelect<'a> {
    /// Connect to a chip.
    pub fn new(chip: &'a RefCell<SimulatedVs1002>) -> Self {
        Self { chip }
    }
}

impl embedded_hal::digital::ErrorType for MockChipSelect<'_> {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for MockChipSelect<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.chip.borrow_mut().set_chip_select(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.chip.borrow_mut().set_chip_select(true);
        Ok(())
    }
}
