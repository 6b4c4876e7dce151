//! Mock implementations for testing
//!
//! This module provides simulated LPC2138 register blocks and a simulated
//! VS1002 for use in unit and integration tests and by the desktop simulator.
//!
//! - [`MockSystemControl`]: PLL that only reports lock after an enable has
//!   been committed by a valid feed sequence.
//! - [`SimulatedVs1002`]: SCI register file and SDI command parser behind
//!   [`MockSpi`] (SPI0 registers) and [`MockChipSelect`] (P0.7).
//! - [`MockPinConnect`]: records `PINSEL0` and `IODIR0`.

#![cfg(any(test, feature = "std"))]

mod system_control;
mod vs1002;

pub use system_control::{MockSystemControl, ScbEvent};
pub use vs1002::{BusEvent, MockChipSelect, MockSpi, SimulatedVs1002};

use crate::registers::PinConnect;

/// Mock pin connect block
#[derive(Debug, Default)]
pub struct MockPinConnect {
    pinsel0: Option<u32>,
    iodir0: u32,
    writes: usize,
}

impl MockPinConnect {
    /// Create new mock pin connect block (nothing written yet)
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value written to `PINSEL0`
    pub fn pinsel0(&self) -> Option<u32> {
        self.pinsel0
    }

    /// Number of `PINSEL0` writes
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Current `IODIR0` (reset value 0, all inputs)
    pub fn iodir0(&self) -> u32 {
        self.iodir0
    }
}

impl PinConnect for MockPinConnect {
    fn write_pinsel0(&mut self, value: u32) {
        self.pinsel0 = Some(value);
        self.writes = self.writes.saturating_add(1);
    }

    fn make_output(&mut self, pin: u8) {
        self.iodir0 |= 1u32.checked_shl(u32::from(pin)).unwrap_or(0);
    }
}
