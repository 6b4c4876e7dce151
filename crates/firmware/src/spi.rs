//! Polled SPI0 master.
//!
//! Each byte is written to `S0SPDR`, then `S0SPSR` is polled until SPIF is
//! set, then `S0SPDR` is read back (which also clears SPIF). No byte is queued
//! before the previous one has completed, so once a transfer call returns the
//! bus is idle and [`SpiBus::flush`] has nothing left to wait for.
//!
//! Chip select is not handled here; the VS1002 link drives it directly because
//! its SDI framing uses the opposite polarity to SCI.

use embedded_hal::spi::{ErrorKind, ErrorType, SpiBus};
use platform::peripheral::SpiBusConfig;
use platform::poll::{wait_for, PollBudget};
use platform::registers::SpiRegisters;

/// Byte clocked out when the caller only wants to read.
pub const READ_FILL_BYTE: u8 = 0x00;

/// SPI0 transfer failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiError {
    /// SPIF was not set within the poll budget.
    Timeout {
        /// Status reads performed for the stalled byte.
        polls: u32,
    },
}

impl embedded_hal::spi::Error for SpiError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl core::fmt::Display for SpiError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Timeout { polls } => {
                write!(f, "SPI transfer did not complete after {polls} status reads")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SpiError {}

/// SPI0 in master mode, one byte at a time.
pub struct PolledSpi<R> {
    regs: R,
    budget: PollBudget,
}

impl<R: SpiRegisters> PolledSpi<R> {
    /// Program `S0SPCCR` and `S0SPCR` from `config` and take the registers.
    ///
    /// The pins must already be routed to SPI0 (`PINSEL0`).
    pub fn new(mut regs: R, config: &SpiBusConfig, budget: PollBudget) -> Self {
        regs.write_clock_counter(config.clock_divider());
        regs.write_control(config.control_register());
        Self { regs, budget }
    }

    /// Shift one byte out and return the byte shifted in.
    pub fn transfer_byte(&mut self, byte: u8) -> Result<u8, SpiError> {
        self.regs.write_data(byte);
        let regs = &mut self.regs;
        wait_for(|| regs.status().transfer_complete(), self.budget)
            .map_err(|t| SpiError::Timeout { polls: t.polls })?;
        Ok(self.regs.read_data())
    }

    /// Poll budget applied to every byte.
    pub fn budget(&self) -> PollBudget {
        self.budget
    }

    /// Give the registers back.
    pub fn release(self) -> R {
        self.regs
    }
}

impl<R> ErrorType for PolledSpi<R> {
    type Error = SpiError;
}

impl<R: SpiRegisters> SpiBus<u8> for PolledSpi<R> {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words.iter_mut() {
            *word = self.transfer_byte(READ_FILL_BYTE)?;
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        for &word in words {
            self.transfer_byte(word)?;
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        let len = read.len().max(write.len());
        for i in 0..len {
            let out = write.get(i).copied().unwrap_or(READ_FILL_BYTE);
            let got = self.transfer_byte(out)?;
            if let Some(slot) = read.get_mut(i) {
                *slot = got;
            }
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words.iter_mut() {
            *word = self.transfer_byte(*word)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        // Every byte was polled to completion before its call returned.
        Ok(())
    }
}
