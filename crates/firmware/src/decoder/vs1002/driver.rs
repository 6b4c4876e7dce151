//! VS1002 serial link: SCI register access and SDI command stream.
//!
//! # Wiring (LPC2138)
//!
//! | Signal | LPC2138 pin | Direction |
//! |--------|-------------|-----------|
//! | SCLK   | P0.4 (SCK0)  | Host → VS1002 |
//! | SO     | P0.5 (MISO0) | VS1002 → Host |
//! | SI     | P0.6 (MOSI0) | Host → VS1002 |
//! | xCS    | P0.7 (GPIO)  | Host → VS1002 |
//!
//! xDCS is not wired separately: with `SM_SDISHARE` set the chip derives
//! xDCS as the inverse of xCS. P0.7 low therefore selects SCI and P0.7 high
//! selects SDI.
//!
//! # Framing
//!
//! Chip select is set before the first byte is queued and released only
//! after [`SpiBus::flush`] returns, i.e. after the completion of the last
//! byte has been observed. The release also happens when the bus fails, so
//! a failed frame never leaves the chip selected for SCI.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use platform::vs1002::{
    sci_read_header, sci_write_frame, SciMode, SineTone, SCI_MODE, SINE_TEST_END,
};

/// Link failure: the SPI bus or the chip-select pin reported an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<SpiE, PinE> {
    /// SPI transfer failed.
    Bus(SpiE),
    /// Chip-select pin could not be driven.
    ChipSelect(PinE),
}

#[allow(clippy::use_debug)]
impl<SpiE, PinE> core::fmt::Display for LinkError<SpiE, PinE>
where
    SpiE: core::fmt::Debug,
    PinE: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "VS1002 SPI transfer failed: {e:?}"),
            Self::ChipSelect(e) => write!(f, "VS1002 chip select failed: {e:?}"),
        }
    }
}

#[cfg(feature = "std")]
impl<SpiE: core::fmt::Debug, PinE: core::fmt::Debug> std::error::Error for LinkError<SpiE, PinE> {}

/// Which side of the shared chip select a frame addresses.
#[derive(Clone, Copy)]
enum Frame {
    /// xCS active (pin low).
    Sci,
    /// xDCS active (pin high).
    Sdi,
}

/// VS1002 driver over an exclusively owned SPI bus and chip-select pin.
pub struct Vs1002<SPI, CS> {
    spi: SPI,
    cs: CS,
}

type LinkResult<T, SPI, CS> = core::result::Result<
    T,
    LinkError<
        <SPI as embedded_hal::spi::ErrorType>::Error,
        <CS as embedded_hal::digital::ErrorType>::Error,
    >,
>;

impl<SPI, CS> Vs1002<SPI, CS>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
{
    /// Take ownership of the bus and chip select.
    ///
    /// The pin level is not touched; drive it to its idle (high) level
    /// during bus configuration.
    pub fn new(spi: SPI, cs: CS) -> Self {
        Self { spi, cs }
    }

    /// Read a 16-bit SCI register.
    ///
    /// Wire: `0x03, address, 0x00 → hi, 0x00 → lo` with P0.7 low.
    pub fn read_register(&mut self, address: u8) -> LinkResult<u16, SPI, CS> {
        let value = self.framed(Frame::Sci, |spi| {
            spi.write(&sci_read_header(address))?;
            let mut value = [0u8; 2];
            spi.read(&mut value)?;
            Ok(u16::from_be_bytes(value))
        })?;
        #[cfg(feature = "defmt")]
        defmt::trace!("SCI read  {=u8:#x} -> {=u16:#x}", address, value);
        #[cfg(feature = "simulator")]
        tracing::trace!(address, value, "SCI read");
        Ok(value)
    }

    /// Write a 16-bit SCI register.
    ///
    /// Wire: `0x02, address, hi, lo` with P0.7 low.
    pub fn write_register(&mut self, address: u8, value: u16) -> LinkResult<(), SPI, CS> {
        self.framed(Frame::Sci, |spi| spi.write(&sci_write_frame(address, value)))?;
        #[cfg(feature = "defmt")]
        defmt::trace!("SCI write {=u8:#x} <- {=u16:#x}", address, value);
        #[cfg(feature = "simulator")]
        tracing::trace!(address, value, "SCI write");
        Ok(())
    }

    /// Stream eight raw bytes over SDI with P0.7 high.
    ///
    /// The pin is driven low again after the last byte, which leaves xCS
    /// selected. Only meaningful once `SM_SDISHARE` is set.
    pub fn send_command_sequence(&mut self, bytes: &[u8; 8]) -> LinkResult<(), SPI, CS> {
        self.framed(Frame::Sdi, |spi| spi.write(bytes))?;
        #[cfg(feature = "simulator")]
        tracing::trace!(?bytes, "SDI command");
        Ok(())
    }

    /// Write `SCI_MODE`.
    pub fn set_mode(&mut self, mode: SciMode) -> LinkResult<(), SPI, CS> {
        self.write_register(SCI_MODE, mode.bits())
    }

    /// Read `SCI_MODE`.
    pub fn mode(&mut self) -> LinkResult<SciMode, SPI, CS> {
        self.read_register(SCI_MODE).map(SciMode::from_bits)
    }

    /// Start the built-in sine test. Needs `SM_TESTS` and `SM_SDISHARE`.
    pub fn start_sine_test(&mut self, tone: SineTone) -> LinkResult<(), SPI, CS> {
        #[cfg(feature = "defmt")]
        defmt::info!("sine test: pitch {=u8} ({=u32} Hz)", tone.pitch(), tone.frequency_hz());
        #[cfg(feature = "simulator")]
        tracing::info!(pitch = tone.pitch(), hz = tone.frequency_hz(), "sine test start");
        self.send_command_sequence(&tone.start_sequence())
    }

    /// Leave the sine test.
    pub fn stop_sine_test(&mut self) -> LinkResult<(), SPI, CS> {
        #[cfg(feature = "simulator")]
        tracing::info!("sine test stop");
        self.send_command_sequence(&SINE_TEST_END)
    }

    /// Give the bus and pin back.
    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }

    fn framed<T>(
        &mut self,
        frame: Frame,
        body: impl FnOnce(&mut SPI) -> core::result::Result<T, SPI::Error>,
    ) -> LinkResult<T, SPI, CS> {
        let selected = match frame {
            Frame::Sci => self.cs.set_low(),
            Frame::Sdi => self.cs.set_high(),
        };
        selected.map_err(LinkError::ChipSelect)?;

        let outcome = body(&mut self.spi).and_then(|value| {
            self.spi.flush()?;
            Ok(value)
        });

        let released = match frame {
            Frame::Sci => self.cs.set_high(),
            Frame::Sdi => self.cs.set_low(),
        };

        let value = outcome.map_err(LinkError::Bus)?;
        released.map_err(LinkError::ChipSelect)?;
        Ok(value)
    }
}
