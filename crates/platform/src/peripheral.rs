//! SPI0 bus configuration
//!
//! Translates a mode / bit order / clock divider into the `S0SPCR` and
//! `S0SPCCR` values (UM10120 §12.4), and names the `PINSEL0` value that routes
//! SCK0, MISO0 and MOSI0 to P0.4–P0.6.

/// `PINSEL0` value selecting SCK0 (P0.4), MISO0 (P0.5) and MOSI0 (P0.6).
///
/// Each pin takes a 2-bit field; `01` selects the SPI0 function. P0.7 is
/// left as GPIO for chip select.
pub const SPI0_PINSEL0: u32 = 0x0000_1500;

/// Smallest clock-counter value SPI0 accepts in master mode.
pub const MIN_CLOCK_DIVIDER: u8 = 8;

const SPCR_CPHA: u8 = 1 << 3;
const SPCR_CPOL: u8 = 1 << 4;
const SPCR_MSTR: u8 = 1 << 5;
const SPCR_LSBF: u8 = 1 << 6;

/// SPI modes (CPOL, CPHA)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiMode {
    /// Mode 0: CPOL=0, CPHA=0
    #[default]
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

/// Bit order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    /// Most significant bit first
    #[default]
    MsbFirst,
    /// Least significant bit first
    LsbFirst,
}

/// Rejected SPI clock divider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiConfigError {
    /// Below the master-mode minimum of 8.
    DividerTooSmall(u8),
    /// Odd dividers are not supported by the clock counter.
    DividerOdd(u8),
}

#[cfg(feature = "std")]
impl std::error::Error for SpiConfigError {}

impl core::fmt::Display for SpiConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DividerTooSmall(d) => write!(f, "SPI clock divider {d} is below 8"),
            Self::DividerOdd(d) => write!(f, "SPI clock divider {d} is odd"),
        }
    }
}

/// SPI0 master configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiBusConfig {
    clock_divider: u8,
    /// SPI mode (CPOL, CPHA)
    pub mode: SpiMode,
    /// Bit order
    pub bit_order: BitOrder,
}

impl SpiBusConfig {
    /// Mode 0, MSB first, SCK = PCLK / `clock_divider`.
    ///
    /// # Errors
    ///
    /// The divider must be even and at least 8.
    pub const fn new(clock_divider: u8) -> Result<Self, SpiConfigError> {
        if clock_divider < MIN_CLOCK_DIVIDER {
            return Err(SpiConfigError::DividerTooSmall(clock_divider));
        }
        if clock_divider % 2 != 0 {
            return Err(SpiConfigError::DividerOdd(clock_divider));
        }
        Ok(Self {
            clock_divider,
            mode: SpiMode::Mode0,
            bit_order: BitOrder::MsbFirst,
        })
    }

    /// Replace the SPI mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: SpiMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replace the bit order.
    #[must_use]
    pub const fn with_bit_order(mut self, bit_order: BitOrder) -> Self {
        self.bit_order = bit_order;
        self
    }

    /// Value for `S0SPCCR`.
    pub const fn clock_divider(&self) -> u8 {
        self.clock_divider
    }

    /// Value for `S0SPCR`: master mode, SPIE off.
    pub const fn control_register(&self) -> u8 {
        let mut spcr = SPCR_MSTR;
        match self.mode {
            SpiMode::Mode0 => {}
            SpiMode::Mode1 => spcr |= SPCR_CPHA,
            SpiMode::Mode2 => spcr |= SPCR_CPOL,
            SpiMode::Mode3 => spcr |= SPCR_CPOL | SPCR_CPHA,
        }
        if let BitOrder::LsbFirst = self.bit_order {
            spcr |= SPCR_LSBF;
        }
        spcr
    }

    /// Resulting SCK frequency for a given peripheral clock.
    pub const fn sck_hz(&self, pclk_hz: u32) -> u32 {
        // clock_divider >= 8 by construction
        pclk_hz / self.clock_divider as u32
    }
}
