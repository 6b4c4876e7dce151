//! Typed access to the LPC2138 registers used by the firmware.
//!
//! The firmware never dereferences a raw peripheral address outside the
//! `firmware::lpc2138` module. Everything above that layer talks to the
//! hardware through the traits in this module, which lets the same clock and
//! bus code run against the simulated peripherals in [`crate::mocks`].
//!
//! # Sources
//!
//! - UM10120 (LPC2131/2/4/6/8 User Manual) rev. 4, chapter 3 (system
//!   control block), chapter 4 (MAM), chapter 7 (pin connect block),
//!   chapter 12 (SPI0).

// ── SPI0 ─────────────────────────────────────────────────────────────────────

/// Snapshot of the SPI0 status register (`S0SPSR`, UM10120 §12.4.2).
///
/// Reading `S0SPSR` followed by an access of `S0SPDR` clears SPIF, so a
/// snapshot is taken once per poll and inspected afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct SpiStatus(u8);

impl SpiStatus {
    /// Slave abort (ABRT, bit 3).
    pub const ABRT: u8 = 1 << 3;
    /// Mode fault (MODF, bit 4).
    pub const MODF: u8 = 1 << 4;
    /// Read overrun (ROVR, bit 5).
    pub const ROVR: u8 = 1 << 5;
    /// Write collision (WCOL, bit 6).
    pub const WCOL: u8 = 1 << 6;
    /// Transfer complete (SPIF, bit 7).
    pub const SPIF: u8 = 1 << 7;

    /// Wrap a raw `S0SPSR` value.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw register value.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// SPIF: the last queued byte has been fully shifted out and in.
    pub const fn transfer_complete(self) -> bool {
        self.0 & Self::SPIF != 0
    }

    /// WCOL: the data register was written while a transfer was in progress.
    pub const fn write_collision(self) -> bool {
        self.0 & Self::WCOL != 0
    }

    /// MODF: SSEL was driven low while the port was configured as master.
    pub const fn mode_fault(self) -> bool {
        self.0 & Self::MODF != 0
    }

    /// ROVR: a byte arrived before the previous one was read.
    pub const fn read_overrun(self) -> bool {
        self.0 & Self::ROVR != 0
    }

    /// ABRT: slave abort (slave mode only).
    pub const fn slave_abort(self) -> bool {
        self.0 & Self::ABRT != 0
    }
}

/// SPI0 register block: control, clock counter, status and data.
///
/// All accessors take `&mut self`: the register block is exclusively owned
/// by whoever drives the bus, and a status read has side effects on SPIF.
pub trait SpiRegisters {
    /// Write `S0SPCR` (control register).
    fn write_control(&mut self, value: u8);

    /// Write `S0SPCCR` (clock counter; SCK = PCLK / value).
    fn write_clock_counter(&mut self, value: u8);

    /// Read `S0SPSR`.
    fn status(&mut self) -> SpiStatus;

    /// Write `S0SPDR`, starting a transfer in master mode.
    fn write_data(&mut self, byte: u8);

    /// Read `S0SPDR`: the byte clocked in by the last transfer.
    fn read_data(&mut self) -> u8;
}

// ── Pin connect block ────────────────────────────────────────────────────────

/// Pin function select (`PINSEL0`, UM10120 §7.4.1) and port 0 direction
/// (`IODIR0`, UM10120 §8.4.2).
pub trait PinConnect {
    /// Write `PINSEL0` (functions of P0.0 through P0.15).
    fn write_pinsel0(&mut self, value: u32);

    /// Set the `IODIR0` bit for `pin`, leaving the other pins' directions
    /// unchanged.
    fn make_output(&mut self, pin: u8);
}

// ── System control block ─────────────────────────────────────────────────────

/// Snapshot of `PLLSTAT` (UM10120 §3.7.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct PllStatus(u16);

impl PllStatus {
    /// Read-back of the PLLE control bit (bit 8).
    pub const PLLE: u16 = 1 << 8;
    /// Read-back of the PLLC control bit (bit 9).
    pub const PLLC: u16 = 1 << 9;
    /// Lock status (PLOCK, bit 10).
    pub const PLOCK: u16 = 1 << 10;

    /// Wrap a raw `PLLSTAT` value.
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Raw register value.
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// PLOCK: the PLL is locked onto the requested frequency.
    pub const fn locked(self) -> bool {
        self.0 & Self::PLOCK != 0
    }

    /// The committed PLLE bit.
    pub const fn enabled(self) -> bool {
        self.0 & Self::PLLE != 0
    }

    /// The committed PLLC bit.
    pub const fn connected(self) -> bool {
        self.0 & Self::PLLC != 0
    }

    /// Committed MSEL field (bits 4:0).
    #[allow(clippy::cast_possible_truncation)] // masked to 5 bits
    pub const fn msel(self) -> u8 {
        (self.0 & 0x1F) as u8
    }

    /// Committed PSEL field (bits 6:5).
    #[allow(clippy::cast_possible_truncation)] // masked to 2 bits
    pub const fn psel(self) -> u8 {
        ((self.0 >> 5) & 0x03) as u8
    }
}

/// Value written to `PLLCON` (UM10120 §3.7.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct PllControl(u8);

impl PllControl {
    /// PLL off, CCLK taken from the oscillator.
    pub const DISABLED: Self = Self(0x00);
    /// PLLE: PLL running but not yet driving CCLK.
    pub const ENABLED: Self = Self(0x01);
    /// PLLE | PLLC: PLL drives CCLK. Only valid once PLOCK is set.
    pub const ENABLED_AND_CONNECTED: Self = Self(0x03);

    /// Raw register value.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// PLLE bit.
    pub const fn enable(self) -> bool {
        self.0 & 0x01 != 0
    }

    /// PLLC bit.
    pub const fn connect(self) -> bool {
        self.0 & 0x02 != 0
    }
}

/// Memory accelerator mode (`MAMCR`, UM10120 §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MamMode {
    /// MAM functions disabled.
    Disabled = 0,
    /// Partially enabled (sequential code fetches only).
    Partial = 1,
    /// Fully enabled.
    Full = 2,
}

/// VPB (peripheral bus) clock divider (`VPBDIV`, UM10120 §3.11).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum VpbDivider {
    /// PCLK = CCLK / 4 (reset value).
    Quarter = 0,
    /// PCLK = CCLK.
    Full = 1,
    /// PCLK = CCLK / 2.
    Half = 2,
}

impl VpbDivider {
    /// Peripheral clock for a given core clock.
    pub const fn pclk_hz(self, cclk_hz: u32) -> u32 {
        match self {
            Self::Quarter => cclk_hz / 4,
            Self::Full => cclk_hz,
            Self::Half => cclk_hz / 2,
        }
    }
}

/// The two-write feed sequence that commits pending `PLLCON`/`PLLCFG` values
/// (UM10120 §3.7.5). Any other write between them aborts the feed.
pub const PLL_FEED_SEQUENCE: [u8; 2] = [0xAA, 0x55];

/// System control block: PLL, memory accelerator and VPB divider.
pub trait SystemControl {
    /// Write `PLLCFG` (MSEL bits 4:0, PSEL bits 6:5). Takes effect on feed.
    fn write_pll_config(&mut self, value: u8);

    /// Write `PLLCON`. Takes effect on feed.
    fn write_pll_control(&mut self, value: PllControl);

    /// Write one byte of the feed sequence to `PLLFEED`.
    fn write_pll_feed(&mut self, value: u8);

    /// Read `PLLSTAT`.
    fn pll_status(&mut self) -> PllStatus;

    /// Write `MAMCR`.
    fn write_mam_control(&mut self, mode: MamMode);

    /// Write `MAMTIM` (flash fetch cycles, 1..=7).
    fn write_mam_timing(&mut self, cycles: u8);

    /// Write `VPBDIV`.
    fn write_vpb_divider(&mut self, divider: VpbDivider);
}
