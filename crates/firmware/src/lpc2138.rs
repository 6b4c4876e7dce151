//! LPC2138 register map and volatile register blocks.
//!
//! Addresses are from UM10120 (LPC213x user manual). The constants compile on
//! every target so host tests and the xtask can reference them; the register
//! blocks that dereference them only exist with `feature = "hardware"`.
//!
//! | Block | Base | Registers used |
//! |-------|------|----------------|
//! | SPI0  | `0xE002_0000` | S0SPCR, S0SPSR, S0SPDR, S0SPCCR |
//! | GPIO0 | `0xE002_8000` | IOSET0, IODIR0, IOCLR0 |
//! | PINSEL | `0xE002_C000` | PINSEL0 |
//! | SCB   | `0xE01F_C000` | MAMCR, MAMTIM, PLLCON, PLLCFG, PLLSTAT, PLLFEED, VPBDIV |

/// SPI0 control register.
pub const S0SPCR: usize = 0xE002_0000;
/// SPI0 status register (SPIF is cleared by reading this then S0SPDR).
pub const S0SPSR: usize = 0xE002_0004;
/// SPI0 data register.
pub const S0SPDR: usize = 0xE002_0008;
/// SPI0 clock counter register.
pub const S0SPCCR: usize = 0xE002_000C;

/// GPIO port 0 output set register.
pub const IOSET0: usize = 0xE002_8004;
/// GPIO port 0 direction register.
pub const IODIR0: usize = 0xE002_8008;
/// GPIO port 0 output clear register.
pub const IOCLR0: usize = 0xE002_800C;

/// Pin function select register 0 (P0.0 to P0.15).
pub const PINSEL0: usize = 0xE002_C000;

/// Memory accelerator mode.
pub const MAMCR: usize = 0xE01F_C000;
/// Memory accelerator flash fetch timing.
pub const MAMTIM: usize = 0xE01F_C004;
/// PLL control.
pub const PLLCON: usize = 0xE01F_C080;
/// PLL configuration (MSEL, PSEL).
pub const PLLCFG: usize = 0xE01F_C084;
/// PLL status (read only).
pub const PLLSTAT: usize = 0xE01F_C088;
/// PLL feed.
pub const PLLFEED: usize = 0xE01F_C08C;
/// VPB (peripheral bus) divider.
pub const VPBDIV: usize = 0xE01F_C100;

#[cfg(feature = "hardware")]
pub use mmio::{ChipSelectPin, Lpc2138, PinConnectBlock, Spi0, SystemControlBlock};

#[cfg(feature = "hardware")]
#[allow(unsafe_code)]
mod mmio {
    use core::cell::Cell;
    use core::convert::Infallible;
    use core::ptr;

    use critical_section::Mutex;
    use embedded_hal::digital::{ErrorType, OutputPin};
    use platform::registers::{
        MamMode, PinConnect, PllControl, PllStatus, SpiRegisters, SpiStatus, SystemControl,
        VpbDivider,
    };

    use super::{
        IOCLR0, IODIR0, IOSET0, MAMCR, MAMTIM, PINSEL0, PLLCFG, PLLCON, PLLFEED, PLLSTAT,
        S0SPCCR, S0SPCR, S0SPDR, S0SPSR, VPBDIV,
    };

    static TAKEN: Mutex<Cell<bool>> = Mutex::new(Cell::new(false));

    fn write_u8(address: usize, value: u8) {
        // SAFETY: callers pass one of the register addresses above, all of
        // which are valid, aligned and writable on the LPC2138 VPB/APB.
        unsafe { ptr::write_volatile(address as *mut u8, value) }
    }

    fn read_u8(address: usize) -> u8 {
        // SAFETY: as for `write_u8`; reads have no side effects beyond the
        // documented SPIF clearing sequence.
        unsafe { ptr::read_volatile(address as *const u8) }
    }

    fn write_u32(address: usize, value: u32) {
        // SAFETY: as for `write_u8`; GPIO and PINSEL registers are 32 bits wide.
        unsafe { ptr::write_volatile(address as *mut u32, value) }
    }

    fn read_u32(address: usize) -> u32 {
        // SAFETY: as for `read_u8`.
        unsafe { ptr::read_volatile(address as *const u32) }
    }

    fn read_u16(address: usize) -> u16 {
        // SAFETY: PLLSTAT is a 16-bit read-only register.
        unsafe { ptr::read_volatile(address as *const u16) }
    }

    /// Singleton handle to the peripherals the sine test uses.
    pub struct Lpc2138 {
        /// PLL, MAM and VPB divider.
        pub scb: SystemControlBlock,
        /// Pin function select.
        pub pins: PinConnectBlock,
        /// SPI0.
        pub spi0: Spi0,
        /// Port 0 output driving VS1002 xCS.
        pub chip_select: ChipSelectPin,
    }

    impl Lpc2138 {
        /// Hand out the register blocks once; later calls return `None`.
        pub fn take() -> Option<Self> {
            critical_section::with(|cs| {
                let taken = TAKEN.borrow(cs);
                if taken.get() {
                    return None;
                }
                taken.set(true);
                Some(Self {
                    scb: SystemControlBlock { _private: () },
                    pins: PinConnectBlock { _private: () },
                    spi0: Spi0 { _private: () },
                    chip_select: ChipSelectPin::new(platform::config::CHIP_SELECT_PIN),
                })
            })
        }
    }

    /// System control block registers.
    pub struct SystemControlBlock {
        _private: (),
    }

    impl SystemControl for SystemControlBlock {
        fn write_pll_config(&mut self, value: u8) {
            write_u8(PLLCFG, value);
        }

        fn write_pll_control(&mut self, control: PllControl) {
            write_u8(PLLCON, control.bits());
        }

        fn write_pll_feed(&mut self, value: u8) {
            write_u8(PLLFEED, value);
        }

        fn pll_status(&mut self) -> PllStatus {
            PllStatus::from_bits(read_u16(PLLSTAT))
        }

        fn write_mam_control(&mut self, mode: MamMode) {
            write_u8(MAMCR, mode as u8);
        }

        fn write_mam_timing(&mut self, cycles: u8) {
            write_u8(MAMTIM, cycles);
        }

        fn write_vpb_divider(&mut self, divider: VpbDivider) {
            write_u8(VPBDIV, divider as u8);
        }
    }

    /// Pin connect block.
    pub struct PinConnectBlock {
        _private: (),
    }

    impl PinConnect for PinConnectBlock {
        fn write_pinsel0(&mut self, value: u32) {
            write_u32(PINSEL0, value);
        }

        fn make_output(&mut self, pin: u8) {
            let mask = 1u32.checked_shl(u32::from(pin)).unwrap_or(0);
            write_u32(IODIR0, read_u32(IODIR0) | mask);
        }
    }

    /// SPI0 registers.
    pub struct Spi0 {
        _private: (),
    }

    impl SpiRegisters for Spi0 {
        fn write_control(&mut self, value: u8) {
            write_u8(S0SPCR, value);
        }

        fn write_clock_counter(&mut self, value: u8) {
            write_u8(S0SPCCR, value);
        }

        fn status(&mut self) -> SpiStatus {
            SpiStatus::from_bits(read_u8(S0SPSR))
        }

        fn write_data(&mut self, byte: u8) {
            write_u8(S0SPDR, byte);
        }

        fn read_data(&mut self) -> u8 {
            read_u8(S0SPDR)
        }
    }

    /// A port 0 output pin.
    ///
    /// IOSET0/IOCLR0 only affect the bits written as 1, so no
    /// read-modify-write is needed for the level. The direction is set
    /// through [`PinConnect::make_output`] during bus configuration.
    pub struct ChipSelectPin {
        mask: u32,
    }

    impl ChipSelectPin {
        fn new(pin: u8) -> Self {
            Self {
                mask: 1u32.checked_shl(u32::from(pin)).unwrap_or(0),
            }
        }
    }

    impl ErrorType for ChipSelectPin {
        type Error = Infallible;
    }

    impl OutputPin for ChipSelectPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            write_u32(IOCLR0, self.mask);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            write_u32(IOSET0, self.mask);
            Ok(())
        }
    }
}
