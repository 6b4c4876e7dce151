//! Boot sequence for the VS1002 sine test.
//!
//! Initialization order (must be respected):
//!   1. Clocks: PLL to 58.9824 MHz, MAM fully on, PCLK = CCLK
//!   2. SPI0: pins routed, divider and control programmed, xCS output high
//!   3. VS1002: `SCI_MODE = SM_SDINEW | SM_SDISHARE | SM_TESTS`
//!   4. VS1002: sine-test start sequence over SDI
//!
//! Every step is generic over the register traits in [`platform::registers`]
//! so the same code runs against the LPC2138 and the simulated peripherals
//! in `platform::mocks`.

use embedded_hal::digital::OutputPin;

use platform::clock_config::{ClockPlan, ClockPlanError};
use platform::clock_sequencer::{self, ClockError};
use platform::config::{
    CHIP_SELECT_PIN, CRYSTAL_HZ, SCI_MODE_VALUE, SINE_TEST_TONE, SPI_CLOCK_DIVIDER,
    TARGET_CCLK_HZ,
};
use platform::peripheral::{SpiBusConfig, SpiConfigError, SPI0_PINSEL0};
use platform::poll::PollBudget;
use platform::registers::{PinConnect, SpiRegisters, SystemControl};

use crate::decoder::vs1002::{LinkError, Vs1002};
use crate::spi::{PolledSpi, SpiError};

/// Ordered list of boot sequence steps for documentation and testing.
///
/// # Correctness Invariants
///
/// - The PLL must be locked and connected before SPI0 is configured: the SCK
///   rate is derived from PCLK, which only reaches its final value once the
///   VPB divider is written at the end of the clock sequence.
/// - xCS must be an output driven high before the first SCI frame, otherwise
///   the chip sees a select edge in the middle of the first byte.
/// - `SM_SDISHARE` and `SM_TESTS` must be set before the SDI sine-test
///   sequence; without them the bytes are ignored.
pub const BOOT_SEQUENCE_STEPS: &[&str] = &[
    "1. Clocks: PLLCFG+feed, PLLE+feed, wait PLOCK, PLLE|PLLC+feed, MAMTIM, MAMCR, VPBDIV",
    "2. SPI0: PINSEL0=0x1500, S0SPCCR, S0SPCR=master, P0.7 output high",
    "3. VS1002: SCI_MODE = SM_SDINEW | SM_SDISHARE | SM_TESTS",
    "4. VS1002: sine-test start sequence over SDI",
];

/// Boot failure.
///
/// `PinE` is the chip-select pin's error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootError<PinE> {
    /// The board crystal and target cannot be met by the PLL.
    Plan(ClockPlanError),
    /// The PLL did not lock.
    Clock(ClockError),
    /// The SPI divider in the board configuration is invalid.
    SpiConfig(SpiConfigError),
    /// A VS1002 transfer or chip-select change failed.
    Link(LinkError<SpiError, PinE>),
}

impl<PinE> From<ClockPlanError> for BootError<PinE> {
    fn from(e: ClockPlanError) -> Self {
        Self::Plan(e)
    }
}

impl<PinE> From<ClockError> for BootError<PinE> {
    fn from(e: ClockError) -> Self {
        Self::Clock(e)
    }
}

impl<PinE> From<SpiConfigError> for BootError<PinE> {
    fn from(e: SpiConfigError) -> Self {
        Self::SpiConfig(e)
    }
}

impl<PinE> From<LinkError<SpiError, PinE>> for BootError<PinE> {
    fn from(e: LinkError<SpiError, PinE>) -> Self {
        Self::Link(e)
    }
}

impl<PinE: core::fmt::Debug> core::fmt::Display for BootError<PinE> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Plan(e) => write!(f, "clock plan rejected: {e}"),
            Self::Clock(e) => write!(f, "clock bring-up failed: {e}"),
            Self::SpiConfig(e) => write!(f, "SPI0 configuration rejected: {e}"),
            Self::Link(e) => write!(f, "{e}"),
        }
    }
}

#[cfg(feature = "std")]
impl<PinE: core::fmt::Debug> std::error::Error for BootError<PinE> {}

/// The PLL plan for this board.
pub fn board_clock_plan() -> Result<ClockPlan, ClockPlanError> {
    ClockPlan::new(CRYSTAL_HZ, TARGET_CCLK_HZ)
}

/// Step 1: run the clock sequencer with the board plan.
pub fn bring_up_clocks<S, PinE>(
    scb: &mut S,
    budget: PollBudget,
) -> Result<ClockPlan, BootError<PinE>>
where
    S: SystemControl,
{
    let plan = board_clock_plan()?;
    let plan = clock_sequencer::bring_up(scb, plan, budget)?;
    #[cfg(feature = "defmt")]
    defmt::info!(
        "cclk {=u32} Hz (M={=u8} P={=u8}, Fcco {=u32} Hz)",
        plan.cclk_hz(),
        plan.multiplier(),
        plan.divider(),
        plan.cco_hz()
    );
    #[cfg(feature = "simulator")]
    tracing::info!(
        cclk_hz = plan.cclk_hz(),
        multiplier = plan.multiplier(),
        divider = plan.divider(),
        cco_hz = plan.cco_hz(),
        "clocks running"
    );
    Ok(plan)
}

/// Step 2: route SPI0 to its pins, program it, and park xCS high.
pub fn configure_spi_bus<P, R, CS>(
    pins: &mut P,
    spi_regs: R,
    cs: &mut CS,
    budget: PollBudget,
) -> Result<PolledSpi<R>, BootError<CS::Error>>
where
    P: PinConnect,
    R: SpiRegisters,
    CS: OutputPin,
{
    let config = SpiBusConfig::new(SPI_CLOCK_DIVIDER)?;
    pins.write_pinsel0(SPI0_PINSEL0);
    let spi = PolledSpi::new(spi_regs, &config, budget);
    pins.make_output(CHIP_SELECT_PIN);
    cs.set_high()
        .map_err(|e| BootError::Link(LinkError::ChipSelect(e)))?;
    #[cfg(feature = "defmt")]
    defmt::debug!("SPI0 master, S0SPCCR={=u8}", config.clock_divider());
    #[cfg(feature = "simulator")]
    tracing::debug!(divider = config.clock_divider(), "SPI0 master");
    Ok(spi)
}

/// Run every boot step and return the driver with the tone playing.
pub fn run<S, P, R, CS>(
    scb: &mut S,
    pins: &mut P,
    spi_regs: R,
    mut cs: CS,
    budget: PollBudget,
) -> Result<Vs1002<PolledSpi<R>, CS>, BootError<CS::Error>>
where
    S: SystemControl,
    P: PinConnect,
    R: SpiRegisters,
    CS: OutputPin,
{
    bring_up_clocks::<S, CS::Error>(scb, budget)?;
    let spi = configure_spi_bus(pins, spi_regs, &mut cs, budget)?;

    let mut decoder = Vs1002::new(spi, cs);
    decoder.set_mode(SCI_MODE_VALUE)?;
    decoder.start_sine_test(SINE_TEST_TONE)?;
    Ok(decoder)
}
