//! PLL and memory-accelerator configuration for the LPC2138.
//!
//! Derives the `PLLCFG` multiplier/divider pair and the `MAMTIM` fetch-cycle
//! count from the crystal frequency and the desired core clock.
//!
//! # Background
//!
//! The LPC2138 PLL multiplies the oscillator by `M` to produce CCLK. Internally
//! the current-controlled oscillator runs at `F_cco = CCLK * 2 * P`, and `P`
//! must be picked so that `F_cco` stays inside the 156–320 MHz band. Both
//! values are packed into `PLLCFG`:
//!
//! ```text
//!  bit   7    6  5    4  3  2  1  0
//!       [-] [ PSEL ] [     MSEL     ]
//!  MSEL = M - 1        (M = 1..=32)
//!  PSEL = log2(P)      (P = 1, 2, 4, 8)
//! ```
//!
//! `M` is rounded *up* so the resulting CCLK is never below the request. For
//! the 14.7456 MHz board crystal and a 53.2368 MHz request that gives `M = 4`,
//! CCLK = 58.9824 MHz, `P = 2` (`F_cco` = 235.9296 MHz), `PLLCFG = 0x23`.
//!
//! # Sources
//!
//! - UM10120 rev. 4 §3.7.10 (PLL frequency calculation), Table 22 (PSEL),
//!   Table 23 (MSEL)
//! - UM10120 §4.9 (MAM timing register)
//! - LPC2131/2/4/6/8 datasheet rev. 5, Table 6 (CCLK maximum 60 MHz)

/// Lower edge of the CCO operating band.
pub const CCO_MIN_HZ: u32 = 156_000_000;

/// Upper edge of the CCO operating band.
pub const CCO_MAX_HZ: u32 = 320_000_000;

/// Maximum core clock for the LPC2138.
pub const CCLK_MAX_HZ: u32 = 60_000_000;

/// Largest PLL multiplier representable in the 5-bit MSEL field.
pub const MULTIPLIER_MAX: u32 = 32;

/// Divider values selectable through PSEL, in PSEL order.
pub const DIVIDERS: [u32; 4] = [1, 2, 4, 8];

/// Core-clock span served by one flash fetch cycle.
///
/// `MAMTIM = ceil(CCLK / 15 MHz)` keeps the on-chip flash access inside its
/// timing with the board's 58.9824 MHz clock landing on 4 cycles.
pub const MAM_HZ_PER_FETCH_CYCLE: u32 = 15_000_000;

/// Largest value accepted by `MAMTIM`.
pub const MAM_FETCH_CYCLES_MAX: u8 = 7;

/// Reasons a clock plan cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockPlanError {
    /// Crystal frequency of zero.
    ZeroCrystal,
    /// `ceil(target / crystal)` is not in `1..=32`.
    MultiplierOutOfRange {
        /// The multiplier that would have been required.
        multiplier: u32,
    },
    /// The achievable CCLK exceeds the 60 MHz part maximum.
    CoreClockTooHigh {
        /// CCLK the multiplier would produce.
        cclk_hz: u64,
    },
    /// No divider puts `F_cco` inside 156–320 MHz.
    NoDividerInBand {
        /// CCLK the multiplier would produce.
        cclk_hz: u32,
    },
}

#[cfg(feature = "std")]
impl std::error::Error for ClockPlanError {}

impl core::fmt::Display for ClockPlanError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ZeroCrystal => write!(f, "crystal frequency is zero"),
            Self::MultiplierOutOfRange { multiplier } => {
                write!(f, "PLL multiplier {multiplier} outside 1..=32")
            }
            Self::CoreClockTooHigh { cclk_hz } => {
                write!(f, "core clock {cclk_hz} Hz exceeds the 60 MHz maximum")
            }
            Self::NoDividerInBand { cclk_hz } => {
                write!(f, "no PLL divider puts the CCO in band for {cclk_hz} Hz")
            }
        }
    }
}

/// A validated PLL + MAM configuration.
///
/// Invariants (checked once in [`ClockPlan::new`]):
/// - `1 <= multiplier <= 32`
/// - `divider` is one of 1, 2, 4, 8
/// - `156 MHz <= cclk * 2 * divider <= 320 MHz`
/// - `cclk <= 60 MHz`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockPlan {
    crystal_hz: u32,
    multiplier: u8,
    psel: u8,
    cclk_hz: u32,
    mam_fetch_cycles: u8,
}

impl ClockPlan {
    /// Derive the plan for `crystal_hz` and a desired CCLK of `target_hz`.
    ///
    /// # Errors
    ///
    /// See [`ClockPlanError`].
    pub fn new(crystal_hz: u32, target_hz: u32) -> Result<Self, ClockPlanError> {
        if crystal_hz == 0 {
            return Err(ClockPlanError::ZeroCrystal);
        }

        let multiplier = target_hz.div_ceil(crystal_hz);
        if multiplier == 0 || multiplier > MULTIPLIER_MAX {
            return Err(ClockPlanError::MultiplierOutOfRange { multiplier });
        }

        let cclk_wide = u64::from(crystal_hz).saturating_mul(u64::from(multiplier));
        let cclk_hz = match u32::try_from(cclk_wide) {
            Ok(hz) if hz <= CCLK_MAX_HZ => hz,
            _ => return Err(ClockPlanError::CoreClockTooHigh { cclk_hz: cclk_wide }),
        };

        let psel = DIVIDERS
            .iter()
            .position(|&p| {
                let cco = u64::from(cclk_hz).saturating_mul(2).saturating_mul(u64::from(p));
                (u64::from(CCO_MIN_HZ)..=u64::from(CCO_MAX_HZ)).contains(&cco)
            })
            .ok_or(ClockPlanError::NoDividerInBand { cclk_hz })?;

        #[allow(clippy::cast_possible_truncation)] // multiplier <= 32
        let multiplier = multiplier as u8;
        #[allow(clippy::cast_possible_truncation)] // index into a 4-entry table
        let psel = psel as u8;

        Ok(Self {
            crystal_hz,
            multiplier,
            psel,
            cclk_hz,
            mam_fetch_cycles: mam_fetch_cycles(cclk_hz),
        })
    }

    /// Oscillator frequency the plan was derived from.
    pub const fn crystal_hz(&self) -> u32 {
        self.crystal_hz
    }

    /// PLL multiplier `M`.
    pub const fn multiplier(&self) -> u8 {
        self.multiplier
    }

    /// PLL divider `P`.
    pub const fn divider(&self) -> u8 {
        1 << self.psel
    }

    /// MSEL field value (`M - 1`).
    pub const fn msel_field(&self) -> u8 {
        self.multiplier.saturating_sub(1)
    }

    /// PSEL field value (`log2 P`).
    pub const fn psel_field(&self) -> u8 {
        self.psel
    }

    /// The byte written to `PLLCFG`.
    pub const fn pllcfg(&self) -> u8 {
        (self.psel << 5) | self.msel_field()
    }

    /// Core clock once the PLL is connected.
    pub const fn cclk_hz(&self) -> u32 {
        self.cclk_hz
    }

    /// CCO frequency (`CCLK * 2 * P`).
    pub const fn cco_hz(&self) -> u32 {
        // Bounded by CCO_MAX_HZ at construction.
        self.cclk_hz.saturating_mul(2).saturating_mul(1 << self.psel)
    }

    /// Value for `MAMTIM`.
    pub const fn mam_fetch_cycles(&self) -> u8 {
        self.mam_fetch_cycles
    }
}

/// `ceil(cclk / 15 MHz)` clamped to `1..=7`.
pub const fn mam_fetch_cycles(cclk_hz: u32) -> u8 {
    let cycles = cclk_hz.div_ceil(MAM_HZ_PER_FETCH_CYCLE);
    if cycles == 0 {
        1
    } else if cycles > MAM_FETCH_CYCLES_MAX as u32 {
        MAM_FETCH_CYCLES_MAX
    } else {
        #[allow(clippy::cast_possible_truncation)] // <= 7
        let cycles = cycles as u8;
        cycles
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// The board configuration: 14.7456 MHz crystal, 53.2368 MHz requested.
    #[test]
    fn board_plan_matches_pllcfg_0x23() {
        let plan = ClockPlan::new(14_745_600, 53_236_800).unwrap();
        assert_eq!(plan.multiplier(), 4);
        assert_eq!(plan.msel_field(), 3);
        assert_eq!(plan.divider(), 2);
        assert_eq!(plan.psel_field(), 1);
        assert_eq!(plan.pllcfg(), 0x23);
        assert_eq!(plan.cclk_hz(), 58_982_400);
        assert_eq!(plan.cco_hz(), 235_929_600);
        assert_eq!(plan.mam_fetch_cycles(), 4);
    }

    #[test]
    fn exact_multiple_does_not_round_up() {
        let plan = ClockPlan::new(12_000_000, 60_000_000).unwrap();
        assert_eq!(plan.multiplier(), 5);
        assert_eq!(plan.cclk_hz(), 60_000_000);
        assert_eq!(plan.divider(), 2);
    }

    #[test]
    fn low_cclk_picks_larger_divider() {
        // 12 MHz * 1 → CCO needs P = 8 (192 MHz)
        let plan = ClockPlan::new(12_000_000, 12_000_000).unwrap();
        assert_eq!(plan.divider(), 8);
        assert_eq!(plan.pllcfg(), 0x60);
        assert_eq!(plan.mam_fetch_cycles(), 1);
    }

    #[test]
    fn zero_crystal_rejected() {
        assert_eq!(ClockPlan::new(0, 60_000_000), Err(ClockPlanError::ZeroCrystal));
    }

    #[test]
    fn zero_target_rejected() {
        assert_eq!(
            ClockPlan::new(12_000_000, 0),
            Err(ClockPlanError::MultiplierOutOfRange { multiplier: 0 })
        );
    }

    #[test]
    fn multiplier_above_32_rejected() {
        assert_eq!(
            ClockPlan::new(1_000_000, 33_000_000),
            Err(ClockPlanError::MultiplierOutOfRange { multiplier: 33 })
        );
    }

    #[test]
    fn cclk_above_part_maximum_rejected() {
        assert_eq!(
            ClockPlan::new(14_745_600, 60_000_000),
            Err(ClockPlanError::CoreClockTooHigh { cclk_hz: 73_728_000 })
        );
    }

    #[test]
    fn slow_cclk_has_no_divider_in_band() {
        assert_eq!(
            ClockPlan::new(5_000_000, 5_000_000),
            Err(ClockPlanError::NoDividerInBand { cclk_hz: 5_000_000 })
        );
    }

    #[test]
    fn mam_cycles_clamped() {
        assert_eq!(mam_fetch_cycles(0), 1);
        assert_eq!(mam_fetch_cycles(15_000_000), 1);
        assert_eq!(mam_fetch_cycles(15_000_001), 2);
        assert_eq!(mam_fetch_cycles(u32::MAX), 7);
    }
}
