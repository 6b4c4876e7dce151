//! Clock bring-up typestate machine.
//!
//! Enforces the LPC2138 PLL start-up ordering from UM10120 §3.7.11:
//!
//! ```text
//! [Reset] --configure()--> [Configured] --enable()--> [Enabled]
//!     --await_lock()--> [Locked] --connect()--> [Connected]
//!     --tune_memory()--> [Running]
//! ```
//!
//! Every write to `PLLCFG` or `PLLCON` is immediately followed by the
//! `0xAA, 0x55` feed sequence, and the feed is written nowhere else. Connecting
//! the PLL before PLOCK is set would clock the core from an unstable source,
//! so `connect()` only exists on `ClockSequencer<Locked>`.
//!
//! The MAM and VPB divider are separate register families and need no feed.
//! `MAMTIM` is written while the MAM is still off (reset state), then the MAM
//! is switched fully on; UM10120 §4.9 forbids changing the timing with the MAM
//! enabled.

use core::marker::PhantomData;

use crate::clock_config::ClockPlan;
use crate::poll::{wait_for, PollBudget};
use crate::registers::{MamMode, PllControl, SystemControl, VpbDivider, PLL_FEED_SEQUENCE};

// ── State types (zero-sized) ──────────────────────────────────────────────────

/// PLL off, core running from the oscillator.
pub struct Reset;

/// `PLLCFG` committed.
pub struct Configured;

/// PLLE committed; the PLL is acquiring lock.
pub struct Enabled;

/// PLOCK observed.
pub struct Locked;

/// PLLC committed; the core runs from the PLL.
pub struct Connected;

/// MAM timing and VPB divider set. Terminal state.
pub struct Running;

/// Ordered names of the clock bring-up steps.
pub const CLOCK_SEQUENCE_STEPS: &[&str] =
    &["configure", "enable", "await_lock", "connect", "tune_memory"];

/// Clock bring-up failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// PLOCK was not set within the poll budget.
    LockTimeout {
        /// `PLLSTAT` reads performed.
        polls: u32,
    },
}

#[cfg(feature = "std")]
impl std::error::Error for ClockError {}

impl core::fmt::Display for ClockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::LockTimeout { polls } => {
                write!(f, "PLL did not lock after {polls} PLLSTAT reads")
            }
        }
    }
}

// ── Sequencer ────────────────────────────────────────────────────────────────

/// Typestate machine for PLL / MAM / VPB bring-up.
///
/// The phantom type `State` encodes the current step. Only the next valid
/// transition is provided as a method, and each transition consumes the
/// sequencer, so a step can neither be skipped nor repeated.
pub struct ClockSequencer<'a, R: SystemControl, State> {
    scb: &'a mut R,
    plan: ClockPlan,
    _state: PhantomData<State>,
}

impl<'a, R: SystemControl, State> ClockSequencer<'a, R, State> {
    /// The plan being applied.
    pub fn plan(&self) -> &ClockPlan {
        &self.plan
    }

    fn into_state<Next>(self) -> ClockSequencer<'a, R, Next> {
        ClockSequencer {
            scb: self.scb,
            plan: self.plan,
            _state: PhantomData,
        }
    }

    fn feed(&mut self) {
        for byte in PLL_FEED_SEQUENCE {
            self.scb.write_pll_feed(byte);
        }
    }
}

impl<'a, R: SystemControl> ClockSequencer<'a, R, Reset> {
    /// Take the system control block for the duration of the bring-up.
    pub fn new(scb: &'a mut R, plan: ClockPlan) -> Self {
        Self {
            scb,
            plan,
            _state: PhantomData,
        }
    }

    /// Write `PLLCFG` and feed.
    #[must_use]
    pub fn configure(mut self) -> ClockSequencer<'a, R, Configured> {
        let pllcfg = self.plan.pllcfg();
        self.scb.write_pll_config(pllcfg);
        self.feed();
        #[cfg(feature = "defmt")]
        defmt::debug!("PLLCFG = {=u8:#x}", pllcfg);
        self.into_state()
    }
}

impl<'a, R: SystemControl> ClockSequencer<'a, R, Configured> {
    /// Write `PLLCON = PLLE` and feed.
    #[must_use]
    pub fn enable(mut self) -> ClockSequencer<'a, R, Enabled> {
        self.scb.write_pll_control(PllControl::ENABLED);
        self.feed();
        self.into_state()
    }
}

impl<'a, R: SystemControl> ClockSequencer<'a, R, Enabled> {
    /// Poll `PLLSTAT` until PLOCK is set.
    ///
    /// # Errors
    ///
    /// [`ClockError::LockTimeout`] if `budget` runs out first. With
    /// [`PollBudget::Unbounded`] this never returns an error.
    pub fn await_lock(
        mut self,
        budget: PollBudget,
    ) -> Result<ClockSequencer<'a, R, Locked>, ClockError> {
        let scb = &mut *self.scb;
        match wait_for(|| scb.pll_status().locked(), budget) {
            Ok(_polls) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("PLL locked after {=u32} polls", _polls);
                Ok(self.into_state())
            }
            Err(timeout) => {
                #[cfg(feature = "defmt")]
                defmt::error!("PLL lock timeout after {=u32} polls", timeout.polls);
                Err(ClockError::LockTimeout {
                    polls: timeout.polls,
                })
            }
        }
    }
}

impl<'a, R: SystemControl> ClockSequencer<'a, R, Locked> {
    /// Write `PLLCON = PLLE | PLLC` and feed.
    #[must_use]
    pub fn connect(mut self) -> ClockSequencer<'a, R, Connected> {
        self.scb.write_pll_control(PllControl::ENABLED_AND_CONNECTED);
        self.feed();
        self.into_state()
    }
}

impl<'a, R: SystemControl> ClockSequencer<'a, R, Connected> {
    /// Set the MAM fetch timing, enable the MAM fully and run the
    /// peripheral bus at CCLK.
    #[must_use]
    pub fn tune_memory(mut self) -> ClockSequencer<'a, R, Running> {
        self.scb.write_mam_timing(self.plan.mam_fetch_cycles());
        self.scb.write_mam_control(MamMode::Full);
        self.scb.write_vpb_divider(VpbDivider::Full);
        self.into_state()
    }
}

impl<R: SystemControl> ClockSequencer<'_, R, Running> {
    /// Core clock now in effect.
    pub fn cclk_hz(&self) -> u32 {
        self.plan.cclk_hz()
    }

    /// Peripheral clock now in effect (`VPBDIV = 1`).
    pub fn pclk_hz(&self) -> u32 {
        VpbDivider::Full.pclk_hz(self.plan.cclk_hz())
    }

    /// Consume the finished sequencer, releasing the register block.
    pub fn finish(self) -> ClockPlan {
        self.plan
    }
}

/// Run every step in order.
///
/// # Errors
///
/// [`ClockError::LockTimeout`] if PLOCK is not observed within `budget`.
pub fn bring_up<R: SystemControl>(
    scb: &mut R,
    plan: ClockPlan,
    budget: PollBudget,
) -> Result<ClockPlan, ClockError> {
    let running = ClockSequencer::new(scb, plan)
        .configure()
        .enable()
        .await_lock(budget)?
        .connect()
        .tune_memory();
    Ok(running.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::PllStatus;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Write {
        Cfg(u8),
        Con(u8),
        Feed(u8),
        Stat,
        MamCr(u8),
        MamTim(u8),
        Vpb(u8),
    }

    /// Records every access; PLOCK reads as set after `lock_after` reads.
    struct RecordingScb {
        log: std::vec::Vec<Write>,
        lock_after: Option<u32>,
        reads: u32,
    }

    impl RecordingScb {
        fn new(lock_after: Option<u32>) -> Self {
            Self {
                log: std::vec::Vec::new(),
                lock_after,
                reads: 0,
            }
        }
    }

    impl SystemControl for RecordingScb {
        fn write_pll_config(&mut self, value: u8) {
            self.log.push(Write::Cfg(value));
        }
        fn write_pll_control(&mut self, value: PllControl) {
            self.log.push(Write::Con(value.bits()));
        }
        fn write_pll_feed(&mut self, value: u8) {
            self.log.push(Write::Feed(value));
        }
        fn pll_status(&mut self) -> PllStatus {
            self.log.push(Write::Stat);
            self.reads += 1;
            match self.lock_after {
                Some(n) if self.reads >= n => PllStatus::from_bits(PllStatus::PLOCK),
                _ => PllStatus::from_bits(0),
            }
        }
        fn write_mam_control(&mut self, mode: MamMode) {
            self.log.push(Write::MamCr(mode as u8));
        }
        fn write_mam_timing(&mut self, cycles: u8) {
            self.log.push(Write::MamTim(cycles));
        }
        fn write_vpb_divider(&mut self, divider: VpbDivider) {
            self.log.push(Write::Vpb(divider as u8));
        }
    }

    fn board_plan() -> ClockPlan {
        ClockPlan::new(14_745_600, 53_236_800).unwrap()
    }

    #[test]
    fn full_sequence_register_trace() {
        let mut scb = RecordingScb::new(Some(2));
        bring_up(&mut scb, board_plan(), PollBudget::Polls(10)).unwrap();
        assert_eq!(
            scb.log,
            [
                Write::Cfg(0x23),
                Write::Feed(0xAA),
                Write::Feed(0x55),
                Write::Con(0x01),
                Write::Feed(0xAA),
                Write::Feed(0x55),
                Write::Stat,
                Write::Stat,
                Write::Con(0x03),
                Write::Feed(0xAA),
                Write::Feed(0x55),
                Write::MamTim(4),
                Write::MamCr(2),
                Write::Vpb(1),
            ]
        );
    }

    #[test]
    fn lock_timeout_stops_before_connect() {
        let mut scb = RecordingScb::new(None);
        let err = bring_up(&mut scb, board_plan(), PollBudget::Polls(5)).unwrap_err();
        assert_eq!(err, ClockError::LockTimeout { polls: 5 });
        assert!(!scb.log.contains(&Write::Con(0x03)));
        assert!(!scb.log.iter().any(|w| matches!(w, Write::MamCr(_))));
    }

    #[test]
    fn running_reports_clocks() {
        let mut scb = RecordingScb::new(Some(1));
        let running = ClockSequencer::new(&mut scb, board_plan())
            .configure()
            .enable()
            .await_lock(PollBudget::Unbounded)
            .unwrap()
            .connect()
            .tune_memory();
        assert_eq!(running.cclk_hz(), 58_982_400);
        assert_eq!(running.pclk_hz(), 58_982_400);
    }

    #[test]
    fn step_names_are_ordered() {
        assert_eq!(CLOCK_SEQUENCE_STEPS.len(), 5);
        assert_eq!(CLOCK_SEQUENCE_STEPS.first(), Some(&"configure"));
        assert_eq!(CLOCK_SEQUENCE_STEPS.last(), Some(&"tune_memory"));
    }
}
