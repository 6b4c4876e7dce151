//! Busy-wait on a hardware status bit.
//!
//! The LPC2138 code has two places where it must spin on a status flag:
//! SPIF after each SPI0 byte and PLOCK after enabling the PLL. Both go
//! through [`wait_for`] so the budget is chosen by the caller: production
//! code passes [`PollBudget::Unbounded`] and hangs if the hardware never
//! responds; tests and the simulator pass [`PollBudget::Polls`] and get a
//! [`Timeout`] instead.

/// How many times a status predicate may be evaluated before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollBudget {
    /// Spin until the predicate holds. Never returns [`Timeout`].
    #[default]
    Unbounded,
    /// Evaluate the predicate at most this many times.
    ///
    /// `Polls(0)` does not evaluate the predicate at all and times out
    /// immediately.
    Polls(u32),
}

impl PollBudget {
    /// Whether a poll count has used up this budget.
    pub const fn exhausted(self, polls: u32) -> bool {
        match self {
            Self::Unbounded => false,
            Self::Polls(limit) => polls >= limit,
        }
    }
}

/// The poll budget ran out before the predicate held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timeout {
    /// Number of times the predicate was evaluated.
    pub polls: u32,
}

#[cfg(feature = "std")]
impl std::error::Error for Timeout {}

impl core::fmt::Display for Timeout {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "status bit not set after {} polls", self.polls)
    }
}

/// Evaluate `ready` until it returns `true` or `budget` is exhausted.
///
/// Returns the number of evaluations it took (at least 1 on success).
///
/// # Errors
///
/// [`Timeout`] when the budget is [`PollBudget::Polls`] and every permitted
/// evaluation returned `false`.
pub fn wait_for<F>(mut ready: F, budget: PollBudget) -> Result<u32, Timeout>
where
    F: FnMut() -> bool,
{
    let mut polls: u32 = 0;
    loop {
        if budget.exhausted(polls) {
            return Err(Timeout { polls });
        }
        polls = polls.saturating_add(1);
        if ready() {
            return Ok(polls);
        }
        core::hint::spin_loop();
    }
}
