use crate::registers::{
    MamMode, PllControl, PllStatus, SystemControl, VpbDivider, PLL_FEED_SEQUENCE,
};

const EVENT_CAPACITY: usize = 64;

/// One access to the simulated system control block.
///
/// Consecutive `PLLSTAT` reads are folded into a single
/// [`ScbEvent::StatusReads`] entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScbEvent {
    /// `PLLCFG` write.
    PllConfig(u8),
    /// `PLLCON` write.
    PllControl(u8),
    /// `PLLFEED` write.
    Feed(u8),
    /// A run of `PLLSTAT` reads.
    StatusReads(u32),
    /// `MAMCR` write.
    MamControl(u8),
    /// `MAMTIM` write.
    MamTiming(u8),
    /// `VPBDIV` write.
    VpbDivider(u8),
}

/// Simulated PLL, MAM and VPB divider.
///
/// `PLLCFG` and `PLLCON` writes are latched and only take effect when
/// `0xAA` followed directly by `0x55` is written to `PLLFEED`. Any other
/// access between the two feed bytes aborts the feed. PLOCK asserts after a
/// configurable number of `PLLSTAT` reads counted from the moment PLLE is
/// committed, so lock can never be observed before the enable commit.
#[derive(Debug)]
pub struct MockSystemControl {
    pending_config: u8,
    pending_control: PllControl,
    config: u8,
    control: PllControl,
    feed_armed: bool,
    feeds: usize,
    aborted_feeds: usize,
    lock_after: Option<u32>,
    reads_since_enable: u32,
    mam_control: Option<MamMode>,
    mam_timing: Option<u8>,
    vpb_divider: VpbDivider,
    events: heapless::Vec<ScbEvent, EVENT_CAPACITY>,
    dropped_events: usize,
}

impl MockSystemControl {
    /// PLL that locks on the third status read after enable.
    pub fn new() -> Self {
        Self {
            pending_config: 0,
            pending_control: PllControl::DISABLED,
            config: 0,
            control: PllControl::DISABLED,
            feed_armed: false,
            feeds: 0,
            aborted_feeds: 0,
            lock_after: Some(3),
            reads_since_enable: 0,
            mam_control: None,
            mam_timing: None,
            vpb_divider: VpbDivider::Quarter,
            events: heapless::Vec::new(),
            dropped_events: 0,
        }
    }

    /// Lock on the `reads`-th status read after enable (0 and 1 both lock on
    /// the first read).
    #[must_use]
    pub fn lock_after(mut self, reads: u32) -> Self {
        self.lock_after = Some(reads);
        self
    }

    /// PLL that never locks.
    #[must_use]
    pub fn never_locks(mut self) -> Self {
        self.lock_after = None;
        self
    }

    /// Committed `PLLCFG`.
    pub fn committed_config(&self) -> u8 {
        self.config
    }

    /// Committed `PLLCON`.
    pub fn committed_control(&self) -> PllControl {
        self.control
    }

    /// Completed (valid) feed sequences.
    pub fn feed_count(&self) -> usize {
        self.feeds
    }

    /// Feed sequences interrupted by another access or a wrong byte.
    pub fn aborted_feed_count(&self) -> usize {
        self.aborted_feeds
    }

    /// Last `MAMCR` value written.
    pub fn mam_control(&self) -> Option<MamMode> {
        self.mam_control
    }

    /// Last `MAMTIM` value written.
    pub fn mam_timing(&self) -> Option<u8> {
        self.mam_timing
    }

    /// Current `VPBDIV`.
    pub fn vpb_divider(&self) -> VpbDivider {
        self.vpb_divider
    }

    /// Access log, oldest first.
    pub fn events(&self) -> &[ScbEvent] {
        &self.events
    }

    /// Accesses that did not fit in the log.
    pub fn dropped_events(&self) -> usize {
        self.dropped_events
    }

    /// Whether PLOCK would currently read as set.
    pub fn is_locked(&self) -> bool {
        self.control.enable()
            && self
                .lock_after
                .is_some_and(|n| self.reads_since_enable >= n.max(1))
    }

    /// Number of completed feeds that precede the first `PLLSTAT` read.
    pub fn feeds_before_first_status_read(&self) -> usize {
        let end = self
            .events
            .iter()
            .position(|e| matches!(e, ScbEvent::StatusReads(_)))
            .unwrap_or(self.events.len());
        self.events
            .get(..end)
            .unwrap_or_default()
            .windows(2)
            .filter(|w| matches!(w, [ScbEvent::Feed(0xAA), ScbEvent::Feed(0x55)]))
            .count()
    }

    /// Every `PLLCFG`/`PLLCON` write is immediately followed by `0xAA, 0x55`,
    /// and no feed byte appears anywhere else.
    pub fn feeds_only_follow_pll_writes(&self) -> bool {
        let events = self.events.as_slice();
        let mut i = 0usize;
        while let Some(event) = events.get(i) {
            match event {
                ScbEvent::PllConfig(_) | ScbEvent::PllControl(_) => {
                    let next = i.saturating_add(1);
                    let after = i.saturating_add(2);
                    if events.get(next) != Some(&ScbEvent::Feed(0xAA))
                        || events.get(after) != Some(&ScbEvent::Feed(0x55))
                    {
                        return false;
                    }
                    i = i.saturating_add(3);
                }
                ScbEvent::Feed(_) => return false,
                _ => i = i.saturating_add(1),
            }
        }
        true
    }

    fn record(&mut self, event: ScbEvent) {
        if let (ScbEvent::StatusReads(_), Some(ScbEvent::StatusReads(n))) =
            (event, self.events.last_mut())
        {
            *n = n.saturating_add(1);
            return;
        }
        if self.events.push(event).is_err() {
            self.dropped_events = self.dropped_events.saturating_add(1);
        }
    }

    fn interrupt_feed(&mut self) {
        if self.feed_armed {
            self.feed_armed = false;
            self.aborted_feeds = self.aborted_feeds.saturating_add(1);
        }
    }
}

impl Default for MockSystemControl {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemControl for MockSystemControl {
    fn write_pll_config(&mut self, value: u8) {
        self.interrupt_feed();
        self.record(ScbEvent::PllConfig(value));
        self.pending_config = value & 0x7F;
    }

    fn write_pll_control(&mut self, value: PllControl) {
        self.interrupt_feed();
        self.record(ScbEvent::PllControl(value.bits()));
        self.pending_control = value;
    }

    fn write_pll_feed(&mut self, value: u8) {
        self.record(ScbEvent::Feed(value));
        let [first, second] = PLL_FEED_SEQUENCE;
        if value == first {
            if self.feed_armed {
                self.aborted_feeds = self.aborted_feeds.saturating_add(1);
            }
            self.feed_armed = true;
        } else if value == second && self.feed_armed {
            self.feed_armed = false;
            self.feeds = self.feeds.saturating_add(1);
            let was_enabled = self.control.enable();
            self.config = self.pending_config;
            self.control = self.pending_control;
            if self.control.enable() && !was_enabled {
                self.reads_since_enable = 0;
            }
        } else {
            self.interrupt_feed();
        }
    }

    fn pll_status(&mut self) -> PllStatus {
        self.interrupt_feed();
        self.record(ScbEvent::StatusReads(1));
        if self.control.enable() {
            self.reads_since_enable = self.reads_since_enable.saturating_add(1);
        }
        let mut bits = u16::from(self.config);
        if self.control.enable() {
            bits |= PllStatus::PLLE;
        }
        if self.control.connect() {
            bits |= PllStatus::PLLC;
        }
        if self.is_locked() {
            bits |= PllStatus::PLOCK;
        }
        PllStatus::from_bits(bits)
    }

    fn write_mam_control(&mut self, mode: MamMode) {
        self.interrupt_feed();
        self.record(ScbEvent::MamControl(mode as u8));
        self.mam_control = Some(mode);
    }

    fn write_mam_timing(&mut self, cycles: u8) {
        self.interrupt_feed();
        self.record(ScbEvent::MamTiming(cycles));
        self.mam_timing = Some(cycles);
    }

    fn write_vpb_divider(&mut self, divider: VpbDivider) {
        self.interrupt_feed();
        self.record(ScbEvent::VpbDivider(divider as u8));
        self.vpb_divider = divider;
    }
}
