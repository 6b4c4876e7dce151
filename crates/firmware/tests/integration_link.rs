//! Integration test: VS1002 link over the polled SPI0 bus against the
//! simulated chip.
//!
//! Tests that:
//!   1. SCI write then read returns the written value for every register
//!   2. SCI frames keep xCS low for the whole transfer, high byte first
//!   3. The sine-test start sequence goes out with P0.7 high and ends low
//!   4. No chip-select change or data write happens while a byte is shifting
//!   5. A bus that never completes surfaces a timeout and still deselects
//!
//! Run with: cargo test -p vs1002-firmware --test integration_link

// Integration test file -- intentional test patterns permitted.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
)]

use core::cell::RefCell;

use firmware::spi::READ_FILL_BYTE;
use firmware::{LinkError, PolledSpi, SpiError, Vs1002};
use platform::mocks::{BusEvent, MockChipSelect, MockSpi, SimulatedVs1002};
use platform::peripheral::SpiBusConfig;
use platform::poll::PollBudget;
use platform::vs1002::{
    SciMode, SineTone, SCI_MODE, SCI_READ, SCI_REGISTER_COUNT, SCI_WRITE,
};
use proptest::prelude::*;

type Link<'a> = Vs1002<PolledSpi<MockSpi<'a>>, MockChipSelect<'a>>;

fn link(chip: &RefCell<SimulatedVs1002>, budget: PollBudget) -> Link<'_> {
    let config = SpiBusConfig::new(32).unwrap();
    let spi = PolledSpi::new(MockSpi::new(chip), &config, budget);
    Vs1002::new(spi, MockChipSelect::new(chip))
}

fn byte(mosi: u8, miso: u8) -> BusEvent {
    BusEvent::Byte { mosi, miso }
}

proptest! {
    #[test]
    fn sci_write_then_read_round_trips(
        address in 0u8..(SCI_REGISTER_COUNT as u8),
        value in any::<u16>(),
        latency in 0u32..4,
    ) {
        let chip = RefCell::new(SimulatedVs1002::new().with_latency(latency));
        let mut vs = link(&chip, PollBudget::Polls(16));

        vs.write_register(address, value).unwrap();
        prop_assert_eq!(vs.read_register(address).unwrap(), value);

        let chip = chip.borrow();
        prop_assert_eq!(chip.register(address), Some(value));
        prop_assert_eq!(chip.chip_select_violations(), 0);
        prop_assert_eq!(chip.write_collisions(), 0);
        prop_assert!(chip.chip_select_high());
    }

    /// The address byte goes out unchanged for any `u8`, mapped or not.
    #[test]
    fn any_address_reaches_the_wire(address in any::<u8>(), value in any::<u16>()) {
        let chip = RefCell::new(SimulatedVs1002::new());
        let mut vs = link(&chip, PollBudget::Polls(8));

        vs.write_register(address, value).unwrap();
        let read = vs.read_register(address).unwrap();

        let chip = chip.borrow();
        let [hi, lo] = value.to_be_bytes();
        let mosi = chip.mosi_bytes();
        prop_assert_eq!(
            mosi.as_slice(),
            &[
                SCI_WRITE, address, hi, lo,
                SCI_READ, address, READ_FILL_BYTE, READ_FILL_BYTE,
            ]
        );
        prop_assert_eq!(chip.mosi_bytes()[1], address);
        prop_assert_eq!(chip.mosi_bytes()[5], address);
        prop_assert_eq!(chip.dropped_events(), 0);
        if usize::from(address) < SCI_REGISTER_COUNT {
            prop_assert_eq!(read, value);
        } else {
            prop_assert_eq!(read, 0);
        }
    }
}

/// `write_register(0x00, 0x0C20)` produces `[0x02, 0x00, 0x0C, 0x20]`
/// framed by one select-assert and one select-deassert.
#[test]
fn write_register_frame_on_the_wire() {
    let chip = RefCell::new(SimulatedVs1002::new());
    let mut vs = link(&chip, PollBudget::Polls(8));

    vs.write_register(SCI_MODE, 0x0C20).unwrap();

    let chip = chip.borrow();
    assert_eq!(
        chip.wire_trace().as_slice(),
        &[
            BusEvent::ChipSelectLow,
            byte(0x02, 0),
            byte(0x00, 0),
            byte(0x0C, 0),
            byte(0x20, 0),
            BusEvent::ChipSelectHigh,
        ]
    );
    assert!(chip.events().contains(&BusEvent::SciWrite {
        address: SCI_MODE,
        value: 0x0C20
    }));
    assert_eq!(chip.mode(), SciMode::SINE_TEST);
}

/// The high byte is clocked in before the low byte.
#[test]
fn read_register_frame_on_the_wire() {
    let chip = RefCell::new(SimulatedVs1002::new().with_register(0x0B, 0xABCD));
    let mut vs = link(&chip, PollBudget::Polls(8));

    assert_eq!(vs.read_register(0x0B).unwrap(), 0xABCD);

    assert_eq!(
        chip.borrow().wire_trace().as_slice(),
        &[
            BusEvent::ChipSelectLow,
            byte(0x03, 0),
            byte(0x0B, 0),
            byte(0x00, 0xAB),
            byte(0x00, 0xCD),
            BusEvent::ChipSelectHigh,
        ]
    );
}

/// `send_command_sequence([0x53,0xEF,0x6E,170,0,0,0,0])` appears as exactly
/// those eight bytes between P0.7 high and P0.7 low.
#[test]
fn sine_test_sequence_uses_inverted_select() {
    let chip = RefCell::new(SimulatedVs1002::new());
    let mut vs = link(&chip, PollBudget::Polls(8));
    vs.set_mode(SciMode::SINE_TEST).unwrap();
    chip.borrow_mut().clear_events();

    vs.send_command_sequence(&[0x53, 0xEF, 0x6E, 170, 0, 0, 0, 0])
        .unwrap();

    let chip = chip.borrow();
    let trace = chip.wire_trace();
    assert_eq!(trace.len(), 10);
    assert_eq!(trace.first(), Some(&BusEvent::ChipSelectHigh));
    assert_eq!(trace.last(), Some(&BusEvent::ChipSelectLow));
    assert_eq!(
        chip.mosi_bytes().as_slice(),
        &[0x53, 0xEF, 0x6E, 170, 0, 0, 0, 0]
    );
    assert_eq!(chip.sine_test(), Some(SineTone::new(170)));
    assert!(!chip.chip_select_high());
}

#[test]
fn start_then_stop_sine_test() {
    let chip = RefCell::new(SimulatedVs1002::new());
    let mut vs = link(&chip, PollBudget::Polls(8));
    vs.set_mode(SciMode::SINE_TEST).unwrap();

    vs.start_sine_test(SineTone::new(126)).unwrap();
    assert_eq!(chip.borrow().sine_test().map(SineTone::frequency_hz), Some(5168));

    vs.stop_sine_test().unwrap();
    let chip = chip.borrow();
    assert_eq!(chip.sine_test(), None);
    assert!(chip.events().contains(&BusEvent::SineTestStopped));
}

/// Without SM_SDISHARE the chip ignores bytes sent with xCS high.
#[test]
fn sdi_ignored_before_sdishare() {
    let chip = RefCell::new(SimulatedVs1002::new());
    let mut vs = link(&chip, PollBudget::Polls(8));

    vs.start_sine_test(SineTone::new(170)).unwrap();

    let chip = chip.borrow();
    assert_eq!(chip.sine_test(), None);
    assert!(!chip
        .events()
        .iter()
        .any(|e| matches!(e, BusEvent::SineTestStarted(_) | BusEvent::SdiData)));
}

/// Slow completion never leads to a select edge or data write mid-byte.
#[test]
fn slow_bus_keeps_framing_intact() {
    let chip = RefCell::new(SimulatedVs1002::new().with_latency(25));
    let mut vs = link(&chip, PollBudget::Unbounded);

    vs.set_mode(SciMode::SINE_TEST).unwrap();
    assert_eq!(vs.mode().unwrap(), SciMode::SINE_TEST);
    vs.start_sine_test(SineTone::new(170)).unwrap();

    let chip = chip.borrow();
    assert_eq!(chip.chip_select_violations(), 0);
    assert_eq!(chip.write_collisions(), 0);
    assert_eq!(chip.sine_test(), Some(SineTone::new(170)));
}

#[test]
fn stalled_bus_times_out_and_deselects() {
    let chip = RefCell::new(SimulatedVs1002::new().stalled());
    let mut vs = link(&chip, PollBudget::Polls(40));

    let err = vs.write_register(SCI_MODE, 0x0C20).unwrap_err();
    assert_eq!(err, LinkError::Bus(SpiError::Timeout { polls: 40 }));

    let chip = chip.borrow();
    assert!(chip.chip_select_high());
    assert!(chip
        .events()
        .contains(&BusEvent::SciFrameAborted { received: 1 }));
    assert_eq!(chip.mode(), SciMode::default());
}

/// Long sessions overflow the simulated chip's log; the overflow is counted
/// instead of leaving a silently truncated trace.
#[test]
fn long_session_reports_dropped_events() {
    let chip = RefCell::new(SimulatedVs1002::new());
    let mut vs = link(&chip, PollBudget::Polls(8));

    for value in 0..40u16 {
        vs.write_register(SCI_MODE, value).unwrap();
    }

    let chip = chip.borrow();
    // Seven events per frame: two select edges, four bytes and the write
    assert_eq!(chip.events().len(), 256);
    assert_eq!(chip.dropped_events(), 24);
    assert_eq!(chip.register(SCI_MODE), Some(39));
}
