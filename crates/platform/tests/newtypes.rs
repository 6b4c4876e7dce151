//! Register newtypes and bus configuration.

// Integration test file -- intentional test patterns permitted.
#![allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
)]

use platform::peripheral::{BitOrder, SpiBusConfig, SpiConfigError, SpiMode, SPI0_PINSEL0};
use platform::registers::{PllStatus, SpiStatus};
use platform::vs1002::{sci_write_frame, SciMode, SineTone, SCI_MODE};

#[test]
fn spi_status_only_spif_means_complete() {
    for bits in 0u8..=0x7F {
        assert!(!SpiStatus::from_bits(bits).transfer_complete());
    }
    assert!(SpiStatus::from_bits(0x80).transfer_complete());
}

#[test]
fn pll_status_lock_ignores_other_bits() {
    assert!(!PllStatus::from_bits(PllStatus::PLLE | PllStatus::PLLC | 0x7F).locked());
    assert!(PllStatus::from_bits(PllStatus::PLOCK).locked());
}

#[test]
fn board_spi_settings() {
    let cfg = SpiBusConfig::new(32).unwrap();
    assert_eq!(cfg.mode, SpiMode::Mode0);
    assert_eq!(cfg.bit_order, BitOrder::MsbFirst);
    assert_eq!(cfg.control_register(), 0x20);
    assert_eq!(SPI0_PINSEL0, 0x1500);
}

#[test]
fn spi_divider_validation() {
    for d in 0u8..8 {
        assert_eq!(SpiBusConfig::new(d), Err(SpiConfigError::DividerTooSmall(d)));
    }
    for d in (9u8..=255).step_by(2) {
        assert_eq!(SpiBusConfig::new(d), Err(SpiConfigError::DividerOdd(d)));
    }
    for d in (8u8..=254).step_by(2) {
        assert!(SpiBusConfig::new(d).is_ok());
    }
}

#[test]
fn mode_write_frame() {
    assert_eq!(
        sci_write_frame(SCI_MODE, SciMode::SINE_TEST.bits()),
        [0x02, 0x00, 0x0C, 0x20]
    );
}

#[test]
fn sine_tone_from_raw_byte() {
    let tone: SineTone = 170u8.into();
    assert_eq!(tone.pitch(), 170);
    assert_eq!(tone.start_sequence(), [0x53, 0xEF, 0x6E, 170, 0, 0, 0, 0]);
}
