//! Board configuration and constants
//!
//! This module defines central configuration values used across the firmware.
//! Clock, bus and decoder set-up reference these constants rather than
//! hardcoding values.

use crate::vs1002::{SciMode, SineTone};

/// The application name
pub const APP_NAME: &str = "VS1002 Sine Test";

/// Application version (synchronized with Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// LPC2138 oscillator frequency on this board.
pub const CRYSTAL_HZ: u32 = 14_745_600;

/// Requested core clock. The PLL rounds up to the next whole multiple of the
/// crystal (58.9824 MHz).
pub const TARGET_CCLK_HZ: u32 = 53_236_800;

/// `S0SPCCR` value: SCK = PCLK / 32.
pub const SPI_CLOCK_DIVIDER: u8 = 32;

/// P0 pin driving the VS1002 xCS line (xDCS is derived from it via SDISHARE).
pub const CHIP_SELECT_PIN: u8 = 7;

/// `SCI_MODE` written before the sine test.
pub const SCI_MODE_VALUE: SciMode = SciMode::SINE_TEST;

/// Sine-test parameter: Fs = 16 kHz, S = 10 → 1250 Hz.
pub const SINE_TEST_PITCH: u8 = 170;

/// [`SINE_TEST_PITCH`] as a tone.
pub const SINE_TEST_TONE: SineTone = SineTone::new(SINE_TEST_PITCH);
