//! Hardware Abstraction Layer (HAL) for the VS1002 sine-test board
//!
//! This crate provides trait-based abstractions for the LPC2138 registers the
//! firmware touches, enabling development and testing without physical
//! hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate: boot, VS1002 link, MMIO impls)
//!         ↓
//! Platform HAL (this crate - register traits, clock plan, sequencer)
//!         ↓
//! Hardware Layer (LPC2138 memory-mapped registers)
//! ```
//!
//! # Modules
//!
//! - [`registers`] - Typed register access traits and status newtypes
//! - [`poll`] - Bounded / unbounded busy-wait on a status predicate
//! - [`clock_config`] - PLL multiplier/divider and MAM timing derivation
//! - [`clock_sequencer`] - Typestate clock bring-up sequence
//! - [`peripheral`] - SPI0 bus configuration
//! - [`vs1002`] - VS1002 SCI register map and sine-test commands
//! - [`config`] - Board constants
//! - `mocks` - Simulated LPC2138 + VS1002 (requires `std` or `test`)
//!
//! # Features
//!
//! - `std`: Enable standard library support (for testing)
//! - `hardware`: Physical hardware implementations
//! - `defmt`: Enable defmt logging
//!
//! # Example
//!
//! ```
//! use platform::clock_config::ClockPlan;
//!
//! let plan = ClockPlan::new(14_745_600, 53_236_800).unwrap();
//! assert_eq!(plan.pllcfg(), 0x23);
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // hex addresses and register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors — callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

#[cfg(feature = "std")]
extern crate std;

pub mod clock_config;
pub mod clock_sequencer;
pub mod config;
pub mod peripheral;
pub mod poll;
pub mod registers;
pub mod vs1002;

pub mod mocks;

// Re-export the register access seams
pub use registers::{
    MamMode, PinConnect, PllControl, PllStatus, SpiRegisters, SpiStatus, SystemControl,
    VpbDivider,
};

// Re-export poll types
pub use poll::{wait_for, PollBudget, Timeout};

// Re-export clock types
pub use clock_config::{ClockPlan, ClockPlanError};
pub use clock_sequencer::{ClockError, ClockSequencer};

// Re-export peripheral types
pub use peripheral::{BitOrder, SpiBusConfig, SpiConfigError, SpiMode};

// Re-export decoder types
pub use vs1002::{SciMode, SineTone};
