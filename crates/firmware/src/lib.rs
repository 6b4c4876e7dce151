//! VS1002 Sine-Test Firmware
//!
//! Brings an LPC2138 (ARM7TDMI-S, 14.7456 MHz crystal) up to speed and makes
//! an attached VS1002 audio decoder play its built-in test tone.
//!
//! # Architecture
//!
//! This firmware follows a layered architecture:
//!
//! ```text
//! Application Layer (main.rs, boot)
//!         ↓
//! Drivers (decoder::vs1002 over embedded_hal::spi::SpiBus)
//!         ↓
//! Bus (spi::PolledSpi over platform::SpiRegisters)
//!         ↓
//! Platform HAL (platform crate) / LPC2138 registers (lpc2138)
//! ```
//!
//! # Features
//!
//! - `hardware` - Build for the LPC2138 target (defmt over RTT, vector table)
//! - `simulator` - Run the boot sequence on the desktop against simulated
//!   peripherals (tracing)
//! - `std` - Enable standard library (for the simulator and testing)
//!
//! # Examples
//!
//! ## Hardware Target
//!
//! ```bash
//! cargo +nightly build --release -Zbuild-std=core \
//!     --target armv4t-none-eabi --features hardware
//! ```
//!
//! ## Simulator
//!
//! ```bash
//! cargo run --example sine_test_simulator --features simulator
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
// Upgrade relevant warns to deny; keep pedantic as warn (too noisy for firmware)
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
// unsafe fn body is not implicitly unsafe block
// Logging discipline
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![warn(clippy::dbg_macro)] // dbg! should not be left in committed code
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)] // common in Rust crates; not a real issue
#![allow(clippy::missing_errors_doc)] // most errors are self-explanatory
// Pedantic lints too noisy for firmware application code:
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]

pub mod boot;
pub mod decoder;
pub mod exception_handlers;
pub mod lpc2138;
pub mod spi;

#[cfg(all(feature = "hardware", target_arch = "arm"))]
mod critical_section_impl;

#[cfg(all(feature = "hardware", target_os = "none"))]
mod panic_handler;

// Re-export key types
pub use boot::{BootError, BOOT_SEQUENCE_STEPS};
pub use decoder::vs1002::{LinkError, Vs1002};
pub use spi::{PolledSpi, SpiError};
