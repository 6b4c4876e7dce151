//! Architecture boundary tests — run with `cargo test -p vs1002-firmware --test arch_boundaries`
// Architecture test file: expect/unwrap/panic are intentional test mechanisms.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::assertions_on_constants,
    clippy::arithmetic_side_effects,
)]
//!
//! These tests enforce the layering rules:
//!   Rule 1: platform (register traits, clock math, VS1002 protocol) must not
//!           depend on firmware (application layer)
//!   Rule 2: drivers talk to embedded-hal traits, not to LPC2138 registers
//!   Rule 3: production `main` keeps the fail-stop behaviour (unbounded polls)
//!   Rule 4: every vector in the table has a handler, and no Cortex-M
//!           runtime crate leaks into an ARM7 build
//!
//! # How enforcement works
//!
//! Rules 1 and 2 are compile-time: this integration test binary links
//! `platform` and `firmware` and instantiates the driver over the simulated
//! peripherals, which only compiles if the driver is generic over the traits.
//! Rules 3 and 4 scan the sources and manifests embedded with `include_str!`.

use platform::registers::{PinConnect, SpiRegisters, SystemControl};

/// Verify that the platform HAL crate exposes its register traits without
/// depending on the firmware crate.
#[test]
fn platform_hal_is_independent() {
    fn _assert_spi<T: SpiRegisters>() {}
    fn _assert_scb<T: SystemControl>() {}
    fn _assert_pins<T: PinConnect>() {}

    let platform_cargo = include_str!("../../platform/Cargo.toml");
    assert!(
        !platform_cargo.contains("vs1002-firmware") && !platform_cargo.contains("../firmware"),
        "platform must not depend on the firmware crate"
    );
}

/// The driver is generic over `embedded_hal::spi::SpiBus` and
/// `embedded_hal::digital::OutputPin`.
#[test]
fn driver_is_generic_over_embedded_hal() {
    fn _assert_driver<SPI, CS>(spi: SPI, cs: CS) -> firmware::Vs1002<SPI, CS>
    where
        SPI: embedded_hal::spi::SpiBus<u8>,
        CS: embedded_hal::digital::OutputPin,
    {
        firmware::Vs1002::new(spi, cs)
    }

    let driver_rs = include_str!("../src/decoder/vs1002/driver.rs");
    assert!(
        !driver_rs.contains("lpc2138"),
        "the VS1002 driver must not reference LPC2138 registers"
    );
}

/// Production boot passes `PollBudget::Unbounded`: a stalled bus or an
/// unlocked PLL hangs rather than continuing with a half-configured system.
#[test]
fn main_uses_unbounded_polls() {
    let main_rs = include_str!("../src/main.rs");
    assert!(main_rs.contains("PollBudget::Unbounded"));
    assert!(
        !main_rs.contains("PollBudget::Polls"),
        "main.rs must not bound the hardware polls"
    );
}

/// Every handler the vector table branches to is named in the startup
/// assembly, in vector order.
#[test]
fn startup_references_every_handler() {
    let startup_rs = include_str!("../src/startup.rs");
    let mut last = 0;
    for handler in firmware::exception_handlers::EXCEPTION_VECTORS {
        let at = startup_rs
            .find(&format!(".word {handler}"))
            .unwrap_or_else(|| panic!("startup.rs does not reference {handler}"));
        assert!(at > last, "{handler} is out of vector order");
        last = at;
    }
}

/// The reset handler must hand over to the `main` symbol main.rs exports.
#[test]
fn reset_calls_main() {
    let startup_rs = include_str!("../src/startup.rs");
    let main_rs = include_str!("../src/main.rs");
    assert!(startup_rs.contains("bl    main"));
    assert!(main_rs.contains("#[no_mangle]"));
    assert!(main_rs.contains("extern \"C\" fn main() -> !"));
}

/// The boot sequence documentation lists clocks before SPI.
#[test]
fn boot_sequence_clocks_before_spi() {
    let steps = firmware::BOOT_SEQUENCE_STEPS;
    let clocks = steps.iter().position(|s| s.contains("Clocks")).unwrap();
    let spi = steps.iter().position(|s| s.contains("SPI0")).unwrap();
    assert!(clocks < spi);
}

/// ARM7TDMI-S has no NVIC/PRIMASK: cortex-m, cortex-m-rt and panic-probe
/// must not be in the firmware manifest.
#[test]
fn no_cortex_m_runtime_in_cargo_toml() {
    let firmware_cargo = include_str!("../Cargo.toml");
    for banned in ["cortex-m", "panic-probe", "embassy"] {
        assert!(
            !firmware_cargo.contains(banned),
            "firmware Cargo.toml must not contain `{banned}` (ARM7 target)"
        );
    }
}

/// `.cargo/config.toml` links with link.x and defmt.x and sets DEFMT_LOG.
#[test]
fn cargo_config_links_scripts() {
    let config = include_str!("../../../.cargo/config.toml");
    assert!(config.contains("armv4t-none-eabi"));
    assert!(config.contains("-Tlink.x"));
    assert!(config.contains("-Tdefmt.x"));
    assert!(config.contains("DEFMT_LOG"));
}
