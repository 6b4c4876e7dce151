//! VS1002 Sine-Test Firmware - Main Entry Point
//!
//! Hardware-only entry point for the LPC2138. `_reset` in `startup.rs` calls
//! `main` once RAM is initialized.

#![no_std]
#![no_main]

use firmware::lpc2138::Lpc2138;
use platform::config::{APP_NAME, APP_VERSION};
use platform::poll::PollBudget;

// Global defmt logger over RTT
use defmt_rtt as _;

mod startup;

#[no_mangle]
extern "C" fn main() -> ! {
    defmt::info!("{=str} v{=str}", APP_NAME, APP_VERSION);
    defmt::info!("LPC2138 ARM7TDMI-S, VS1002 on SPI0 (xCS P0.7)");

    let Some(Lpc2138 {
        mut scb,
        mut pins,
        spi0,
        chip_select,
    }) = Lpc2138::take()
    else {
        defmt::error!("peripherals already taken");
        halt();
    };

    // Production keeps the fail-stop behaviour: a stalled bus or a PLL that
    // never locks hangs in the poll instead of returning.
    match firmware::boot::run(
        &mut scb,
        &mut pins,
        spi0,
        chip_select,
        PollBudget::Unbounded,
    ) {
        Ok(_decoder) => {
            defmt::info!("sine test running");
            halt();
        }
        Err(e) => {
            defmt::error!("boot failed: {}", defmt::Display2Format(&e));
            halt();
        }
    }
}

fn halt() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
