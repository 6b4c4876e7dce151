//! ARM7TDMI-S exception handlers for the sine-test firmware.
//!
//! The vector table in `startup.rs` branches to these symbols. The firmware
//! enables no interrupt sources and uses no SWI, so any entry here means the
//! core fetched garbage or a peripheral was misconfigured:
//!
//! - **Undefined instruction**: corrupted flash or a branch into data
//! - **SWI**: nothing issues one
//! - **Prefetch / data abort**: access outside the LPC2138 memory map
//! - **IRQ / FIQ**: CPSR I and F stay set outside critical sections; the
//!   VIC has no enabled sources
//!
//! Each handler logs the vector over defmt/RTT and halts. Returning would
//! need the mode-specific `LR` adjustment and a stack for the exception mode,
//! neither of which the firmware sets up.
//!
//! # Hardware-only symbols
//!
//! `#[no_mangle]` is applied only with `feature = "hardware"` so host test
//! binaries do not export these names. The functions themselves compile on
//! every target so host tests can check the vector list.

#![allow(clippy::doc_markdown)] // Exception names (UNDEF, SWI, FIQ) used as plain text
#![allow(non_snake_case)] // Symbol names match the vector table labels

/// Symbols the vector table branches to, in vector order after reset.
///
/// Checked by arch tests against `startup.rs`.
pub const EXCEPTION_VECTORS: &[&str] = &[
    "UndefHandler",
    "SwiHandler",
    "PrefetchAbortHandler",
    "DataAbortHandler",
    "IrqHandler",
    "FiqHandler",
];

/// Undefined instruction.
#[cfg_attr(feature = "hardware", no_mangle)]
pub extern "C" fn UndefHandler() -> ! {
    halt("UNDEF")
}

/// Software interrupt.
#[cfg_attr(feature = "hardware", no_mangle)]
pub extern "C" fn SwiHandler() -> ! {
    halt("SWI")
}

/// Instruction fetch abort.
#[cfg_attr(feature = "hardware", no_mangle)]
pub extern "C" fn PrefetchAbortHandler() -> ! {
    halt("prefetch abort")
}

/// Data access abort.
#[cfg_attr(feature = "hardware", no_mangle)]
pub extern "C" fn DataAbortHandler() -> ! {
    halt("data abort")
}

/// IRQ.
#[cfg_attr(feature = "hardware", no_mangle)]
pub extern "C" fn IrqHandler() -> ! {
    halt("IRQ")
}

/// FIQ.
#[cfg_attr(feature = "hardware", no_mangle)]
pub extern "C" fn FiqHandler() -> ! {
    halt("FIQ")
}

#[inline(never)]
fn halt(_vector: &'static str) -> ! {
    #[cfg(feature = "defmt")]
    defmt::error!("unexpected exception: {=str}, halting", _vector);
    loop {
        core::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_vectors_after_reset() {
        assert_eq!(EXCEPTION_VECTORS.len(), 6);
        assert!(EXCEPTION_VECTORS.iter().all(|name| name.ends_with("Handler")));
    }

    #[test]
    fn handlers_have_the_c_abi() {
        let table: [extern "C" fn() -> !; 6] = [
            UndefHandler,
            SwiHandler,
            PrefetchAbortHandler,
            DataAbortHandler,
            IrqHandler,
            FiqHandler,
        ];
        assert_eq!(table.len(), EXCEPTION_VECTORS.len());
    }
}
