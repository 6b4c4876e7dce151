//! ELF section address verification tests.
// ELF test file: expect/unwrap/cast/indexing are intentional test mechanisms.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
)]
//!
//! These tests verify that the linker scripts (memory.x, link.x) put the
//! vector table at address 0 and `.data`/`.bss` in on-chip SRAM. If the
//! vectors move, the LPC2138 boot loader sees an invalid signature and stays
//! in ISP mode instead of starting the firmware.
//!
//! # How to run
//! The ELF checks need the ARM binary to be pre-built:
//! ```
//! cargo +nightly build --release -Zbuild-std=core \
//!     --target armv4t-none-eabi --features hardware
//! cargo test -p vs1002-firmware --test elf_sections
//! ```
//! Without it they print SKIP and pass; the linker-script checks always run.

use std::path::PathBuf;

/// Path to the built ARM ELF binary (set by CI or found in `target/`).
fn firmware_elf_path() -> Option<PathBuf> {
    // Try environment variable first (set by CI)
    if let Ok(path) = std::env::var("FIRMWARE_ELF_PATH") {
        let p = PathBuf::from(path);
        if p.exists() {
            return Some(p);
        }
    }
    // Try conventional cargo output path
    let workspace_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .map(|p| p.to_path_buf())?;
    let elf = workspace_root
        .join("target")
        .join("armv4t-none-eabi")
        .join("release")
        .join("vs1002-firmware");
    if elf.exists() {
        Some(elf)
    } else {
        None
    }
}

/// Skip a test with a message if the ELF is not available.
macro_rules! require_elf {
    () => {
        match firmware_elf_path() {
            Some(p) => p,
            None => {
                eprintln!(
                    "SKIP: ARM ELF not found — run \
                     `cargo xtask flash --release` or build for armv4t-none-eabi first"
                );
                return;
            }
        }
    };
}

/// `(name, address)` for every symbol `arm-none-eabi-nm` reports.
fn symbols(elf: &std::path::Path) -> Option<Vec<(String, u64)>> {
    let out = std::process::Command::new("arm-none-eabi-nm")
        .args(["--radix=hex", elf.to_str().unwrap()])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&out.stdout);
    Some(
        text.lines()
            .filter_map(|line| {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() < 3 {
                    return None;
                }
                let addr = u64::from_str_radix(parts[0], 16).ok()?;
                Some((parts[parts.len() - 1].to_string(), addr))
            })
            .collect(),
    )
}

#[test]
fn vector_table_at_address_zero() {
    let elf_path = require_elf!();
    let Some(symbols) = symbols(&elf_path) else {
        eprintln!("SKIP: arm-none-eabi-nm not available");
        return;
    };

    let vectors = symbols.iter().find(|(name, _)| name == "_vectors");
    assert_eq!(
        vectors.map(|(_, addr)| *addr),
        Some(0),
        "_vectors must be linked at 0x00000000"
    );
}

#[test]
fn ram_symbols_in_sram() {
    let elf_path = require_elf!();
    let Some(symbols) = symbols(&elf_path) else {
        eprintln!("SKIP: arm-none-eabi-nm not available");
        return;
    };

    for wanted in ["_sdata", "_edata", "_sbss", "_ebss", "_stack_top"] {
        let (_, addr) = symbols
            .iter()
            .find(|(name, _)| name == wanted)
            .unwrap_or_else(|| panic!("{wanted} missing from ELF"));
        assert!(
            (0x4000_0000..=0x4000_8000).contains(addr),
            "{wanted} at 0x{addr:08X} is outside the 32 KiB SRAM"
        );
    }
}

#[test]
fn memory_x_matches_lpc2138_map() {
    let memory_x = std::fs::read_to_string(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../memory.x"
    ))
    .expect("memory.x must exist at workspace root");

    assert!(
        memory_x.contains("FLASH : ORIGIN = 0x00000000"),
        "memory.x must place FLASH at 0x00000000"
    );
    assert!(
        memory_x.contains("RAM   : ORIGIN = 0x40000000"),
        "memory.x must place RAM at 0x40000000"
    );
    // Top 12 KiB of flash belong to the boot loader
    assert!(memory_x.contains("LENGTH = 500K"));
}

#[test]
fn link_x_defines_startup_symbols() {
    let link_x = std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/../../link.x"))
        .expect("link.x must exist at workspace root");

    for symbol in ["_sidata", "_sdata", "_edata", "_sbss", "_ebss", "_stack_top"] {
        assert!(link_x.contains(symbol), "link.x must define {symbol}");
    }
    assert!(link_x.contains("ENTRY(_reset)"));
    assert!(link_x.contains("KEEP(*(.vectors))"));
    assert!(link_x.contains("INCLUDE memory.x"));
}
