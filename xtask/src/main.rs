// Desktop/tooling crate — unwrap/expect/panic acceptable in non-embedded code.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod check;
mod doc;
mod flash;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// LPC2138: ARM7TDMI-S, ARM state, no prebuilt `core`.
pub const TARGET: &str = "armv4t-none-eabi";

/// Firmware package and binary name.
pub const FIRMWARE: &str = "vs1002-firmware";

/// `cargo` arguments shared by every hardware build.
///
/// armv4t-none-eabi is a tier 3 target, so `core` is built from source on
/// nightly.
pub fn hardware_cargo_args(subcommand: &str) -> Vec<&str> {
    vec![
        "+nightly",
        subcommand,
        "-p",
        FIRMWARE,
        "--target",
        TARGET,
        "-Zbuild-std=core",
        "--features",
        "hardware",
    ]
}

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "VS1002 sine-test development tasks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the firmware and flash the LPC2138 over its UART boot loader (lpc21isp)
    Flash {
        /// Build and flash release version
        #[arg(short, long)]
        release: bool,
        /// Serial port the board's UART0 is connected to
        #[arg(long, default_value = "/dev/ttyUSB0")]
        port: String,
        /// Boot loader baud rate
        #[arg(long, default_value_t = 38_400)]
        baud: u32,
    },
    /// Check firmware builds for both hardware and simulator targets
    Check,
    /// Run the host tests (library units, each integration target, doc tests)
    Test {
        /// Run only unit tests
        #[arg(long)]
        unit: bool,
        /// Run only integration tests
        #[arg(long)]
        integration: bool,
    },
    /// Build and optionally open documentation
    Doc {
        /// Open documentation in browser
        #[arg(long)]
        open: bool,
        /// Document the armv4t-none-eabi build with the `hardware` feature
        #[arg(long)]
        hardware: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Flash {
            release,
            port,
            baud,
        } => flash::run(release, &port, baud),
        Commands::Check => check::run(),
        Commands::Test { unit, integration } => test::run(unit, integration),
        Commands::Doc { open, hardware } => doc::run(open, hardware),
    }
}
