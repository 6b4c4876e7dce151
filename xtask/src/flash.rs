use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

use platform::config::{APP_NAME, CRYSTAL_HZ};

use crate::{hardware_cargo_args, FIRMWARE, TARGET};

pub fn run(release: bool, port: &str, baud: u32) -> Result<()> {
    let mode = if release { "release" } else { "debug" };

    println!();
    println!(
        "{}",
        format!("🔨 Building firmware ({} mode)...", mode)
            .cyan()
            .bold()
    );
    println!();

    // Build firmware for the LPC2138
    let build_start = Instant::now();
    let mut build_cmd = Command::new("cargo");
    build_cmd.args(hardware_cargo_args("build"));

    if release {
        build_cmd.arg("--release");
    }

    let build_output = build_cmd.output().context("Failed to run cargo build")?;

    if !build_output.status.success() {
        eprintln!("{}", "✗ Build failed".red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&build_output.stderr));
        anyhow::bail!("Build failed");
    }

    let build_time = build_start.elapsed();
    println!(
        "{}",
        format!("✓ Build successful in {:.2}s", build_time.as_secs_f64()).green()
    );
    println!();

    let elf = format!("target/{TARGET}/{mode}/{FIRMWARE}");
    let hex = format!("{elf}.hex");

    // Show binary size
    show_binary_size(&elf)?;
    println!();

    // lpc21isp takes Intel HEX
    let objcopy_output = Command::new("arm-none-eabi-objcopy")
        .args(["-O", "ihex", &elf, &hex])
        .output()
        .context("Failed to run arm-none-eabi-objcopy. Is the ARM GNU toolchain installed?")?;

    if !objcopy_output.status.success() {
        eprintln!("{}", "✗ HEX conversion failed".red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&objcopy_output.stderr));
        anyhow::bail!("HEX conversion failed");
    }

    // Flash with lpc21isp. It fills in the vector checksum at 0x14 and uses
    // DTR/RTS to reset the board into the boot loader.
    println!("{}", "📡 Flashing LPC2138...".cyan().bold());
    println!("   {}", format!("Boot loader on {port} @ {baud} baud").dimmed());

    let flash_start = Instant::now();
    let crystal_khz = (CRYSTAL_HZ / 1_000).to_string();
    let flash_output = Command::new("lpc21isp")
        .args(["-control", "-hex", &hex, port, &baud.to_string(), &crystal_khz])
        .output()
        .context("Failed to run lpc21isp. Is lpc21isp installed and on PATH?")?;

    if !flash_output.status.success() {
        eprintln!("{}", "✗ Flash failed".red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&flash_output.stdout));
        eprintln!("{}", String::from_utf8_lossy(&flash_output.stderr));
        anyhow::bail!("Flash failed - check the serial port and that the board is powered");
    }

    let flash_time = flash_start.elapsed();
    println!(
        "{}",
        format!("✓ Flash successful in {:.2}s", flash_time.as_secs_f64()).green()
    );
    println!();
    println!("{}", format!("🎵 {APP_NAME} is running on hardware!").bold());
    println!(
        "   {}",
        "Attach a JTAG debugger with RTT support (OpenOCD `rtt` commands) to view defmt logs"
            .dimmed()
    );
    println!();

    Ok(())
}

fn show_binary_size(elf: &str) -> Result<()> {
    let output = Command::new("rust-size").arg(elf).arg("-A").output();

    let output = match output {
        Ok(out) if out.status.success() => Some(out),
        // If rust-size is not available, try the GNU one
        _ => Command::new("arm-none-eabi-size")
            .arg("-A")
            .arg(elf)
            .output()
            .ok()
            .filter(|out| out.status.success()),
    };

    if let Some(out) = output {
        println!("{}", "📊 Binary size:".cyan());
        let size_output = String::from_utf8_lossy(&out.stdout);
        for line in size_output.lines() {
            println!("   {}", line.dimmed());
        }
    }

    Ok(())
}
