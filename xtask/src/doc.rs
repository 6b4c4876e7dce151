use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

use crate::{hardware_cargo_args, TARGET};

/// Crate names whose docs `xtask doc` produces (library names, not packages).
pub const DOC_CRATES: &[&str] = &["firmware", "platform"];

pub fn run(open: bool, hardware: bool) -> Result<()> {
    println!();
    let what = if hardware {
        "LPC2138 (hardware feature)"
    } else {
        "host"
    };
    println!(
        "{}",
        format!("📚 Building {what} documentation...").cyan().bold()
    );
    println!();

    let start = Instant::now();

    let mut cmd = Command::new("cargo");
    if hardware {
        // Pulls in the MMIO register blocks and the exception vectors that
        // only exist behind `hardware`.
        cmd.args(hardware_cargo_args("doc"));
    } else {
        cmd.args(["doc", "-p", "platform", "-p", crate::FIRMWARE, "--lib"]);
    }
    cmd.args(["--no-deps", "--document-private-items"]);

    if open {
        cmd.arg("--open");
    }

    let output = cmd.output().context("Failed to spawn cargo doc")?;

    if !output.status.success() {
        eprintln!("{}", "✗ Documentation build failed".red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        anyhow::bail!("Documentation build failed");
    }

    println!(
        "{}",
        format!(
            "✓ Documentation built in {:.2}s",
            start.elapsed().as_secs_f64()
        )
        .green()
    );

    if !open {
        println!();
        for name in DOC_CRATES {
            println!(
                "   {}",
                format!("{}/index.html", doc_root(name, hardware)).dimmed()
            );
        }
    }

    println!();

    Ok(())
}

/// Where cargo writes the docs for `crate_name`. Cross builds land under the
/// target triple.
pub fn doc_root(crate_name: &str, hardware: bool) -> String {
    if hardware {
        format!("target/{TARGET}/doc/{crate_name}")
    } else {
        format!("target/doc/{crate_name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_doc_roots_match_library_names() {
        assert_eq!(doc_root("firmware", false), "target/doc/firmware");
        assert_eq!(doc_root("platform", false), "target/doc/platform");
    }

    #[test]
    fn hardware_docs_land_under_the_target_triple() {
        assert_eq!(
            doc_root("firmware", true),
            "target/armv4t-none-eabi/doc/firmware"
        );
    }
}
