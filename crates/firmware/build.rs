fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Only run linker script setup for hardware builds
    #[cfg(feature = "hardware")]
    {
        use std::env;
        use std::fs;
        use std::path::PathBuf;

        // Put `memory.x` and `link.x` in our output directory and ensure it's
        // on the linker search path.
        let out = PathBuf::from(env::var_os("OUT_DIR").ok_or("OUT_DIR not set")?);
        fs::write(out.join("memory.x"), include_bytes!("../../memory.x"))?;
        fs::write(out.join("link.x"), include_bytes!("../../link.x"))?;

        println!("cargo:rustc-link-search={}", out.display());
        println!("cargo:rerun-if-changed=../../memory.x");
        println!("cargo:rerun-if-changed=../../link.x");
    }

    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
