//! VS1002 driver module (VLSI Solution)
//!
//! The register map and command encodings live in [`platform::vs1002`] so the
//! simulated chip can share them; this module adds the bus driver.

mod driver;

pub use driver::{LinkError, Vs1002};
pub use platform::vs1002::{SciMode, SineTone};
