//! Audio decoder drivers
//!
//! Vertically sliced: one sub-directory per decoder chip.
//!
//! - `vs1002/` — VLSI VS1002 link (SCI register access, SDI command stream)
//!
//! # Dependency Injection
//!
//! Drivers are generic over [`embedded_hal::spi::SpiBus`] and
//! [`embedded_hal::digital::OutputPin`]. Concrete types are injected at the
//! call site:
//!
//! ```rust,ignore
//! // Hardware:
//! Vs1002::new(PolledSpi::new(spi0, &config, PollBudget::Unbounded), p0_7);
//! // Tests:
//! Vs1002::new(SpiMock::new(&expectations), PinMock::new(&pins));
//! ```

pub mod vs1002;
