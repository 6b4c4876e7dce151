//! VS1002 Sine-Test Simulator
//!
//! Runs the full boot sequence on the desktop against the simulated LPC2138
//! system control block and VS1002, then prints the SPI0/P0.7 wire trace.
//!
//! Run with: cargo run -p vs1002-firmware --example sine_test_simulator --features simulator
//!
//! Log level follows `RUST_LOG` (default `info`; `trace` shows every SCI
//! frame).

use std::cell::RefCell;

use firmware::boot;
use platform::config;
use platform::mocks::{
    BusEvent, MockChipSelect, MockPinConnect, MockSpi, MockSystemControl, SimulatedVs1002,
};
use platform::poll::PollBudget;

/// Generous enough for any simulated latency, small enough to fail fast.
const SIMULATOR_BUDGET: PollBudget = PollBudget::Polls(10_000);

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};
    let stdout_subscriber = tracing_subscriber::fmt::layer()
        .compact()
        .without_time()
        .with_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        );

    tracing_subscriber::registry().with(stdout_subscriber).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    tracing::info!("{} v{} - simulator", config::APP_NAME, config::APP_VERSION);

    let chip = RefCell::new(SimulatedVs1002::new().with_latency(4));
    let mut scb = MockSystemControl::new().lock_after(12);
    let mut pins = MockPinConnect::new();

    let vs = boot::run(
        &mut scb,
        &mut pins,
        MockSpi::new(&chip),
        MockChipSelect::new(&chip),
        SIMULATOR_BUDGET,
    )?;
    drop(vs);

    tracing::info!(
        feeds = scb.feed_count(),
        pll_status_reads_before_lock = scb
            .events()
            .iter()
            .find_map(|e| match e {
                platform::mocks::ScbEvent::StatusReads(n) => Some(*n),
                _ => None,
            })
            .unwrap_or(0),
        "clock sequence complete"
    );

    let chip = chip.borrow();
    for event in chip.wire_trace() {
        match event {
            BusEvent::ChipSelectLow => tracing::info!("P0.7 low"),
            BusEvent::ChipSelectHigh => tracing::info!("P0.7 high"),
            BusEvent::Byte { mosi, miso } => {
                tracing::info!("  MOSI {mosi:#04x}  MISO {miso:#04x}");
            }
            _ => {}
        }
    }

    match chip.sine_test() {
        Some(tone) => tracing::info!(
            pitch = tone.pitch(),
            sample_rate_hz = tone.sample_rate_hz(),
            frequency_hz = tone.frequency_hz(),
            "VS1002 playing sine test"
        ),
        None => tracing::warn!("VS1002 did not enter the sine test"),
    }
    Ok(())
}
