//! VS1002 register map, SCI framing and sine-test commands.
//!
//! Reference: VLSI Solution VS1002d datasheet v1.01, section 7.4 (Serial
//! Control Interface), section 8.6 (SCI registers), section 8.7.3 (sine test).
//!
//! SCI frames are MSB first. A read is `0x03, addr` followed by two dummy
//! bytes during which the chip shifts the 16-bit value out high byte first. A
//! write is `0x02, addr, value_hi, value_lo`.

/// SCI opcode: read register.
pub const SCI_READ: u8 = 0x03;
/// SCI opcode: write register.
pub const SCI_WRITE: u8 = 0x02;

/// Register 0x0: mode control.
pub const SCI_MODE: u8 = 0x00;
/// Register 0x1: status.
pub const SCI_STATUS: u8 = 0x01;
/// Register 0x2: built-in bass enhancer.
pub const SCI_BASS: u8 = 0x02;
/// Register 0x3: clock frequency + doubler.
pub const SCI_CLOCKF: u8 = 0x03;
/// Register 0x4: decode time in seconds.
pub const SCI_DECODE_TIME: u8 = 0x04;
/// Register 0x5: misc. audio data (sample rate, channels).
pub const SCI_AUDATA: u8 = 0x05;
/// Register 0x6: RAM write.
pub const SCI_WRAM: u8 = 0x06;
/// Register 0x7: base address for RAM write.
pub const SCI_WRAMADDR: u8 = 0x07;
/// Register 0x8: stream header data 0.
pub const SCI_HDAT0: u8 = 0x08;
/// Register 0x9: stream header data 1.
pub const SCI_HDAT1: u8 = 0x09;
/// Register 0xA: start address of application.
pub const SCI_AIADDR: u8 = 0x0A;
/// Register 0xB: volume control.
pub const SCI_VOL: u8 = 0x0B;
/// Register 0xC: application control register 0.
pub const SCI_AICTRL0: u8 = 0x0C;
/// Register 0xD: application control register 1.
pub const SCI_AICTRL1: u8 = 0x0D;

/// Number of SCI registers.
pub const SCI_REGISTER_COUNT: usize = 14;

/// Build the two-byte header of an SCI read.
pub const fn sci_read_header(address: u8) -> [u8; 2] {
    [SCI_READ, address]
}

/// Build a complete SCI write frame.
pub const fn sci_write_frame(address: u8, value: u16) -> [u8; 4] {
    let [hi, lo] = value.to_be_bytes();
    [SCI_WRITE, address, hi, lo]
}

// ── SCI_MODE ─────────────────────────────────────────────────────────────────

/// Value of the `SCI_MODE` register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct SciMode(u16);

impl SciMode {
    /// Differential output.
    pub const DIFF: Self = Self(1 << 0);
    /// Set to zero.
    pub const SETTOZERO: Self = Self(1 << 1);
    /// Soft reset.
    pub const RESET: Self = Self(1 << 2);
    /// Jump out of WAV decoding.
    pub const OUTOFWAV: Self = Self(1 << 3);
    /// Power down.
    pub const PDOWN: Self = Self(1 << 4);
    /// Allow SDI tests (sine test, memory test).
    pub const TESTS: Self = Self(1 << 5);
    /// Stream mode.
    pub const STREAM: Self = Self(1 << 6);
    /// MP3+V.
    pub const PLUSV: Self = Self(1 << 7);
    /// DCLK active edge (rising when clear).
    pub const DACT: Self = Self(1 << 8);
    /// SDI bit order (MSB first when clear).
    pub const SDIORD: Self = Self(1 << 9);
    /// Share SPI chip select: xDCS becomes the inverse of xCS.
    pub const SDISHARE: Self = Self(1 << 10);
    /// VS1002 native SPI modes.
    pub const SDINEW: Self = Self(1 << 11);
    /// ADPCM recording active.
    pub const ADPCM: Self = Self(1 << 12);
    /// ADPCM high-pass filter.
    pub const ADPCM_HP: Self = Self(1 << 13);

    /// `SDINEW | SDISHARE | TESTS` = `0x0C20`: native SPI, shared chip
    /// select and SDI tests allowed.
    pub const SINE_TEST: Self = Self::SDINEW.union(Self::SDISHARE).union(Self::TESTS);

    /// Wrap a raw register value.
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Raw register value.
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Bitwise OR of two mode values.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl core::ops::BitOr for SciMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

// ── Sine test ────────────────────────────────────────────────────────────────

/// Sample rates selected by bits 7:5 of the sine-test parameter.
pub const SINE_SAMPLE_RATES_HZ: [u32; 8] =
    [44_100, 48_000, 32_000, 22_050, 24_000, 16_000, 11_025, 12_000];

/// First three bytes of the sine-test start sequence (`0x53 0xEF 0x6E`).
pub const SINE_TEST_START_PREFIX: [u8; 3] = [0x53, 0xEF, 0x6E];

/// Sine-test exit sequence (`"Exit"` followed by four zero bytes).
pub const SINE_TEST_END: [u8; 8] = [0x45, 0x78, 0x69, 0x74, 0, 0, 0, 0];

/// The sine-test parameter byte `n`.
///
/// ```text
///  bit   7  6  5    4  3  2  1  0
///       [FsIdx ]   [     S      ]
///  F = Fs[FsIdx] * S / 128
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct SineTone(u8);

impl SineTone {
    /// Wrap a raw parameter byte. Every byte is a valid parameter.
    pub const fn new(pitch: u8) -> Self {
        Self(pitch)
    }

    /// Build from a sample-rate index (0..=7) and skip speed (0..=31).
    pub const fn from_parts(rate_index: u8, skip: u8) -> Option<Self> {
        if rate_index > 7 || skip > 31 {
            return None;
        }
        Some(Self((rate_index << 5) | skip))
    }

    /// Raw parameter byte.
    pub const fn pitch(self) -> u8 {
        self.0
    }

    /// Sample-rate index (bits 7:5).
    pub const fn rate_index(self) -> u8 {
        self.0 >> 5
    }

    /// Skip speed `S` (bits 4:0).
    pub const fn skip(self) -> u8 {
        self.0 & 0x1F
    }

    /// Sample rate `Fs` in Hz.
    pub fn sample_rate_hz(self) -> u32 {
        SINE_SAMPLE_RATES_HZ
            .get(usize::from(self.rate_index()))
            .copied()
            .unwrap_or(0)
    }

    /// Output frequency `Fs * S / 128`, rounded to the nearest Hz.
    pub fn frequency_hz(self) -> u32 {
        self.sample_rate_hz()
            .saturating_mul(u32::from(self.skip()))
            .saturating_add(64)
            / 128
    }

    /// The eight-byte SDI start sequence for this tone.
    pub const fn start_sequence(self) -> [u8; 8] {
        let [a, b, c] = SINE_TEST_START_PREFIX;
        [a, b, c, self.0, 0, 0, 0, 0]
    }
}

impl From<u8> for SineTone {
    fn from(pitch: u8) -> Self {
        Self::new(pitch)
    }
}

/// `[0x53, 0xEF, 0x6E, pitch, 0, 0, 0, 0]`.
pub const fn sine_test_start(tone: SineTone) -> [u8; 8] {
    tone.start_sequence()
}

/// Recognise a sine-test start sequence and return its tone.
pub fn parse_sine_test_start(bytes: &[u8]) -> Option<SineTone> {
    match bytes {
        [0x53, 0xEF, 0x6E, n, 0, 0, 0, 0] => Some(SineTone(*n)),
        _ => None,
    }
}
