use crate::defined::{float, MILLIMETER, PI};

pub const NUM_TRANS_IN_UNIT: usize = 249;
pub const NUM_TRANS_X: usize = 18;
pub const NUM_TRANS_Y: usize = 14;
pub const TRANS_SPACING: float = 10.16 * MILLIMETER;
pub const DEVICE_WIDTH: float = 192.0 * MILLIMETER;
pub const DEVICE_HEIGHT: float = 151.4 * MILLIMETER;

pub const FPGA_CLK_FREQ: usize = 163_840_000;

pub const MAX_CYCLE: u16 = 8191;

pub const MOD_BUF_SIZE_MAX: usize = 65536;
pub const MOD_SAMPLING_FREQ_DIV_MIN: u32 = 1160;

pub const FOCUS_STM_FIXED_NUM_WIDTH: usize = 18;
pub const FOCUS_STM_FIXED_NUM_UNIT: float = 0.025 * MILLIMETER;
pub const FOCUS_STM_FIXED_NUM_UPPER: i32 = (1 << (FOCUS_STM_FIXED_NUM_WIDTH - 1)) - 1;
pub const FOCUS_STM_FIXED_NUM_LOWER: i32 = -(1 << (FOCUS_STM_FIXED_NUM_WIDTH - 1));
pub const FOCUS_STM_BUF_SIZE_MAX: usize = 65536;
pub const FOCUS_STM_SAMPLING_FREQ_DIV_MIN: u32 = 3224;

pub const GAIN_STM_BUF_SIZE_MAX: usize = 1024;
pub const GAIN_STM_LEGACY_BUF_SIZE_MAX: usize = 2048;
pub const GAIN_STM_SAMPLING_FREQ_DIV_MIN: u32 = 3224;

pub const SILENCER_CYCLE_MIN: u16 = 1044;

/// Three transducers are not mounted on the board; their grid positions
/// must be skipped when enumerating the 18x14 array row-major.
pub const fn is_missing_transducer(x: usize, y: usize) -> bool {
    y == 1 && (x == 1 || x == 2 || x == 16)
}

bitflags::bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    #[repr(transparent)]
    pub struct FPGAControlFlags : u8 {
        const NONE               = 0;
        const LEGACY_MODE        = 1 << 0;
        const USE_STM_FINISH_IDX = 1 << 2;
        const USE_STM_START_IDX  = 1 << 3;
        const FORCE_FAN          = 1 << 4;
        const STM_MODE           = 1 << 5;
        const STM_GAIN_MODE      = 1 << 6;
        const READS_FPGA_INFO    = 1 << 7;
    }
}

/// Amplitude and phase of a single transducer. `phase` is in cycles
/// ([0, 1) maps to [0, 2pi)), `amp` is the normalized amplitude in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Drive {
    pub phase: float,
    pub amp: float,
}

/// 8-bit phase/duty pair used when the FPGA runs at the fixed 40 kHz
/// carrier (Legacy mode).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(C)]
pub struct LegacyDrive {
    pub phase: u8,
    pub duty: u8,
}

impl LegacyDrive {
    pub fn to_phase(d: &Drive) -> u8 {
        // NaN rounds to 0 via the saturating cast
        (((d.phase * 256.0).round() as i32) & 0xFF) as u8
    }

    pub fn to_duty(d: &Drive) -> u8 {
        ((d.amp.clamp(0.0, 1.0).asin() / PI) * 510.0).round() as u8
    }

    pub fn set(&mut self, d: &Drive) {
        self.phase = Self::to_phase(d);
        self.duty = Self::to_duty(d);
    }
}

/// 16-bit phase word of an Advanced-mode drive, quantized to the
/// per-transducer cycle.
pub struct Phase {}

impl Phase {
    pub fn to_phase(d: &Drive, cycle: u16) -> u16 {
        ((d.phase * cycle as float).round() as i32).rem_euclid(cycle as i32) as u16
    }
}

/// 16-bit duty word of an Advanced-mode drive.
pub struct Duty {}

impl Duty {
    pub fn to_duty(d: &Drive, cycle: u16) -> u16 {
        ((d.amp.clamp(0.0, 1.0).asin() / PI) * cycle as float).round() as u16
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FPGAInfo {
    info: u8,
}

impl FPGAInfo {
    pub const fn new(info: u8) -> Self {
        Self { info }
    }

    pub const fn is_thermal_assert(&self) -> bool {
        (self.info & 0x01) != 0
    }

    pub const fn info(&self) -> u8 {
        self.info
    }
}
