use thiserror::Error;

use crate::{defined::float, fpga::*, operation::GainSTMMode};

#[derive(Error, Debug, PartialEq)]
pub enum DriverError {
    #[error("Modulation buffer size ({0}) is out of range ([2, {MOD_BUF_SIZE_MAX}])")]
    ModulationSizeOutOfRange(usize),

    #[error(
        "Modulation sampling frequency division ({0}) is below the minimum ({MOD_SAMPLING_FREQ_DIV_MIN})"
    )]
    ModFreqDivOutOfRange(u32),

    #[error("Silencer cycle ({0}) is below the minimum ({SILENCER_CYCLE_MIN})")]
    SilencerCycleOutOfRange(u16),

    #[error(
        "Point coordinate ({0}) is out of range ([{lower}, {upper}])",
        lower = FOCUS_STM_FIXED_NUM_LOWER as float * FOCUS_STM_FIXED_NUM_UNIT,
        upper = FOCUS_STM_FIXED_NUM_UPPER as float * FOCUS_STM_FIXED_NUM_UNIT
    )]
    FocusSTMPointOutOfRange(float),

    #[error("FocusSTM size ({0}) is out of range ([1, {FOCUS_STM_BUF_SIZE_MAX}])")]
    FocusSTMSizeOutOfRange(usize),

    #[error(
        "FocusSTM sampling frequency division ({0}) is below the minimum ({FOCUS_STM_SAMPLING_FREQ_DIV_MIN})"
    )]
    FocusSTMFreqDivOutOfRange(u32),

    #[error("GainSTM size ({0}) is out of range ([1, {GAIN_STM_LEGACY_BUF_SIZE_MAX}])")]
    GainSTMLegacySizeOutOfRange(usize),

    #[error("GainSTM size ({0}) is out of range ([1, {GAIN_STM_BUF_SIZE_MAX}])")]
    GainSTMSizeOutOfRange(usize),

    #[error(
        "GainSTM sampling frequency division ({0}) is below the minimum ({GAIN_STM_SAMPLING_FREQ_DIV_MIN})"
    )]
    GainSTMFreqDivOutOfRange(u32),

    #[error("GainSTMMode ({0:?}) is not supported")]
    GainSTMModeNotSupported(GainSTMMode),

    #[error("STM start index is out of range")]
    STMStartIndexOutOfRange,
    #[error("STM finish index is out of range")]
    STMFinishIndexOutOfRange,

    #[error("Cycle ({0}) must be 4096 in Legacy mode")]
    InvalidCycleForLegacyMode(u16),

    #[error("{0}")]
    ModulationError(String),
    #[error("{0}")]
    GainError(String),
    #[error("{0}")]
    LinkError(String),

    #[error("Link is closed")]
    LinkClosed,
}
