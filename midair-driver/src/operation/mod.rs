mod clear;
mod force_fan;
mod gain;
mod info;
mod mod_delay;
mod modulation;
mod null;
mod silencer;
mod stm;
mod sync;

pub use clear::*;
pub use force_fan::*;
pub use gain::*;
pub use info::*;
pub use mod_delay::*;
pub use modulation::*;
pub use null::*;
pub use silencer::*;
pub use stm::*;
pub use sync::*;

pub use crate::cpu::GainSTMMode;
