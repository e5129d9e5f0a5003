use midair_driver::{cpu::TxDatagram, error::DriverError, operation::ConfigSilencer};

use super::DatagramHeader;

/// Configuration of the silencer low-pass stage.
#[derive(Clone, Copy, Debug)]
pub struct SilencerConfig {
    pub step: u16,
    pub cycle: u16,
}

impl SilencerConfig {
    pub const fn new(step: u16, cycle: u16) -> Self {
        Self { step, cycle }
    }

    /// Disable smoothing by making the silencer keep up with any change.
    pub const fn none() -> Self {
        Self::new(0xFFFF, 4096)
    }
}

impl Default for SilencerConfig {
    fn default() -> Self {
        Self::new(10, 4096)
    }
}

impl DatagramHeader for SilencerConfig {
    fn init(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    fn pack(&mut self, msg_id: u8, tx: &mut TxDatagram) -> Result<(), DriverError> {
        ConfigSilencer {
            msg_id,
            cycle: self.cycle,
            step: self.step,
        }
        .pack(tx)
    }

    fn is_finished(&self) -> bool {
        true
    }
}
