use midair_driver::{cpu::TxDatagram, error::DriverError, geometry::Geometry, operation::ModDelay};

use super::DatagramBody;

/// Write the per-transducer modulation delays currently stored in the
/// geometry into the device's mod-delay BRAM region.
#[derive(Default)]
pub struct ModDelayConfig {
    sent: bool,
}

impl DatagramBody for ModDelayConfig {
    fn init(&mut self) -> Result<(), DriverError> {
        self.sent = false;
        Ok(())
    }

    fn pack(&mut self, geometry: &Geometry, tx: &mut TxDatagram) -> Result<(), DriverError> {
        if self.is_finished() {
            return Ok(());
        }
        let delays = geometry.mod_delays();
        ModDelay { delays: &delays }.pack(tx);
        self.sent = true;
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.sent
    }
}
