use midair_driver::{cpu::TxDatagram, error::DriverError, geometry::Geometry};

use super::DatagramBody;

/// Distribute the per-transducer cycles and let every CPU re-align to the
/// distributed clock.
#[derive(Default)]
pub struct Synchronize {
    sent: bool,
}

impl DatagramBody for Synchronize {
    fn init(&mut self) -> Result<(), DriverError> {
        self.sent = false;
        Ok(())
    }

    fn pack(&mut self, geometry: &Geometry, tx: &mut TxDatagram) -> Result<(), DriverError> {
        if self.is_finished() {
            return Ok(());
        }
        geometry.mode().pack_sync(geometry, tx)?;
        self.sent = true;
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.sent
    }
}
