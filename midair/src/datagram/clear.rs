use midair_driver::{cpu::TxDatagram, error::DriverError, operation};

use super::DatagramHeader;

/// Reset every device to its power-on state. Sent under the reserved
/// message id, so the per-frame id is ignored.
#[derive(Default)]
pub struct Clear {}

impl DatagramHeader for Clear {
    fn init(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    fn pack(&mut self, _msg_id: u8, tx: &mut TxDatagram) -> Result<(), DriverError> {
        operation::Clear::default().pack(tx);
        Ok(())
    }

    fn is_finished(&self) -> bool {
        true
    }
}
