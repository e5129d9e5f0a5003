use midair_driver::{
    cpu::TxDatagram,
    defined::float,
    error::DriverError,
    fpga::Drive,
    geometry::Geometry,
    operation::{GainAdvancedDutyBody, GainAdvancedHeader},
};

use super::DatagramBody;

/// Uniform amplitude for every transducer, written as an advanced duty
/// frame. Pairs with AdvancedPhase mode, where gains carry phase only.
pub struct Amplitudes {
    pub amp: float,
    sent: bool,
}

impl Amplitudes {
    pub const fn new(amp: float) -> Self {
        Self { amp, sent: false }
    }
}

impl DatagramBody for Amplitudes {
    fn init(&mut self) -> Result<(), DriverError> {
        self.sent = false;
        Ok(())
    }

    fn pack(&mut self, geometry: &Geometry, tx: &mut TxDatagram) -> Result<(), DriverError> {
        GainAdvancedHeader::default().pack(tx);
        if self.is_finished() {
            return Ok(());
        }

        let drives = vec![
            Drive {
                phase: 0.0,
                amp: self.amp,
            };
            geometry.num_transducers()
        ];
        let cycles = geometry.cycles();
        GainAdvancedDutyBody {
            drives: &drives,
            cycles: &cycles,
        }
        .pack(tx);
        self.sent = true;
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.sent
    }
}
