mod bessel;
mod focus;
mod grouped;
mod null;
mod plane;

pub use bessel::*;
pub use focus::*;
pub use grouped::*;
pub use null::*;
pub use plane::*;
pub use transducer_test::*;

use midair_driver::{cpu::TxDatagram, error::DriverError, fpga::Drive, geometry::Geometry};

use crate::datagram::DatagramBody;

/// Cached drive data plus the per-send progression state of a gain.
#[derive(Default)]
pub struct GainProps {
    pub built: bool,
    pub phase_sent: bool,
    pub duty_sent: bool,
    pub drives: Vec<Drive>,
}

impl GainProps {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A per-transducer amplitude/phase pattern. Implementors provide
/// [`Gain::calc`]; transmission as one or two frames (depending on the
/// drive mode) is handled by the blanket [`DatagramBody`] impl.
pub trait Gain {
    fn props(&self) -> &GainProps;
    fn props_mut(&mut self) -> &mut GainProps;

    fn calc(&mut self, geometry: &Geometry) -> Result<Vec<Drive>, DriverError>;

    fn build(&mut self, geometry: &Geometry) -> Result<(), DriverError> {
        if self.props().built {
            return Ok(());
        }
        let drives = self.calc(geometry)?;
        debug_assert_eq!(drives.len(), geometry.num_transducers());
        let props = self.props_mut();
        props.drives = drives;
        props.built = true;
        Ok(())
    }

    fn rebuild(&mut self, geometry: &Geometry) -> Result<(), DriverError> {
        self.props_mut().built = false;
        self.build(geometry)
    }

    fn drives(&self) -> &[Drive] {
        &self.props().drives
    }
}

impl Gain for Box<dyn Gain + Send> {
    fn props(&self) -> &GainProps {
        self.as_ref().props()
    }

    fn props_mut(&mut self) -> &mut GainProps {
        self.as_mut().props_mut()
    }

    fn calc(&mut self, geometry: &Geometry) -> Result<Vec<Drive>, DriverError> {
        self.as_mut().calc(geometry)
    }
}

impl<G: Gain> DatagramBody for G {
    fn init(&mut self) -> Result<(), DriverError> {
        let props = self.props_mut();
        props.phase_sent = false;
        props.duty_sent = false;
        Ok(())
    }

    fn pack(&mut self, geometry: &Geometry, tx: &mut TxDatagram) -> Result<(), DriverError> {
        geometry.mode().pack_gain_header(tx);
        if DatagramBody::is_finished(self) {
            return Ok(());
        }
        self.build(geometry)?;

        let GainProps {
            phase_sent,
            duty_sent,
            drives,
            ..
        } = self.props_mut();
        geometry
            .mode()
            .pack_gain_body(phase_sent, duty_sent, drives, geometry, tx);
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.props().phase_sent && self.props().duty_sent
    }
}
