mod amplitudes;
mod clear;
mod mod_delay;
mod silencer_config;
mod synchronize;

pub use amplitudes::*;
pub use clear::*;
pub use mod_delay::*;
pub use silencer_config::*;
pub use synchronize::*;

use midair_driver::{cpu::TxDatagram, error::DriverError, geometry::Geometry, operation};

/// Data packed into the header half of a frame.
pub trait DatagramHeader {
    fn init(&mut self) -> Result<(), DriverError>;
    fn pack(&mut self, msg_id: u8, tx: &mut TxDatagram) -> Result<(), DriverError>;
    fn is_finished(&self) -> bool;
}

/// Data packed into the body half of a frame.
pub trait DatagramBody {
    fn init(&mut self) -> Result<(), DriverError>;
    fn pack(&mut self, geometry: &Geometry, tx: &mut TxDatagram) -> Result<(), DriverError>;
    fn is_finished(&self) -> bool;
}

#[derive(Default)]
pub struct NullHeader {}

impl DatagramHeader for NullHeader {
    fn init(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    fn pack(&mut self, msg_id: u8, tx: &mut TxDatagram) -> Result<(), DriverError> {
        operation::NullHeader { msg_id }.pack(tx);
        Ok(())
    }

    fn is_finished(&self) -> bool {
        true
    }
}

#[derive(Default)]
pub struct NullBody {}

impl DatagramBody for NullBody {
    fn init(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    fn pack(&mut self, _geometry: &Geometry, tx: &mut TxDatagram) -> Result<(), DriverError> {
        operation::NullBody::default().pack(tx);
        Ok(())
    }

    fn is_finished(&self) -> bool {
        true
    }
}
