mod primitive;

pub use primitive::*;

use midair_driver::{
    cpu::TxDatagram, defined::float, error::DriverError, fpga::FPGA_CLK_FREQ, operation,
};

use crate::datagram::DatagramHeader;

/// Sampled envelope buffer plus the transfer cursor.
pub struct ModProps {
    pub buffer: Vec<u8>,
    pub freq_div: u32,
    built: bool,
    sent: usize,
}

impl ModProps {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for ModProps {
    fn default() -> Self {
        Self {
            buffer: Vec::new(),
            freq_div: 40960,
            built: false,
            sent: 0,
        }
    }
}

/// An amplitude envelope broadcast to every transducer, sampled at
/// `FPGA_CLK_FREQ / freq_div`. Implementors provide [`Modulation::calc`];
/// fragmentation over frames comes from the blanket [`DatagramHeader`]
/// impl.
pub trait Modulation {
    fn props(&self) -> &ModProps;
    fn props_mut(&mut self) -> &mut ModProps;

    /// Compute the duty-encoded envelope samples.
    fn calc(&mut self) -> Result<Vec<u8>, DriverError>;

    fn build(&mut self) -> Result<(), DriverError> {
        if self.props().built {
            return Ok(());
        }
        let buffer = self.calc()?;
        let props = self.props_mut();
        props.buffer = buffer;
        props.built = true;
        Ok(())
    }

    fn rebuild(&mut self) -> Result<(), DriverError> {
        self.props_mut().built = false;
        self.build()
    }

    fn buffer(&self) -> &[u8] {
        &self.props().buffer
    }

    fn sampling_frequency_division(&self) -> u32 {
        self.props().freq_div
    }

    fn set_sampling_frequency_division(&mut self, freq_div: u32) {
        self.props_mut().freq_div = freq_div;
    }

    fn sampling_frequency(&self) -> float {
        FPGA_CLK_FREQ as float / self.props().freq_div as float
    }

    fn set_sampling_frequency(&mut self, freq: float) -> float {
        self.props_mut().freq_div = (FPGA_CLK_FREQ as float / freq).round() as u32;
        self.sampling_frequency()
    }
}

impl<M: Modulation> DatagramHeader for M {
    fn init(&mut self) -> Result<(), DriverError> {
        self.props_mut().sent = 0;
        self.build()
    }

    fn pack(&mut self, msg_id: u8, tx: &mut TxDatagram) -> Result<(), DriverError> {
        let props = self.props_mut();
        operation::Modulation {
            msg_id,
            mod_data: &props.buffer,
            freq_div: props.freq_div,
        }
        .pack(&mut props.sent, tx)
    }

    fn is_finished(&self) -> bool {
        self.props().sent == self.props().buffer.len()
    }
}
