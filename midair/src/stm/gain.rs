use midair_driver::{
    cpu::TxDatagram,
    error::DriverError,
    fpga::Drive,
    geometry::Geometry,
    operation::GainSTMMode,
};

use crate::{datagram::DatagramBody, gain::Gain};

use super::STM;

/// Hardware-timed stream of full gains. Frame cadence depends on the
/// drive mode and on `mode`: legacy PhaseFull packs two gains per frame
/// and PhaseHalf four; advanced PhaseDutyFull alternates phase and duty
/// frames.
pub struct GainSTM {
    gains: Vec<Box<dyn Gain + Send>>,
    drives: Vec<Vec<Drive>>,
    built: bool,
    freq_div: u32,
    pub mode: GainSTMMode,
    pub start_idx: Option<u16>,
    pub finish_idx: Option<u16>,
    sent: usize,
    next_duty: bool,
}

impl GainSTM {
    pub fn new() -> Self {
        Self {
            gains: Vec::new(),
            drives: Vec::new(),
            built: false,
            freq_div: 4096,
            mode: GainSTMMode::PhaseDutyFull,
            start_idx: None,
            finish_idx: None,
            sent: 0,
            next_duty: false,
        }
    }

    pub fn add<G: Gain + Send + 'static>(&mut self, gain: G) {
        self.gains.push(Box::new(gain));
        self.built = false;
    }
}

impl Default for GainSTM {
    fn default() -> Self {
        Self::new()
    }
}

impl STM for GainSTM {
    fn size(&self) -> usize {
        self.gains.len()
    }

    fn sampling_frequency_division(&self) -> u32 {
        self.freq_div
    }

    fn set_sampling_frequency_division(&mut self, freq_div: u32) {
        self.freq_div = freq_div;
    }
}

impl DatagramBody for GainSTM {
    fn init(&mut self) -> Result<(), DriverError> {
        self.sent = 0;
        self.next_duty = false;
        Ok(())
    }

    fn pack(&mut self, geometry: &Geometry, tx: &mut TxDatagram) -> Result<(), DriverError> {
        geometry.mode().pack_stm_gain_header(tx);
        if DatagramBody::is_finished(self) {
            return Ok(());
        }

        if !self.built {
            self.drives = self
                .gains
                .iter_mut()
                .map(|gain| {
                    gain.build(geometry)?;
                    Ok(gain.drives().to_vec())
                })
                .collect::<Result<Vec<_>, DriverError>>()?;
            self.built = true;
        }

        geometry.mode().pack_stm_gain_body(
            &mut self.sent,
            &mut self.next_duty,
            self.freq_div,
            &self.drives,
            geometry,
            self.mode,
            self.start_idx,
            self.finish_idx,
            tx,
        )
    }

    fn is_finished(&self) -> bool {
        self.sent == self.gains.len() + 1
    }
}
