use midair_driver::{
    cpu::TxDatagram,
    defined::float,
    error::DriverError,
    fpga::STMFocus,
    geometry::{Geometry, Vector3},
    operation::{focus_stm_send_size, FocusSTMBody, FocusSTMHeader},
};

use crate::datagram::DatagramBody;

use super::STM;

/// Hardware-timed stream of focal points. Points are given in global
/// coordinates; each frame is transformed into every device's local frame
/// before packing.
pub struct FocusSTM {
    points: Vec<(Vector3, u8)>,
    freq_div: u32,
    /// Speed of sound used by the FPGA's on-the-fly phase computation.
    pub sound_speed: float,
    pub start_idx: Option<u16>,
    pub finish_idx: Option<u16>,
    sent: usize,
}

impl FocusSTM {
    pub fn new(sound_speed: float) -> Self {
        Self {
            points: Vec::new(),
            freq_div: 4096,
            sound_speed,
            start_idx: None,
            finish_idx: None,
            sent: 0,
        }
    }

    /// Add a focal point at maximum duty.
    pub fn add(&mut self, point: Vector3) {
        self.add_with_shift(point, 0);
    }

    /// Add a focal point with a duty shift; the duty ratio will be
    /// `50% >> duty_shift`.
    pub fn add_with_shift(&mut self, point: Vector3, duty_shift: u8) {
        self.points.push((point, duty_shift));
    }
}

impl STM for FocusSTM {
    fn size(&self) -> usize {
        self.points.len()
    }

    fn sampling_frequency_division(&self) -> u32 {
        self.freq_div
    }

    fn set_sampling_frequency_division(&mut self, freq_div: u32) {
        self.freq_div = freq_div;
    }
}

impl DatagramBody for FocusSTM {
    fn init(&mut self) -> Result<(), DriverError> {
        self.sent = 0;
        Ok(())
    }

    fn pack(&mut self, geometry: &Geometry, tx: &mut TxDatagram) -> Result<(), DriverError> {
        FocusSTMHeader::default().pack(tx);
        if DatagramBody::is_finished(self) {
            return Ok(());
        }

        let send_size = focus_stm_send_size(self.points.len(), self.sent, &geometry.device_map());
        let src = &self.points[self.sent..self.sent + send_size];

        let points = geometry
            .devices()
            .map(|dev| {
                src.iter()
                    .map(|(p, duty_shift)| {
                        let lp = dev.to_local_position(p);
                        let mut focus = STMFocus::new();
                        focus.set(lp.x, lp.y, lp.z, *duty_shift)?;
                        Ok(focus)
                    })
                    .collect::<Result<Vec<_>, DriverError>>()
            })
            .collect::<Result<Vec<_>, DriverError>>()?;

        FocusSTMBody {
            points: &points,
            total_size: self.points.len(),
            freq_div: self.freq_div,
            sound_speed: self.sound_speed,
            start_idx: self.start_idx,
            finish_idx: self.finish_idx,
        }
        .pack(&mut self.sent, tx)
    }

    fn is_finished(&self) -> bool {
        self.sent == self.points.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use midair_driver::{defined::PI, mode::Mode};

    #[test]
    fn frequency() {
        let mut stm = FocusSTM::new(340e3);
        (0..200).for_each(|i| {
            let theta = 2.0 * PI * i as float / 200.0;
            stm.add(Vector3::new(30.0 * theta.cos(), 30.0 * theta.sin(), 150.0));
        });

        let actual = stm.set_frequency(1.0);
        assert_eq!(819_200, stm.sampling_frequency_division());
        approx::assert_abs_diff_eq!(1.0, actual, epsilon = 1e-9);
        approx::assert_abs_diff_eq!(200.0, stm.sampling_frequency(), epsilon = 1e-9);
    }

    #[test]
    fn fragmentation() {
        let mut geometry = Geometry::new(Mode::Legacy);
        geometry.add_device(Vector3::zeros(), Vector3::zeros());
        let mut tx = TxDatagram::new(&geometry.device_map());

        let mut stm = FocusSTM::new(340e3);
        (0..200).for_each(|i| stm.add(Vector3::new(0.0, 0.0, i as float)));
        stm.set_frequency(1.0);

        DatagramBody::init(&mut stm).unwrap();
        let mut frames = 0;
        while !DatagramBody::is_finished(&stm) {
            DatagramBody::pack(&mut stm, &geometry, &mut tx).unwrap();
            frames += 1;
        }
        // 60 + 62 + 62 + 16 points
        assert_eq!(4, frames);
        assert_eq!(200, stm.sent);

        // a further pack only re-packs the header
        DatagramBody::pack(&mut stm, &geometry, &mut tx).unwrap();
        assert_eq!(200, stm.sent);
    }
}
