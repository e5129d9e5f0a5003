use midair_driver::{
    defined::{float, PI},
    error::DriverError,
    fpga::Drive,
    geometry::{Geometry, Vector3},
};

use super::{Gain, GainProps};

/// Gain that produces a plane wave.
pub struct PlaneWave {
    props: GainProps,
    dir: Vector3,
    amp: float,
}

impl PlaneWave {
    pub fn new(dir: Vector3) -> Self {
        Self::with_amp(dir, 1.0)
    }

    pub fn with_amp(dir: Vector3, amp: float) -> Self {
        Self {
            props: GainProps::new(),
            dir,
            amp,
        }
    }
}

impl Gain for PlaneWave {
    fn props(&self) -> &GainProps {
        &self.props
    }

    fn props_mut(&mut self) -> &mut GainProps {
        &mut self.props
    }

    fn calc(&mut self, geometry: &Geometry) -> Result<Vec<Drive>, DriverError> {
        let sound_speed = geometry.sound_speed;
        Ok(geometry
            .transducers()
            .map(|tr| {
                let dist = tr.position().dot(&self.dir);
                let phase = tr.align_phase_at(dist, sound_speed) / (2.0 * PI);
                Drive {
                    phase,
                    amp: self.amp,
                }
            })
            .collect())
    }
}
