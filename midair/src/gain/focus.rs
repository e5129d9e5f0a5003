use midair_driver::{
    defined::{float, PI},
    error::DriverError,
    fpga::Drive,
    geometry::{Geometry, Vector3},
};

use super::{Gain, GainProps};

/// Gain that produces a single focal point.
pub struct Focus {
    props: GainProps,
    point: Vector3,
    amp: float,
}

impl Focus {
    pub fn new(point: Vector3) -> Self {
        Self::with_amp(point, 1.0)
    }

    pub fn with_amp(point: Vector3, amp: float) -> Self {
        Self {
            props: GainProps::new(),
            point,
            amp,
        }
    }
}

impl Gain for Focus {
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
                let dist = (self.point - tr.position()).norm();
                let phase = tr.align_phase_at(dist, sound_speed) / (2.0 * PI);
                Drive {
                    phase,
                    amp: self.amp,
                }
            })
            .collect())
    }
}
