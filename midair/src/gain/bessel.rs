use midair_driver::{
    defined::{float, PI},
    error::DriverError,
    fpga::Drive,
    geometry::{Geometry, UnitQuaternion, Vector3},
};

use super::{Gain, GainProps};

/// Gain that produces a Bessel beam.
pub struct BesselBeam {
    props: GainProps,
    apex: Vector3,
    dir: Vector3,
    theta_z: float,
    amp: float,
}

impl BesselBeam {
    /// `apex` is the apex of the conical wavefront, `dir` the beam
    /// direction, and `theta_z` the angle between the side of the cone
    /// and the plane perpendicular to the beam.
    pub fn new(apex: Vector3, dir: Vector3, theta_z: float) -> Self {
        Self::with_amp(apex, dir, theta_z, 1.0)
    }

    pub fn with_amp(apex: Vector3, dir: Vector3, theta_z: float, amp: float) -> Self {
        Self {
            props: GainProps::new(),
            apex,
            dir,
            theta_z,
            amp,
        }
    }
}

impl Gain for BesselBeam {
    fn props(&self) -> &GainProps {
        &self.props
    }

    fn props_mut(&mut self) -> &mut GainProps {
        &mut self.props
    }

    fn calc(&mut self, geometry: &Geometry) -> Result<Vec<Drive>, DriverError> {
        let dir = self.dir.normalize();
        let v = Vector3::z().cross(&dir);
        let theta_v = v.norm().asin();
        let rot = nalgebra::Unit::try_new(v, 1e-9)
            .map(|axis| UnitQuaternion::from_axis_angle(&axis, -theta_v))
            .unwrap_or_else(UnitQuaternion::identity);

        let sound_speed = geometry.sound_speed;
        Ok(geometry
            .transducers()
            .map(|tr| {
                let r = rot * (tr.position() - self.apex);
                let dist = self.theta_z.sin() * (r.x * r.x + r.y * r.y).sqrt()
                    - self.theta_z.cos() * r.z;
                let phase = tr.align_phase_at(dist, sound_speed) / (2.0 * PI);
                Drive {
                    phase,
                    amp: self.amp,
                }
            })
            .collect())
    }
}
