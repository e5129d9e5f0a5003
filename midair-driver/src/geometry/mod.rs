mod device;
mod transducer;

pub use device::*;
pub use transducer::*;

use crate::{
    defined::{float, METER},
    mode::Mode,
};

pub type Vector3 = nalgebra::Vector3<float>;
pub type Vector4 = nalgebra::Vector4<float>;
pub type Quaternion = nalgebra::Quaternion<float>;
pub type UnitQuaternion = nalgebra::UnitQuaternion<float>;

/// All connected devices, plus the process-wide acoustic parameters. The
/// drive mode is fixed at construction and read by every operation that
/// packs drives or cycles.
pub struct Geometry {
    devices: Vec<Device>,
    /// Speed of sound in the configured length unit per second.
    pub sound_speed: float,
    /// Attenuation coefficient in Np per length unit.
    pub attenuation: float,
    mode: Mode,
}

impl Geometry {
    pub fn new(mode: Mode) -> Self {
        Self {
            devices: Vec::new(),
            sound_speed: 340.0 * METER,
            attenuation: 0.0,
            mode,
        }
    }

    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Add a device whose transducer #0 (lower-left corner) sits at
    /// `position`. The transform order is translate then rotate.
    /// `euler_angles` are ZYZ.
    pub fn add_device(&mut self, position: Vector3, euler_angles: Vector3) -> usize {
        let q = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), euler_angles.x)
            * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), euler_angles.y)
            * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), euler_angles.z);
        self.add_device_quaternion(position, q)
    }

    pub fn add_device_quaternion(&mut self, position: Vector3, rotation: UnitQuaternion) -> usize {
        let id = self.devices.len();
        self.devices.push(Device::new(id, position, rotation));
        id
    }

    pub fn num_devices(&self) -> usize {
        self.devices.len()
    }

    pub fn num_transducers(&self) -> usize {
        self.devices.iter().map(|dev| dev.num_transducers()).sum()
    }

    pub fn device_map(&self) -> Vec<usize> {
        self.devices.iter().map(|dev| dev.num_transducers()).collect()
    }

    /// Per-transducer frequency divisors across all devices, in wire order.
    pub fn cycles(&self) -> Vec<u16> {
        self.transducers().map(|tr| tr.cycle()).collect()
    }

    pub fn mod_delays(&self) -> Vec<u16> {
        self.transducers().map(|tr| tr.mod_delay()).collect()
    }

    pub fn center(&self) -> Vector3 {
        if self.devices.is_empty() {
            return Vector3::zeros();
        }
        self.devices.iter().map(|dev| dev.center()).sum::<Vector3>()
            / self.devices.len() as float
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    pub fn transducers(&self) -> impl Iterator<Item = &Transducer> {
        self.devices.iter().flat_map(|dev| dev.iter())
    }

    pub fn transducers_mut(&mut self) -> impl Iterator<Item = &mut Transducer> {
        self.devices.iter_mut().flat_map(|dev| dev.iter_mut())
    }
}

impl std::ops::Index<usize> for Geometry {
    type Output = Device;

    fn index(&self, index: usize) -> &Self::Output {
        &self.devices[index]
    }
}

impl std::ops::IndexMut<usize> for Geometry {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.devices[index]
    }
}
