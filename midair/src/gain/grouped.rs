use std::collections::HashMap;

use midair_driver::{error::DriverError, fpga::Drive, geometry::Geometry};

use super::{Gain, GainProps};

/// Gain that drives each device with its own sub-gain. Devices without an
/// entry keep zero drives and are never touched by the sub-gains.
#[derive(Default)]
pub struct Grouped {
    props: GainProps,
    gains: HashMap<usize, Box<dyn Gain + Send>>,
}

impl Grouped {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<G: Gain + Send + 'static>(&mut self, device_id: usize, gain: G) {
        self.gains.insert(device_id, Box::new(gain));
    }
}

impl Gain for Grouped {
    fn props(&self) -> &GainProps {
        &self.props
    }

    fn props_mut(&mut self) -> &mut GainProps {
        &mut self.props
    }

    fn calc(&mut self, geometry: &Geometry) -> Result<Vec<Drive>, DriverError> {
        let mut drives = vec![Drive::default(); geometry.num_transducers()];

        let device_map = geometry.device_map();
        for (&device_id, gain) in self.gains.iter_mut() {
            if device_id >= device_map.len() {
                return Err(DriverError::GainError(format!(
                    "Device id {device_id} is out of range"
                )));
            }
            gain.build(geometry)?;

            let start = device_map[..device_id].iter().sum::<usize>();
            let n = device_map[device_id];
            drives[start..start + n].copy_from_slice(&gain.drives()[start..start + n]);
        }

        Ok(drives)
    }
}
