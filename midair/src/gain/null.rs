use midair_driver::{error::DriverError, fpga::Drive, geometry::Geometry};

use super::{Gain, GainProps};

/// Gain that produces nothing.
#[derive(Default)]
pub struct Null {
    props: GainProps,
}

impl Null {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Gain for Null {
    fn props(&self) -> &GainProps {
        &self.props
    }

    fn props_mut(&mut self) -> &mut GainProps {
        &mut self.props
    }

    fn calc(&mut self, geometry: &Geometry) -> Result<Vec<Drive>, DriverError> {
        Ok(vec![
            Drive {
                phase: 0.0,
                amp: 0.0
            };
            geometry.num_transducers()
        ])
    }
}
