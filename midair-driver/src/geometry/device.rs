use nalgebra::{Isometry3, Point3, Translation3};

use crate::{
    defined::float,
    fpga::{is_missing_transducer, NUM_TRANS_IN_UNIT, NUM_TRANS_X, NUM_TRANS_Y, TRANS_SPACING},
};

use super::{Transducer, UnitQuaternion, Vector3};

/// One device unit: 249 transducers on an 18x14 grid with three corner
/// positions unpopulated, enumerated row-major.
pub struct Device {
    transducers: Vec<Transducer>,
    inv: Isometry3<float>,
}

impl Device {
    pub(crate) fn new(id: usize, position: Vector3, rotation: UnitQuaternion) -> Self {
        let transform = Translation3::from(position) * rotation;

        let mut transducers = Vec::with_capacity(NUM_TRANS_IN_UNIT);
        let mut i = id * NUM_TRANS_IN_UNIT;
        for y in 0..NUM_TRANS_Y {
            for x in 0..NUM_TRANS_X {
                if is_missing_transducer(x, y) {
                    continue;
                }
                let local = Point3::new(
                    x as float * TRANS_SPACING,
                    y as float * TRANS_SPACING,
                    0.0,
                );
                transducers.push(Transducer::new(
                    i,
                    transform.transform_point(&local).coords,
                    rotation,
                ));
                i += 1;
            }
        }

        Self {
            transducers,
            inv: transform.inverse(),
        }
    }

    pub fn num_transducers(&self) -> usize {
        self.transducers.len()
    }

    pub fn center(&self) -> Vector3 {
        self.transducers
            .iter()
            .map(|tr| tr.position())
            .sum::<Vector3>()
            / self.transducers.len() as float
    }

    /// Convert a global position into this device's local frame.
    pub fn to_local_position(&self, global_position: &Vector3) -> Vector3 {
        self.inv
            .transform_point(&Point3::from(*global_position))
            .coords
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transducer> {
        self.transducers.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Transducer> {
        self.transducers.iter_mut()
    }
}

impl std::ops::Index<usize> for Device {
    type Output = Transducer;

    fn index(&self, index: usize) -> &Self::Output {
        &self.transducers[index]
    }
}

impl<'a> IntoIterator for &'a Device {
    type Item = &'a Transducer;
    type IntoIter = std::slice::Iter<'a, Transducer>;

    fn into_iter(self) -> Self::IntoIter {
        self.transducers.iter()
    }
}
