use crate::{
    defined::{float, Complex, PI},
    geometry::Vector3,
};

const DIR_COEF_A: [float; 9] = [
    1.0, 1.0, 1.0, 0.891250938, 0.707945784, 0.501187234, 0.354813389, 0.251188643, 0.199526231,
];
const DIR_COEF_B: [float; 9] = [
    0.,
    0.,
    -0.00459648054721,
    -0.0155520765675,
    -0.0208114779827,
    -0.0182211227016,
    -0.0122437497109,
    -0.00780345575475,
    -0.00312857467007,
];
const DIR_COEF_C: [float; 9] = [
    0.,
    0.,
    -0.000787968093807,
    -0.000307591508224,
    -0.000218348633296,
    0.00047738416141,
    0.000120353137658,
    0.000323676257958,
    0.000143850511,
];
const DIR_COEF_D: [float; 9] = [
    0.,
    0.,
    1.60125528528e-05,
    2.9747624976e-06,
    2.31910931569e-05,
    -1.1901034125e-05,
    6.77743734332e-06,
    -5.99548024824e-06,
    -4.79372835035e-06,
];

pub trait Directivity {
    /// Directivity for a zenith angle given in degrees.
    fn directivity(theta_deg: float) -> float;
}

/// Omnidirectional point source.
pub struct Sphere {}

impl Directivity for Sphere {
    fn directivity(_: float) -> float {
        1.0
    }
}

/// Measured directivity of the T4010A1 transducer, piecewise cubic per
/// 10 degree bin.
pub struct T4010A1 {}

impl Directivity for T4010A1 {
    fn directivity(theta_deg: float) -> float {
        let mut theta_deg = theta_deg.abs();
        while theta_deg > 90.0 {
            theta_deg = (180.0 - theta_deg).abs();
        }
        let i = (theta_deg / 10.0).ceil() as usize;
        if i == 0 {
            return 1.0;
        }
        let a = DIR_COEF_A[i - 1];
        let b = DIR_COEF_B[i - 1];
        let c = DIR_COEF_C[i - 1];
        let d = DIR_COEF_D[i - 1];
        let x = theta_deg - (i - 1) as float * 10.0;
        a + (b + (c + d * x) * x) * x
    }
}

/// Complex sound pressure at `target` radiated from a transducer at
/// `source_pos` facing `source_dir`.
pub fn propagate<D: Directivity>(
    source_pos: &Vector3,
    source_dir: &Vector3,
    attenuation: float,
    wavenumber: float,
    target: &Vector3,
) -> Complex {
    let diff = target - source_pos;
    let dist = diff.norm();

    let theta = source_dir.cross(&diff).norm().atan2(source_dir.dot(&diff)) * 180.0 / PI;

    let d = D::directivity(theta);
    let r = d * (-dist * attenuation).exp() / dist;
    let phi = -wavenumber * dist;
    Complex::new(r * phi.cos(), r * phi.sin())
}
