use num_integer::gcd;

use midair_driver::{
    defined::{float, PI},
    error::DriverError,
};

use super::{ModProps, Modulation};

fn to_duty(amp: float) -> u8 {
    ((amp.clamp(0.0, 1.0).asin() / PI) * 510.0).round() as u8
}

/// Constant envelope (no modulation).
pub struct Static {
    props: ModProps,
    amp: float,
}

impl Static {
    pub fn new(amp: float) -> Self {
        Self {
            props: ModProps::new(),
            amp,
        }
    }
}

impl Default for Static {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Modulation for Static {
    fn props(&self) -> &ModProps {
        &self.props
    }

    fn props_mut(&mut self) -> &mut ModProps {
        &mut self.props
    }

    fn calc(&mut self) -> Result<Vec<u8>, DriverError> {
        Ok(vec![to_duty(self.amp); 2])
    }
}

/// Sine wave in ultrasound amplitude. The buffer length is the smallest
/// integer number of samples holding a whole number of periods.
pub struct Sine {
    props: ModProps,
    freq: i32,
    amp: float,
    offset: float,
}

impl Sine {
    pub fn new(freq: i32) -> Self {
        Self::with_params(freq, 1.0, 0.5)
    }

    /// The amplitude oscillates from `offset - amp / 2` to
    /// `offset + amp / 2`; values outside [0, 1] are clamped.
    pub fn with_params(freq: i32, amp: float, offset: float) -> Self {
        Self {
            props: ModProps::new(),
            freq,
            amp,
            offset,
        }
    }
}

impl Modulation for Sine {
    fn props(&self) -> &ModProps {
        &self.props
    }

    fn props_mut(&mut self) -> &mut ModProps {
        &mut self.props
    }

    fn calc(&mut self) -> Result<Vec<u8>, DriverError> {
        let fs = self.sampling_frequency() as i32;
        let f = self.freq.clamp(1, fs / 2);

        let k = gcd(fs, f);
        let n = (fs / k) as usize;
        let d = (f / k) as usize;

        Ok((0..n)
            .map(|i| {
                let amp = self.amp / 2.0 * (2.0 * PI * (d * i) as float / n as float).sin()
                    + self.offset;
                to_duty(amp)
            })
            .collect())
    }
}

/// Sine wave in squared acoustic pressure, which is proportional to
/// radiation pressure.
pub struct SineSquared {
    props: ModProps,
    freq: i32,
    amp: float,
    offset: float,
}

impl SineSquared {
    pub fn new(freq: i32) -> Self {
        Self::with_params(freq, 1.0, 0.5)
    }

    pub fn with_params(freq: i32, amp: float, offset: float) -> Self {
        Self {
            props: ModProps::new(),
            freq,
            amp,
            offset,
        }
    }
}

impl Modulation for SineSquared {
    fn props(&self) -> &ModProps {
        &self.props
    }

    fn props_mut(&mut self) -> &mut ModProps {
        &mut self.props
    }

    fn calc(&mut self) -> Result<Vec<u8>, DriverError> {
        let fs = self.sampling_frequency() as i32;
        let f = self.freq.clamp(1, fs / 2);

        let k = gcd(fs, f);
        let n = (fs / k) as usize;
        let d = (f / k) as usize;

        Ok((0..n)
            .map(|i| {
                let amp = (self.amp / 2.0 * (2.0 * PI * (d * i) as float / n as float).sin()
                    + self.offset)
                    .sqrt();
                to_duty(amp)
            })
            .collect())
    }
}

/// Sine wave with a non-integer period, kept for compatibility with old
/// firmware tools. One period is rounded to the nearest sample count.
pub struct SineLegacy {
    props: ModProps,
    freq: float,
    amp: float,
    offset: float,
}

impl SineLegacy {
    pub fn new(freq: float) -> Self {
        Self::with_params(freq, 1.0, 0.5)
    }

    pub fn with_params(freq: float, amp: float, offset: float) -> Self {
        Self {
            props: ModProps::new(),
            freq,
            amp,
            offset,
        }
    }
}

impl Modulation for SineLegacy {
    fn props(&self) -> &ModProps {
        &self.props
    }

    fn props_mut(&mut self) -> &mut ModProps {
        &mut self.props
    }

    fn calc(&mut self) -> Result<Vec<u8>, DriverError> {
        let fs = self.sampling_frequency();
        let f = self.freq.min(fs / 2.0);
        let t = (fs / f).round() as usize;
        Ok((0..t)
            .map(|i| {
                let amp =
                    self.offset + 0.5 * self.amp * (2.0 * PI * i as float / t as float).cos();
                to_duty(amp)
            })
            .collect())
    }
}

/// Square wave between `low` and `high` with the given duty ratio.
pub struct Square {
    props: ModProps,
    freq: i32,
    low: float,
    high: float,
    duty: float,
}

impl Square {
    pub fn new(freq: i32) -> Self {
        Self::with_params(freq, 0.0, 1.0, 0.5)
    }

    pub fn with_params(freq: i32, low: float, high: float, duty: float) -> Self {
        Self {
            props: ModProps::new(),
            freq,
            low,
            high,
            duty,
        }
    }
}

impl Modulation for Square {
    fn props(&self) -> &ModProps {
        &self.props
    }

    fn props_mut(&mut self) -> &mut ModProps {
        &mut self.props
    }

    fn calc(&mut self) -> Result<Vec<u8>, DriverError> {
        let fs = self.sampling_frequency() as i32;
        let f = self.freq.clamp(1, fs / 2);

        let k = gcd(fs, f);
        let n = (fs / k) as usize;
        let d = (f / k) as usize;

        let low = to_duty(self.low);
        let high = to_duty(self.high);

        let mut buffer = vec![low; n];
        let mut cursor = 0;
        for i in 0..d {
            let size = (n + i) / d;
            let high_size = (size as float * self.duty).round() as usize;
            buffer[cursor..cursor + high_size].fill(high);
            cursor += size;
        }
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[test]
    #[case(0xFF, 1.0)]
    #[case(85, 0.5)]
    #[case(0xFF, 2.0)]
    #[case(0x00, -1.0)]
    fn static_modulation(#[case] expect: u8, #[case] amp: float) {
        let mut m = Static::new(amp);
        assert_eq!(vec![expect; 2], m.calc().unwrap());
    }

    #[test]
    fn sine() {
        let mut m = Sine::new(150);
        let buffer = m.calc().unwrap();

        let expect = [
            85, 108, 132, 157, 183, 210, 237, 246, 219, 192, 166, 140, 116, 92, 71, 51, 34, 19,
            9, 2, 0, 2, 9, 19, 34, 51, 71, 92, 116, 140, 166, 192, 219, 246, 237, 210, 183, 157,
            132, 108, 85, 64, 45, 29, 16, 6, 1, 0, 4, 12, 24, 39, 57, 78, 100, 124, 149, 175,
            201, 228, 255, 228, 201, 175, 149, 124, 100, 78, 57, 39, 24, 12, 4, 0, 1, 6, 16, 29,
            45, 64,
        ];
        assert_eq!(expect.len(), buffer.len());
        assert_eq!(expect, *buffer);
    }

    #[test]
    fn sine_with_offset() {
        let mut m = Sine::with_params(150, 0.4, 0.2);
        let buffer = m.calc().unwrap();

        let expect = [
            33, 40, 48, 55, 60, 64, 66, 67, 65, 62, 57, 50, 43, 35, 28, 20, 13, 8, 4, 1, 0, 1, 4,
            8, 13, 20, 28, 35, 43, 50, 57, 62, 65, 67, 66, 64, 60, 55, 48, 40, 33, 25, 18, 11, 6,
            2, 0, 0, 2, 5, 10, 16, 23, 30, 38, 45, 52, 58, 63, 66, 67, 66, 63, 58, 52, 45, 38,
            30, 23, 16, 10, 5, 2, 0, 0, 2, 6, 11, 18, 25,
        ];
        assert_eq!(expect.len(), buffer.len());
        assert_eq!(expect, *buffer);
    }

    #[test]
    fn square() {
        let mut m = Square::with_params(150, 0.0, 1.0, 0.5);
        let buffer = m.calc().unwrap();

        assert_eq!(80, buffer.len());
        // the first chunk spans 26 samples: 13 high then 13 low
        assert!(buffer[..13].iter().all(|&v| v == 0xFF));
        assert!(buffer[13..26].iter().all(|&v| v == 0x00));
    }

    #[test]
    fn square_extremes() {
        let mut m = Square::with_params(150, 0.0, 1.0, 1.0);
        assert!(m.calc().unwrap().iter().all(|&v| v == 0xFF));

        let mut m = Square::with_params(150, 0.0, 1.0, 0.0);
        assert!(m.calc().unwrap().iter().all(|&v| v == 0x00));
    }

    #[test]
    fn sine_legacy() {
        let mut m = SineLegacy::new(150.0);
        let buffer = m.calc().unwrap();
        // 4 kHz sampling over one 150 Hz period, rounded to 27 samples
        assert_eq!(27, buffer.len());
        assert_eq!(0xFF, buffer[0]);
    }
}
