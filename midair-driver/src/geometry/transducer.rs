use crate::{
    defined::{float, PI},
    fpga::FPGA_CLK_FREQ,
};

use super::{UnitQuaternion, Vector3};

/// A single ultrasound transducer: position, rotation, modulation delay,
/// and the frequency divisor of the 163.84 MHz master clock.
#[derive(Clone, Debug)]
pub struct Transducer {
    idx: usize,
    pos: Vector3,
    rot: UnitQuaternion,
    mod_delay: u16,
    cycle: u16,
}

impl Transducer {
    pub fn new(idx: usize, pos: Vector3, rot: UnitQuaternion) -> Self {
        Self {
            idx,
            pos,
            rot,
            mod_delay: 0,
            cycle: 4096,
        }
    }

    pub const fn idx(&self) -> usize {
        self.idx
    }

    pub const fn position(&self) -> &Vector3 {
        &self.pos
    }

    pub const fn rotation(&self) -> &UnitQuaternion {
        &self.rot
    }

    pub fn x_direction(&self) -> Vector3 {
        self.rot * Vector3::x()
    }

    pub fn y_direction(&self) -> Vector3 {
        self.rot * Vector3::y()
    }

    pub fn z_direction(&self) -> Vector3 {
        self.rot * Vector3::z()
    }

    pub const fn mod_delay(&self) -> u16 {
        self.mod_delay
    }

    pub fn set_mod_delay(&mut self, delay: u16) {
        self.mod_delay = delay;
    }

    pub const fn cycle(&self) -> u16 {
        self.cycle
    }

    pub fn set_cycle(&mut self, cycle: u16) {
        self.cycle = cycle;
    }

    pub fn frequency(&self) -> float {
        FPGA_CLK_FREQ as float / self.cycle as float
    }

    pub fn set_frequency(&mut self, freq: float) {
        self.set_cycle((FPGA_CLK_FREQ as float / freq).round() as u16);
    }

    pub fn wavelength(&self, sound_speed: float) -> float {
        sound_speed / self.frequency()
    }

    pub fn wavenumber(&self, sound_speed: float) -> float {
        2.0 * PI * self.frequency() / sound_speed
    }

    /// Phase in radians that aligns the wavefront at distance `dist`.
    /// Consumers divide by 2pi before storing the result in a `Drive`.
    pub fn align_phase_at(&self, dist: float, sound_speed: float) -> float {
        dist * self.wavenumber(sound_speed)
    }
}
