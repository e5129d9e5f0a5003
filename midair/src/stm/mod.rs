mod focus;
mod gain;

pub use focus::*;
pub use gain::*;

use midair_driver::{defined::float, fpga::FPGA_CLK_FREQ};

/// Common frequency handling of the hardware-timed streaming modes.
pub trait STM {
    fn size(&self) -> usize;

    fn sampling_frequency_division(&self) -> u32;
    fn set_sampling_frequency_division(&mut self, freq_div: u32);

    /// Set the repetition frequency of the whole pattern. Hardware
    /// constraints quantize it; the actual frequency is returned.
    fn set_frequency(&mut self, freq: float) -> float {
        let sample_freq = self.size() as float * freq;
        self.set_sampling_frequency_division(
            (FPGA_CLK_FREQ as float / sample_freq).round() as u32
        );
        self.frequency()
    }

    fn frequency(&self) -> float {
        self.sampling_frequency() / self.size() as float
    }

    fn sampling_frequency(&self) -> float {
        FPGA_CLK_FREQ as float / self.sampling_frequency_division() as float
    }
}
