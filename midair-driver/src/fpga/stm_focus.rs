use crate::{defined::float, error::DriverError};

use super::{FOCUS_STM_FIXED_NUM_LOWER, FOCUS_STM_FIXED_NUM_UNIT, FOCUS_STM_FIXED_NUM_UPPER};

/// A focal point of FocusSTM packed for the wire: 18-bit signed
/// fixed-point x/y/z in units of [`FOCUS_STM_FIXED_NUM_UNIT`] followed by
/// the 8-bit duty shift. The duty ratio emitted by the FPGA is
/// `cycle >> (duty_shift + 1)`, so `duty_shift == 0` is maximum output.
#[bitfield_struct::bitfield(u64)]
pub struct STMFocus {
    #[bits(18)]
    pub x: i32,
    #[bits(18)]
    pub y: i32,
    #[bits(18)]
    pub z: i32,
    #[bits(8)]
    pub duty_shift: u8,
    #[bits(2)]
    __: u8,
}

impl STMFocus {
    fn to_fixed_num(x: float) -> Result<i32, DriverError> {
        let ix = (x / FOCUS_STM_FIXED_NUM_UNIT).round() as i32;
        if !(FOCUS_STM_FIXED_NUM_LOWER..=FOCUS_STM_FIXED_NUM_UPPER).contains(&ix) {
            return Err(DriverError::FocusSTMPointOutOfRange(x));
        }
        Ok(ix)
    }

    pub fn set(
        &mut self,
        x: float,
        y: float,
        z: float,
        duty_shift: u8,
    ) -> Result<(), DriverError> {
        self.set_x(Self::to_fixed_num(x)?);
        self.set_y(Self::to_fixed_num(y)?);
        self.set_z(Self::to_fixed_num(z)?);
        self.set_duty_shift(duty_shift);
        Ok(())
    }
}
