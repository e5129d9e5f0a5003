use crate::{
    cpu::{CPUControlFlags, FocusSTMBodyInitial, FocusSTMBodySubsequent, TxDatagram},
    defined::{float, METER},
    error::DriverError,
    fpga::{
        FPGAControlFlags, STMFocus, FOCUS_STM_BUF_SIZE_MAX, FOCUS_STM_SAMPLING_FREQ_DIV_MIN,
    },
};

/// How many focal points fit into the next frame. The initial frame loses
/// seven body words to the parameter block, subsequent frames one word to
/// the point count.
pub fn focus_stm_send_size(total_size: usize, sent: usize, device_map: &[usize]) -> usize {
    let tr_num = device_map.iter().min().copied().unwrap_or(0);
    let max_size = if sent == 0 {
        tr_num.saturating_sub(7) / 4
    } else {
        tr_num.saturating_sub(1) / 4
    };
    (total_size - sent).min(max_size)
}

#[derive(Default)]
pub struct FocusSTMHeader {}

impl FocusSTMHeader {
    pub fn pack(&self, tx: &mut TxDatagram) {
        let header = tx.header_mut();
        header.cpu_flag.remove(CPUControlFlags::WRITE_BODY);
        header.cpu_flag.remove(CPUControlFlags::STM_BEGIN);
        header.cpu_flag.remove(CPUControlFlags::STM_END);
        header.fpga_flag.insert(FPGAControlFlags::STM_MODE);
        header.fpga_flag.remove(FPGAControlFlags::STM_GAIN_MODE);
        tx.num_bodies = 0;
    }
}

/// One frame of a focal-point stream. `points` holds the slice for this
/// frame already transformed into each device's local coordinates.
pub struct FocusSTMBody<'a> {
    pub points: &'a [Vec<STMFocus>],
    pub total_size: usize,
    pub freq_div: u32,
    pub sound_speed: float,
    pub start_idx: Option<u16>,
    pub finish_idx: Option<u16>,
}

impl FocusSTMBody<'_> {
    pub fn pack(&self, sent: &mut usize, tx: &mut TxDatagram) -> Result<(), DriverError> {
        if self.total_size > FOCUS_STM_BUF_SIZE_MAX {
            tracing::error!("FocusSTM buffer size {} is too large", self.total_size);
            return Err(DriverError::FocusSTMSizeOutOfRange(self.total_size));
        }
        if let Some(idx) = self.start_idx {
            if idx as usize >= self.total_size {
                return Err(DriverError::STMStartIndexOutOfRange);
            }
        }
        if let Some(idx) = self.finish_idx {
            if idx as usize >= self.total_size {
                return Err(DriverError::STMFinishIndexOutOfRange);
            }
        }

        let header = tx.header_mut();
        if self.start_idx.is_some() {
            header.fpga_flag.insert(FPGAControlFlags::USE_STM_START_IDX);
        } else {
            header.fpga_flag.remove(FPGAControlFlags::USE_STM_START_IDX);
        }
        if self.finish_idx.is_some() {
            header.fpga_flag.insert(FPGAControlFlags::USE_STM_FINISH_IDX);
        } else {
            header.fpga_flag.remove(FPGAControlFlags::USE_STM_FINISH_IDX);
        }
        header.cpu_flag.remove(CPUControlFlags::STM_BEGIN);
        header.cpu_flag.remove(CPUControlFlags::STM_END);

        if self.points.is_empty() || self.points[0].is_empty() {
            header.cpu_flag.remove(CPUControlFlags::WRITE_BODY);
            tx.num_bodies = 0;
            return Ok(());
        }

        let send_size = self.points[0].len();

        if *sent == 0 {
            if self.freq_div < FOCUS_STM_SAMPLING_FREQ_DIV_MIN {
                tracing::error!(
                    "FocusSTM frequency division {} is below the minimum {}",
                    self.freq_div,
                    FOCUS_STM_SAMPLING_FREQ_DIV_MIN
                );
                return Err(DriverError::FocusSTMFreqDivOutOfRange(self.freq_div));
            }
            tx.header_mut().cpu_flag.insert(CPUControlFlags::STM_BEGIN);
            let sound_speed = (self.sound_speed / METER * 1024.0).round() as u32;
            (0..tx.num_devices()).for_each(|i| {
                let mut body = FocusSTMBodyInitial::new(tx.body_mut(i));
                body.set_size(self.points[i].len() as u16);
                body.set_freq_div(self.freq_div);
                body.set_sound_speed(sound_speed);
                body.set_start_idx(self.start_idx.unwrap_or(0));
                body.set_finish_idx(self.finish_idx.unwrap_or(0));
                body.set_points(&self.points[i]);
            });
        } else {
            (0..tx.num_devices()).for_each(|i| {
                let mut body = FocusSTMBodySubsequent::new(tx.body_mut(i));
                body.set_size(self.points[i].len() as u16);
                body.set_points(&self.points[i]);
            });
        }

        let header = tx.header_mut();
        header.cpu_flag.insert(CPUControlFlags::WRITE_BODY);
        if *sent + send_size == self.total_size {
            header.cpu_flag.insert(CPUControlFlags::STM_END);
        }

        *sent += send_size;
        tx.num_bodies = tx.num_devices();
        Ok(())
    }
}
