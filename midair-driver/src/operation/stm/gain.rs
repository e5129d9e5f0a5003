use crate::{
    cpu::{CPUControlFlags, GainSTMBodyInitial, GainSTMMode, TxDatagram},
    error::DriverError,
    fpga::{
        Drive, Duty, FPGAControlFlags, LegacyDrive, Phase, GAIN_STM_BUF_SIZE_MAX,
        GAIN_STM_LEGACY_BUF_SIZE_MAX, GAIN_STM_SAMPLING_FREQ_DIV_MIN,
    },
};

#[derive(Default)]
pub struct GainSTMLegacyHeader {}

impl GainSTMLegacyHeader {
    pub fn pack(&self, tx: &mut TxDatagram) {
        let header = tx.header_mut();
        header.cpu_flag.remove(CPUControlFlags::WRITE_BODY);
        header.cpu_flag.remove(CPUControlFlags::STM_BEGIN);
        header.cpu_flag.remove(CPUControlFlags::STM_END);
        header.fpga_flag.insert(FPGAControlFlags::LEGACY_MODE);
        header.fpga_flag.insert(FPGAControlFlags::STM_MODE);
        header.fpga_flag.insert(FPGAControlFlags::STM_GAIN_MODE);
        tx.num_bodies = 0;
    }
}

#[derive(Default)]
pub struct GainSTMAdvancedHeader {}

impl GainSTMAdvancedHeader {
    pub fn pack(&self, tx: &mut TxDatagram) {
        let header = tx.header_mut();
        header.cpu_flag.remove(CPUControlFlags::WRITE_BODY);
        header.cpu_flag.remove(CPUControlFlags::STM_BEGIN);
        header.cpu_flag.remove(CPUControlFlags::STM_END);
        header.fpga_flag.remove(FPGAControlFlags::LEGACY_MODE);
        header.fpga_flag.insert(FPGAControlFlags::STM_MODE);
        header.fpga_flag.insert(FPGAControlFlags::STM_GAIN_MODE);
        tx.num_bodies = 0;
    }
}

fn pack_idx_flags(
    tx: &mut TxDatagram,
    size: usize,
    start_idx: Option<u16>,
    finish_idx: Option<u16>,
) -> Result<(), DriverError> {
    if let Some(idx) = start_idx {
        if idx as usize >= size {
            return Err(DriverError::STMStartIndexOutOfRange);
        }
    }
    if let Some(idx) = finish_idx {
        if idx as usize >= size {
            return Err(DriverError::STMFinishIndexOutOfRange);
        }
    }
    let header = tx.header_mut();
    if start_idx.is_some() {
        header.fpga_flag.insert(FPGAControlFlags::USE_STM_START_IDX);
    } else {
        header.fpga_flag.remove(FPGAControlFlags::USE_STM_START_IDX);
    }
    if finish_idx.is_some() {
        header.fpga_flag.insert(FPGAControlFlags::USE_STM_FINISH_IDX);
    } else {
        header.fpga_flag.remove(FPGAControlFlags::USE_STM_FINISH_IDX);
    }
    Ok(())
}

/// One frame of a legacy gain stream. The first frame carries only the
/// parameter block; each further frame carries one, two, or four gains
/// depending on `mode`. `sent` counts the initial frame plus the gains
/// already on the wire.
pub struct GainSTMLegacyBody<'a> {
    pub drives: &'a [Vec<Drive>],
    pub freq_div: u32,
    pub mode: GainSTMMode,
    pub start_idx: Option<u16>,
    pub finish_idx: Option<u16>,
}

impl GainSTMLegacyBody<'_> {
    pub fn pack(&self, sent: &mut usize, tx: &mut TxDatagram) -> Result<(), DriverError> {
        if self.drives.len() > GAIN_STM_LEGACY_BUF_SIZE_MAX {
            tracing::error!("GainSTM buffer size {} is too large", self.drives.len());
            return Err(DriverError::GainSTMLegacySizeOutOfRange(self.drives.len()));
        }
        pack_idx_flags(tx, self.drives.len(), self.start_idx, self.finish_idx)?;

        let header = tx.header_mut();
        header.cpu_flag.remove(CPUControlFlags::STM_BEGIN);
        header.cpu_flag.remove(CPUControlFlags::STM_END);
        header.cpu_flag.insert(CPUControlFlags::WRITE_BODY);

        if *sent == 0 {
            if self.freq_div < GAIN_STM_SAMPLING_FREQ_DIV_MIN {
                tracing::error!(
                    "GainSTM frequency division {} is below the minimum {}",
                    self.freq_div,
                    GAIN_STM_SAMPLING_FREQ_DIV_MIN
                );
                return Err(DriverError::GainSTMFreqDivOutOfRange(self.freq_div));
            }
            tx.header_mut().cpu_flag.insert(CPUControlFlags::STM_BEGIN);
            (0..tx.num_devices()).for_each(|i| {
                let mut body = GainSTMBodyInitial::new(tx.body_mut(i));
                body.set_freq_div(self.freq_div);
                body.set_mode(self.mode);
                body.set_cycle(self.drives.len());
                body.set_start_idx(self.start_idx.unwrap_or(0));
                body.set_finish_idx(self.finish_idx.unwrap_or(0));
            });
            *sent += 1;
        } else {
            let base = *sent - 1;
            let remaining = self.drives.len() - base;
            match self.mode {
                GainSTMMode::PhaseDutyFull => {
                    tx.bodies_raw_mut()
                        .iter_mut()
                        .zip(self.drives[base].iter())
                        .for_each(|(dst, d)| {
                            *dst = ((LegacyDrive::to_duty(d) as u16) << 8)
                                | LegacyDrive::to_phase(d) as u16;
                        });
                    *sent += 1;
                }
                GainSTMMode::PhaseFull => {
                    let packed = remaining.min(2);
                    tx.bodies_raw_mut().iter_mut().enumerate().for_each(|(i, dst)| {
                        let mut word = 0u16;
                        (0..packed).for_each(|k| {
                            let phase = LegacyDrive::to_phase(&self.drives[base + k][i]) as u16;
                            word |= phase << (8 * k);
                        });
                        *dst = word;
                    });
                    *sent += packed;
                }
                GainSTMMode::PhaseHalf => {
                    let packed = remaining.min(4);
                    tx.bodies_raw_mut().iter_mut().enumerate().for_each(|(i, dst)| {
                        let mut word = 0u16;
                        (0..packed).for_each(|k| {
                            let phase =
                                (LegacyDrive::to_phase(&self.drives[base + k][i]) >> 4) as u16;
                            word |= phase << (4 * k);
                        });
                        *dst = word;
                    });
                    *sent += packed;
                }
            }
        }

        if *sent > self.drives.len() {
            tx.header_mut().cpu_flag.insert(CPUControlFlags::STM_END);
        }
        tx.num_bodies = tx.num_devices();
        Ok(())
    }
}

/// Phase frame of an advanced gain stream. `sent == 0` packs the
/// parameter block instead of drive data; the caller advances the cursor.
pub struct GainSTMAdvancedPhaseBody<'a> {
    pub drives: &'a [Vec<Drive>],
    pub cycles: &'a [u16],
    pub sent: usize,
    pub freq_div: u32,
    pub mode: GainSTMMode,
    pub start_idx: Option<u16>,
    pub finish_idx: Option<u16>,
}

impl GainSTMAdvancedPhaseBody<'_> {
    pub fn pack(&self, tx: &mut TxDatagram) -> Result<(), DriverError> {
        if self.drives.len() > GAIN_STM_BUF_SIZE_MAX {
            tracing::error!("GainSTM buffer size {} is too large", self.drives.len());
            return Err(DriverError::GainSTMSizeOutOfRange(self.drives.len()));
        }
        pack_idx_flags(tx, self.drives.len(), self.start_idx, self.finish_idx)?;

        let header = tx.header_mut();
        header.cpu_flag.remove(CPUControlFlags::STM_BEGIN);
        header.cpu_flag.remove(CPUControlFlags::STM_END);
        header.cpu_flag.remove(CPUControlFlags::IS_DUTY);
        header.cpu_flag.insert(CPUControlFlags::WRITE_BODY);

        if self.sent == 0 {
            if self.freq_div < GAIN_STM_SAMPLING_FREQ_DIV_MIN {
                tracing::error!(
                    "GainSTM frequency division {} is below the minimum {}",
                    self.freq_div,
                    GAIN_STM_SAMPLING_FREQ_DIV_MIN
                );
                return Err(DriverError::GainSTMFreqDivOutOfRange(self.freq_div));
            }
            tx.header_mut().cpu_flag.insert(CPUControlFlags::STM_BEGIN);
            (0..tx.num_devices()).for_each(|i| {
                let mut body = GainSTMBodyInitial::new(tx.body_mut(i));
                body.set_freq_div(self.freq_div);
                body.set_mode(self.mode);
                body.set_cycle(self.drives.len());
                body.set_start_idx(self.start_idx.unwrap_or(0));
                body.set_finish_idx(self.finish_idx.unwrap_or(0));
            });
        } else {
            let gain = &self.drives[self.sent - 1];
            tx.bodies_raw_mut()
                .iter_mut()
                .zip(gain.iter().zip(self.cycles.iter()))
                .for_each(|(dst, (d, &cycle))| *dst = Phase::to_phase(d, cycle));
        }

        if self.sent == self.drives.len() {
            tx.header_mut().cpu_flag.insert(CPUControlFlags::STM_END);
        }
        tx.num_bodies = tx.num_devices();
        Ok(())
    }
}

/// Duty frame of an advanced gain stream.
pub struct GainSTMAdvancedDutyBody<'a> {
    pub drives: &'a [Vec<Drive>],
    pub cycles: &'a [u16],
    pub sent: usize,
}

impl GainSTMAdvancedDutyBody<'_> {
    pub fn pack(&self, tx: &mut TxDatagram) -> Result<(), DriverError> {
        if self.drives.len() > GAIN_STM_BUF_SIZE_MAX {
            tracing::error!("GainSTM buffer size {} is too large", self.drives.len());
            return Err(DriverError::GainSTMSizeOutOfRange(self.drives.len()));
        }

        let header = tx.header_mut();
        header.cpu_flag.remove(CPUControlFlags::STM_BEGIN);
        header.cpu_flag.remove(CPUControlFlags::STM_END);
        header.cpu_flag.insert(CPUControlFlags::IS_DUTY);
        header.cpu_flag.insert(CPUControlFlags::WRITE_BODY);

        let gain = &self.drives[self.sent - 1];
        tx.bodies_raw_mut()
            .iter_mut()
            .zip(gain.iter().zip(self.cycles.iter()))
            .for_each(|(dst, (d, &cycle))| *dst = Duty::to_duty(d, cycle));

        if self.sent == self.drives.len() {
            tx.header_mut().cpu_flag.insert(CPUControlFlags::STM_END);
        }
        tx.num_bodies = tx.num_devices();
        Ok(())
    }
}
