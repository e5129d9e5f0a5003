use crate::{
    cpu::{
        CPUControlFlags, TxDatagram, MOD_HEADER_INITIAL_DATA_SIZE, MOD_HEADER_SUBSEQUENT_DATA_SIZE,
    },
    error::DriverError,
    fpga::{MOD_BUF_SIZE_MAX, MOD_SAMPLING_FREQ_DIV_MIN},
};

/// Fragment a modulation envelope into header-payload frames. The first
/// frame carries the sampling frequency division; `sent` advances by the
/// number of payload bytes of each frame.
pub struct Modulation<'a> {
    pub msg_id: u8,
    pub mod_data: &'a [u8],
    pub freq_div: u32,
}

impl Modulation<'_> {
    pub fn pack(&self, sent: &mut usize, tx: &mut TxDatagram) -> Result<(), DriverError> {
        if self.mod_data.len() > MOD_BUF_SIZE_MAX {
            tracing::error!("Modulation buffer size {} is too large", self.mod_data.len());
            return Err(DriverError::ModulationSizeOutOfRange(self.mod_data.len()));
        }
        if self.freq_div < MOD_SAMPLING_FREQ_DIV_MIN {
            tracing::error!(
                "Modulation frequency division {} is below the minimum {}",
                self.freq_div,
                MOD_SAMPLING_FREQ_DIV_MIN
            );
            return Err(DriverError::ModFreqDivOutOfRange(self.freq_div));
        }

        let is_first_frame = *sent == 0;

        let header = tx.header_mut();
        header.msg_id = self.msg_id;
        header.cpu_flag.insert(CPUControlFlags::MOD);
        header.cpu_flag.remove(CPUControlFlags::MOD_BEGIN);
        header.cpu_flag.remove(CPUControlFlags::MOD_END);

        let max_size = if is_first_frame {
            MOD_HEADER_INITIAL_DATA_SIZE
        } else {
            MOD_HEADER_SUBSEQUENT_DATA_SIZE
        };
        let send_size = (self.mod_data.len() - *sent).min(max_size);

        if is_first_frame {
            header.cpu_flag.insert(CPUControlFlags::MOD_BEGIN);
            let initial = header.mod_initial_mut();
            initial.freq_div = self.freq_div;
            initial.data[..send_size].copy_from_slice(&self.mod_data[..send_size]);
        } else {
            let subsequent = header.mod_subsequent_mut();
            subsequent.data[..send_size]
                .copy_from_slice(&self.mod_data[*sent..*sent + send_size]);
        }

        if *sent + send_size == self.mod_data.len() {
            header.cpu_flag.insert(CPUControlFlags::MOD_END);
        }

        header.size = send_size as u8;
        *sent += send_size;
        Ok(())
    }
}
