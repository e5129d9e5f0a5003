use crate::{
    cpu::{CPUControlFlags, TxDatagram},
    error::DriverError,
    fpga::SILENCER_CYCLE_MIN,
};

/// Configure the silencer smoothing stage with `{step, cycle}`.
pub struct ConfigSilencer {
    pub msg_id: u8,
    pub cycle: u16,
    pub step: u16,
}

impl ConfigSilencer {
    pub fn pack(&self, tx: &mut TxDatagram) -> Result<(), DriverError> {
        if self.cycle < SILENCER_CYCLE_MIN {
            tracing::error!(
                "Silencer cycle {} is below the minimum {}",
                self.cycle,
                SILENCER_CYCLE_MIN
            );
            return Err(DriverError::SilencerCycleOutOfRange(self.cycle));
        }

        let header = tx.header_mut();
        header.msg_id = self.msg_id;
        header.cpu_flag.remove(CPUControlFlags::MOD);
        header.cpu_flag.remove(CPUControlFlags::CONFIG_SYNC);
        header.cpu_flag.insert(CPUControlFlags::CONFIG_SILENCER);
        header.silencer_mut().cycle = self.cycle;
        header.silencer_mut().step = self.step;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fpga::NUM_TRANS_IN_UNIT;

    #[test]
    fn config_silencer() {
        let mut tx = TxDatagram::new(&[NUM_TRANS_IN_UNIT; 10]);

        assert!(ConfigSilencer {
            msg_id: 1,
            cycle: 1044,
            step: 4
        }
        .pack(&mut tx)
        .is_ok());

        assert_eq!(1, tx.header().msg_id);
        assert!(!tx.header().cpu_flag.contains(CPUControlFlags::MOD));
        assert!(!tx.header().cpu_flag.contains(CPUControlFlags::CONFIG_SYNC));
        assert!(tx
            .header()
            .cpu_flag
            .contains(CPUControlFlags::CONFIG_SILENCER));
        assert_eq!(1044, tx.header().silencer().cycle);
        assert_eq!(4, tx.header().silencer().step);
    }

    #[test]
    fn config_silencer_cycle_out_of_range() {
        let mut tx = TxDatagram::new(&[NUM_TRANS_IN_UNIT; 10]);

        assert_eq!(
            Err(DriverError::SilencerCycleOutOfRange(1043)),
            ConfigSilencer {
                msg_id: 1,
                cycle: 1043,
                step: 4
            }
            .pack(&mut tx)
        );
    }
}
