use crate::{
    cpu::{CPUControlFlags, TxDatagram},
    fpga::{Drive, Duty, FPGAControlFlags, LegacyDrive, Phase},
};

/// Header frame announcing legacy-mode drives; clears STM mode.
#[derive(Default)]
pub struct GainLegacyHeader {}

impl GainLegacyHeader {
    pub fn pack(&self, tx: &mut TxDatagram) {
        let header = tx.header_mut();
        header.cpu_flag.remove(CPUControlFlags::WRITE_BODY);
        header.cpu_flag.remove(CPUControlFlags::MOD_DELAY);
        header.fpga_flag.insert(FPGAControlFlags::LEGACY_MODE);
        header.fpga_flag.remove(FPGAControlFlags::STM_MODE);
        tx.num_bodies = 0;
    }
}

/// Header frame announcing advanced-mode drives; clears STM mode.
#[derive(Default)]
pub struct GainAdvancedHeader {}

impl GainAdvancedHeader {
    pub fn pack(&self, tx: &mut TxDatagram) {
        let header = tx.header_mut();
        header.cpu_flag.remove(CPUControlFlags::WRITE_BODY);
        header.cpu_flag.remove(CPUControlFlags::MOD_DELAY);
        header.fpga_flag.remove(FPGAControlFlags::LEGACY_MODE);
        header.fpga_flag.remove(FPGAControlFlags::STM_MODE);
        tx.num_bodies = 0;
    }
}

/// One body word per transducer: packed 8-bit phase and duty.
pub struct GainLegacyBody<'a> {
    pub drives: &'a [Drive],
}

impl GainLegacyBody<'_> {
    pub fn pack(&self, tx: &mut TxDatagram) {
        debug_assert_eq!(self.drives.len(), tx.num_transducers());

        tx.header_mut().cpu_flag.insert(CPUControlFlags::WRITE_BODY);

        tx.bodies_raw_mut()
            .iter_mut()
            .zip(self.drives.iter())
            .for_each(|(dst, d)| {
                *dst = ((LegacyDrive::to_duty(d) as u16) << 8) | LegacyDrive::to_phase(d) as u16;
            });
        tx.num_bodies = tx.num_devices();
    }
}

/// Duty half of an advanced-mode drive write.
pub struct GainAdvancedDutyBody<'a> {
    pub drives: &'a [Drive],
    pub cycles: &'a [u16],
}

impl GainAdvancedDutyBody<'_> {
    pub fn pack(&self, tx: &mut TxDatagram) {
        debug_assert_eq!(self.drives.len(), tx.num_transducers());

        let header = tx.header_mut();
        header.cpu_flag.insert(CPUControlFlags::IS_DUTY);
        header.cpu_flag.insert(CPUControlFlags::WRITE_BODY);

        tx.bodies_raw_mut()
            .iter_mut()
            .zip(self.drives.iter().zip(self.cycles.iter()))
            .for_each(|(dst, (d, &cycle))| *dst = Duty::to_duty(d, cycle));
        tx.num_bodies = tx.num_devices();
    }
}

/// Phase half of an advanced-mode drive write.
pub struct GainAdvancedPhaseBody<'a> {
    pub drives: &'a [Drive],
    pub cycles: &'a [u16],
}

impl GainAdvancedPhaseBody<'_> {
    pub fn pack(&self, tx: &mut TxDatagram) {
        debug_assert_eq!(self.drives.len(), tx.num_transducers());

        let header = tx.header_mut();
        header.cpu_flag.remove(CPUControlFlags::IS_DUTY);
        header.cpu_flag.insert(CPUControlFlags::WRITE_BODY);

        tx.bodies_raw_mut()
            .iter_mut()
            .zip(self.drives.iter().zip(self.cycles.iter()))
            .for_each(|(dst, (d, &cycle))| *dst = Phase::to_phase(d, cycle));
        tx.num_bodies = tx.num_devices();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fpga::NUM_TRANS_IN_UNIT;
    use rand::prelude::*;

    fn random_drives(n: usize) -> Vec<Drive> {
        let mut rng = rand::thread_rng();
        (0..n)
            .map(|_| Drive {
                phase: rng.gen_range(0.0..1.0),
                amp: rng.gen_range(0.0..1.0),
            })
            .collect()
    }

    #[test]
    fn legacy_header() {
        let mut tx = TxDatagram::new(&[NUM_TRANS_IN_UNIT; 10]);

        GainLegacyHeader::default().pack(&mut tx);

        assert!(!tx.header().cpu_flag.contains(CPUControlFlags::WRITE_BODY));
        assert!(tx.header().fpga_flag.contains(FPGAControlFlags::LEGACY_MODE));
        assert!(!tx.header().fpga_flag.contains(FPGAControlFlags::STM_MODE));
        assert_eq!(0, tx.num_bodies);
    }

    #[test]
    fn legacy_body() {
        let mut tx = TxDatagram::new(&[NUM_TRANS_IN_UNIT; 10]);

        let drives = random_drives(NUM_TRANS_IN_UNIT * 10);
        GainLegacyBody { drives: &drives }.pack(&mut tx);

        assert!(tx.header().cpu_flag.contains(CPUControlFlags::WRITE_BODY));
        tx.bodies_raw()
            .iter()
            .zip(drives.iter())
            .for_each(|(&word, d)| {
                assert_eq!(LegacyDrive::to_phase(d) as u16, word & 0xFF);
                assert_eq!(LegacyDrive::to_duty(d) as u16, word >> 8);
            });
        assert_eq!(10, tx.num_bodies);
    }

    #[test]
    fn advanced_header() {
        let mut tx = TxDatagram::new(&[NUM_TRANS_IN_UNIT; 10]);

        GainAdvancedHeader::default().pack(&mut tx);

        assert!(!tx.header().cpu_flag.contains(CPUControlFlags::WRITE_BODY));
        assert!(!tx.header().fpga_flag.contains(FPGAControlFlags::LEGACY_MODE));
        assert!(!tx.header().fpga_flag.contains(FPGAControlFlags::STM_MODE));
        assert_eq!(0, tx.num_bodies);
    }

    #[test]
    fn advanced_duty_body() {
        let mut tx = TxDatagram::new(&[NUM_TRANS_IN_UNIT; 10]);

        let drives = random_drives(NUM_TRANS_IN_UNIT * 10);
        let cycles = vec![4096; NUM_TRANS_IN_UNIT * 10];
        GainAdvancedDutyBody {
            drives: &drives,
            cycles: &cycles,
        }
        .pack(&mut tx);

        assert!(tx.header().cpu_flag.contains(CPUControlFlags::IS_DUTY));
        assert!(tx.header().cpu_flag.contains(CPUControlFlags::WRITE_BODY));
        tx.bodies_raw()
            .iter()
            .zip(drives.iter())
            .for_each(|(&word, d)| assert_eq!(Duty::to_duty(d, 4096), word));
        assert_eq!(10, tx.num_bodies);
    }

    #[test]
    fn advanced_phase_body() {
        let mut tx = TxDatagram::new(&[NUM_TRANS_IN_UNIT; 10]);

        let drives = random_drives(NUM_TRANS_IN_UNIT * 10);
        let cycles = vec![4096; NUM_TRANS_IN_UNIT * 10];
        GainAdvancedPhaseBody {
            drives: &drives,
            cycles: &cycles,
        }
        .pack(&mut tx);

        assert!(!tx.header().cpu_flag.contains(CPUControlFlags::IS_DUTY));
        assert!(tx.header().cpu_flag.contains(CPUControlFlags::WRITE_BODY));
        tx.bodies_raw()
            .iter()
            .zip(drives.iter())
            .for_each(|(&word, d)| assert_eq!(Phase::to_phase(d, 4096), word));
        assert_eq!(10, tx.num_bodies);
    }
}
