use crate::{cpu::TxDatagram, fpga::FPGAControlFlags};

pub struct ForceFan {
    pub value: bool,
}

impl ForceFan {
    pub fn pack(&self, tx: &mut TxDatagram) {
        if self.value {
            tx.header_mut().fpga_flag.insert(FPGAControlFlags::FORCE_FAN);
        } else {
            tx.header_mut().fpga_flag.remove(FPGAControlFlags::FORCE_FAN);
        }
    }
}

pub struct ReadsFPGAInfo {
    pub value: bool,
}

impl ReadsFPGAInfo {
    pub fn pack(&self, tx: &mut TxDatagram) {
        if self.value {
            tx.header_mut()
                .fpga_flag
                .insert(FPGAControlFlags::READS_FPGA_INFO);
        } else {
            tx.header_mut()
                .fpga_flag
                .remove(FPGAControlFlags::READS_FPGA_INFO);
        }
    }
}
