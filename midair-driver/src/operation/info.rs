use crate::cpu::{
    CPUControlFlags, TxDatagram, MSG_RD_CPU_VERSION, MSG_RD_FPGA_FUNCTION, MSG_RD_FPGA_VERSION,
};

// The reserved message ids also overwrite the cpu flag byte; firmware
// older than v1.9 dispatched on that byte instead of the id.

#[derive(Default)]
pub struct CPUVersion {}

impl CPUVersion {
    pub fn pack(&self, tx: &mut TxDatagram) {
        tx.header_mut().msg_id = MSG_RD_CPU_VERSION;
        tx.header_mut().cpu_flag = CPUControlFlags::from_bits_retain(MSG_RD_CPU_VERSION);
    }
}

#[derive(Default)]
pub struct FPGAVersion {}

impl FPGAVersion {
    pub fn pack(&self, tx: &mut TxDatagram) {
        tx.header_mut().msg_id = MSG_RD_FPGA_VERSION;
        tx.header_mut().cpu_flag = CPUControlFlags::from_bits_retain(MSG_RD_FPGA_VERSION);
    }
}

#[derive(Default)]
pub struct FPGAFunctions {}

impl FPGAFunctions {
    pub fn pack(&self, tx: &mut TxDatagram) {
        tx.header_mut().msg_id = MSG_RD_FPGA_FUNCTION;
        tx.header_mut().cpu_flag = CPUControlFlags::from_bits_retain(MSG_RD_FPGA_FUNCTION);
    }
}
