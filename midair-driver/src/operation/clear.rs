use crate::cpu::{CPUControlFlags, TxDatagram, MSG_CLEAR};

/// Reset all BRAM and control state on every device.
#[derive(Default)]
pub struct Clear {}

impl Clear {
    pub fn pack(&self, tx: &mut TxDatagram) {
        tx.header_mut().msg_id = MSG_CLEAR;
        tx.header_mut().cpu_flag = CPUControlFlags::NONE;
        tx.header_mut().size = 0;
        tx.num_bodies = 0;
    }
}
