use crate::cpu::{CPUControlFlags, TxDatagram};

/// Header half that carries no data; pairs with a body-only operation.
pub struct NullHeader {
    pub msg_id: u8,
}

impl NullHeader {
    pub fn pack(&self, tx: &mut TxDatagram) {
        let header = tx.header_mut();
        header.msg_id = self.msg_id;
        header.cpu_flag.remove(CPUControlFlags::MOD);
        header.cpu_flag.remove(CPUControlFlags::CONFIG_SILENCER);
        header.cpu_flag.remove(CPUControlFlags::CONFIG_SYNC);
        header.size = 0;
    }
}

/// Body half that carries no data; pairs with a header-only operation.
#[derive(Default)]
pub struct NullBody {}

impl NullBody {
    pub fn pack(&self, tx: &mut TxDatagram) {
        tx.header_mut().cpu_flag.remove(CPUControlFlags::WRITE_BODY);
        tx.num_bodies = 0;
    }
}
