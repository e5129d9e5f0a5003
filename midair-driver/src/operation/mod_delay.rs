use crate::cpu::{CPUControlFlags, TxDatagram};

/// Write per-transducer modulation delays into the mod-delay BRAM region.
pub struct ModDelay<'a> {
    pub delays: &'a [u16],
}

impl ModDelay<'_> {
    pub fn pack(&self, tx: &mut TxDatagram) {
        debug_assert_eq!(self.delays.len(), tx.num_transducers());

        let header = tx.header_mut();
        header.cpu_flag.insert(CPUControlFlags::WRITE_BODY);
        header.cpu_flag.insert(CPUControlFlags::MOD_DELAY);

        tx.bodies_raw_mut().copy_from_slice(self.delays);
        tx.num_bodies = tx.num_devices();
    }
}
