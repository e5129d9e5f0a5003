use crate::cpu::{CPUControlFlags, TxDatagram};

/// Copy the per-transducer cycles into the bodies and ask every CPU to
/// re-synchronize against the distributed clock. Cycle validation is mode
/// dependent and happens in [`crate::mode::Mode::pack_sync`].
pub struct Sync<'a> {
    pub cycles: &'a [u16],
}

impl Sync<'_> {
    pub fn pack(&self, tx: &mut TxDatagram) {
        debug_assert_eq!(self.cycles.len(), tx.num_transducers());

        let header = tx.header_mut();
        header.cpu_flag.remove(CPUControlFlags::MOD);
        header.cpu_flag.remove(CPUControlFlags::CONFIG_SILENCER);
        header.cpu_flag.insert(CPUControlFlags::CONFIG_SYNC);

        tx.bodies_raw_mut().copy_from_slice(self.cycles);
        tx.num_bodies = tx.num_devices();
    }
}
