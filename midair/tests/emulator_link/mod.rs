use midair_driver::{
    cpu::{RxDatagram, TxDatagram},
    error::DriverError,
    geometry::Geometry,
    link::Link,
};
use midair_firmware_emulator::CPUEmulator;

/// Link backed by one emulated CPU/FPGA pair per device. Every send runs
/// one tick on each device; acks are read back on receive.
pub struct Emulator {
    cpus: Vec<CPUEmulator>,
    sent_msg_ids: Vec<u8>,
    drop_acks: bool,
    is_open: bool,
}

impl Emulator {
    pub fn new() -> Self {
        Self {
            cpus: Vec::new(),
            sent_msg_ids: Vec::new(),
            drop_acks: false,
            is_open: false,
        }
    }

    pub fn cpu(&self, idx: usize) -> &CPUEmulator {
        &self.cpus[idx]
    }

    pub fn sent_msg_ids(&self) -> &[u8] {
        &self.sent_msg_ids
    }

    /// Simulate lost acks: `receive` reports nothing until reset.
    pub fn set_drop_acks(&mut self, drop: bool) {
        self.drop_acks = drop;
    }
}

impl Link for Emulator {
    fn open(&mut self, geometry: &Geometry) -> Result<(), DriverError> {
        self.cpus = geometry
            .device_map()
            .iter()
            .enumerate()
            .map(|(i, &n)| CPUEmulator::new(i, n))
            .collect();
        self.is_open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), DriverError> {
        self.is_open = false;
        Ok(())
    }

    fn send(&mut self, tx: &TxDatagram) -> Result<bool, DriverError> {
        if !self.is_open {
            return Err(DriverError::LinkClosed);
        }
        self.sent_msg_ids.push(tx.header().msg_id);
        self.cpus.iter_mut().for_each(|cpu| {
            cpu.send(tx);
            cpu.update();
        });
        Ok(true)
    }

    fn receive(&mut self, rx: &mut RxDatagram) -> Result<bool, DriverError> {
        if !self.is_open {
            return Err(DriverError::LinkClosed);
        }
        if self.drop_acks {
            return Ok(false);
        }
        rx.iter_mut().zip(self.cpus.iter()).for_each(|(msg, cpu)| {
            msg.msg_id = cpu.msg_id();
            msg.ack = cpu.rx_data();
        });
        Ok(true)
    }

    fn is_open(&self) -> bool {
        self.is_open
    }
}
