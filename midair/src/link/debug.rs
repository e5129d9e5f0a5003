use midair_driver::{
    cpu::{RxDatagram, TxDatagram},
    error::DriverError,
    geometry::Geometry,
    link::Link,
};

/// Link that reaches no hardware: every frame is logged and acked
/// immediately.
#[derive(Default)]
pub struct Debug {
    is_open: bool,
    last_msg_id: u8,
}

impl Debug {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Link for Debug {
    fn open(&mut self, geometry: &Geometry) -> Result<(), DriverError> {
        tracing::debug!("Open Debug link ({} devices)", geometry.num_devices());
        self.is_open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), DriverError> {
        tracing::debug!("Close Debug link");
        self.is_open = false;
        Ok(())
    }

    fn send(&mut self, tx: &TxDatagram) -> Result<bool, DriverError> {
        if !self.is_open {
            return Err(DriverError::LinkClosed);
        }
        tracing::debug!(
            "Send {} bytes, msg_id = {:#04x}, fpga_flag = {:?}, cpu_flag = {:?}",
            tx.transmitting_size(),
            tx.header().msg_id,
            tx.header().fpga_flag,
            tx.header().cpu_flag,
        );
        self.last_msg_id = tx.header().msg_id;
        Ok(true)
    }

    fn receive(&mut self, rx: &mut RxDatagram) -> Result<bool, DriverError> {
        if !self.is_open {
            return Err(DriverError::LinkClosed);
        }
        let msg_id = self.last_msg_id;
        rx.iter_mut().for_each(|msg| {
            msg.msg_id = msg_id;
            msg.ack = 0;
        });
        Ok(true)
    }

    fn is_open(&self) -> bool {
        self.is_open
    }
}
