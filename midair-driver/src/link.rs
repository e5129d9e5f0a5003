use std::time::Duration;

use crate::{
    cpu::{RxDatagram, TxDatagram},
    error::DriverError,
    geometry::Geometry,
};

/// Transport to the devices. The bus has a single mailbox with at most
/// one frame in flight; `send_receive` is the blocking convenience over
/// that contract.
pub trait Link: Send {
    fn open(&mut self, geometry: &Geometry) -> Result<(), DriverError>;
    fn close(&mut self) -> Result<(), DriverError>;
    fn send(&mut self, tx: &TxDatagram) -> Result<bool, DriverError>;
    fn receive(&mut self, rx: &mut RxDatagram) -> Result<bool, DriverError>;
    fn is_open(&self) -> bool;

    /// Send one frame and wait for every device to echo its message id.
    /// A zero timeout means fire-and-forget: receive once, do not poll.
    fn send_receive(
        &mut self,
        tx: &TxDatagram,
        rx: &mut RxDatagram,
        timeout: Duration,
    ) -> Result<bool, DriverError> {
        if !self.send(tx)? {
            return Ok(false);
        }
        if timeout.is_zero() {
            return self.receive(rx);
        }
        self.wait_msg_processed(tx, rx, timeout)
    }

    fn wait_msg_processed(
        &mut self,
        tx: &TxDatagram,
        rx: &mut RxDatagram,
        timeout: Duration,
    ) -> Result<bool, DriverError> {
        let msg_id = tx.header().msg_id;
        let start = std::time::Instant::now();
        loop {
            if self.receive(rx)? && rx.is_msg_processed(msg_id) {
                return Ok(true);
            }
            if start.elapsed() > timeout {
                return Ok(false);
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

impl Link for Box<dyn Link> {
    fn open(&mut self, geometry: &Geometry) -> Result<(), DriverError> {
        self.as_mut().open(geometry)
    }

    fn close(&mut self) -> Result<(), DriverError> {
        self.as_mut().close()
    }

    fn send(&mut self, tx: &TxDatagram) -> Result<bool, DriverError> {
        self.as_mut().send(tx)
    }

    fn receive(&mut self, rx: &mut RxDatagram) -> Result<bool, DriverError> {
        self.as_mut().receive(rx)
    }

    fn is_open(&self) -> bool {
        self.as_ref().is_open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fpga::NUM_TRANS_IN_UNIT;

    struct MockLink {
        is_open: bool,
        recv_cnt: usize,
        down: bool,
    }

    impl Link for MockLink {
        fn open(&mut self, _: &Geometry) -> Result<(), DriverError> {
            self.is_open = true;
            Ok(())
        }

        fn close(&mut self) -> Result<(), DriverError> {
            self.is_open = false;
            Ok(())
        }

        fn send(&mut self, _: &TxDatagram) -> Result<bool, DriverError> {
            if !self.is_open {
                return Err(DriverError::LinkClosed);
            }
            Ok(!self.down)
        }

        fn receive(&mut self, rx: &mut RxDatagram) -> Result<bool, DriverError> {
            if !self.is_open {
                return Err(DriverError::LinkClosed);
            }
            self.recv_cnt += 1;
            let ack = self.recv_cnt as u8;
            rx.iter_mut().for_each(|r| r.msg_id = ack);
            Ok(!self.down)
        }

        fn is_open(&self) -> bool {
            self.is_open
        }
    }

    #[test]
    fn send_receive() {
        let mut link = MockLink {
            is_open: true,
            recv_cnt: 0,
            down: false,
        };

        let tx = TxDatagram::new(&[NUM_TRANS_IN_UNIT]);
        let mut rx = RxDatagram::new(1);
        assert_eq!(Ok(true), link.send_receive(&tx, &mut rx, Duration::ZERO));

        link.is_open = false;
        assert_eq!(
            Err(DriverError::LinkClosed),
            link.send_receive(&tx, &mut rx, Duration::ZERO)
        );

        link.is_open = true;
        link.down = true;
        assert_eq!(Ok(false), link.send_receive(&tx, &mut rx, Duration::ZERO));
    }

    #[test]
    fn wait_msg_processed() {
        let mut link = MockLink {
            is_open: true,
            recv_cnt: 0,
            down: false,
        };

        let mut tx = TxDatagram::new(&[NUM_TRANS_IN_UNIT]);
        tx.header_mut().msg_id = 2;
        let mut rx = RxDatagram::new(1);

        // the mock acks 1, 2, ... so the second receive matches
        assert_eq!(
            Ok(true),
            link.wait_msg_processed(&tx, &mut rx, Duration::from_millis(100))
        );
        assert_eq!(2, link.recv_cnt);

        tx.header_mut().msg_id = 0;
        assert_eq!(
            Ok(false),
            link.wait_msg_processed(&tx, &mut rx, Duration::from_millis(5))
        );
    }
}
