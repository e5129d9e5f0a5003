use std::time::Duration;

use midair_driver::{
    cpu::{RxDatagram, TxDatagram, EC_SYNC0_CYCLE_TIME_MICRO_SEC, MSG_BEGIN, MSG_END},
    error::DriverError,
    firmware_version::FirmwareInfo,
    fpga::FPGAInfo,
    geometry::Geometry,
    link::Link,
    operation,
};

use crate::datagram::{
    Amplitudes, DatagramBody, DatagramHeader, NullBody, NullHeader, SilencerConfig, Synchronize,
};

/// Minimum number of ack polls for operations that reset or re-time the
/// devices.
const SPECIAL_CHECK_TRIALS: usize = 200;

/// Owns the link and the frame buffers and pumps one datagram pair at a
/// time through the send/ack loop.
pub struct Controller<L: Link> {
    geometry: Geometry,
    link: L,
    tx_buf: TxDatagram,
    rx_buf: RxDatagram,
    msg_id: u8,
    /// If true, the fan is forced on.
    pub force_fan: bool,
    /// If true, the devices return the FPGA info byte in every ack.
    pub reads_fpga_info: bool,
    /// If > 0, each frame waits for its ack, polling at most this many
    /// times before the send fails.
    pub check_trials: usize,
    /// Poll/sleep spacing in units of the bus cycle time.
    pub send_interval: usize,
}

impl<L: Link> Controller<L> {
    pub fn open(geometry: Geometry, mut link: L) -> Result<Self, DriverError> {
        link.open(&geometry)?;
        let device_map = geometry.device_map();
        Ok(Self {
            tx_buf: TxDatagram::new(&device_map),
            rx_buf: RxDatagram::new(device_map.len()),
            geometry,
            link,
            msg_id: MSG_END,
            force_fan: false,
            reads_fpga_info: false,
            check_trials: 0,
            send_interval: 1,
        })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn geometry_mut(&mut self) -> &mut Geometry {
        &mut self.geometry
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn is_open(&self) -> bool {
        self.link.is_open()
    }

    /// Send a header datagram paired with an empty body.
    pub fn send_header<H: DatagramHeader>(&mut self, header: &mut H) -> Result<bool, DriverError> {
        let mut body = NullBody::default();
        self.send(header, &mut body)
    }

    /// Send a body datagram paired with an empty header.
    pub fn send_body<B: DatagramBody>(&mut self, body: &mut B) -> Result<bool, DriverError> {
        let mut header = NullHeader::default();
        self.send(&mut header, body)
    }

    /// Send a header/body pair, looping until both report finished. With
    /// `check_trials == 0` no ack is awaited and the result only reflects
    /// transport success.
    pub fn send<H: DatagramHeader, B: DatagramBody>(
        &mut self,
        header: &mut H,
        body: &mut B,
    ) -> Result<bool, DriverError> {
        header.init()?;
        body.init()?;

        loop {
            let msg_id = self.next_id();
            operation::ForceFan {
                value: self.force_fan,
            }
            .pack(&mut self.tx_buf);
            operation::ReadsFPGAInfo {
                value: self.reads_fpga_info,
            }
            .pack(&mut self.tx_buf);

            header.pack(msg_id, &mut self.tx_buf)?;
            body.pack(&self.geometry, &mut self.tx_buf)?;

            if !self.link.send(&self.tx_buf)? {
                return Ok(false);
            }
            let trials = self.wait_msg_processed(self.check_trials)?;
            if self.check_trials != 0 && trials == self.check_trials {
                return Ok(false);
            }
            if header.is_finished() && body.is_finished() {
                return Ok(true);
            }
            if trials == 0 {
                std::thread::sleep(self.interval());
            }
        }
    }

    /// Reset every device. Always verified (at least 200 polls).
    pub fn clear(&mut self) -> Result<bool, DriverError> {
        operation::Clear::default().pack(&mut self.tx_buf);
        if !self.link.send(&self.tx_buf)? {
            return Ok(false);
        }
        let trials = self.check_trials.max(SPECIAL_CHECK_TRIALS);
        Ok(self.wait_msg_processed(trials)? != trials)
    }

    /// Re-synchronize the devices. Always verified (at least 200 polls).
    pub fn synchronize(&mut self) -> Result<bool, DriverError> {
        let msg_id = self.next_id();
        operation::ForceFan {
            value: self.force_fan,
        }
        .pack(&mut self.tx_buf);
        operation::ReadsFPGAInfo {
            value: self.reads_fpga_info,
        }
        .pack(&mut self.tx_buf);
        operation::NullHeader { msg_id }.pack(&mut self.tx_buf);

        let mut sync = Synchronize::default();
        DatagramBody::init(&mut sync)?;
        DatagramBody::pack(&mut sync, &self.geometry, &mut self.tx_buf)?;

        if !self.link.send(&self.tx_buf)? {
            return Ok(false);
        }
        let trials = self.check_trials.max(SPECIAL_CHECK_TRIALS);
        Ok(self.wait_msg_processed(trials)? != trials)
    }

    /// Stop output by disabling smoothing bypass and zeroing amplitudes.
    pub fn stop(&mut self) -> Result<bool, DriverError> {
        let mut config = SilencerConfig::default();
        let mut null = Amplitudes::new(0.0);
        self.send(&mut config, &mut null)
    }

    /// Push the current force-fan / reads-fpga-info flags.
    pub fn update_flag(&mut self) -> Result<bool, DriverError> {
        let mut header = NullHeader::default();
        let mut body = NullBody::default();
        self.send(&mut header, &mut body)
    }

    /// Stop, clear, and close the link.
    pub fn close(&mut self) -> Result<bool, DriverError> {
        if !self.stop()? {
            return Ok(false);
        }
        if !self.clear()? {
            return Ok(false);
        }
        self.link.close()?;
        Ok(true)
    }

    /// The latest FPGA info bytes; requires `reads_fpga_info`.
    pub fn fpga_info(&mut self) -> Result<Vec<FPGAInfo>, DriverError> {
        self.link.receive(&mut self.rx_buf)?;
        Ok(self.rx_buf.iter().map(|rx| FPGAInfo::new(rx.ack)).collect())
    }

    /// Query CPU/FPGA versions and function bits of every device.
    pub fn firmware_infos(&mut self) -> Result<Vec<FirmwareInfo>, DriverError> {
        let cpu_versions = {
            operation::CPUVersion::default().pack(&mut self.tx_buf);
            self.read_back()?
        };
        let fpga_versions = {
            operation::FPGAVersion::default().pack(&mut self.tx_buf);
            self.read_back()?
        };
        let fpga_functions = {
            operation::FPGAFunctions::default().pack(&mut self.tx_buf);
            self.read_back()?
        };

        Ok((0..self.geometry.num_devices())
            .map(|i| {
                FirmwareInfo::new(i, cpu_versions[i], fpga_versions[i], fpga_functions[i])
            })
            .collect())
    }

    fn read_back(&mut self) -> Result<Vec<u8>, DriverError> {
        if !self.link.send(&self.tx_buf)? {
            return Err(DriverError::LinkError("Failed to send".to_string()));
        }
        let trials = self.check_trials.max(SPECIAL_CHECK_TRIALS);
        if self.wait_msg_processed(trials)? == trials {
            return Err(DriverError::LinkError(
                "Failed to read firmware info".to_string(),
            ));
        }
        Ok(self.rx_buf.iter().map(|rx| rx.ack).collect())
    }

    fn next_id(&mut self) -> u8 {
        self.msg_id = if self.msg_id >= MSG_END || self.msg_id < MSG_BEGIN {
            MSG_BEGIN
        } else {
            self.msg_id + 1
        };
        self.msg_id
    }

    fn interval(&self) -> Duration {
        Duration::from_micros(self.send_interval as u64 * EC_SYNC0_CYCLE_TIME_MICRO_SEC)
    }

    fn wait_msg_processed(&mut self, max_trials: usize) -> Result<usize, DriverError> {
        let msg_id = self.tx_buf.header().msg_id;
        for i in 0..max_trials {
            if self.link.receive(&mut self.rx_buf)? && self.rx_buf.is_msg_processed(msg_id) {
                return Ok(i);
            }
            std::thread::sleep(self.interval());
        }
        Ok(max_trials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use midair_driver::{cpu::MSG_BEGIN, geometry::Vector3, mode::Mode};
    use std::collections::HashSet;

    struct AckAllLink {
        is_open: bool,
        msg_ids: Vec<u8>,
        last: u8,
    }

    impl Link for AckAllLink {
        fn open(&mut self, _: &Geometry) -> Result<(), DriverError> {
            self.is_open = true;
            Ok(())
        }

        fn close(&mut self) -> Result<(), DriverError> {
            self.is_open = false;
            Ok(())
        }

        fn send(&mut self, tx: &TxDatagram) -> Result<bool, DriverError> {
            self.last = tx.header().msg_id;
            self.msg_ids.push(self.last);
            Ok(true)
        }

        fn receive(&mut self, rx: &mut RxDatagram) -> Result<bool, DriverError> {
            rx.iter_mut().for_each(|r| r.msg_id = self.last);
            Ok(true)
        }

        fn is_open(&self) -> bool {
            self.is_open
        }
    }

    fn controller() -> Controller<AckAllLink> {
        let mut geometry = Geometry::new(Mode::Legacy);
        geometry.add_device(Vector3::zeros(), Vector3::zeros());
        Controller::open(
            geometry,
            AckAllLink {
                is_open: false,
                msg_ids: Vec::new(),
                last: 0,
            },
        )
        .unwrap()
    }

    #[test]
    fn msg_id_cycles_with_no_gap() {
        let mut cnt = controller();
        cnt.check_trials = 1;

        // 236 ids from MSG_BEGIN to MSG_END inclusive, then wrap
        let ids = (0..236 * 2)
            .map(|_| cnt.next_id())
            .collect::<Vec<_>>();
        assert_eq!(MSG_BEGIN, ids[0]);
        assert_eq!(MSG_END, ids[235]);
        assert_eq!(MSG_BEGIN, ids[236]);

        let window: HashSet<u8> = ids[..236].iter().copied().collect();
        assert_eq!(236, window.len());
        assert!(window.iter().all(|&id| (MSG_BEGIN..=MSG_END).contains(&id)));
    }

    #[test]
    fn update_flag() {
        let mut cnt = controller();
        cnt.check_trials = 10;
        cnt.force_fan = true;
        assert!(cnt.update_flag().unwrap());
        assert_eq!(1, cnt.link.msg_ids.len());
    }

    #[test]
    fn close_stops_and_clears() {
        let mut cnt = controller();
        cnt.check_trials = 10;
        assert!(cnt.close().unwrap());
        assert!(!cnt.is_open());
    }
}
