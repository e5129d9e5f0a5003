use super::{GlobalHeader, HEADER_SIZE};

/// Transmission buffer of one frame: a single [`GlobalHeader`] followed by
/// one body per device. Body offsets come from a prefix sum over the
/// device map built at construction. The buffer is backed by `u32` words
/// so the header payload and the 16-bit body words stay aligned.
#[derive(Clone)]
pub struct TxDatagram {
    data: Vec<u32>,
    trans_num_prefix_sum: Vec<usize>,
    /// How many device bodies are live this frame. Bodies past this count
    /// are still transmitted but ignored by their CPU.
    pub num_bodies: usize,
}

impl TxDatagram {
    pub fn new(device_map: &[usize]) -> Self {
        let mut trans_num_prefix_sum = vec![0; device_map.len() + 1];
        for (i, &n) in device_map.iter().enumerate() {
            trans_num_prefix_sum[i + 1] = trans_num_prefix_sum[i] + n;
        }
        let len = HEADER_SIZE + std::mem::size_of::<u16>() * trans_num_prefix_sum[device_map.len()];
        Self {
            data: vec![0x0000_0000; len.div_ceil(std::mem::size_of::<u32>())],
            num_bodies: device_map.len(),
            trans_num_prefix_sum,
        }
    }

    pub fn num_devices(&self) -> usize {
        self.trans_num_prefix_sum.len() - 1
    }

    pub fn num_transducers(&self) -> usize {
        self.trans_num_prefix_sum[self.num_devices()]
    }

    /// Size in bytes of the live part of the frame.
    pub fn transmitting_size(&self) -> usize {
        HEADER_SIZE + std::mem::size_of::<u16>() * self.trans_num_prefix_sum[self.num_bodies]
    }

    pub fn bodies_size(&self) -> usize {
        std::mem::size_of::<u16>() * self.trans_num_prefix_sum[self.num_bodies]
    }

    pub fn data(&self) -> &[u8] {
        unsafe {
            std::slice::from_raw_parts(
                self.data.as_ptr() as *const u8,
                HEADER_SIZE + std::mem::size_of::<u16>() * self.num_transducers(),
            )
        }
    }

    pub fn header(&self) -> &GlobalHeader {
        unsafe { &*(self.data.as_ptr() as *const GlobalHeader) }
    }

    pub fn header_mut(&mut self) -> &mut GlobalHeader {
        unsafe { &mut *(self.data.as_mut_ptr() as *mut GlobalHeader) }
    }

    /// All body words across devices, as one contiguous slice.
    pub fn bodies_raw(&self) -> &[u16] {
        unsafe {
            std::slice::from_raw_parts(
                (self.data.as_ptr() as *const u8).add(HEADER_SIZE) as *const u16,
                self.num_transducers(),
            )
        }
    }

    pub fn bodies_raw_mut(&mut self) -> &mut [u16] {
        let n = self.num_transducers();
        unsafe {
            std::slice::from_raw_parts_mut(
                (self.data.as_mut_ptr() as *mut u8).add(HEADER_SIZE) as *mut u16,
                n,
            )
        }
    }

    pub fn body(&self, idx: usize) -> &[u16] {
        let start = self.trans_num_prefix_sum[idx];
        let end = self.trans_num_prefix_sum[idx + 1];
        &self.bodies_raw()[start..end]
    }

    pub fn body_mut(&mut self, idx: usize) -> &mut [u16] {
        let start = self.trans_num_prefix_sum[idx];
        let end = self.trans_num_prefix_sum[idx + 1];
        &mut self.bodies_raw_mut()[start..end]
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(C)]
pub struct RxMessage {
    pub ack: u8,
    pub msg_id: u8,
}

#[derive(Clone)]
pub struct RxDatagram {
    data: Vec<RxMessage>,
}

impl RxDatagram {
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![RxMessage::default(); size],
        }
    }

    /// The host considers a frame processed iff every device echoed its
    /// message id.
    pub fn is_msg_processed(&self, msg_id: u8) -> bool {
        self.data.iter().all(|msg| msg.msg_id == msg_id)
    }

    pub fn clear(&mut self) {
        self.data.fill(RxMessage::default());
    }
}

impl std::ops::Deref for RxDatagram {
    type Target = [RxMessage];

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl std::ops::DerefMut for RxDatagram {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fpga::NUM_TRANS_IN_UNIT;

    #[test]
    fn tx_datagram() {
        let mut tx = TxDatagram::new(&[NUM_TRANS_IN_UNIT; 10]);

        assert_eq!(10, tx.num_devices());
        assert_eq!(128 + 498 * 10, tx.transmitting_size());
        assert_eq!(tx.transmitting_size(), tx.data().len());

        tx.num_bodies = 5;
        assert_eq!(128 + 498 * 5, tx.transmitting_size());
    }

    #[test]
    fn tx_datagram_body() {
        let mut tx = TxDatagram::new(&[NUM_TRANS_IN_UNIT; 3]);

        tx.body_mut(1).fill(0x1234);
        assert!(tx.body(0).iter().all(|&v| v == 0x0000));
        assert!(tx.body(1).iter().all(|&v| v == 0x1234));
        assert!(tx.body(2).iter().all(|&v| v == 0x0000));

        // the k-th word of the concatenated bodies is the k-th transducer
        assert_eq!(0x1234, tx.bodies_raw()[NUM_TRANS_IN_UNIT]);
        assert_eq!(
            0x34,
            tx.data()[128 + NUM_TRANS_IN_UNIT * std::mem::size_of::<u16>()]
        );

        tx.clear();
        assert!(tx.bodies_raw().iter().all(|&v| v == 0x0000));
    }

    #[test]
    fn tx_datagram_clone() {
        let mut tx = TxDatagram::new(&[NUM_TRANS_IN_UNIT; 2]);
        tx.header_mut().msg_id = 0x05;
        tx.body_mut(0).fill(0xFFFF);

        let tx2 = tx.clone();
        assert_eq!(tx.data(), tx2.data());
        assert_eq!(tx.num_bodies, tx2.num_bodies);
    }

    #[test]
    fn rx_datagram() {
        let mut rx = RxDatagram::new(10);

        assert!(!rx.is_msg_processed(1));

        rx[0].msg_id = 1;
        assert!(!rx.is_msg_processed(1));

        rx.iter_mut().for_each(|msg| msg.msg_id = 1);
        assert!(rx.is_msg_processed(1));
        assert!(!rx.is_msg_processed(2));

        rx.clear();
        assert!(rx.is_msg_processed(0));
    }
}
