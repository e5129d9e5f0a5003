use midair_driver::cpu::{
    TxDatagram, EC_OUTPUT_FRAME_SIZE, HEADER_SIZE, MSG_CLEAR, MSG_END, MSG_RD_CPU_VERSION,
    MSG_RD_FPGA_FUNCTION, MSG_RD_FPGA_VERSION,
};

use crate::fpga::FPGAEmulator;

use super::params::*;

fn u16_at(data: &[u8], i: usize) -> u16 {
    u16::from_le_bytes([data[i], data[i + 1]])
}

fn u32_at(data: &[u8], i: usize) -> u32 {
    u32::from_le_bytes([data[i], data[i + 1], data[i + 2], data[i + 3]])
}

/// SPSC ring fed by the bus interrupt and drained by the tick loop. The
/// newest frame is dropped when the ring is full; the host observes the
/// missing ack and retries.
struct RxRing {
    buf: Vec<[u8; EC_OUTPUT_FRAME_SIZE]>,
    write_cursor: usize,
    read_cursor: usize,
}

impl RxRing {
    fn new() -> Self {
        Self {
            buf: vec![[0x00; EC_OUTPUT_FRAME_SIZE]; RX_RING_SIZE],
            write_cursor: 0,
            read_cursor: 0,
        }
    }

    fn push(&mut self, frame: &[u8; EC_OUTPUT_FRAME_SIZE]) -> bool {
        let next = (self.write_cursor + 1) % RX_RING_SIZE;
        if next == self.read_cursor {
            return false;
        }
        self.buf[self.write_cursor] = *frame;
        self.write_cursor = next;
        true
    }

    fn pop(&mut self) -> Option<[u8; EC_OUTPUT_FRAME_SIZE]> {
        if self.read_cursor == self.write_cursor {
            return None;
        }
        let frame = self.buf[self.read_cursor];
        self.read_cursor = (self.read_cursor + 1) % RX_RING_SIZE;
        Some(frame)
    }
}

/// One device's embedded CPU: parses inbound frames, manages the
/// segmented BRAM regions, and answers over the 16-bit ack word
/// (message-id echo in the high byte, version/FPGA-info in the low byte).
pub struct CPUEmulator {
    idx: usize,
    num_transducers: usize,
    msg_id: u8,
    rx_data: u8,
    read_fpga_info: bool,
    cycles: Vec<u16>,
    mod_cycle: u32,
    stm_write: u32,
    stm_cycle: u32,
    gain_stm_mode: u16,
    wdt_cnt: i32,
    al_status_code: u16,
    last_msg_id: u8,
    ring: RxRing,
    synchronized: bool,
    fpga: FPGAEmulator,
}

impl CPUEmulator {
    pub fn new(idx: usize, num_transducers: usize) -> Self {
        let mut cpu = Self {
            idx,
            num_transducers,
            msg_id: 0x00,
            rx_data: 0x00,
            read_fpga_info: false,
            cycles: vec![4096; num_transducers],
            mod_cycle: 0,
            stm_write: 0,
            stm_cycle: 0,
            gain_stm_mode: GAIN_DATA_MODE_PHASE_DUTY_FULL,
            wdt_cnt: WDT_CNT_MAX,
            al_status_code: 0x0000,
            last_msg_id: 0x00,
            ring: RxRing::new(),
            synchronized: false,
            fpga: FPGAEmulator::new(num_transducers),
        };
        cpu.clear();
        cpu
    }

    pub fn idx(&self) -> usize {
        self.idx
    }

    pub fn fpga(&self) -> &FPGAEmulator {
        &self.fpga
    }

    pub fn fpga_mut(&mut self) -> &mut FPGAEmulator {
        &mut self.fpga
    }

    /// Message-id echo plus data byte, as published over the bus.
    pub fn ack(&self) -> u16 {
        ((self.msg_id as u16) << 8) | self.rx_data as u16
    }

    pub fn msg_id(&self) -> u8 {
        self.msg_id
    }

    pub fn rx_data(&self) -> u8 {
        self.rx_data
    }

    pub fn synchronized(&self) -> bool {
        self.synchronized
    }

    /// Inject the bus AL status (tests use this to trip the watchdog).
    pub fn set_al_status_code(&mut self, code: u16) {
        self.al_status_code = code;
    }

    /// The bus interrupt: push this device's slice of the frame into the
    /// RX ring. Frames repeating the last accepted message id are
    /// dropped here.
    pub fn send(&mut self, tx: &TxDatagram) {
        let mut frame = [0x00u8; EC_OUTPUT_FRAME_SIZE];
        frame[..HEADER_SIZE].copy_from_slice(&tx.data()[..HEADER_SIZE]);
        tx.body(self.idx).iter().enumerate().for_each(|(i, &word)| {
            frame[HEADER_SIZE + 2 * i..HEADER_SIZE + 2 * i + 2]
                .copy_from_slice(&word.to_le_bytes());
        });
        self.recv_ethercat(&frame);
    }

    fn recv_ethercat(&mut self, frame: &[u8; EC_OUTPUT_FRAME_SIZE]) {
        let msg_id = frame[0];
        if msg_id == self.last_msg_id {
            return;
        }
        if self.ring.push(frame) {
            self.last_msg_id = msg_id;
        }
    }

    /// The 1 ms tick: run the watchdog, pop one frame, refresh the ack.
    pub fn update(&mut self) {
        if self.al_status_code == AL_STATUS_CODE_SYNC_ERR {
            if self.wdt_cnt < 0 {
                return;
            }
            let cnt = self.wdt_cnt;
            self.wdt_cnt -= 1;
            if cnt == 0 {
                self.clear();
            }
        } else {
            self.wdt_cnt = WDT_CNT_MAX;
        }

        if let Some(frame) = self.ring.pop() {
            self.process(&frame);
        }

        match self.msg_id {
            MSG_RD_CPU_VERSION | MSG_RD_FPGA_VERSION | MSG_RD_FPGA_FUNCTION => {}
            _ => {
                if self.read_fpga_info {
                    self.rx_data = (self.read_fpga_info_reg() & 0xFF) as u8;
                }
            }
        }
    }
}

impl CPUEmulator {
    fn get_addr(select: u8, addr: u16) -> u16 {
        ((select as u16 & 0x0003) << 14) | (addr & 0x3FFF)
    }

    fn bram_read(&self, select: u8, addr: u16) -> u16 {
        self.fpga.read(Self::get_addr(select, addr))
    }

    fn bram_write(&mut self, select: u8, addr: u16, data: u16) {
        self.fpga.write(Self::get_addr(select, addr), data);
    }

    fn bram_cpy(&mut self, select: u8, addr_base: u16, data: &[u16]) {
        data.iter().enumerate().for_each(|(i, &word)| {
            self.fpga.write(Self::get_addr(select, addr_base + i as u16), word);
        });
    }

    fn bram_set(&mut self, select: u8, addr_base: u16, value: u16, size: usize) {
        (0..size).for_each(|i| {
            self.fpga
                .write(Self::get_addr(select, addr_base + i as u16), value);
        });
    }

    fn read_fpga_info_reg(&self) -> u16 {
        self.bram_read(BRAM_SELECT_CONTROLLER, BRAM_ADDR_FPGA_INFO)
    }

    fn get_fpga_version(&self) -> u16 {
        self.bram_read(BRAM_SELECT_CONTROLLER, BRAM_ADDR_VERSION_NUM)
    }

    fn process(&mut self, frame: &[u8; EC_OUTPUT_FRAME_SIZE]) {
        let msg_id = frame[0];
        let fpga_flag = frame[1];
        let cpu_flag = frame[2];
        let payload = &frame[4..HEADER_SIZE];
        let body = &frame[HEADER_SIZE..];

        self.msg_id = msg_id;
        self.read_fpga_info = fpga_flag & (CTL_REG_READS_FPGA_INFO as u8) != 0;
        if self.read_fpga_info {
            self.rx_data = (self.read_fpga_info_reg() & 0xFF) as u8;
        }

        match msg_id {
            MSG_CLEAR => self.clear(),
            MSG_RD_CPU_VERSION => self.rx_data = (CPU_VERSION & 0xFF) as u8,
            MSG_RD_FPGA_VERSION => self.rx_data = (self.get_fpga_version() & 0xFF) as u8,
            MSG_RD_FPGA_FUNCTION => self.rx_data = (self.get_fpga_version() >> 8) as u8,
            _ => {
                if msg_id > MSG_END {
                    return;
                }

                if cpu_flag & CPU_FLAG_MOD == 0 && cpu_flag & CPU_FLAG_CONFIG_SYNC != 0 {
                    self.synchronize(fpga_flag, body);
                    return;
                }

                self.bram_write(BRAM_SELECT_CONTROLLER, BRAM_ADDR_CTL_REG, fpga_flag as u16);

                if cpu_flag & CPU_FLAG_MOD != 0 {
                    self.write_mod(cpu_flag, frame[3], payload);
                } else if cpu_flag & CPU_FLAG_CONFIG_SILENCER != 0 {
                    self.config_silencer(payload);
                }

                if cpu_flag & CPU_FLAG_WRITE_BODY == 0 {
                    return;
                }

                if cpu_flag & CPU_FLAG_MOD_DELAY != 0 {
                    self.write_mod_delay(body);
                    return;
                }

                if fpga_flag & (CTL_REG_OP_MODE as u8) == 0 {
                    self.write_normal_op(fpga_flag, cpu_flag, body);
                    return;
                }

                if fpga_flag & (CTL_REG_STM_GAIN_MODE as u8) == 0 {
                    self.write_focus_stm(cpu_flag, fpga_flag, body);
                } else if fpga_flag & (CTL_REG_LEGACY_MODE as u8) == 0 {
                    self.write_gain_stm_advanced(cpu_flag, fpga_flag, body);
                } else {
                    self.write_gain_stm_legacy(cpu_flag, fpga_flag, body);
                }
            }
        }
    }

    fn synchronize(&mut self, fpga_flag: u8, body: &[u8]) {
        let cycles = (0..self.num_transducers)
            .map(|i| u16_at(body, 2 * i))
            .collect::<Vec<_>>();
        self.bram_cpy(BRAM_SELECT_CONTROLLER, BRAM_ADDR_CYCLE_BASE, &cycles);
        self.cycles = cycles;

        // the next SYNC0 pulse at least 250 us ahead; modelled as zero here
        self.bram_cpy(
            BRAM_SELECT_CONTROLLER,
            BRAM_ADDR_EC_SYNC_TIME_0,
            &[0x0000; 4],
        );
        self.bram_write(
            BRAM_SELECT_CONTROLLER,
            BRAM_ADDR_CTL_REG,
            fpga_flag as u16 | CTL_REG_SYNC,
        );

        // the FPGA acknowledges by clearing the SYNC bit
        let reg = self.bram_read(BRAM_SELECT_CONTROLLER, BRAM_ADDR_CTL_REG);
        self.bram_write(BRAM_SELECT_CONTROLLER, BRAM_ADDR_CTL_REG, reg & !CTL_REG_SYNC);
        self.synchronized = true;
    }

    fn write_mod(&mut self, cpu_flag: u8, size: u8, payload: &[u8]) {
        let write = size as u32;

        let data = if cpu_flag & CPU_FLAG_MOD_BEGIN != 0 {
            self.mod_cycle = 0;
            self.bram_write(BRAM_SELECT_CONTROLLER, BRAM_ADDR_MOD_ADDR_OFFSET, 0);
            let freq_div = u32_at(payload, 0);
            self.bram_cpy(
                BRAM_SELECT_CONTROLLER,
                BRAM_ADDR_MOD_FREQ_DIV_0,
                &[(freq_div & 0xFFFF) as u16, (freq_div >> 16) as u16],
            );
            &payload[4..]
        } else {
            payload
        };

        let segment_capacity =
            (self.mod_cycle & !MOD_BUF_SEGMENT_SIZE_MASK) + MOD_BUF_SEGMENT_SIZE - self.mod_cycle;
        if write <= segment_capacity {
            self.mod_bram_cpy(self.mod_cycle, data, write);
            self.mod_cycle += write;
        } else {
            self.mod_bram_cpy(self.mod_cycle, data, segment_capacity);
            self.mod_cycle += segment_capacity;
            self.bram_write(
                BRAM_SELECT_CONTROLLER,
                BRAM_ADDR_MOD_ADDR_OFFSET,
                ((self.mod_cycle & !MOD_BUF_SEGMENT_SIZE_MASK) >> MOD_BUF_SEGMENT_SIZE_WIDTH)
                    as u16,
            );
            self.mod_bram_cpy(
                self.mod_cycle,
                &data[segment_capacity as usize..],
                write - segment_capacity,
            );
            self.mod_cycle += write - segment_capacity;
        }

        if cpu_flag & CPU_FLAG_MOD_END != 0 {
            self.bram_write(
                BRAM_SELECT_CONTROLLER,
                BRAM_ADDR_MOD_CYCLE,
                (self.mod_cycle.max(1) - 1) as u16,
            );
        }
    }

    fn mod_bram_cpy(&mut self, mod_cycle: u32, data: &[u8], bytes: u32) {
        let base = ((mod_cycle & MOD_BUF_SEGMENT_SIZE_MASK) >> 1) as u16;
        let words = ((bytes + 1) >> 1) as usize;
        (0..words).for_each(|i| {
            let lo = data[2 * i];
            let hi = if 2 * i + 1 < data.len() {
                data[2 * i + 1]
            } else {
                0x00
            };
            self.bram_write(
                BRAM_SELECT_MOD,
                base + i as u16,
                u16::from_le_bytes([lo, hi]),
            );
        });
    }

    fn config_silencer(&mut self, payload: &[u8]) {
        let cycle = u16_at(payload, 0);
        let step = u16_at(payload, 2);
        self.bram_write(BRAM_SELECT_CONTROLLER, BRAM_ADDR_SILENT_CYCLE, cycle);
        self.bram_write(BRAM_SELECT_CONTROLLER, BRAM_ADDR_SILENT_STEP, step);
    }

    fn write_mod_delay(&mut self, body: &[u8]) {
        let delays = (0..self.num_transducers)
            .map(|i| u16_at(body, 2 * i))
            .collect::<Vec<_>>();
        self.bram_cpy(BRAM_SELECT_CONTROLLER, BRAM_ADDR_MOD_DELAY_BASE, &delays);
    }

    fn write_normal_op(&mut self, fpga_flag: u8, cpu_flag: u8, body: &[u8]) {
        if fpga_flag & (CTL_REG_LEGACY_MODE as u8) != 0 {
            (0..self.num_transducers).for_each(|i| {
                self.bram_write(BRAM_SELECT_NORMAL, (i << 1) as u16, u16_at(body, 2 * i));
            });
        } else {
            let offset = if cpu_flag & CPU_FLAG_IS_DUTY != 0 { 1 } else { 0 };
            (0..self.num_transducers).for_each(|i| {
                self.bram_write(
                    BRAM_SELECT_NORMAL,
                    ((i << 1) + offset) as u16,
                    u16_at(body, 2 * i),
                );
            });
        }
    }

    fn write_focus_stm(&mut self, cpu_flag: u8, fpga_flag: u8, body: &[u8]) {
        let size = u16_at(body, 0) as u32;

        let src = if cpu_flag & CPU_FLAG_STM_BEGIN != 0 {
            self.stm_write = 0;
            self.bram_write(BRAM_SELECT_CONTROLLER, BRAM_ADDR_STM_ADDR_OFFSET, 0);

            let freq_div = u32_at(body, 2);
            let sound_speed = u32_at(body, 6);
            let start_idx = u16_at(body, 10);
            let finish_idx = u16_at(body, 12);

            self.bram_cpy(
                BRAM_SELECT_CONTROLLER,
                BRAM_ADDR_STM_FREQ_DIV_0,
                &[(freq_div & 0xFFFF) as u16, (freq_div >> 16) as u16],
            );
            self.bram_cpy(
                BRAM_SELECT_CONTROLLER,
                BRAM_ADDR_SOUND_SPEED_0,
                &[(sound_speed & 0xFFFF) as u16, (sound_speed >> 16) as u16],
            );
            self.bram_write(BRAM_SELECT_CONTROLLER, BRAM_ADDR_STM_START_IDX, start_idx);
            self.bram_write(BRAM_SELECT_CONTROLLER, BRAM_ADDR_STM_FINISH_IDX, finish_idx);

            &body[14..]
        } else {
            &body[2..]
        };

        let segment_capacity = (self.stm_write & !FOCUS_STM_BUF_SEGMENT_SIZE_MASK)
            + FOCUS_STM_BUF_SEGMENT_SIZE
            - self.stm_write;
        if size <= segment_capacity {
            self.focus_stm_bram_cpy(src, size);
            self.stm_write += size;
        } else {
            self.focus_stm_bram_cpy(src, segment_capacity);
            self.stm_write += segment_capacity;
            self.bram_write(
                BRAM_SELECT_CONTROLLER,
                BRAM_ADDR_STM_ADDR_OFFSET,
                ((self.stm_write & !FOCUS_STM_BUF_SEGMENT_SIZE_MASK)
                    >> FOCUS_STM_BUF_SEGMENT_SIZE_WIDTH) as u16,
            );
            self.focus_stm_bram_cpy(
                &src[(segment_capacity as usize) * 8..],
                size - segment_capacity,
            );
            self.stm_write += size - segment_capacity;
        }

        if cpu_flag & CPU_FLAG_STM_END != 0 {
            self.bram_write(
                BRAM_SELECT_CONTROLLER,
                BRAM_ADDR_STM_CYCLE,
                (self.stm_write.max(1) - 1) as u16,
            );
            self.bram_write(
                BRAM_SELECT_CONTROLLER,
                BRAM_ADDR_CTL_REG,
                fpga_flag as u16 | CTL_REG_OP_MODE_FPGA,
            );
        }
    }

    fn focus_stm_bram_cpy(&mut self, src: &[u8], points: u32) {
        let mut dst = ((self.stm_write & FOCUS_STM_BUF_SEGMENT_SIZE_MASK) << 3) as u16;
        (0..points as usize).for_each(|i| {
            (0..4).for_each(|k| {
                self.bram_write(BRAM_SELECT_STM, dst, u16_at(src, 8 * i + 2 * k));
                dst += 1;
            });
            dst += 4;
        });
    }

    fn write_gain_stm_legacy(&mut self, cpu_flag: u8, fpga_flag: u8, body: &[u8]) {
        if cpu_flag & CPU_FLAG_STM_BEGIN != 0 {
            self.stm_write = 0;
            self.bram_write(BRAM_SELECT_CONTROLLER, BRAM_ADDR_STM_ADDR_OFFSET, 0);

            let freq_div = u32_at(body, 0);
            self.bram_cpy(
                BRAM_SELECT_CONTROLLER,
                BRAM_ADDR_STM_FREQ_DIV_0,
                &[(freq_div & 0xFFFF) as u16, (freq_div >> 16) as u16],
            );
            self.gain_stm_mode = u16_at(body, 4);
            self.stm_cycle = u16_at(body, 6) as u32;
            self.bram_write(
                BRAM_SELECT_CONTROLLER,
                BRAM_ADDR_STM_START_IDX,
                u16_at(body, 8),
            );
            self.bram_write(
                BRAM_SELECT_CONTROLLER,
                BRAM_ADDR_STM_FINISH_IDX,
                u16_at(body, 10),
            );
            return;
        }

        match self.gain_stm_mode {
            GAIN_DATA_MODE_PHASE_DUTY_FULL => {
                let mut dst =
                    ((self.stm_write & GAIN_STM_LEGACY_BUF_SEGMENT_SIZE_MASK) << 8) as u16;
                (0..self.num_transducers).for_each(|i| {
                    self.bram_write(BRAM_SELECT_STM, dst, u16_at(body, 2 * i));
                    dst += 1;
                });
                self.stm_write += 1;
            }
            GAIN_DATA_MODE_PHASE_FULL => {
                (0..2).for_each(|pass| {
                    let mut dst =
                        ((self.stm_write & GAIN_STM_LEGACY_BUF_SEGMENT_SIZE_MASK) << 8) as u16;
                    (0..self.num_transducers).for_each(|i| {
                        let phase = (u16_at(body, 2 * i) >> (8 * pass)) & 0x00FF;
                        self.bram_write(BRAM_SELECT_STM, dst, 0xFF00 | phase);
                        dst += 1;
                    });
                    self.stm_write += 1;
                });
            }
            GAIN_DATA_MODE_PHASE_HALF => {
                (0..4).for_each(|pass| {
                    let mut dst =
                        ((self.stm_write & GAIN_STM_LEGACY_BUF_SEGMENT_SIZE_MASK) << 8) as u16;
                    (0..self.num_transducers).for_each(|i| {
                        let phase = (u16_at(body, 2 * i) >> (4 * pass)) & 0x000F;
                        self.bram_write(BRAM_SELECT_STM, dst, 0xFF00 | (phase << 4) | phase);
                        dst += 1;
                    });
                    self.stm_write += 1;
                });
            }
            _ => {}
        }

        if self.stm_write & GAIN_STM_LEGACY_BUF_SEGMENT_SIZE_MASK == 0 {
            self.bram_write(
                BRAM_SELECT_CONTROLLER,
                BRAM_ADDR_STM_ADDR_OFFSET,
                ((self.stm_write & !GAIN_STM_LEGACY_BUF_SEGMENT_SIZE_MASK)
                    >> GAIN_STM_LEGACY_BUF_SEGMENT_SIZE_WIDTH) as u16,
            );
        }

        if cpu_flag & CPU_FLAG_STM_END != 0 {
            self.bram_write(
                BRAM_SELECT_CONTROLLER,
                BRAM_ADDR_STM_CYCLE,
                (self.stm_cycle.max(1) - 1) as u16,
            );
            self.bram_write(
                BRAM_SELECT_CONTROLLER,
                BRAM_ADDR_CTL_REG,
                fpga_flag as u16 | CTL_REG_OP_MODE_FPGA,
            );
        }
    }

    fn write_gain_stm_advanced(&mut self, cpu_flag: u8, fpga_flag: u8, body: &[u8]) {
        if cpu_flag & CPU_FLAG_STM_BEGIN != 0 {
            self.stm_write = 0;
            self.bram_write(BRAM_SELECT_CONTROLLER, BRAM_ADDR_STM_ADDR_OFFSET, 0);

            let freq_div = u32_at(body, 0);
            self.bram_cpy(
                BRAM_SELECT_CONTROLLER,
                BRAM_ADDR_STM_FREQ_DIV_0,
                &[(freq_div & 0xFFFF) as u16, (freq_div >> 16) as u16],
            );
            self.gain_stm_mode = u16_at(body, 4);
            self.stm_cycle = u16_at(body, 6) as u32;
            self.bram_write(
                BRAM_SELECT_CONTROLLER,
                BRAM_ADDR_STM_START_IDX,
                u16_at(body, 8),
            );
            self.bram_write(
                BRAM_SELECT_CONTROLLER,
                BRAM_ADDR_STM_FINISH_IDX,
                u16_at(body, 10),
            );
            return;
        }

        match self.gain_stm_mode {
            GAIN_DATA_MODE_PHASE_DUTY_FULL => {
                let base = ((self.stm_write & GAIN_STM_BUF_SEGMENT_SIZE_MASK) << 9) as u16;
                let mut dst = if cpu_flag & CPU_FLAG_IS_DUTY != 0 {
                    self.stm_write += 1;
                    base + 1
                } else {
                    base
                };
                (0..self.num_transducers).for_each(|i| {
                    self.bram_write(BRAM_SELECT_STM, dst, u16_at(body, 2 * i));
                    dst += 2;
                });
            }
            GAIN_DATA_MODE_PHASE_FULL => {
                if cpu_flag & CPU_FLAG_IS_DUTY == 0 {
                    let mut dst = ((self.stm_write & GAIN_STM_BUF_SEGMENT_SIZE_MASK) << 9) as u16;
                    // the duty word reads the cycle table shifted by one
                    // transducer; kept as the hardware behaves, with the
                    // final out-of-bounds read clamped
                    (0..self.num_transducers).for_each(|i| {
                        self.bram_write(BRAM_SELECT_STM, dst, u16_at(body, 2 * i));
                        dst += 1;
                        let cycle = self.cycles[(i + 1).min(self.num_transducers - 1)];
                        self.bram_write(BRAM_SELECT_STM, dst, cycle >> 1);
                        dst += 1;
                    });
                    self.stm_write += 1;
                }
            }
            _ => {}
        }

        if self.stm_write & GAIN_STM_BUF_SEGMENT_SIZE_MASK == 0 {
            self.bram_write(
                BRAM_SELECT_CONTROLLER,
                BRAM_ADDR_STM_ADDR_OFFSET,
                ((self.stm_write & !GAIN_STM_BUF_SEGMENT_SIZE_MASK)
                    >> GAIN_STM_BUF_SEGMENT_SIZE_WIDTH) as u16,
            );
        }

        if cpu_flag & CPU_FLAG_STM_END != 0 {
            self.bram_write(
                BRAM_SELECT_CONTROLLER,
                BRAM_ADDR_STM_CYCLE,
                (self.stm_cycle.max(1) - 1) as u16,
            );
            self.bram_write(
                BRAM_SELECT_CONTROLLER,
                BRAM_ADDR_CTL_REG,
                fpga_flag as u16 | CTL_REG_OP_MODE_FPGA,
            );
        }
    }

    fn clear(&mut self) {
        let freq_div_4k: u32 = 40960;

        self.read_fpga_info = false;
        self.bram_write(BRAM_SELECT_CONTROLLER, BRAM_ADDR_CTL_REG, 0x0000);

        self.bram_write(BRAM_SELECT_CONTROLLER, BRAM_ADDR_SILENT_STEP, 10);
        self.bram_write(BRAM_SELECT_CONTROLLER, BRAM_ADDR_SILENT_CYCLE, 4096);

        self.stm_write = 0;
        self.stm_cycle = 0;

        self.mod_cycle = 2;
        self.bram_write(
            BRAM_SELECT_CONTROLLER,
            BRAM_ADDR_MOD_CYCLE,
            (self.mod_cycle.max(1) - 1) as u16,
        );
        self.bram_cpy(
            BRAM_SELECT_CONTROLLER,
            BRAM_ADDR_MOD_FREQ_DIV_0,
            &[(freq_div_4k & 0xFFFF) as u16, (freq_div_4k >> 16) as u16],
        );
        self.bram_write(BRAM_SELECT_CONTROLLER, BRAM_ADDR_MOD_ADDR_OFFSET, 0);
        self.bram_write(BRAM_SELECT_MOD, 0, 0x0000);

        self.bram_set(BRAM_SELECT_NORMAL, 0, 0x0000, self.num_transducers << 1);

        self.bram_set(
            BRAM_SELECT_CONTROLLER,
            BRAM_ADDR_MOD_DELAY_BASE,
            0x0000,
            self.num_transducers,
        );
        self.bram_set(
            BRAM_SELECT_CONTROLLER,
            BRAM_ADDR_FILTER_DUTY_BASE,
            0x0000,
            self.num_transducers,
        );
        self.bram_set(
            BRAM_SELECT_CONTROLLER,
            BRAM_ADDR_FILTER_PHASE_BASE,
            0x0000,
            self.num_transducers,
        );
    }
}
