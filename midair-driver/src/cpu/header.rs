use crate::fpga::FPGAControlFlags;

pub const MSG_CLEAR: u8 = 0x00;
pub const MSG_RD_CPU_VERSION: u8 = 0x01;
pub const MSG_RD_FPGA_VERSION: u8 = 0x03;
pub const MSG_RD_FPGA_FUNCTION: u8 = 0x04;
pub const MSG_BEGIN: u8 = 0x05;
pub const MSG_END: u8 = 0xF0;

pub const MOD_HEADER_INITIAL_DATA_SIZE: usize = 120;
pub const MOD_HEADER_SUBSEQUENT_DATA_SIZE: usize = 124;

bitflags::bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    #[repr(transparent)]
    pub struct CPUControlFlags : u8 {
        const NONE            = 0;
        const MOD             = 1 << 0;
        const MOD_BEGIN       = 1 << 1;
        const MOD_END         = 1 << 2;
        // bits 0..2 are reused by frames that do not carry modulation
        const CONFIG_EN_N     = 1 << 0;
        const CONFIG_SILENCER = 1 << 1;
        const CONFIG_SYNC     = 1 << 2;
        const WRITE_BODY      = 1 << 3;
        const STM_BEGIN       = 1 << 4;
        const STM_END         = 1 << 5;
        const IS_DUTY         = 1 << 6;
        const MOD_DELAY       = 1 << 7;
    }
}

/// First frame of a fragmented modulation transfer: the sampling
/// frequency division followed by the first payload bytes.
#[derive(Clone, Copy)]
#[repr(C)]
pub struct ModHeaderInitial {
    pub freq_div: u32,
    pub data: [u8; MOD_HEADER_INITIAL_DATA_SIZE],
}

#[derive(Clone, Copy)]
#[repr(C)]
pub struct ModHeaderSubsequent {
    pub data: [u8; MOD_HEADER_SUBSEQUENT_DATA_SIZE],
}

#[derive(Clone, Copy)]
#[repr(C)]
pub struct SilencerHeader {
    pub cycle: u16,
    pub step: u16,
    _pad: [u8; 120],
}

/// The 128-byte header shared by every device of a frame. The 124-byte
/// payload is a discriminated union selected by `cpu_flag`; the struct is
/// 4-aligned so the payload views stay aligned on their widest field.
#[derive(Clone, Copy)]
#[repr(C, align(4))]
pub struct GlobalHeader {
    pub msg_id: u8,
    pub fpga_flag: FPGAControlFlags,
    pub cpu_flag: CPUControlFlags,
    pub size: u8,
    pub data: [u8; 124],
}

impl GlobalHeader {
    pub fn mod_initial(&self) -> &ModHeaderInitial {
        unsafe { &*(self.data.as_ptr() as *const ModHeaderInitial) }
    }

    pub fn mod_initial_mut(&mut self) -> &mut ModHeaderInitial {
        unsafe { &mut *(self.data.as_mut_ptr() as *mut ModHeaderInitial) }
    }

    pub fn mod_subsequent(&self) -> &ModHeaderSubsequent {
        unsafe { &*(self.data.as_ptr() as *const ModHeaderSubsequent) }
    }

    pub fn mod_subsequent_mut(&mut self) -> &mut ModHeaderSubsequent {
        unsafe { &mut *(self.data.as_mut_ptr() as *mut ModHeaderSubsequent) }
    }

    pub fn silencer(&self) -> &SilencerHeader {
        unsafe { &*(self.data.as_ptr() as *const SilencerHeader) }
    }

    pub fn silencer_mut(&mut self) -> &mut SilencerHeader {
        unsafe { &mut *(self.data.as_mut_ptr() as *mut SilencerHeader) }
    }
}
