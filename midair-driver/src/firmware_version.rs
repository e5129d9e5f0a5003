use std::fmt;

/// Version and feature bytes reported by one device over the ack channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FirmwareInfo {
    idx: usize,
    cpu_version_number: u8,
    fpga_version_number: u8,
    fpga_function_bits: u8,
}

impl FirmwareInfo {
    pub const fn new(
        idx: usize,
        cpu_version_number: u8,
        fpga_version_number: u8,
        fpga_function_bits: u8,
    ) -> Self {
        Self {
            idx,
            cpu_version_number,
            fpga_version_number,
            fpga_function_bits,
        }
    }

    pub fn cpu_version(&self) -> String {
        Self::firmware_version_map(self.cpu_version_number)
    }

    pub fn fpga_version(&self) -> String {
        Self::firmware_version_map(self.fpga_version_number)
    }

    pub const fn fpga_function_bits(&self) -> u8 {
        self.fpga_function_bits
    }

    pub const fn idx(&self) -> usize {
        self.idx
    }

    fn firmware_version_map(version_number: u8) -> String {
        match version_number {
            0 => "older than v0.4".to_string(),
            0x01..=0x06 => format!("v0.{}", version_number + 3),
            0x0A..=0x15 => format!("v1.{}", version_number - 0x0A),
            0x80..=0x87 => format!("v2.{}", version_number - 0x80),
            _ => format!("unknown ({version_number})"),
        }
    }
}

impl fmt::Display for FirmwareInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: CPU = {}, FPGA = {}",
            self.idx,
            self.cpu_version(),
            self.fpga_version()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[test]
    #[case("older than v0.4", 0)]
    #[case("v0.4", 1)]
    #[case("v0.9", 6)]
    #[case("unknown (7)", 7)]
    #[case("unknown (9)", 9)]
    #[case("v1.0", 10)]
    #[case("v1.11", 21)]
    #[case("unknown (22)", 22)]
    #[case("v2.0", 128)]
    #[case("v2.6", 134)]
    #[case("v2.7", 135)]
    #[case("unknown (136)", 136)]
    fn version_map(#[case] expected: &str, #[case] version: u8) {
        let info = FirmwareInfo::new(0, version, version, 0);
        assert_eq!(expected, info.cpu_version());
        assert_eq!(expected, info.fpga_version());
    }

    #[test]
    fn display() {
        let info = FirmwareInfo::new(1, 135, 135, 0);
        assert_eq!("1: CPU = v2.7, FPGA = v2.7", format!("{}", info));
    }
}
