use crate::{
    cpu::TxDatagram,
    error::DriverError,
    fpga::Drive,
    geometry::Geometry,
    operation::{
        GainAdvancedDutyBody, GainAdvancedHeader, GainAdvancedPhaseBody, GainLegacyBody,
        GainLegacyHeader, GainSTMAdvancedDutyBody, GainSTMAdvancedHeader,
        GainSTMAdvancedPhaseBody, GainSTMLegacyBody, GainSTMLegacyHeader, GainSTMMode, Sync,
    },
};

/// Drive encoding selected at `Geometry` construction.
///
/// Legacy fixes the carrier at 40 kHz and uses 8-bit phase/duty;
/// Advanced uses 16-bit words scaled to the per-transducer cycle and
/// transmits phase and duty in separate frames; AdvancedPhase transmits
/// phase only, with the amplitude frozen by a previous `Amplitudes` write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Legacy,
    Advanced,
    AdvancedPhase,
}

impl Mode {
    pub fn pack_sync(&self, geometry: &Geometry, tx: &mut TxDatagram) -> Result<(), DriverError> {
        let cycles = geometry.cycles();
        if matches!(self, Mode::Legacy) {
            if let Some(&cycle) = cycles.iter().find(|&&cycle| cycle != 4096) {
                tracing::error!("Cannot change frequency in Legacy mode");
                return Err(DriverError::InvalidCycleForLegacyMode(cycle));
            }
        }
        Sync { cycles: &cycles }.pack(tx);
        Ok(())
    }

    pub fn pack_gain_header(&self, tx: &mut TxDatagram) {
        match self {
            Mode::Legacy => GainLegacyHeader::default().pack(tx),
            Mode::Advanced | Mode::AdvancedPhase => GainAdvancedHeader::default().pack(tx),
        }
    }

    pub fn pack_gain_body(
        &self,
        phase_sent: &mut bool,
        duty_sent: &mut bool,
        drives: &[Drive],
        geometry: &Geometry,
        tx: &mut TxDatagram,
    ) {
        match self {
            Mode::Legacy => {
                GainLegacyBody { drives }.pack(tx);
                *phase_sent = true;
                *duty_sent = true;
            }
            Mode::Advanced => {
                let cycles = geometry.cycles();
                if !*phase_sent {
                    GainAdvancedPhaseBody {
                        drives,
                        cycles: &cycles,
                    }
                    .pack(tx);
                    *phase_sent = true;
                } else {
                    GainAdvancedDutyBody {
                        drives,
                        cycles: &cycles,
                    }
                    .pack(tx);
                    *duty_sent = true;
                }
            }
            Mode::AdvancedPhase => {
                let cycles = geometry.cycles();
                GainAdvancedPhaseBody {
                    drives,
                    cycles: &cycles,
                }
                .pack(tx);
                *phase_sent = true;
                *duty_sent = true;
            }
        }
    }

    pub fn pack_stm_gain_header(&self, tx: &mut TxDatagram) {
        match self {
            Mode::Legacy => GainSTMLegacyHeader::default().pack(tx),
            Mode::Advanced | Mode::AdvancedPhase => GainSTMAdvancedHeader::default().pack(tx),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn pack_stm_gain_body(
        &self,
        sent: &mut usize,
        next_duty: &mut bool,
        freq_div: u32,
        gains: &[Vec<Drive>],
        geometry: &Geometry,
        mode: GainSTMMode,
        start_idx: Option<u16>,
        finish_idx: Option<u16>,
        tx: &mut TxDatagram,
    ) -> Result<(), DriverError> {
        match self {
            Mode::Legacy => GainSTMLegacyBody {
                drives: gains,
                freq_div,
                mode,
                start_idx,
                finish_idx,
            }
            .pack(sent, tx),
            Mode::Advanced => {
                let cycles = geometry.cycles();
                if *sent == 0 {
                    GainSTMAdvancedPhaseBody {
                        drives: gains,
                        cycles: &cycles,
                        sent: 0,
                        freq_div,
                        mode,
                        start_idx,
                        finish_idx,
                    }
                    .pack(tx)?;
                    *sent += 1;
                    return Ok(());
                }
                match mode {
                    GainSTMMode::PhaseDutyFull => {
                        *next_duty = !*next_duty;
                        if *next_duty {
                            GainSTMAdvancedPhaseBody {
                                drives: gains,
                                cycles: &cycles,
                                sent: *sent,
                                freq_div,
                                mode,
                                start_idx,
                                finish_idx,
                            }
                            .pack(tx)
                        } else {
                            let result = GainSTMAdvancedDutyBody {
                                drives: gains,
                                cycles: &cycles,
                                sent: *sent,
                            }
                            .pack(tx);
                            *sent += 1;
                            result
                        }
                    }
                    GainSTMMode::PhaseFull => {
                        let result = GainSTMAdvancedPhaseBody {
                            drives: gains,
                            cycles: &cycles,
                            sent: *sent,
                            freq_div,
                            mode,
                            start_idx,
                            finish_idx,
                        }
                        .pack(tx);
                        *sent += 1;
                        result
                    }
                    GainSTMMode::PhaseHalf => {
                        tracing::error!("PhaseHalf is not supported in Advanced mode");
                        Err(DriverError::GainSTMModeNotSupported(mode))
                    }
                }
            }
            Mode::AdvancedPhase => {
                let cycles = geometry.cycles();
                let result = GainSTMAdvancedPhaseBody {
                    drives: gains,
                    cycles: &cycles,
                    sent: *sent,
                    freq_div,
                    mode: GainSTMMode::PhaseFull,
                    start_idx,
                    finish_idx,
                }
                .pack(tx);
                *sent += 1;
                result
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cpu::CPUControlFlags,
        fpga::{FPGAControlFlags, NUM_TRANS_IN_UNIT},
        geometry::Vector3,
    };

    fn make_geometry(mode: Mode) -> Geometry {
        let mut geometry = Geometry::new(mode);
        geometry.add_device(Vector3::zeros(), Vector3::zeros());
        geometry
    }

    #[test]
    fn legacy_sync_rejects_non_default_cycle() {
        let mut geometry = make_geometry(Mode::Legacy);
        let mut tx = TxDatagram::new(&geometry.device_map());

        assert!(geometry.mode().pack_sync(&geometry, &mut tx).is_ok());
        assert_eq!(vec![4096u16; NUM_TRANS_IN_UNIT], tx.bodies_raw());

        geometry.transducers_mut().next().unwrap().set_cycle(4095);
        assert_eq!(
            Err(DriverError::InvalidCycleForLegacyMode(4095)),
            geometry.mode().pack_sync(&geometry, &mut tx)
        );
    }

    #[test]
    fn advanced_sync_accepts_any_cycle() {
        let mut geometry = make_geometry(Mode::Advanced);
        geometry
            .transducers_mut()
            .for_each(|tr| tr.set_cycle(2341));
        let mut tx = TxDatagram::new(&geometry.device_map());

        assert!(geometry.mode().pack_sync(&geometry, &mut tx).is_ok());
        assert_eq!(vec![2341u16; NUM_TRANS_IN_UNIT], tx.bodies_raw());
    }

    #[test]
    fn advanced_gain_takes_two_frames() {
        let geometry = make_geometry(Mode::Advanced);
        let mut tx = TxDatagram::new(&geometry.device_map());

        let drives = vec![
            Drive {
                phase: 0.5,
                amp: 1.0
            };
            NUM_TRANS_IN_UNIT
        ];

        let mut phase_sent = false;
        let mut duty_sent = false;
        geometry.mode().pack_gain_body(
            &mut phase_sent,
            &mut duty_sent,
            &drives,
            &geometry,
            &mut tx,
        );
        assert!(phase_sent);
        assert!(!duty_sent);
        assert!(!tx.header().cpu_flag.contains(CPUControlFlags::IS_DUTY));

        geometry.mode().pack_gain_body(
            &mut phase_sent,
            &mut duty_sent,
            &drives,
            &geometry,
            &mut tx,
        );
        assert!(duty_sent);
        assert!(tx.header().cpu_flag.contains(CPUControlFlags::IS_DUTY));
    }

    #[test]
    fn advanced_phase_gain_takes_one_frame() {
        let geometry = make_geometry(Mode::AdvancedPhase);
        let mut tx = TxDatagram::new(&geometry.device_map());

        let drives = vec![
            Drive {
                phase: 0.5,
                amp: 1.0
            };
            NUM_TRANS_IN_UNIT
        ];

        let mut phase_sent = false;
        let mut duty_sent = false;
        geometry.mode().pack_gain_body(
            &mut phase_sent,
            &mut duty_sent,
            &drives,
            &geometry,
            &mut tx,
        );
        assert!(phase_sent);
        assert!(duty_sent);
    }

    #[test]
    fn stm_phase_half_rejected_in_advanced() {
        let geometry = make_geometry(Mode::Advanced);
        let mut tx = TxDatagram::new(&geometry.device_map());

        let gains = vec![vec![Drive::default(); NUM_TRANS_IN_UNIT]; 2];
        let mut sent = 1;
        let mut next_duty = false;
        assert_eq!(
            Err(DriverError::GainSTMModeNotSupported(GainSTMMode::PhaseHalf)),
            geometry.mode().pack_stm_gain_body(
                &mut sent,
                &mut next_duty,
                3224,
                &gains,
                &geometry,
                GainSTMMode::PhaseHalf,
                None,
                None,
                &mut tx,
            )
        );
    }

    #[test]
    fn stm_gain_header_mode_flags() {
        let geometry = make_geometry(Mode::Legacy);
        let mut tx = TxDatagram::new(&geometry.device_map());
        geometry.mode().pack_stm_gain_header(&mut tx);
        assert!(tx.header().fpga_flag.contains(FPGAControlFlags::LEGACY_MODE));

        let geometry = make_geometry(Mode::Advanced);
        geometry.mode().pack_stm_gain_header(&mut tx);
        assert!(!tx.header().fpga_flag.contains(FPGAControlFlags::LEGACY_MODE));
    }
}
