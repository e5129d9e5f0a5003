mod emulator_link;

use emulator_link::Emulator;

use midair::prelude::*;
use midair_driver::{
    cpu::MSG_BEGIN,
    defined::PI,
    fpga::{LegacyDrive, Drive, FPGA_CLK_FREQ, NUM_TRANS_IN_UNIT},
};

fn open(mode: Mode, num_devices: usize) -> Controller<Emulator> {
    let mut geometry = Geometry::new(mode);
    (0..num_devices).for_each(|i| {
        geometry.add_device(Vector3::new(192.0 * i as float, 0.0, 0.0), Vector3::zeros());
    });
    let mut cnt = Controller::open(geometry, Emulator::new()).unwrap();
    cnt.check_trials = 50;
    cnt
}

#[test]
fn static_modulation() {
    let mut cnt = open(Mode::Legacy, 1);

    let mut m = Static::new(1.0);
    assert!(cnt.send_header(&mut m).unwrap());

    let fpga = cnt.link().cpu(0).fpga();
    assert_eq!(2, fpga.modulation_cycle());
    assert_eq!(vec![0xFF, 0xFF], fpga.modulation());
}

#[test]
fn sine_modulation() {
    let mut cnt = open(Mode::Legacy, 1);

    let mut m = Sine::new(150);
    assert!(cnt.send_header(&mut m).unwrap());

    let fpga = cnt.link().cpu(0).fpga();
    assert_eq!(80, fpga.modulation_cycle());
    assert_eq!(
        [85, 108, 132, 157, 183, 210, 237, 246, 219, 192],
        fpga.modulation()[..10]
    );
    assert_eq!(40960, fpga.modulation_frequency_division());
}

#[test]
fn square_modulation() {
    let mut cnt = open(Mode::Legacy, 1);

    let mut m = Square::with_params(150, 0.0, 1.0, 0.5);
    assert!(cnt.send_header(&mut m).unwrap());

    let fpga = cnt.link().cpu(0).fpga();
    let buffer = fpga.modulation();
    assert_eq!(80, buffer.len());
    assert!(buffer[..13].iter().all(|&v| v == 0xFF));
    assert!(buffer[13..26].iter().all(|&v| v == 0x00));
}

#[test]
fn focus_gain_legacy() {
    let mut cnt = open(Mode::Legacy, 2);

    let point = cnt.geometry().center() + Vector3::new(0.0, 0.0, 150.0);
    let mut g = Focus::new(point);
    assert!(cnt.send_body(&mut g).unwrap());

    let sound_speed = cnt.geometry().sound_speed;
    let attenuation = cnt.geometry().attenuation;
    for dev in 0..2 {
        let stored = cnt.link().cpu(dev).fpga().drives_legacy();
        cnt.geometry()[dev].iter().for_each(|tr| {
            let local_idx = tr.idx() - dev * NUM_TRANS_IN_UNIT;
            let (duty, phase) = stored[local_idx];

            // maximum amplitude everywhere
            assert_eq!(0xFF, duty);

            // the stored phase must cancel the propagation phase
            let p = midair_driver::acoustics::propagate::<midair_driver::acoustics::Sphere>(
                tr.position(),
                &tr.z_direction(),
                attenuation,
                tr.wavenumber(sound_speed),
                &point,
            );
            let expect = LegacyDrive::to_phase(&Drive {
                phase: (-p.arg() / (2.0 * PI)).rem_euclid(1.0),
                amp: 1.0,
            });
            let diff = (phase as i32 - expect as i32).rem_euclid(256);
            assert!(diff.min(256 - diff) <= 1, "diff = {diff}");
        });
    }
}

#[test]
fn focus_stm_circle() {
    let mut cnt = open(Mode::Legacy, 1);
    assert!(cnt.synchronize().unwrap());

    let center = cnt.geometry().center() + Vector3::new(0.0, 0.0, 150.0);
    let sound_speed = cnt.geometry().sound_speed;

    let mut stm = FocusSTM::new(sound_speed);
    const SIZE: usize = 200;
    (0..SIZE).for_each(|i| {
        let theta = 2.0 * PI * i as float / SIZE as float;
        stm.add(center + Vector3::new(30.0 * theta.cos(), 30.0 * theta.sin(), 0.0));
    });
    let freq = stm.set_frequency(1.0);
    approx::assert_abs_diff_eq!(1.0, freq, epsilon = 1e-9);

    assert!(cnt.send_body(&mut stm).unwrap());

    let fpga = cnt.link().cpu(0).fpga();
    assert_eq!(SIZE, fpga.stm_cycle());
    assert_eq!(819_200, fpga.stm_frequency_division());
    assert!(fpga.is_stm_mode());
    assert!(!fpga.is_stm_gain_mode());

    // the FPGA's integer phase pipeline must agree with the acoustic
    // expectation within 2pi/100
    let geometry = cnt.geometry();
    let wavelength = geometry.transducers().next().unwrap().wavelength(sound_speed);
    (0..SIZE).step_by(20).for_each(|i| {
        let theta = 2.0 * PI * i as float / SIZE as float;
        let focus = center + Vector3::new(30.0 * theta.cos(), 30.0 * theta.sin(), 0.0);
        let drives = fpga.focus_stm_drive(i);
        geometry.transducers().for_each(|tr| {
            let (duty, phase) = drives[tr.idx()];
            assert_eq!(2048, duty);

            let dist = (focus - tr.position()).norm();
            let expect = (dist / wavelength * 4096.0).rem_euclid(4096.0);
            let diff = (phase as float - expect).rem_euclid(4096.0);
            let diff = diff.min(4096.0 - diff);
            assert!(diff <= 4096.0 / 100.0, "diff = {diff}");
        });
    });
}

#[test]
fn gain_stm_legacy_phase_half() {
    let mut cnt = open(Mode::Legacy, 1);

    const SIZE: usize = 50;
    let mut stm = GainSTM::new();
    (0..SIZE).for_each(|i| {
        let theta = 2.0 * PI * i as float / SIZE as float;
        stm.add(Focus::new(Vector3::new(
            86.0 + 30.0 * theta.cos(),
            66.0 + 30.0 * theta.sin(),
            150.0,
        )));
    });
    stm.mode = GainSTMMode::PhaseHalf;
    stm.set_sampling_frequency_division(3224);

    assert!(cnt.send_body(&mut stm).unwrap());

    let fpga = cnt.link().cpu(0).fpga();
    assert_eq!(SIZE, fpga.stm_cycle());
    assert!(fpga.is_stm_gain_mode());
    assert!(fpga.is_legacy_mode());

    // stored phases are the 4-bit value replicated into both nibbles
    (0..SIZE).for_each(|k| {
        fpga.gain_stm_legacy_drive(k).iter().for_each(|&(duty, phase)| {
            assert_eq!(0xFF, duty);
            assert_eq!((phase >> 4) * 0x11, phase);
        });
    });
}

#[test]
fn advanced_gain_needs_two_frames() {
    let mut cnt = open(Mode::Advanced, 1);

    let mut g = Focus::new(Vector3::new(86.0, 66.0, 150.0));
    assert!(cnt.send_body(&mut g).unwrap());

    // two frames were pumped under distinct message ids
    assert_eq!(2, cnt.link().sent_msg_ids().len());

    let fpga = cnt.link().cpu(0).fpga();
    assert!(!fpga.is_legacy_mode());
    assert!(fpga
        .drives_advanced()
        .iter()
        .all(|&(duty, _)| duty == 2048));
}

#[test]
fn synchronize_and_clear() {
    let mut cnt = open(Mode::Advanced, 2);
    cnt.geometry_mut()
        .transducers_mut()
        .for_each(|tr| tr.set_frequency(70e3));

    assert!(cnt.synchronize().unwrap());
    (0..2).for_each(|dev| {
        assert!(cnt.link().cpu(dev).synchronized());
        assert_eq!(vec![2341u16; NUM_TRANS_IN_UNIT], cnt.link().cpu(dev).fpga().cycles());
    });

    assert!(cnt.clear().unwrap());
    assert_eq!(2, cnt.link().cpu(0).fpga().modulation_cycle());
}

#[test]
fn legacy_sync_rejects_cycle_change() {
    let mut cnt = open(Mode::Legacy, 1);
    cnt.geometry_mut()
        .transducers_mut()
        .for_each(|tr| tr.set_frequency(70e3));

    assert!(cnt.synchronize().is_err());
}

#[test]
fn firmware_infos() {
    let mut cnt = open(Mode::Legacy, 2);

    let infos = cnt.firmware_infos().unwrap();
    assert_eq!(2, infos.len());
    infos.iter().for_each(|info| {
        assert_eq!("v2.7", info.cpu_version());
        assert_eq!("v2.7", info.fpga_version());
    });
}

#[test]
fn msg_ids_cycle_without_gap() {
    let mut cnt = open(Mode::Legacy, 1);

    for _ in 0..300 {
        assert!(cnt.update_flag().unwrap());
    }
    let ids = cnt.link().sent_msg_ids().to_vec();
    assert_eq!(MSG_BEGIN, ids[0]);
    ids.windows(2).for_each(|w| {
        let expect = if w[0] == 0xF0 { 0x05 } else { w[0] + 1 };
        assert_eq!(expect, w[1]);
    });
}

#[test]
fn dropped_acks_fail_after_trials() {
    let mut cnt = open(Mode::Legacy, 1);
    cnt.check_trials = 2;
    cnt.link_mut().set_drop_acks(true);

    let mut m = Static::new(1.0);
    assert!(!cnt.send_header(&mut m).unwrap());
}

#[test]
fn stop_zeroes_duty() {
    let mut cnt = open(Mode::Advanced, 1);

    let mut g = Focus::new(Vector3::new(86.0, 66.0, 150.0));
    assert!(cnt.send_body(&mut g).unwrap());
    assert!(cnt.stop().unwrap());

    assert!(cnt
        .link()
        .cpu(0)
        .fpga()
        .drives_advanced()
        .iter()
        .all(|&(duty, _)| duty == 0));
}

#[test]
fn software_stm_returns_controller() {
    let cnt = open(Mode::Legacy, 1);

    let mut stm = SoftwareSTM::new();
    stm.timer_strategy = TimerStrategy::Sleep;
    stm.add(Focus::new(Vector3::new(86.0, 66.0, 150.0)));
    stm.add(Null::new());
    stm.set_frequency(50.0);

    let handle = stm.start(cnt);
    std::thread::sleep(std::time::Duration::from_millis(50));
    let cnt = handle.finish().unwrap();

    // the worker pumped at least one full cycle before hand-back
    assert!(cnt.link().sent_msg_ids().len() >= 2);
}

#[test]
fn mod_delay_config() {
    let mut cnt = open(Mode::Legacy, 1);

    cnt.geometry_mut()
        .transducers_mut()
        .for_each(|tr| tr.set_mod_delay(tr.idx() as u16));

    let mut d = ModDelayConfig::default();
    assert!(cnt.send_body(&mut d).unwrap());

    let delays = cnt.link().cpu(0).fpga().mod_delays();
    (0..NUM_TRANS_IN_UNIT).for_each(|i| assert_eq!(i as u16, delays[i]));
}

#[test]
fn fpga_clk_constant() {
    assert_eq!(163_840_000, FPGA_CLK_FREQ);
}
