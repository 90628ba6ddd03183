use sound_of_life::synth::{Oscillator, OscillatorRole, Waveform};

#[test]
fn returns_to_same_value_after_one_period() {
    // 48 kHz / 375 Hz = 128 samples, and 1/128 is exact in binary
    let mut osc = Oscillator::audio();
    osc.prepare_to_play(375.0, 48000.0, 512);

    let first = osc.process_sample();
    let mut last = first;
    for _ in 0..128 {
        last = osc.process_sample();
    }
    assert!((first - last).abs() < 1e-5, "{first} vs {last}");
}

#[test]
fn periodicity_holds_for_inexact_increments() {
    let mut osc = Oscillator::audio();
    osc.prepare_to_play(480.0, 48000.0, 256);

    let first = osc.process_sample();
    let mut last = first;
    for _ in 0..100 {
        last = osc.process_sample();
    }
    assert!((first - last).abs() < 1e-3, "{first} vs {last}");
}

#[test]
fn set_frequency_needs_update_phase_delta() {
    let mut osc = Oscillator::audio();
    osc.prepare_to_play(100.0, 1000.0, 64);
    assert!((osc.phase_delta() - 0.1).abs() < 1e-7);

    osc.set_frequency(200.0);
    assert_eq!(osc.frequency(), 200.0);
    assert!((osc.phase_delta() - 0.1).abs() < 1e-7);

    osc.update_phase_delta();
    assert!((osc.phase_delta() - 0.2).abs() < 1e-7);
}

#[test]
fn transient_frequency_is_not_persisted() {
    let mut osc = Oscillator::audio();
    osc.prepare_to_play(220.0, 44100.0, 128);
    for _ in 0..64 {
        osc.process_sample_at(330.0);
    }
    assert_eq!(osc.frequency(), 220.0);
    assert!((osc.phase_delta() - 220.0 / 44100.0).abs() < 1e-7);
}

#[test]
fn phase_stays_wrapped() {
    let mut osc = Oscillator::modulation();
    osc.prepare_to_play(0.1, 48000.0, 512);
    assert_eq!(osc.role(), OscillatorRole::Modulation);
    for _ in 0..1000 {
        osc.process_sample_at(15000.0);
        assert!((0.0..1.0).contains(&osc.phase()));
        osc.process_sample_at(-15000.0);
        assert!((0.0..1.0).contains(&osc.phase()));
    }
}

#[test]
fn prepare_resets_phase() {
    let mut osc = Oscillator::audio();
    osc.prepare_to_play(1000.0, 48000.0, 64);
    for _ in 0..10 {
        osc.process_sample();
    }
    assert!(osc.phase() > 0.0);
    osc.prepare_to_play(1000.0, 48000.0, 64);
    assert_eq!(osc.phase(), 0.0);
    assert_eq!(osc.sample_rate(), 48000.0);
    assert_eq!(osc.block_size(), 64);
}

#[test]
fn every_waveform_is_bounded() {
    for waveform in [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Sawtooth,
        Waveform::Triangle,
    ] {
        let mut osc = Oscillator::audio().with_waveform(waveform);
        osc.prepare_to_play(441.0, 44100.0, 64);
        for _ in 0..500 {
            let sample = osc.process_sample();
            assert!(
                (-1.0..=1.0).contains(&sample),
                "{waveform:?} produced {sample}"
            );
        }
    }
}
