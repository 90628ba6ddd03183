use sound_of_life::synth::{ConfigError, SynthConfig, Waveform};

#[test]
fn defaults_are_valid() {
    let config = SynthConfig::default();
    config.validate().unwrap();
    assert_eq!(config.num_lfos(), 4);
    assert_eq!(config.columns_per_oscillator(), 4);
    assert_eq!(config.cells_per_block(), 128);
}

#[test]
fn partial_json_overrides_only_named_fields() {
    let config = SynthConfig::from_json_str(
        r#"{
            "rows": 16,
            "columns": 16,
            "num_oscillators": 4,
            "lfo_waveform": "triangle",
            "reverb": { "reset_each_block": false }
        }"#,
    )
    .unwrap();

    assert_eq!(config.rows, 16);
    assert_eq!(config.num_oscillators, 4);
    assert_eq!(config.lfo_waveform, Waveform::Triangle);
    assert!(!config.reverb.reset_each_block);
    assert_eq!(config.reverb.channels, 8);
    assert_eq!(config.start_frequency, SynthConfig::default().start_frequency);
}

#[test]
fn json_output_loads_back() {
    let json = SynthConfig::default().to_json_pretty().unwrap();
    assert_eq!(SynthConfig::from_json_str(&json).unwrap(), SynthConfig::default());
}

#[test]
fn malformed_json_is_a_parse_error() {
    let result = SynthConfig::from_json_str("{ rows: 4 ");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn missing_file_is_an_io_error() {
    let path = std::env::temp_dir().join("sound_of_life_missing_config.json");
    let _ = std::fs::remove_file(&path);
    assert!(matches!(SynthConfig::load(&path), Err(ConfigError::Io { .. })));
}

#[test]
fn loads_from_file() {
    let path = std::env::temp_dir().join("sound_of_life_config_test.json");
    std::fs::write(&path, r#"{ "start_frequency": 110.0 }"#).unwrap();
    let config = SynthConfig::load(&path).unwrap();
    assert_eq!(config.start_frequency, 110.0);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn validation_catches_each_bad_field() {
    let bad = |edit: fn(&mut SynthConfig)| {
        let mut config = SynthConfig::default();
        edit(&mut config);
        config.validate().unwrap_err()
    };

    assert!(matches!(
        bad(|c| c.rows = 0),
        ConfigError::EmptyGrid { rows: 0, .. }
    ));
    assert!(matches!(
        bad(|c| c.num_oscillators = 0),
        ConfigError::NoOscillators
    ));
    assert!(matches!(
        bad(|c| c.lfo_frequencies.clear()),
        ConfigError::NoLfos
    ));
    assert!(matches!(
        bad(|c| c.lfo_frequencies = vec![1.0; 9]),
        ConfigError::TooManyLfos { lfos: 9, oscillators: 8 }
    ));
    assert!(matches!(
        bad(|c| c.columns = 30),
        ConfigError::UnevenColumns { .. }
    ));
    assert!(matches!(
        bad(|c| c.start_frequency = -1.0),
        ConfigError::NonPositive { name: "start_frequency", .. }
    ));
    assert!(matches!(
        bad(|c| c.lfo_frequencies[2] = f32::NAN),
        ConfigError::NonPositive { name: "lfo_frequencies", .. }
    ));
    assert!(matches!(
        bad(|c| c.fade_decay = 1.0),
        ConfigError::OutOfRange { name: "fade_decay", .. }
    ));
    assert!(matches!(
        bad(|c| c.initial_density = 1.5),
        ConfigError::OutOfRange { name: "initial_density", .. }
    ));
    assert!(matches!(
        bad(|c| c.generation_interval_ms = 0),
        ConfigError::ZeroGenerationInterval
    ));
    assert!(matches!(
        bad(|c| c.reverb.channels = 6),
        ConfigError::ReverbChannels(6)
    ));
    assert!(matches!(
        bad(|c| c.reverb.diffusion_steps = 0),
        ConfigError::ReverbDiffusion
    ));
    assert!(matches!(
        bad(|c| c.reverb.dry_wet = 2.0),
        ConfigError::OutOfRange { name: "reverb.dry_wet", .. }
    ));
}
