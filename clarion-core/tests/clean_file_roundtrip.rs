use std::path::PathBuf;

use clarion_core::audio::wav;
use clarion_core::inference::stub::PassthroughModel;
use clarion_core::{ClarionError, DenoiseEngine, EngineConfig, ModelHandle};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("clarion-e2e-{}-{name}", std::process::id()))
}

fn identity_engine() -> DenoiseEngine {
    DenoiseEngine::new(
        EngineConfig::default(),
        ModelHandle::new(PassthroughModel::new()),
    )
}

#[test]
fn twenty_five_second_upload_pads_to_three_segments() {
    let input = temp_path("25s-in.wav");
    let output = temp_path("25s-out.wav");

    // 25 s at 48 kHz. Deterministic non-zero samples so the padded tail is
    // distinguishable from real audio.
    let samples: Vec<f32> = (0..1_200_000)
        .map(|i| ((i % 4_801) as f32 / 4_801.0) * 0.9 + 0.05)
        .collect();
    wav::write_waveform(&input, &samples, 48_000).unwrap();

    let engine = identity_engine();
    engine.warm_up().unwrap();
    engine.clean_file(&input, &output).unwrap();

    let cleaned = wav::read_waveform(&output).unwrap();
    assert_eq!(cleaned.sample_rate, 48_000);
    // 3 segments of 10 s each: the padded duration is 30 s, not 25.
    assert_eq!(cleaned.len(), 1_440_000);
    assert_eq!(&cleaned.samples[..1_200_000], &samples[..]);
    assert!(cleaned.samples[1_200_000..].iter().all(|&s| s == 0.0));

    let snapshot = engine.diagnostics_snapshot();
    assert_eq!(snapshot.files_cleaned, 1);
    assert_eq!(snapshot.failures, 0);

    let _ = std::fs::remove_file(&input);
    let _ = std::fs::remove_file(&output);
}

#[test]
fn exact_multiple_upload_keeps_its_duration() {
    let input = temp_path("10s-in.wav");
    let output = temp_path("10s-out.wav");

    let samples: Vec<f32> = (0..480_000).map(|i| ((i % 960) as f32 / 960.0) - 0.5).collect();
    wav::write_waveform(&input, &samples, 48_000).unwrap();

    let engine = identity_engine();
    engine.warm_up().unwrap();
    engine.clean_file(&input, &output).unwrap();

    let cleaned = wav::read_waveform(&output).unwrap();
    assert_eq!(cleaned.len(), 480_000);
    assert_eq!(cleaned.samples, samples);

    let _ = std::fs::remove_file(&input);
    let _ = std::fs::remove_file(&output);
}

#[test]
fn zero_length_waveform_is_rejected() {
    let input = temp_path("empty-in.wav");
    let output = temp_path("empty-out.wav");

    wav::write_waveform(&input, &[], 48_000).unwrap();

    let engine = identity_engine();
    engine.warm_up().unwrap();
    let err = engine.clean_file(&input, &output).unwrap_err();
    assert!(matches!(err, ClarionError::EmptyWaveform), "got {err:?}");
    assert!(!output.exists(), "no partial output should be written");
    assert_eq!(engine.diagnostics_snapshot().failures, 1);

    let _ = std::fs::remove_file(&input);
}

#[test]
fn non_audio_input_fails_with_decode_error() {
    let input = temp_path("junk.flac");
    let output = temp_path("junk-out.wav");

    std::fs::write(&input, b"this is not audio at all").unwrap();

    let engine = identity_engine();
    engine.warm_up().unwrap();
    let err = engine.clean_file(&input, &output).unwrap_err();
    assert!(matches!(err, ClarionError::Decode(_)), "got {err:?}");
    assert!(!output.exists(), "no partial output should be written");

    let _ = std::fs::remove_file(&input);
}
