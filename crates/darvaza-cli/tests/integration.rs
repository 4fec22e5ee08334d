//! Integration tests for darvaza-cli.
//!
//! Runs the `darvaza` binary against generated WAV files.

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn darvaza_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_darvaza"))
}

fn write_sine(path: &Path, channels: u16, sample_rate: u32, frames: usize) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        let s = 0.5 * (2.0 * std::f32::consts::PI * 220.0 * i as f32 / sample_rate as f32).sin();
        for _ in 0..channels {
            writer.write_sample(s).unwrap();
        }
    }
    writer.finalize().unwrap();
}

// ---------------------------------------------------------------------------
// `darvaza params` / `darvaza presets`
// ---------------------------------------------------------------------------

#[test]
fn cli_params_lists_every_parameter() {
    let output = darvaza_bin().arg("params").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for id in ["waveform", "odd_speed", "playback_rate", "dry_mix"] {
        assert!(stdout.contains(id), "params listing should contain '{id}'");
    }
}

#[test]
fn cli_params_json_is_valid() {
    let output = darvaza_bin().args(["params", "--json"]).output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value.as_array().map(Vec::len), Some(12));
}

#[test]
fn cli_presets_list_and_show() {
    let output = darvaza_bin().args(["presets", "list"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("slow_motion"));

    let output = darvaza_bin()
        .args(["presets", "show", "choir", "--toml"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[params]"));
}

#[test]
fn cli_presets_show_unknown_fails() {
    let output = darvaza_bin()
        .args(["presets", "show", "no_such_preset"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// `darvaza process`
// ---------------------------------------------------------------------------

#[test]
fn cli_process_factory_preset() {
    let dir = TempDir::new().unwrap();
    let input_path = dir.path().join("input.wav");
    let output_path = dir.path().join("output.wav");
    write_sine(&input_path, 2, 44100, 44100);

    let output = darvaza_bin()
        .args([
            "process",
            input_path.to_str().unwrap(),
            output_path.to_str().unwrap(),
            "--factory",
            "choir",
            "--bpm",
            "96",
            "--time-signature",
            "3/4",
            "--set",
            "dry_mix=0.5",
        ])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "darvaza process failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let reader = hound::WavReader::open(&output_path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 44100);
    assert_eq!(reader.duration(), 44100);
}

#[test]
fn cli_process_pcm16_double_precision() {
    let dir = TempDir::new().unwrap();
    let input_path = dir.path().join("input.wav");
    let output_path = dir.path().join("output.wav");
    write_sine(&input_path, 1, 48000, 4800);

    let output = darvaza_bin()
        .args([
            "process",
            input_path.to_str().unwrap(),
            output_path.to_str().unwrap(),
            "--double",
            "--bit-depth",
            "16",
            "--block-size",
            "100",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let reader = hound::WavReader::open(&output_path).unwrap();
    assert_eq!(reader.spec().bits_per_sample, 16);
    assert_eq!(reader.duration(), 4800);
}

#[test]
fn cli_process_rejects_bad_assignment() {
    let dir = TempDir::new().unwrap();
    let input_path = dir.path().join("input.wav");
    let output_path = dir.path().join("output.wav");
    write_sine(&input_path, 1, 44100, 1000);

    let output = darvaza_bin()
        .args([
            "process",
            input_path.to_str().unwrap(),
            output_path.to_str().unwrap(),
            "--set",
            "harmonize=7",
        ])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(!output_path.exists());
}

#[test]
fn cli_process_nonexistent_input_fails() {
    let dir = TempDir::new().unwrap();
    let output = darvaza_bin()
        .args([
            "process",
            "/nonexistent/input.wav",
            dir.path().join("out.wav").to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(!output.status.success());
}
