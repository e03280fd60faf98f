use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

fn bin() -> Command {
    Command::cargo_bin("drum-machine").expect("binary")
}

#[test]
fn help_lists_options() {
    bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--kit").and(predicate::str::contains("--bpm")));
}

#[test]
fn bpm_outside_options_is_rejected() {
    bin()
        .args(["--bpm", "100", "--list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("100"));
}

#[test]
fn list_shows_every_track_even_without_samples() {
    let dir = tempfile::tempdir().expect("tempdir");
    bin()
        .current_dir(dir.path())
        .args(["--list", "--bpm", "138"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Sine Wave")
                .and(predicate::str::contains("Brown Noise"))
                .and(predicate::str::contains("Scream 3"))
                .and(predicate::str::contains("failed"))
                .and(predicate::str::contains("tempo 138 bpm")),
        );
}

#[test]
fn list_json_reports_loaded_samples() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("one.wav"), wav_bytes(8000, 800)).expect("wav");
    let kit = dir.path().join("kit.yaml");
    fs::write(&kit, "samples:\n  sample-1: one.wav\n").expect("kit");

    let out = bin()
        .args(["--list", "--json", "--kit"])
        .arg(&kit)
        .output()
        .expect("run");
    assert!(out.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json");
    let rows = rows.as_array().expect("array");
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[3]["track"], "sample-1");
    assert_eq!(rows[3]["status"], "loaded");
    assert!((rows[3]["seconds"].as_f64().unwrap() - 0.1).abs() < 1e-3);
    assert_eq!(rows[0]["source"], "tone");
    assert!(rows[4]["status"].as_str().unwrap().starts_with("failed"));
}

#[test]
fn json_requires_list() {
    bin().arg("--json").assert().failure();
}

/// A mono 16-bit PCM WAV of silence.
fn wav_bytes(sample_rate: u32, frames: u32) -> Vec<u8> {
    let data_len = frames * 2;
    let mut b = Vec::new();
    b.extend_from_slice(b"RIFF");
    b.extend_from_slice(&(36 + data_len).to_le_bytes());
    b.extend_from_slice(b"WAVEfmt ");
    b.extend_from_slice(&16u32.to_le_bytes());
    b.extend_from_slice(&1u16.to_le_bytes());
    b.extend_from_slice(&1u16.to_le_bytes());
    b.extend_from_slice(&sample_rate.to_le_bytes());
    b.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    b.extend_from_slice(&2u16.to_le_bytes());
    b.extend_from_slice(&16u16.to_le_bytes());
    b.extend_from_slice(b"data");
    b.extend_from_slice(&data_len.to_le_bytes());
    b.resize(b.len() + data_len as usize, 0);
    b
}
