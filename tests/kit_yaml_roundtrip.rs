use std::fs;

use drum_machine::model::kit::KitConfig;
use drum_machine::model::tempo::TempoOptions;
use drum_machine::model::track::TrackId;
use drum_machine::storage::kit::{open, save};

#[test]
fn roundtrip_kit_yaml() {
    let mut kit = KitConfig::default();
    kit.tempo.options = TempoOptions::new(vec![90, 120, 140]).expect("options");
    kit.tempo.default = 140;
    kit.mix.distortion = 0.25;
    kit.samples.insert(TrackId::Sample2, "/abs/snare.wav".into());

    let yaml = serde_yaml::to_string(&kit).expect("serialize");
    let out: KitConfig = serde_yaml::from_str(&yaml).expect("deserialize");
    assert_eq!(out, kit);
    assert!(yaml.contains("sample-2"));
}

#[test]
fn open_resolves_relative_samples_against_kit_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("kit.yaml");
    fs::write(
        &path,
        "samples:\n  sample-1: hits/one.wav\n  sample-3: /abs/three.wav\nlookahead_ms: 40\n",
    )
    .expect("write");

    let kit = open(&path).expect("open");
    assert_eq!(kit.samples[&TrackId::Sample1], dir.path().join("hits/one.wav").to_string_lossy());
    assert_eq!(kit.samples[&TrackId::Sample3], "/abs/three.wav");
    assert!(!kit.samples.contains_key(&TrackId::Sample2));
    assert_eq!(kit.lookahead_ms, 40);
    assert_eq!(kit.tempo.default, 97);
}

#[test]
fn save_then_open_keeps_settings() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("saved.yaml");
    let mut kit = KitConfig::default();
    kit.samples.clear();
    kit.mix.tone_db = -6.0;

    save(&kit, &path).expect("save");
    let back = open(&path).expect("open");
    assert_eq!(back, kit);
}

#[test]
fn open_rejects_default_outside_options() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bad.yaml");
    fs::write(&path, "tempo:\n  options: [100, 110]\n  default: 97\n").expect("write");

    let err = open(&path).unwrap_err();
    assert!(format!("{err:#}").contains("97"), "got: {err:#}");
}

#[test]
fn open_reports_missing_file() {
    let err = open("/definitely/not/here.yaml").unwrap_err();
    assert!(err.to_string().contains("not/here.yaml"));
}
