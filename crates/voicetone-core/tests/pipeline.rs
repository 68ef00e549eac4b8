//! End-to-end pipeline tests over synthesized recordings

use std::f32::consts::PI;
use std::path::Path;

use voicetone_core::cluster::SpeakerLabel;
use voicetone_core::config::Config;
use voicetone_core::pipeline::{self, AnalysisError, RunOptions};
use voicetone_core::tone::Register;

const SAMPLE_RATE: u32 = 44100;

/// Write a mono WAV made of back-to-back constant-frequency segments.
/// A zero frequency produces silence for that segment.
fn write_wav(path: &Path, segments: &[(f32, f32)]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();

    for &(freq, secs) in segments {
        let n = (secs * SAMPLE_RATE as f32) as usize;
        for i in 0..n {
            let sample = if freq > 0.0 {
                (2.0 * PI * freq * i as f32 / SAMPLE_RATE as f32).sin() * 0.5
            } else {
                0.0
            };
            writer.write_sample(sample).unwrap();
        }
    }
    writer.finalize().unwrap();
}

fn no_plot() -> RunOptions {
    RunOptions { plot_path: None }
}

#[test]
fn test_two_tone_recording_splits_into_two_groups() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conversation.wav");
    // A low and a high voice taking turns
    write_wav(
        &path,
        &[(110.0, 1.0), (250.0, 1.0), (110.0, 1.0), (250.0, 1.0)],
    );

    let report = pipeline::analyze_file(&path, &Config::default(), &no_plot()).unwrap();

    assert_eq!(report.groups.len(), 2);
    assert_eq!(report.groups[0].label, SpeakerLabel::Male);
    assert_eq!(report.groups[1].label, SpeakerLabel::Female);

    let male = &report.groups[0].stats;
    let female = &report.groups[1].stats;
    assert!(male.mean_hz < female.mean_hz);
    assert!(
        (male.mean_hz - 110.0).abs() < 15.0,
        "male mean {} too far from 110Hz",
        male.mean_hz
    );
    assert!(
        (female.mean_hz - 250.0).abs() < 15.0,
        "female mean {} too far from 250Hz",
        female.mean_hz
    );
    assert_eq!(female.register, Register::MezzoSoprano);
}

#[test]
fn test_stats_are_internally_consistent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conversation.wav");
    write_wav(&path, &[(120.0, 1.5), (260.0, 1.5)]);

    let report = pipeline::analyze_file(&path, &Config::default(), &no_plot()).unwrap();

    for group in &report.groups {
        let stats = &group.stats;
        assert!(stats.min_hz <= stats.mean_hz && stats.mean_hz <= stats.max_hz);
        assert!((stats.range_hz - (stats.max_hz - stats.min_hz)).abs() < 1e-12);
        assert!(stats.std_hz >= 0.0);
    }
}

#[test]
fn test_silence_is_reported_as_no_voiced_frames() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("silence.wav");
    write_wav(&path, &[(0.0, 2.0)]);

    let result = pipeline::analyze_file(&path, &Config::default(), &no_plot());
    assert!(matches!(result, Err(AnalysisError::EmptyPitch)));
}

#[test]
fn test_missing_file_is_a_decode_error() {
    let result = pipeline::analyze_file(
        Path::new("/nonexistent/recording.mp3"),
        &Config::default(),
        &no_plot(),
    );
    assert!(matches!(result, Err(AnalysisError::AudioFile(_))));
}

#[test]
fn test_runs_are_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conversation.wav");
    write_wav(&path, &[(100.0, 1.0), (230.0, 1.0)]);

    let config = Config::default();
    let a = pipeline::analyze_file(&path, &config, &no_plot()).unwrap();
    let b = pipeline::analyze_file(&path, &config, &no_plot()).unwrap();

    assert_eq!(a.groups.len(), b.groups.len());
    for (x, y) in a.groups.iter().zip(b.groups.iter()) {
        assert_eq!(x.stats.mean_hz, y.stats.mean_hz);
        assert_eq!(x.stats.range_hz, y.stats.range_hz);
    }
}

#[test]
fn test_unwritable_plot_path_degrades_to_no_plot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conversation.wav");
    write_wav(&path, &[(110.0, 1.0), (250.0, 1.0)]);

    let options = RunOptions {
        plot_path: Some(Path::new("/nonexistent-dir/plot.png").to_path_buf()),
    };
    let report = pipeline::analyze_file(&path, &Config::default(), &options).unwrap();

    assert_eq!(report.groups.len(), 2);
    assert!(report.plot.is_none());
}

#[test]
fn test_analyze_bytes_matches_analyze_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conversation.wav");
    write_wav(&path, &[(110.0, 1.0), (250.0, 1.0)]);
    let bytes = std::fs::read(&path).unwrap();

    let config = Config::default();
    let from_file = pipeline::analyze_file(&path, &config, &no_plot()).unwrap();
    let from_bytes = pipeline::analyze_bytes(&bytes, Some("wav"), &config, &no_plot()).unwrap();

    assert_eq!(from_file.groups.len(), from_bytes.groups.len());
    for (x, y) in from_file.groups.iter().zip(from_bytes.groups.iter()) {
        assert_eq!(x.stats.mean_hz, y.stats.mean_hz);
    }
}
