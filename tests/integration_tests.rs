//! Integration Tests
//!
//! End-to-end tests for the Louder processing pipeline: parameter store to
//! pipeline to WAV files.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use louder::cli::commands::{build_store, render, RenderSettings};
use louder::dsp::{BlockPipeline, LevelMeters, MeterFollower, DECAY_PER_TICK};
use louder::engine::{export_wav, import_wav, AudioBuffer, ChannelLayout, ExportFormat};
use louder::params::{ParamId, ParamStore, ParameterSnapshot, ParameterSource};
use louder::LouderError;
use pretty_assertions::assert_eq;

const SAMPLE_RATE: f64 = 48000.0;

/// Helper to create a stereo sine buffer
fn create_sine_buffer(frequency: f32, num_samples: usize, amplitude: f32) -> AudioBuffer {
    let mut buffer = AudioBuffer::new(num_samples, ChannelLayout::Stereo);
    buffer.sample_rate = SAMPLE_RATE as u32;
    for ch in 0..2 {
        for (i, s) in buffer.channel_mut(ch).iter_mut().enumerate() {
            let t = i as f32 / SAMPLE_RATE as f32;
            *s = (2.0 * std::f32::consts::PI * frequency * t).sin() * amplitude;
        }
    }
    buffer
}

fn energy(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s * s).sum()
}

// === Full Pipeline Tests ===

#[test]
fn test_reverb_tail_crosses_blocks() {
    let store = ParamStore::new();
    store.set(ParamId::ReverbAmount, 100.0);
    store.set(ParamId::ReverbType, 1.0);
    store.set(ParamId::Decay, 90.0);

    let mut pipeline = BlockPipeline::new();
    pipeline.prepare(SAMPLE_RATE, 512).unwrap();

    let mut first = AudioBuffer::new(512, ChannelLayout::Stereo);
    first.set_sample(0, 0, 1.0);
    first.set_sample(1, 0, 1.0);
    pipeline.process_with(&mut first, &store);

    let mut tail_energy = 0.0;
    for _ in 0..40 {
        let mut silent = AudioBuffer::new(512, ChannelLayout::Stereo);
        pipeline.process_with(&mut silent, &store);
        tail_energy += energy(silent.channel(0)) + energy(silent.channel(1));
    }
    assert!(tail_energy > 0.0);
}

#[test]
fn test_parameter_change_does_not_click() {
    let render_run = |change_at: Option<usize>| {
        let store = ParamStore::new();
        store.set(ParamId::ReverbAmount, 100.0);

        let mut pipeline = BlockPipeline::new();
        pipeline.prepare(SAMPLE_RATE, 256).unwrap();
        let source = create_sine_buffer(110.0, 256 * 24, 0.5);

        let mut output = Vec::new();
        for (index, start) in (0..source.num_samples()).step_by(256).enumerate() {
            if Some(index) == change_at {
                store.set(ParamId::ReverbType, 2.0);
                store.set(ParamId::Decay, 10.0);
                store.set(ParamId::Damping, 90.0);
            }
            let mut block = AudioBuffer::default();
            block.copy_range_from(&source, start, 256);
            pipeline.process_with(&mut block, &store);
            output.extend_from_slice(block.channel(0));
        }
        output
    };

    let steady = render_run(None);
    let changed = render_run(Some(16));
    let boundary = 256 * 16;

    assert_eq!(steady[..boundary], changed[..boundary]);
    // Coefficients ramp, so the first samples after the change barely move
    assert!((steady[boundary] - changed[boundary]).abs() < 0.01);
    // ...but the change does take effect
    assert_ne!(steady[boundary + 1024..], changed[boundary + 1024..]);
}

#[test]
fn test_snapshot_from_store_matches_defaults() {
    let store = ParamStore::new();
    assert_eq!(ParameterSnapshot::capture(&store), ParameterSnapshot::default());
}

#[test]
fn test_legacy_names_in_preset() {
    let mut preset = tempfile::NamedTempFile::new().unwrap();
    write!(
        preset,
        r#"{{"reverb": 40, "prePostSwitch": true, "reverbType": "Plate"}}"#
    )
    .unwrap();

    let store = build_store(Some(preset.path()), &[]).unwrap();
    assert_eq!(store.get_by_name("reverbAmount"), Some(40.0));
    assert_eq!(store.get(ParamId::PrePost), 1.0);

    let snapshot = ParameterSnapshot::capture(&store);
    assert_eq!(snapshot.reverb_amount, 0.4);
}

#[test]
fn test_unknown_preset_key_is_rejected() {
    let mut preset = tempfile::NamedTempFile::new().unwrap();
    write!(preset, r#"{{"shimmer": 10}}"#).unwrap();
    let err = build_store(Some(preset.path()), &[]).unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_PARAMETER");
}

#[test]
fn test_reprepare_at_new_rate() {
    let store = ParamStore::new();
    store.set(ParamId::ReverbAmount, 70.0);
    store.set(ParamId::Tone, 30.0);

    let mut pipeline = BlockPipeline::new();
    pipeline.prepare(44100.0, 128).unwrap();
    let mut block = create_sine_buffer(440.0, 128, 0.3);
    pipeline.process_with(&mut block, &store);

    pipeline.release();
    pipeline.prepare(96000.0, 1024).unwrap();
    let mut silent = AudioBuffer::new(1024, ChannelLayout::Stereo);
    pipeline.process_with(&mut silent, &store);
    assert!(silent.samples.iter().flatten().all(|&s| s == 0.0));
}

// === Concurrency ===

#[test]
fn test_automation_thread_writes_while_processing() {
    let store = Arc::new(ParamStore::new());
    let running = Arc::new(AtomicBool::new(true));

    let writer = {
        let store = Arc::clone(&store);
        let running = Arc::clone(&running);
        thread::spawn(move || {
            let mut step = 0u32;
            while running.load(Ordering::Relaxed) {
                store.set(ParamId::Drive, (step % 11) as f32);
                store.set(ParamId::Tone, (step % 201) as f32 - 100.0);
                store.set(ParamId::Width, (step % 201) as f32);
                step = step.wrapping_add(1);
            }
        })
    };

    let mut pipeline = BlockPipeline::new();
    pipeline.prepare(SAMPLE_RATE, 256).unwrap();
    let source: Arc<dyn ParameterSource + Send + Sync> = store.clone();
    for _ in 0..200 {
        let mut block = create_sine_buffer(220.0, 256, 0.8);
        pipeline.process_with(&mut block, &source);
        assert!(block.is_finite());
    }

    running.store(false, Ordering::Relaxed);
    writer.join().unwrap();
}

#[test]
fn test_meter_reader_thread() {
    let meters = Arc::new(LevelMeters::new());
    let mut pipeline = BlockPipeline::with_meters(Arc::clone(&meters));
    pipeline.prepare(SAMPLE_RATE, 256).unwrap();

    let mut block = create_sine_buffer(1000.0, 256, 0.5);
    pipeline.process(&mut block, &ParameterSnapshot::default());

    let reader = {
        let meters = Arc::clone(&meters);
        thread::spawn(move || {
            let mut follower = MeterFollower::new();
            let first = follower.tick(meters.output());
            let second = follower.tick(0.0);
            (first, second)
        })
    };
    let (first, second) = reader.join().unwrap();
    assert_eq!(first, meters.output());
    assert_eq!(second, first * DECAY_PER_TICK);
}

// === File Rendering ===

#[test]
fn test_render_file_roundtrip() {
    let dir = tempfile::TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");
    export_wav(
        &create_sine_buffer(330.0, 4800, 0.5),
        &input,
        ExportFormat::pcm24(),
    )
    .unwrap();

    let store = build_store(
        None,
        &[
            "drive=3".to_string(),
            "reverbAmount=50".to_string(),
            "tone=-20".to_string(),
            "width=150".to_string(),
            "mix=70".to_string(),
            "output=-3".to_string(),
        ],
    )
    .unwrap();
    let report = render(&input, &output, &store, &RenderSettings::default()).unwrap();

    let rendered = import_wav(&output).unwrap();
    assert_eq!(rendered.sample_rate, 48000);
    assert_eq!(rendered.num_channels(), 2);
    assert_eq!(rendered.num_samples(), 4800 + 48000);
    assert_eq!(report.frames, rendered.num_samples());
    assert!(rendered.is_finite());
    assert!(report.output_peak > 0.0);
}

#[test]
fn test_render_missing_input() {
    let dir = tempfile::TempDir::new().unwrap();
    let result = render(
        &dir.path().join("nope.wav"),
        &dir.path().join("out.wav"),
        &ParamStore::new(),
        &RenderSettings::default(),
    );
    assert!(matches!(result, Err(LouderError::Wav(_))));
}
