//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use log::{debug, info, trace};

use crate::dsp::{BlockPipeline, MeterFollower, REFRESH_HZ, TAIL_LENGTH_SECS};
use crate::engine::{export_wav, import_wav, linear_to_db, AudioBuffer, ExportFormat};
use crate::error::{LouderError, Result};
use crate::params::{parse_assignment, ParamId, ParamStore, ParameterSource};

/// Settings for an offline render
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub block_size: usize,
    pub format: ExportFormat,
    pub append_tail: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            block_size: super::DEFAULT_BLOCK_SIZE,
            format: ExportFormat::float32(),
            append_tail: true,
        }
    }
}

/// What a render produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    /// Frames written, tail included
    pub frames: usize,
    pub blocks: usize,
    /// Highest input meter reading over the render
    pub input_peak: f32,
    /// Highest output meter reading over the render
    pub output_peak: f32,
    /// Displayed meter levels at the end of the render
    pub input_display: f32,
    pub output_display: f32,
}

/// Build a parameter store from an optional preset and `name=value` overrides
pub fn build_store(preset: Option<&Path>, assignments: &[String]) -> Result<ParamStore> {
    let store = ParamStore::new();
    if let Some(path) = preset {
        info!("Loading preset: {}", path.display());
        store.apply_preset_file(path)?;
    }
    for assignment in assignments {
        let (id, value) = parse_assignment(assignment)?;
        store.try_set(id, value)?;
        debug!("Set {} = {}", id, store.get(id));
    }
    Ok(store)
}

/// Run a WAV file through the pipeline block by block and write the result
pub fn render(
    input: &Path,
    output: &Path,
    store: &ParamStore,
    settings: &RenderSettings,
) -> Result<RenderReport> {
    if settings.block_size == 0 {
        return Err(LouderError::InvalidConfig {
            reason: "block size must be at least 1".to_string(),
        });
    }

    info!("Rendering {} -> {}", input.display(), output.display());
    let mut audio = import_wav(input)?;
    let sample_rate = audio.sample_rate;

    if settings.append_tail {
        let tail_frames = (TAIL_LENGTH_SECS * f64::from(sample_rate)).round() as usize;
        audio.extend_silence(tail_frames);
        debug!("Appended {} frames of tail", tail_frames);
    }

    let mut pipeline = BlockPipeline::new();
    pipeline.prepare(f64::from(sample_rate), settings.block_size)?;
    let meters = pipeline.meters();

    let total_frames = audio.num_samples();
    let frames_per_tick = (sample_rate / REFRESH_HZ).max(1) as usize;
    let mut input_follower = MeterFollower::new();
    let mut output_follower = MeterFollower::new();
    let mut next_tick = 0;

    let mut block = AudioBuffer::with_channels(audio.num_channels(), settings.block_size);
    let mut report = RenderReport {
        frames: total_frames,
        ..RenderReport::default()
    };

    for offset in (0..total_frames).step_by(settings.block_size) {
        let len = settings.block_size.min(total_frames - offset);
        block.copy_range_from(&audio, offset, len);
        pipeline.process_with(&mut block, store);
        block.copy_range_into(&mut audio, offset);

        let (input_level, output_level) = (meters.input(), meters.output());
        report.input_peak = report.input_peak.max(input_level);
        report.output_peak = report.output_peak.max(output_level);
        report.blocks += 1;

        while next_tick < offset + len {
            input_follower.tick(input_level);
            output_follower.tick(output_level);
            trace!(
                "Meters at frame {}: in {:.1} dB, out {:.1} dB",
                next_tick,
                linear_to_db(input_follower.level()),
                linear_to_db(output_follower.level())
            );
            next_tick += frames_per_tick;
        }
    }
    pipeline.release();

    report.input_display = input_follower.level();
    report.output_display = output_follower.level();

    export_wav(&audio, output, settings.format)?;

    info!(
        "Rendered {} frames in {} blocks (peak in {:.1} dB, peak out {:.1} dB)",
        report.frames,
        report.blocks,
        linear_to_db(report.input_peak),
        linear_to_db(report.output_peak)
    );
    Ok(report)
}

/// Print the parameter table, or its JSON form
pub fn list_params(json: bool) -> Result<()> {
    let infos: Vec<_> = ParamId::ALL.iter().map(|id| id.info()).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    println!(
        "{:<14} {:<16} {:>8} {:>8} {:>8}  {}",
        "ID", "NAME", "MIN", "MAX", "DEFAULT", "UNIT"
    );
    for info in &infos {
        let unit = if info.choices.is_empty() {
            info.unit.to_string()
        } else {
            info.choices.join(" | ")
        };
        println!(
            "{:<14} {:<16} {:>8} {:>8} {:>8}  {}",
            info.id, info.name, info.min, info.max, info.default, unit
        );
    }
    Ok(())
}
