//! DSP Library
//!
//! The processing stages of the effect and the block pipeline that runs
//! them. Stateful stages implement the `Effect` trait so the pipeline can
//! prepare and reset them uniformly.

mod denormal;
mod effect;
mod filter;
mod meter;
mod mix;
mod pipeline;
mod reverb;
mod saturation;
mod smoothing;
mod width;

pub use effect::Effect;
pub use filter::{tone_to_settings, FilterMode, SvfState, ToneFilter};
pub use meter::{LevelMeters, MeterFollower, DECAY_PER_TICK, REFRESH_HZ};
pub use mix::{apply_trim, blend, gain_from_db, MixStage, SILENCE_FLOOR_DB};
pub use pipeline::{BlockPipeline, TAIL_LENGTH_SECS};
pub use reverb::{Reverb, ReverbParams};
pub use saturation::{saturate, Saturator};
pub use smoothing::SmoothedValue;
pub use width::{apply_width, StereoWidth, UNITY_WIDTH};
