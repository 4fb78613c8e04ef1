//! Louder - Real-Time Saturation and Reverb Processor
//!
//! A block-based effect chain combining:
//! - Soft-clip saturation, before or after the reverb
//! - A Freeverb-style reverb with Room, Hall and Plate voicings
//! - A single-knob tone filter sweeping low-pass to high-pass
//! - Mid/side stereo width
//! - Dry/wet mix with input and output trim
//!
//! # Architecture
//!
//! - `params`: parameter ids, the lock-free `ParamStore` and the per-block
//!   `ParameterSnapshot`
//! - `dsp`: the processing stages and the `BlockPipeline` that runs them
//! - `engine`: planar audio buffers and WAV I/O
//! - `cli`: the offline renderer behind `louder-cli`
//!
//! # Example
//!
//! ```
//! use louder::dsp::BlockPipeline;
//! use louder::engine::{AudioBuffer, ChannelLayout};
//! use louder::params::{ParamId, ParamStore};
//!
//! let store = ParamStore::new();
//! store.set(ParamId::Drive, 2.0);
//!
//! let mut pipeline = BlockPipeline::new();
//! pipeline.prepare(48000.0, 256).unwrap();
//!
//! let mut block = AudioBuffer::new(256, ChannelLayout::Stereo);
//! block.fill(0.25);
//! pipeline.process_with(&mut block, &store);
//! assert!(pipeline.meters().output() > 0.25);
//! ```

pub mod cli;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod params;

pub use error::{LouderError, Result};
