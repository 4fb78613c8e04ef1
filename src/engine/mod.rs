//! Audio Engine Module
//!
//! Audio buffer management and WAV file I/O.

pub mod buffer;
pub mod io;

pub use buffer::{
    db_to_linear, linear_to_db, peak_magnitude, AudioBuffer, ChannelLayout, DEFAULT_SAMPLE_RATE,
    MAX_CHANNELS,
};
pub use io::{export_wav, import_wav, ExportFormat};
