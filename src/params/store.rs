//! Lock-free parameter storage
//!
//! One atomic float cell per parameter. Writers (host automation, presets,
//! the CLI) and the audio thread never block each other.

use std::sync::atomic::Ordering;

use atomic_float::AtomicF32;

use super::{ParamId, ParameterSource};
use crate::error::{LouderError, Result};

/// Current value of every parameter
///
/// Writes are clamped into each parameter's range and non-finite writes are
/// dropped, so readers always see an in-range value.
#[derive(Debug)]
pub struct ParamStore {
    values: [AtomicF32; ParamId::COUNT],
}

impl ParamStore {
    /// Create a store holding every parameter's default
    pub fn new() -> Self {
        Self {
            values: std::array::from_fn(|i| AtomicF32::new(ParamId::ALL[i].default_value())),
        }
    }

    /// Set a parameter in plain units
    ///
    /// Returns false (and leaves the value unchanged) for NaN or infinity.
    pub fn set(&self, id: ParamId, value: f32) -> bool {
        if !value.is_finite() {
            return false;
        }
        self.values[id.index()].store(id.constrain(value), Ordering::Relaxed);
        true
    }

    /// Like `set`, but a non-finite value is an error
    pub fn try_set(&self, id: ParamId, value: f32) -> Result<()> {
        if !self.set(id, value) {
            return Err(LouderError::invalid_param(id.id(), value, "a finite number"));
        }
        Ok(())
    }

    /// Set a parameter by id string
    pub fn set_by_name(&self, name: &str, value: f32) -> Result<()> {
        let id = ParamId::from_name(name).ok_or_else(|| LouderError::UnknownParameter {
            name: name.to_string(),
        })?;
        self.try_set(id, value)
    }

    /// Restore every parameter to its default
    pub fn reset(&self) {
        for id in ParamId::ALL {
            self.values[id.index()].store(id.default_value(), Ordering::Relaxed);
        }
    }

    /// (id, value) pairs in storage order
    pub fn values(&self) -> Vec<(ParamId, f32)> {
        ParamId::ALL.iter().map(|&id| (id, self.get(id))).collect()
    }
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ParamStore {
    fn clone(&self) -> Self {
        let store = Self::new();
        for id in ParamId::ALL {
            store.values[id.index()].store(self.get(id), Ordering::Relaxed);
        }
        store
    }
}

impl ParameterSource for ParamStore {
    #[inline]
    fn get(&self, id: ParamId) -> f32 {
        self.values[id.index()].load(Ordering::Relaxed)
    }
}
