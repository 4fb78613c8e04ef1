//! Parameter presets
//!
//! A preset is a JSON object mapping parameter ids to values, e.g.
//! `{"drive": 4, "reverbType": "Hall", "prePost": "POST", "bypass": false}`.

use std::collections::BTreeMap;
use std::path::Path;

use log::debug;
use serde_json::Value;

use super::{ParamId, ParamKind, ParamStore};
use crate::error::{LouderError, Result};

/// Convert a JSON value into the stored representation of `id`
///
/// Numbers are taken as plain units, booleans as 0/1 for bool parameters,
/// and strings as choice names (case-insensitive) or numeric text.
pub fn parse_value(id: ParamId, value: &Value) -> Result<f32> {
    match (id.kind(), value) {
        (_, Value::Number(n)) => n
            .as_f64()
            .map(|v| v as f32)
            .filter(|v| v.is_finite())
            .ok_or_else(|| LouderError::invalid_param(id.id(), n, "a number")),
        (ParamKind::Bool, Value::Bool(b)) => Ok(if *b { 1.0 } else { 0.0 }),
        (_, Value::String(s)) => parse_text(id, s),
        (ParamKind::Bool, other) => Err(LouderError::invalid_param(id.id(), other, "a boolean")),
        (ParamKind::Choice(choices), other) => Err(LouderError::invalid_param(
            id.id(),
            other,
            &choices.join(" | "),
        )),
        (ParamKind::Float, other) => Err(LouderError::invalid_param(id.id(), other, "a number")),
    }
}

fn parse_text(id: ParamId, text: &str) -> Result<f32> {
    let text = text.trim();
    match id.kind() {
        ParamKind::Choice(choices) => {
            if let Some(index) = choices.iter().position(|c| c.eq_ignore_ascii_case(text)) {
                return Ok(index as f32);
            }
        }
        ParamKind::Bool => match text.to_ascii_lowercase().as_str() {
            "true" | "on" => return Ok(1.0),
            "false" | "off" => return Ok(0.0),
            _ => {}
        },
        ParamKind::Float => {}
    }

    let expected = match id.kind() {
        ParamKind::Choice(choices) => choices.join(" | "),
        ParamKind::Bool => "true | false".to_string(),
        ParamKind::Float => "a number".to_string(),
    };
    text.parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| LouderError::invalid_param(id.id(), text, &expected))
}

/// Parse a `name=value` assignment as given on the command line
pub fn parse_assignment(assignment: &str) -> Result<(ParamId, f32)> {
    let (name, value) = assignment
        .split_once('=')
        .ok_or_else(|| LouderError::invalid_param(assignment, assignment, "name=value"))?;
    let id = ParamId::from_name(name.trim()).ok_or_else(|| LouderError::UnknownParameter {
        name: name.trim().to_string(),
    })?;
    Ok((id, parse_text(id, value)?))
}

impl ParamStore {
    /// Apply every entry of a JSON preset object
    ///
    /// Entries are validated before any value is written, so a bad preset
    /// leaves the store untouched.
    pub fn apply_json(&self, json: &Value) -> Result<()> {
        let entries: BTreeMap<String, Value> = serde_json::from_value(json.clone())?;

        let mut parsed = Vec::with_capacity(entries.len());
        for (name, value) in &entries {
            let id = ParamId::from_name(name).ok_or_else(|| LouderError::UnknownParameter {
                name: name.clone(),
            })?;
            parsed.push((id, parse_value(id, value)?));
        }

        for (id, value) in parsed {
            self.try_set(id, value)?;
        }
        Ok(())
    }

    /// Load a preset file into the store
    pub fn apply_preset_file(&self, path: &Path) -> Result<()> {
        let text = std::fs::read_to_string(path)?;
        let json: Value = serde_json::from_str(&text)?;
        self.apply_json(&json)?;
        debug!("Applied preset {}", path.display());
        Ok(())
    }

    /// Current values as a JSON preset object
    pub fn to_json(&self) -> Value {
        let map: serde_json::Map<String, Value> = self
            .values()
            .into_iter()
            .map(|(id, value)| (id.id().to_string(), Value::from(value)))
            .collect();
        Value::Object(map)
    }
}
