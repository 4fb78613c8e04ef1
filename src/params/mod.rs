//! Parameters
//!
//! The fixed set of user controls, the source the pipeline reads them from,
//! and the typed snapshot it captures once per block.

mod preset;
mod snapshot;
mod store;

pub use preset::{parse_assignment, parse_value};
pub use snapshot::ParameterSnapshot;
pub use store::ParamStore;

use serde::Serialize;

/// Gain parameter range in dB
const GAIN_RANGE: (f32, f32) = (-100.0, 24.0);

/// Percentage parameter range
const PERCENT_RANGE: (f32, f32) = (0.0, 100.0);

/// Names of the `prePost` choices, by index
pub const PRE_POST_CHOICES: &[&str] = &["PRE", "POST"];

/// Names of the `reverbType` choices, by index
pub const REVERB_TYPE_CHOICES: &[&str] = &["Room", "Hall", "Plate"];

// ============================================================================
// Parameter Ids
// ============================================================================

/// Every recognised parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamId {
    Bypass,
    Input,
    Drive,
    ReverbAmount,
    PrePost,
    ReverbType,
    Decay,
    Damping,
    Tone,
    Width,
    Mix,
    Output,
}

/// How a parameter's value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Stored as 0.0 or 1.0
    Bool,
    /// Continuous value within the range
    Float,
    /// Index into a list of choice names
    Choice(&'static [&'static str]),
}

impl ParamId {
    /// Number of parameters
    pub const COUNT: usize = 12;

    /// All parameters in storage order
    pub const ALL: [ParamId; Self::COUNT] = [
        ParamId::Bypass,
        ParamId::Input,
        ParamId::Drive,
        ParamId::ReverbAmount,
        ParamId::PrePost,
        ParamId::ReverbType,
        ParamId::Decay,
        ParamId::Damping,
        ParamId::Tone,
        ParamId::Width,
        ParamId::Mix,
        ParamId::Output,
    ];

    /// Storage index of this parameter
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Parameter id string
    pub fn id(self) -> &'static str {
        match self {
            ParamId::Bypass => "bypass",
            ParamId::Input => "input",
            ParamId::Drive => "drive",
            ParamId::ReverbAmount => "reverbAmount",
            ParamId::PrePost => "prePost",
            ParamId::ReverbType => "reverbType",
            ParamId::Decay => "decay",
            ParamId::Damping => "damping",
            ParamId::Tone => "tone",
            ParamId::Width => "width",
            ParamId::Mix => "mix",
            ParamId::Output => "output",
        }
    }

    /// Human-readable name
    pub fn display_name(self) -> &'static str {
        match self {
            ParamId::Bypass => "Bypass",
            ParamId::Input => "Input",
            ParamId::Drive => "Drive",
            ParamId::ReverbAmount => "Reverb",
            ParamId::PrePost => "Pre/Post",
            ParamId::ReverbType => "Reverb Type",
            ParamId::Decay => "Decay",
            ParamId::Damping => "Damping",
            ParamId::Tone => "Tone",
            ParamId::Width => "Width",
            ParamId::Mix => "Mix",
            ParamId::Output => "Output",
        }
    }

    /// Look up a parameter by id string
    ///
    /// Accepts the legacy ids `reverb` and `prePostSwitch`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "reverb" => Some(ParamId::ReverbAmount),
            "prePostSwitch" => Some(ParamId::PrePost),
            _ => Self::ALL.iter().copied().find(|id| id.id() == name),
        }
    }

    pub fn kind(self) -> ParamKind {
        match self {
            ParamId::Bypass => ParamKind::Bool,
            ParamId::PrePost => ParamKind::Choice(PRE_POST_CHOICES),
            ParamId::ReverbType => ParamKind::Choice(REVERB_TYPE_CHOICES),
            _ => ParamKind::Float,
        }
    }

    /// Inclusive (min, max) range in plain units
    pub fn range(self) -> (f32, f32) {
        match self {
            ParamId::Bypass => (0.0, 1.0),
            ParamId::Input | ParamId::Output => GAIN_RANGE,
            ParamId::Drive => (0.0, 10.0),
            ParamId::ReverbAmount | ParamId::Decay | ParamId::Damping | ParamId::Mix => {
                PERCENT_RANGE
            }
            ParamId::PrePost => (0.0, 1.0),
            ParamId::ReverbType => (0.0, 2.0),
            ParamId::Tone => (-100.0, 100.0),
            ParamId::Width => (0.0, 200.0),
        }
    }

    pub fn default_value(self) -> f32 {
        match self {
            ParamId::Decay | ParamId::Damping => 50.0,
            ParamId::Width | ParamId::Mix => 100.0,
            _ => 0.0,
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            ParamId::Input | ParamId::Output => "dB",
            ParamId::ReverbAmount
            | ParamId::Decay
            | ParamId::Damping
            | ParamId::Width
            | ParamId::Mix => "%",
            _ => "",
        }
    }

    /// Clamp a value into range and snap bool/choice values to a valid index
    pub fn constrain(self, value: f32) -> f32 {
        let (min, max) = self.range();
        let clamped = value.clamp(min, max);
        match self.kind() {
            ParamKind::Bool => {
                if clamped >= 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            ParamKind::Choice(_) => clamped.round(),
            ParamKind::Float => clamped,
        }
    }

    /// Metadata for listing
    pub fn info(self) -> ParamInfo {
        let (min, max) = self.range();
        ParamInfo {
            id: self.id(),
            name: self.display_name(),
            min,
            max,
            default: self.default_value(),
            unit: self.unit(),
            choices: match self.kind() {
                ParamKind::Choice(choices) => choices.to_vec(),
                _ => Vec::new(),
            },
        }
    }
}

impl std::fmt::Display for ParamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Serializable parameter description
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub unit: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<&'static str>,
}

// ============================================================================
// Choice Types
// ============================================================================

/// Whether saturation runs before or after the reverb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrePost {
    /// Reverb first, then saturation
    #[default]
    Pre,
    /// Saturation first, then reverb
    Post,
}

impl PrePost {
    pub fn from_value(value: f32) -> Self {
        if value < 0.5 {
            PrePost::Pre
        } else {
            PrePost::Post
        }
    }
}

/// Reverb character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReverbType {
    #[default]
    Room,
    Hall,
    Plate,
}

impl ReverbType {
    /// Map a stored choice index; anything past Hall selects Plate
    pub fn from_value(value: f32) -> Self {
        let index = value.round();
        if index < 0.5 {
            ReverbType::Room
        } else if index < 1.5 {
            ReverbType::Hall
        } else {
            ReverbType::Plate
        }
    }

    pub fn name(self) -> &'static str {
        REVERB_TYPE_CHOICES[self as usize]
    }
}

// ============================================================================
// Parameter Source
// ============================================================================

/// Where the pipeline reads current control values from
///
/// Implementations must be safe to read from the audio thread without
/// blocking. Values are in plain units (dB, %, choice index, 0/1).
pub trait ParameterSource {
    fn get(&self, id: ParamId) -> f32;

    /// String-keyed read; None for an unknown name
    fn get_by_name(&self, name: &str) -> Option<f32> {
        ParamId::from_name(name).map(|id| self.get(id))
    }
}

impl<T: ParameterSource + ?Sized> ParameterSource for std::sync::Arc<T> {
    fn get(&self, id: ParamId) -> f32 {
        (**self).get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_ids_roundtrip() {
        for id in ParamId::ALL {
            assert_eq!(ParamId::from_name(id.id()), Some(id));
            assert_eq!(ParamId::ALL[id.index()], id);
        }
    }

    #[test_case("reverb", ParamId::ReverbAmount ; "legacy reverb id")]
    #[test_case("prePostSwitch", ParamId::PrePost ; "legacy pre post id")]
    #[test_case("reverbAmount", ParamId::ReverbAmount ; "reverb amount")]
    fn test_from_name_aliases(name: &str, expected: ParamId) {
        assert_eq!(ParamId::from_name(name), Some(expected));
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(ParamId::from_name("volume"), None);
    }

    #[test]
    fn test_defaults_within_range() {
        for id in ParamId::ALL {
            let (min, max) = id.range();
            let default = id.default_value();
            assert!(default >= min && default <= max, "{} default out of range", id);
        }
    }

    #[test_case(ParamId::Drive, 42.0, 10.0 ; "drive clamps high")]
    #[test_case(ParamId::Input, -300.0, -100.0 ; "gain clamps low")]
    #[test_case(ParamId::Bypass, 0.7, 1.0 ; "bool snaps on")]
    #[test_case(ParamId::Bypass, 0.2, 0.0 ; "bool snaps off")]
    #[test_case(ParamId::ReverbType, 1.4, 1.0 ; "choice rounds")]
    #[test_case(ParamId::ReverbType, 9.0, 2.0 ; "choice clamps")]
    fn test_constrain(id: ParamId, value: f32, expected: f32) {
        assert_eq!(id.constrain(value), expected);
    }

    #[test_case(0.0, ReverbType::Room)]
    #[test_case(1.0, ReverbType::Hall)]
    #[test_case(2.0, ReverbType::Plate)]
    #[test_case(5.0, ReverbType::Plate)]
    fn test_reverb_type_from_value(value: f32, expected: ReverbType) {
        assert_eq!(ReverbType::from_value(value), expected);
    }

    #[test]
    fn test_pre_post_from_value() {
        assert_eq!(PrePost::from_value(0.0), PrePost::Pre);
        assert_eq!(PrePost::from_value(1.0), PrePost::Post);
    }

    #[test]
    fn test_param_info_serializes_choices() {
        let json = serde_json::to_value(ParamId::ReverbType.info()).unwrap();
        assert_eq!(json["choices"], serde_json::json!(["Room", "Hall", "Plate"]));

        let json = serde_json::to_value(ParamId::Drive.info()).unwrap();
        assert!(json.get("choices").is_none());
    }
}
