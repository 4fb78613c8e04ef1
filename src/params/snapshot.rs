//! Per-block parameter snapshot

use super::{ParamId, ParameterSource, PrePost, ReverbType};

/// Typed view of every parameter, captured once at the start of a block
///
/// Percentages are normalised to 0..1 (`width` to 0..2); gains stay in dB;
/// `tone` stays in -100..100 since its sign selects the filter mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSnapshot {
    pub bypass: bool,
    pub input_gain_db: f32,
    pub drive: f32,
    pub reverb_amount: f32,
    pub pre_post: PrePost,
    pub reverb_type: ReverbType,
    pub decay: f32,
    pub damping: f32,
    pub tone: f32,
    pub width: f32,
    pub mix: f32,
    pub output_gain_db: f32,
}

impl ParameterSnapshot {
    /// Read every parameter from `source` in a single pass
    ///
    /// Non-finite values fall back to the parameter default and everything
    /// is constrained to its range, so a misbehaving source can't push
    /// NaN or huge gains into filter or reverb state.
    pub fn capture<S: ParameterSource + ?Sized>(source: &S) -> Self {
        let mut raw = [0.0_f32; ParamId::COUNT];
        for id in ParamId::ALL {
            let value = source.get(id);
            raw[id.index()] = if value.is_finite() {
                id.constrain(value)
            } else {
                id.default_value()
            };
        }
        Self::from_raw(&raw)
    }

    fn from_raw(raw: &[f32; ParamId::COUNT]) -> Self {
        let get = |id: ParamId| raw[id.index()];
        Self {
            bypass: get(ParamId::Bypass) > 0.5,
            input_gain_db: get(ParamId::Input),
            drive: get(ParamId::Drive),
            reverb_amount: get(ParamId::ReverbAmount) / 100.0,
            pre_post: PrePost::from_value(get(ParamId::PrePost)),
            reverb_type: ReverbType::from_value(get(ParamId::ReverbType)),
            decay: get(ParamId::Decay) / 100.0,
            damping: get(ParamId::Damping) / 100.0,
            tone: get(ParamId::Tone),
            width: get(ParamId::Width) / 100.0,
            mix: get(ParamId::Mix) / 100.0,
            output_gain_db: get(ParamId::Output),
        }
    }
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        let raw = ParamId::ALL.map(ParamId::default_value);
        Self::from_raw(&raw)
    }
}
