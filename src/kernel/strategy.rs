use super::average::RunningAverage;
use super::mode::MeasurementMode;
use super::series::Sample;
use crate::error::MeterError;

/// Max score of a single note cut including multiplier.
pub const MAX_CUT_SCORE: f32 = 115.0;

/// Live collaborator values captured when an event is handled.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LiveReadings {
    pub energy: f32,
    pub prev_frame_modified_score: i32,
    pub immediate_max_possible_raw_score: i32,
    pub relative_score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// A hit. `cut_score` is the finalized score with multiplier when the
    /// mode waited for it, `None` for modes that sample on the spot or when
    /// finalization delivered nothing.
    Hit { cut_score: Option<f32> },
    Miss,
}

/// Turns one outcome into at most one sample.
///
/// `Ok(None)` means "nothing to record for this event". Only an unsupported
/// mode is an error.
pub fn sample(
    mode: MeasurementMode,
    outcome: Outcome,
    live: &LiveReadings,
    average: &mut RunningAverage,
) -> Result<Option<Sample>, MeterError> {
    let value = match mode {
        MeasurementMode::Energy => Some(live.energy),
        MeasurementMode::PercentModified => percent_modified(live),
        MeasurementMode::PercentRaw => Some(live.relative_score),
        MeasurementMode::CutValue => cut_score(outcome).map(normalize_cut),
        MeasurementMode::AvgCutValue => {
            cut_score(outcome).map(|score| average.push(normalize_cut(score)))
        }
        MeasurementMode::Unrecognized(raw) => return Err(MeterError::UnsupportedMode(raw)),
    };
    Ok(value)
}

pub fn normalize_cut(score_with_multiplier: f32) -> Sample {
    score_with_multiplier / MAX_CUT_SCORE
}

fn cut_score(outcome: Outcome) -> Option<f32> {
    match outcome {
        Outcome::Hit { cut_score } => cut_score,
        Outcome::Miss => None,
    }
}

// No ratio before any note has contributed to the max.
fn percent_modified(live: &LiveReadings) -> Option<Sample> {
    if live.immediate_max_possible_raw_score <= 0 {
        return None;
    }
    Some(live.prev_frame_modified_score as f32 / live.immediate_max_possible_raw_score as f32)
}
