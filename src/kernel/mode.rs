use std::fmt;
use std::str::FromStr;

/// Which strategy turns an action outcome into a sample.
/// Read from configuration once per session.
///
/// The stored value is a raw integer, so anything outside the known set is
/// kept as `Unrecognized` instead of being coerced to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementMode {
    /// Live energy bar level (0..1).
    Energy,
    /// Modified score over the max raw score reachable so far.
    PercentModified,
    /// Relative score reported by the rank counter.
    PercentRaw,
    /// Finalized cut score of each hit, normalized to the per-note max.
    CutValue,
    /// Running mean of normalized cut scores.
    AvgCutValue,
    Unrecognized(i32),
}

impl Default for MeasurementMode {
    fn default() -> Self {
        Self::Energy
    }
}

impl MeasurementMode {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::Energy,
            1 => Self::PercentModified,
            2 => Self::PercentRaw,
            3 => Self::CutValue,
            4 => Self::AvgCutValue,
            other => Self::Unrecognized(other),
        }
    }

    pub fn as_raw(&self) -> i32 {
        match self {
            Self::Energy => 0,
            Self::PercentModified => 1,
            Self::PercentRaw => 2,
            Self::CutValue => 3,
            Self::AvgCutValue => 4,
            Self::Unrecognized(raw) => *raw,
        }
    }

    /// Hits in these modes are sampled only once the cut score is final.
    pub fn requires_finalization(&self) -> bool {
        matches!(self, Self::CutValue | Self::AvgCutValue)
    }

    /// Energy mode seeds the series with a synthetic 0.5 baseline.
    pub fn baseline(&self) -> Option<f32> {
        match self {
            Self::Energy => Some(0.5),
            _ => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Energy => "energy",
            Self::PercentModified => "percent-modified",
            Self::PercentRaw => "percent-raw",
            Self::CutValue => "cut-value",
            Self::AvgCutValue => "avg-cut-value",
            Self::Unrecognized(_) => "unrecognized",
        }
    }
}

impl fmt::Display for MeasurementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrecognized(raw) => write!(f, "unrecognized({})", raw),
            other => f.write_str(other.as_str()),
        }
    }
}

impl FromStr for MeasurementMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "energy" => Ok(Self::Energy),
            "percent-modified" | "percentmodified" => Ok(Self::PercentModified),
            "percent-raw" | "percentraw" => Ok(Self::PercentRaw),
            "cut-value" | "cutvalue" => Ok(Self::CutValue),
            "avg-cut-value" | "avgcutvalue" => Ok(Self::AvgCutValue),
            other => other
                .parse::<i32>()
                .map(Self::from_raw)
                .map_err(|_| format!("unknown measurement mode '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_outside_the_set_stay_unrecognized() {
        assert_eq!(MeasurementMode::from_raw(4), MeasurementMode::AvgCutValue);
        assert_eq!(MeasurementMode::from_raw(7), MeasurementMode::Unrecognized(7));
        assert_eq!(MeasurementMode::from_raw(-1).as_raw(), -1);
        assert!(!MeasurementMode::from_raw(5).is_supported());
    }

    #[test]
    fn parses_names_and_numbers() {
        assert_eq!("cut-value".parse(), Ok(MeasurementMode::CutValue));
        assert_eq!("AvgCutValue".parse(), Ok(MeasurementMode::AvgCutValue));
        assert_eq!("2".parse(), Ok(MeasurementMode::PercentRaw));
        assert_eq!("9".parse(), Ok(MeasurementMode::Unrecognized(9)));
        assert!("loudness".parse::<MeasurementMode>().is_err());
    }
}
