use serde::{Deserialize, Serialize};

/// One point of the performance graph. Nominally 0..1, not clamped.
pub type Sample = f32;

/// Append-only samples for the current session, in event arrival order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesBuffer {
    samples: Vec<Sample>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub count: usize,
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub last: f32,
}

impl SeriesBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    /// Copy handed to the presentation layer. Later appends don't reach it.
    pub fn freeze(&self) -> Vec<Sample> {
        self.samples.clone()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn stats(&self) -> SeriesStats {
        compute_stats(&self.samples)
    }
}

pub fn compute_stats(samples: &[Sample]) -> SeriesStats {
    let Some(&last) = samples.last() else {
        return SeriesStats::default();
    };

    let mut stats = SeriesStats {
        count: samples.len(),
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
        mean: 0.0,
        last,
    };

    let mut total = 0.0_f64;
    for &s in samples {
        stats.min = stats.min.min(s);
        stats.max = stats.max.max(s);
        total += s as f64;
    }
    stats.mean = (total / samples.len() as f64) as f32;

    stats
}
