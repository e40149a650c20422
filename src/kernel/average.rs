/// Incremental mean used by the average-cut-value strategy.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunningAverage {
    mean: f64,
    count: u32,
}

impl RunningAverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// mean' = (mean * count + v) / (count + 1)
    pub fn push(&mut self, value: f32) -> f32 {
        let n = self.count as f64;
        self.mean = (self.mean * n + value as f64) / (n + 1.0);
        self.count += 1;
        self.mean as f32
    }

    pub fn mean(&self) -> f32 {
        self.mean as f32
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_direct_recomputation() {
        let values = [0.8_f32, 1.0, 0.5, 0.25, 0.9];
        let mut avg = RunningAverage::new();
        for (k, v) in values.iter().enumerate() {
            let emitted = avg.push(*v);
            let direct: f32 = values[..=k].iter().sum::<f32>() / (k + 1) as f32;
            assert!((emitted - direct).abs() < 1e-5);
        }
        assert_eq!(avg.count(), 5);
    }

    #[test]
    fn reset_returns_to_zero() {
        let mut avg = RunningAverage::new();
        avg.push(0.3);
        avg.reset();
        assert_eq!(avg, RunningAverage::default());
        assert_eq!(avg.mean(), 0.0);
    }
}
