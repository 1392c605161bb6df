//! Mean / standard deviation with iterative outlier trimming

use serde::Serialize;

/// Summary statistics of a sample set
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Statistics {
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator)
    pub std_dev: f64,
    /// Samples the figures were computed from
    pub samples: usize,
}

impl Statistics {
    /// Plain statistics. Mean is 0 without samples; deviation is 0 with fewer
    /// than two.
    pub fn of(values: &[f64]) -> Self {
        let n = values.len();
        if n < 1 {
            return Self::default();
        }

        // Sum in sorted order so permuting the input cannot change the result
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mean = sorted.iter().sum::<f64>() / n as f64;
        if n < 2 {
            return Self {
                mean,
                std_dev: 0.0,
                samples: n,
            };
        }

        let square_sum: f64 = sorted.iter().map(|v| (v - mean) * (v - mean)).sum();
        Self {
            mean,
            std_dev: (square_sum / (n - 1) as f64).sqrt(),
            samples: n,
        }
    }

    /// Statistics after up to `iterations` rounds of discarding samples
    /// farther than `deviation` standard deviations from the current mean.
    ///
    /// Stops early when the deviation is zero (all samples equal) or when a
    /// round would discard nothing or everything.
    pub fn robust(values: &[f64], iterations: usize, deviation: f64) -> Self {
        let mut kept = values.to_vec();
        let mut stats = Self::of(&kept);

        for _ in 0..iterations {
            if stats.std_dev == 0.0 {
                break;
            }
            let trimmed: Vec<f64> = kept
                .iter()
                .copied()
                .filter(|&v| !stats.is_outlier(v, deviation))
                .collect();
            if trimmed.is_empty() || trimmed.len() == kept.len() {
                break;
            }
            kept = trimmed;
            stats = Self::of(&kept);
        }

        stats
    }

    /// Whether `value` lies more than `deviation` standard deviations from
    /// the mean. Nothing is an outlier when the deviation is zero.
    pub fn is_outlier(&self, value: f64, deviation: f64) -> bool {
        self.std_dev > 0.0 && (value - self.mean).abs() > self.std_dev * deviation
    }

    /// Whether `value` lies within one standard deviation of the mean, the
    /// deviation being floored at `min_tolerance`
    pub fn within(&self, value: f64, min_tolerance: f64) -> bool {
        (value - self.mean).abs() <= self.std_dev.max(min_tolerance)
    }

    /// Whether the mean stands out from the noise: `mean / std_dev` above
    /// `threshold`, or a positive mean with zero deviation
    pub fn is_significant(&self, threshold: f64) -> bool {
        if self.samples == 0 || self.mean <= 0.0 {
            return false;
        }
        self.std_dev == 0.0 || self.mean / self.std_dev > threshold
    }
}
