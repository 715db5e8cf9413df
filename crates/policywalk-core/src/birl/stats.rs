use serde::{Deserialize, Serialize};

/// Mean and standard deviation of a collection of values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Moments {
    pub mean: f64,
    pub std: f64,
}

/// Online mean and variance using Welford's algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningMoments {
    count: u64,
    mean: f64,
    squared_residual_sum: f64,
}

impl RunningMoments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of values recorded so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Add a new value to the calculation.
    pub fn record(&mut self, value: f64) {
        let residual_pre = value - self.mean;
        self.count += 1;
        self.mean += residual_pre / self.count as f64;
        let residual_post = value - self.mean;
        self.squared_residual_sum += residual_pre * residual_post;
    }

    /// Mean of all recorded values, or `0.0` when nothing was recorded.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample standard deviation (`n - 1` denominator); `0.0` for fewer than two values.
    pub fn std(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            (self.squared_residual_sum / (self.count - 1) as f64).sqrt()
        }
    }

    pub fn moments(&self) -> Moments {
        Moments {
            mean: self.mean(),
            std: self.std(),
        }
    }
}

impl Extend<f64> for RunningMoments {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for value in iter {
            self.record(value);
        }
    }
}

impl FromIterator<f64> for RunningMoments {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut moments = Self::default();
        moments.extend(iter);
        moments
    }
}
