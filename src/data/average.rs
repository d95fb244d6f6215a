//! Rolling average over a fixed circular window.

/// Window length used for the per-frame allocation average.
pub const ALLOCATION_AVERAGE_WINDOW: usize = 1024;

/// Average of the most recent `capacity` samples.
///
/// Samples are written into a circular buffer at a wrapping index. Until the
/// buffer has filled, only the samples written so far count.
#[derive(Debug, Clone)]
pub struct RollingAverage {
    samples: Vec<f64>,
    write_index: usize,
    count: usize,
    average: f64,
}

impl RollingAverage {
    /// Create an empty average. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity.max(1)],
            write_index: 0,
            count: 0,
            average: 0.0,
        }
    }

    /// Number of slots in the window.
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Number of valid samples, saturating at the capacity.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether no sample has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Average of the valid samples (zero when empty).
    pub fn average(&self) -> f64 {
        self.average
    }

    /// Record a sample and recompute the average.
    pub fn push(&mut self, sample: f64) -> f64 {
        self.samples[self.write_index] = sample;
        self.write_index = (self.write_index + 1) % self.samples.len();
        self.count = (self.count + 1).min(self.samples.len());

        let sum: f64 = self.samples[..self.count].iter().sum();
        self.average = sum / self.count as f64;
        self.average
    }

    /// Forget every sample.
    pub fn clear(&mut self) {
        self.samples.iter_mut().for_each(|s| *s = 0.0);
        self.write_index = 0;
        self.count = 0;
        self.average = 0.0;
    }
}

impl Default for RollingAverage {
    fn default() -> Self {
        Self::new(ALLOCATION_AVERAGE_WINDOW)
    }
}
