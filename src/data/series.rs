//! Fixed-capacity rolling windows for graphing a single metric.

use std::collections::VecDeque;

/// How a series tracks the ceiling it normalizes against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeakPolicy {
    /// The peak is the maximum of the current window, recomputed every push.
    #[default]
    WindowMax,
    /// The peak jumps to new maxima immediately but only decays gradually
    /// once the window maximum drops below it.
    Decaying,
}

/// Peaks above this decay by a tenth per tick, others by one unit.
const FAST_DECAY_FLOOR: f64 = 1000.0;

/// A rolling window of samples for one metric.
///
/// The window always holds exactly `capacity` values, oldest first. New
/// samples shift the window left by one; a freshly created or resized series
/// is zero-filled.
#[derive(Debug, Clone)]
pub struct MetricSeries {
    values: VecDeque<f64>,
    peak: f64,
    policy: PeakPolicy,
}

impl MetricSeries {
    /// Create a zero-filled series. A capacity of zero is raised to one.
    pub fn new(capacity: usize, policy: PeakPolicy) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: std::iter::repeat(0.0).take(capacity).collect(),
            peak: 0.0,
            policy,
        }
    }

    /// Number of samples held.
    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    /// The peak-tracking policy of this series.
    pub fn policy(&self) -> PeakPolicy {
        self.policy
    }

    /// Samples in order, oldest first.
    pub fn values(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// The most recently pushed sample (zero before any push).
    pub fn latest(&self) -> f64 {
        self.values.back().copied().unwrap_or(0.0)
    }

    /// Current normalization ceiling.
    pub fn peak(&self) -> f64 {
        self.peak
    }

    /// Largest sample in the window.
    pub fn window_max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// Change the window length.
    ///
    /// A different capacity discards all history and resets the peak; the
    /// same capacity is a no-op.
    pub fn resize(&mut self, new_capacity: usize) {
        let new_capacity = new_capacity.max(1);
        if new_capacity == self.capacity() {
            return;
        }
        tracing::trace!(from = self.capacity(), to = new_capacity, "Resizing metric series");
        self.values.clear();
        self.values.resize(new_capacity, 0.0);
        self.peak = 0.0;
    }

    /// Shift in a new sample and update the peak.
    pub fn push_sample(&mut self, sample: f64) {
        self.values.pop_front();
        self.values.push_back(sample);

        let window_max = self.window_max();
        self.peak = match self.policy {
            PeakPolicy::WindowMax => window_max,
            PeakPolicy::Decaying => decay_peak(self.peak, window_max),
        };
    }

    /// Denominator used for normalization: the peak, or 1 when the peak is zero.
    pub fn denominator(&self) -> f64 {
        if self.peak == 0.0 {
            1.0
        } else {
            self.peak
        }
    }

    /// Scale an arbitrary value (an average, a threshold) onto this graph.
    pub fn normalize(&self, value: f64) -> f64 {
        value / self.denominator()
    }

    /// Samples divided by the denominator, oldest first.
    ///
    /// The iterator borrows the series and can be recreated at will.
    pub fn normalized(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        let denominator = self.denominator();
        self.values.iter().map(move |v| v / denominator)
    }

    /// Like [`MetricSeries::normalized`] but against an external denominator,
    /// for graphs whose series share one scale.
    pub fn normalized_by(&self, denominator: f64) -> impl ExactSizeIterator<Item = f64> + '_ {
        let denominator = if denominator == 0.0 { 1.0 } else { denominator };
        self.values.iter().map(move |v| v / denominator)
    }
}

/// Advance a decaying peak by one tick given the current window maximum.
///
/// Rises are immediate. Otherwise peaks above 1000 lose a tenth, rounded
/// down to a whole unit, and the rest lose one unit. The result
/// never drops below 1.
pub fn decay_peak(peak: f64, window_max: f64) -> f64 {
    let next = if peak < 1.0 || peak <= window_max {
        window_max
    } else if peak > FAST_DECAY_FLOOR {
        peak - (peak / 10.0).floor()
    } else {
        peak - 1.0
    };
    next.max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(series: &MetricSeries) -> Vec<f64> {
        series.values().collect()
    }

    #[test]
    fn new_series_is_zero_filled() {
        let series = MetricSeries::new(4, PeakPolicy::WindowMax);
        assert_eq!(collect(&series), vec![0.0; 4]);
        assert_eq!(series.peak(), 0.0);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut series = MetricSeries::new(0, PeakPolicy::WindowMax);
        assert_eq!(series.capacity(), 1);
        series.push_sample(3.0);
        assert_eq!(collect(&series), vec![3.0]);
    }

    #[test]
    fn push_shifts_window_left() {
        let mut series = MetricSeries::new(5, PeakPolicy::WindowMax);
        for sample in [10.0, 20.0, 30.0, 40.0, 50.0, 60.0] {
            series.push_sample(sample);
        }
        assert_eq!(collect(&series), vec![20.0, 30.0, 40.0, 50.0, 60.0]);
        assert_eq!(series.latest(), 60.0);
    }

    #[test]
    fn length_is_constant_and_last_is_latest() {
        let mut series = MetricSeries::new(7, PeakPolicy::Decaying);
        for i in 0..50 {
            let sample = (i * 37 % 11) as f64;
            series.push_sample(sample);
            assert_eq!(series.values().len(), 7);
            assert_eq!(series.values().last(), Some(sample));
        }
    }

    #[test]
    fn resize_zero_fills_and_resets_peak() {
        let mut series = MetricSeries::new(3, PeakPolicy::Decaying);
        series.push_sample(500.0);
        assert_eq!(series.peak(), 500.0);

        series.resize(6);
        assert_eq!(collect(&series), vec![0.0; 6]);
        assert_eq!(series.peak(), 0.0);
    }

    #[test]
    fn resize_to_same_capacity_keeps_history() {
        let mut series = MetricSeries::new(3, PeakPolicy::WindowMax);
        series.push_sample(9.0);
        series.resize(3);
        assert_eq!(collect(&series), vec![0.0, 0.0, 9.0]);
    }

    #[test]
    fn window_max_policy_follows_window() {
        let mut series = MetricSeries::new(2, PeakPolicy::WindowMax);
        series.push_sample(100.0);
        series.push_sample(5.0);
        assert_eq!(series.peak(), 100.0);
        series.push_sample(7.0);
        assert_eq!(series.peak(), 7.0);
    }

    #[test]
    fn normalized_divides_by_peak() {
        let mut series = MetricSeries::new(4, PeakPolicy::WindowMax);
        series.push_sample(50.0);
        series.push_sample(100.0);
        let view: Vec<f64> = series.normalized().collect();
        assert_eq!(view, vec![0.0, 0.0, 0.5, 1.0]);
        // restartable
        assert_eq!(series.normalized().count(), 4);
    }

    #[test]
    fn normalized_with_zero_peak_uses_one() {
        let series = MetricSeries::new(3, PeakPolicy::WindowMax);
        assert!(series.normalized().all(|v| v == 0.0));
        assert_eq!(series.normalize(4.0), 4.0);
    }

    #[test]
    fn normalized_by_shared_denominator() {
        let mut series = MetricSeries::new(2, PeakPolicy::WindowMax);
        series.push_sample(10.0);
        let view: Vec<f64> = series.normalized_by(40.0).collect();
        assert_eq!(view, vec![0.0, 0.25]);
    }

    #[test]
    fn decay_rises_instantly() {
        assert_eq!(decay_peak(10.0, 250.0), 250.0);
        assert_eq!(decay_peak(0.0, 3.0), 3.0);
    }

    fn decay_sequence(start: f64, ticks: usize) -> Vec<f64> {
        let mut peak = start;
        let mut seen = vec![peak];
        for _ in 0..ticks {
            peak = decay_peak(peak, 0.0);
            seen.push(peak);
        }
        seen
    }

    #[test]
    fn decay_large_peak_by_tenth() {
        assert_eq!(
            decay_sequence(2000.0, 3),
            vec![2000.0, 1800.0, 1620.0, 1458.0]
        );
    }

    #[test]
    fn decay_at_exactly_one_thousand_is_by_one() {
        assert_eq!(
            decay_sequence(1000.0, 3),
            vec![1000.0, 999.0, 998.0, 997.0]
        );
        assert_eq!(decay_peak(1001.0, 0.0), 901.0);
    }

    #[test]
    fn decay_large_peak_rounds_tenth_down() {
        assert_eq!(decay_peak(1234.0, 0.0), 1111.0);
    }

    #[test]
    fn decay_small_peak_by_one() {
        assert_eq!(decay_peak(729.0, 0.0), 728.0);
        assert_eq!(decay_peak(2.0, 0.0), 1.0);
    }

    #[test]
    fn decay_never_below_one() {
        assert_eq!(decay_peak(1.0, 0.0), 1.0);
        assert_eq!(decay_peak(0.5, 0.0), 1.0);
    }

    #[test]
    fn decay_is_monotonic_without_new_maxima() {
        let mut series = MetricSeries::new(3, PeakPolicy::Decaying);
        series.push_sample(5000.0);
        for _ in 0..3 {
            series.push_sample(0.0);
        }
        // The spike has left the window; from here the peak only decays.
        let mut previous = series.peak();
        for _ in 0..200 {
            series.push_sample(0.0);
            let peak = series.peak();
            assert!(peak <= previous);
            assert!(peak >= 1.0);
            previous = peak;
        }
    }

    #[test]
    fn decaying_series_holds_peak_after_spike() {
        let mut series = MetricSeries::new(2, PeakPolicy::Decaying);
        series.push_sample(2000.0);
        series.push_sample(0.0);
        // spike still in window
        assert_eq!(series.peak(), 2000.0);
        series.push_sample(0.0);
        assert_eq!(series.peak(), 1800.0);
        let view: Vec<f64> = series.normalized().collect();
        assert_eq!(view, vec![0.0, 0.0]);
    }
}
