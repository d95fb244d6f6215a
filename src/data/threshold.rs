//! Severity classification against two ordered thresholds.
//!
//! A classifier owns an outer and an inner (caution) boundary. For metrics
//! where higher is better (FPS) the outer boundary is the *good* threshold;
//! for metrics where lower is better (allocations) it is the *critical*
//! threshold. In both cases the outer boundary is kept strictly above the
//! caution boundary, and every edit is corrected on the spot.

use framewatch_types::Severity;

/// Which direction of a metric is desirable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Larger values are better (frame rate).
    HigherIsBetter,
    /// Smaller values are better (allocated bytes).
    LowerIsBetter,
}

/// Smallest allowed outer threshold.
const MIN_OUTER: f64 = 2.0;
/// Smallest allowed caution threshold.
const MIN_CAUTION: f64 = 1.0;

/// Maps a scalar onto [`Severity`] using two ordered thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdClassifier {
    polarity: Polarity,
    outer: f64,
    caution: f64,
}

impl ThresholdClassifier {
    /// Classifier for a metric where higher is better.
    pub fn higher_is_better(good: f64, caution: f64) -> Self {
        Self::with_polarity(Polarity::HigherIsBetter, good, caution)
    }

    /// Classifier for a metric where lower is better.
    pub fn lower_is_better(critical: f64, caution: f64) -> Self {
        Self::with_polarity(Polarity::LowerIsBetter, critical, caution)
    }

    fn with_polarity(polarity: Polarity, outer: f64, caution: f64) -> Self {
        let mut classifier = Self {
            polarity,
            outer: MIN_OUTER,
            caution: MIN_CAUTION,
        };
        classifier.set_outer(outer);
        classifier.set_caution_threshold(caution);
        classifier
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// The good threshold (higher-is-better) or critical threshold (lower-is-better).
    pub fn outer_threshold(&self) -> f64 {
        self.outer
    }

    pub fn caution_threshold(&self) -> f64 {
        self.caution
    }

    /// Set the good threshold of a higher-is-better classifier.
    ///
    /// On a lower-is-better classifier this edits the critical threshold.
    pub fn set_good_threshold(&mut self, value: f64) {
        self.set_outer(value);
    }

    /// Set the critical threshold of a lower-is-better classifier.
    ///
    /// On a higher-is-better classifier this edits the good threshold.
    pub fn set_critical_threshold(&mut self, value: f64) {
        self.set_outer(value);
    }

    fn set_outer(&mut self, value: f64) {
        if !value.is_finite() {
            tracing::warn!(value, "Ignoring non-finite threshold");
            return;
        }
        self.outer = value;
        if self.outer < MIN_OUTER {
            tracing::debug!(requested = value, "Raising threshold to minimum");
            self.outer = MIN_OUTER;
        }
        if self.caution >= self.outer {
            self.caution = self.outer - 1.0;
            tracing::debug!(caution = self.caution, "Pulled caution threshold below outer threshold");
        }
    }

    /// Set the caution threshold, correcting it to stay below the outer one.
    pub fn set_caution_threshold(&mut self, value: f64) {
        if !value.is_finite() {
            tracing::warn!(value, "Ignoring non-finite threshold");
            return;
        }
        self.caution = value;
        if self.caution >= self.outer {
            self.caution = self.outer - 1.0;
            tracing::debug!(requested = value, caution = self.caution, "Clamped caution threshold");
        } else if self.caution <= 0.0 {
            self.caution = MIN_CAUTION;
            tracing::debug!(requested = value, "Raised caution threshold to minimum");
        }
    }

    /// Classify a value into a severity band.
    pub fn classify(&self, value: f64) -> Severity {
        match self.polarity {
            Polarity::HigherIsBetter => {
                if value >= self.outer {
                    Severity::Good
                } else if value >= self.caution {
                    Severity::Caution
                } else {
                    Severity::Critical
                }
            }
            Polarity::LowerIsBetter => {
                if value >= self.outer {
                    Severity::Critical
                } else if value >= self.caution {
                    Severity::Caution
                } else {
                    Severity::Good
                }
            }
        }
    }

    /// Both thresholds scaled onto a graph with the given denominator,
    /// as `(outer, caution)`.
    pub fn normalized(&self, denominator: f64) -> (f64, f64) {
        let denominator = if denominator == 0.0 { 1.0 } else { denominator };
        (self.outer / denominator, self.caution / denominator)
    }
}
