//! A single metric comparison.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use framewatch_types::MetricId;

use crate::error::Error;

/// How a metric reading is compared against a condition's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Comparator {
    LessThan,
    LessOrEqual,
    /// Approximate equality, see [`approximately`].
    Equal,
    GreaterOrEqual,
    GreaterThan,
}

impl Comparator {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::LessThan => "<",
            Comparator::LessOrEqual => "<=",
            Comparator::Equal => "==",
            Comparator::GreaterOrEqual => ">=",
            Comparator::GreaterThan => ">",
        }
    }

    /// Apply the comparison as `reading <op> threshold`.
    pub fn compare(self, reading: f64, threshold: f64) -> bool {
        match self {
            Comparator::LessThan => reading < threshold,
            Comparator::LessOrEqual => reading <= threshold,
            Comparator::Equal => approximately(reading, threshold),
            Comparator::GreaterOrEqual => reading >= threshold,
            Comparator::GreaterThan => reading > threshold,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Comparator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "<" | "lt" | "less_than" => Ok(Comparator::LessThan),
            "<=" | "le" | "equals_or_less_than" => Ok(Comparator::LessOrEqual),
            "==" | "=" | "eq" | "equals" => Ok(Comparator::Equal),
            ">=" | "ge" | "equals_or_greater_than" => Ok(Comparator::GreaterOrEqual),
            ">" | "gt" | "greater_than" => Ok(Comparator::GreaterThan),
            _ => Err(Error::UnknownComparator(s.to_string())),
        }
    }
}

impl TryFrom<String> for Comparator {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Equality with a tolerance relative to the operands' magnitude.
///
/// Two values are equal when they differ by less than a millionth of the
/// larger magnitude, or by less than a few machine epsilons near zero.
pub fn approximately(a: f64, b: f64) -> bool {
    let tolerance = (1e-6 * a.abs().max(b.abs())).max(f64::from(f32::EPSILON) * 8.0);
    (b - a).abs() < tolerance
}

/// `metric <comparator> value`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugCondition {
    pub metric: MetricId,
    pub comparator: Comparator,
    pub value: f64,
}

impl DebugCondition {
    pub fn new(metric: MetricId, comparator: Comparator, value: f64) -> Self {
        Self {
            metric,
            comparator,
            value,
        }
    }

    /// Whether a reading satisfies this condition.
    pub fn is_met_by(&self, reading: f64) -> bool {
        self.comparator.compare(reading, self.value)
    }
}

impl fmt::Display for DebugCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.metric, self.comparator, self.value)
    }
}
