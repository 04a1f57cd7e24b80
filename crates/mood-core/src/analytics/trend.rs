//! Directional trend classification
//!
//! Compares the mean of the earlier half of a series with the mean of the
//! later half. This is the only trend computation in the crate; anything that
//! needs a direction goes through [`TrendAnalyzer`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::TrendConfig;
use crate::models::MoodRecord;

/// Direction of change across the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Declining => "declining",
            Self::Stable => "stable",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a trend classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub direction: TrendDirection,
    /// Second-half average minus first-half average
    pub magnitude: f64,
    pub sample_size: usize,
    /// False when the series was too short to classify
    pub confident: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_half_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_half_average: Option<f64>,
}

impl TrendResult {
    /// Result for a series too short to classify
    pub fn insufficient(sample_size: usize) -> Self {
        Self {
            direction: TrendDirection::Stable,
            magnitude: 0.0,
            sample_size,
            confident: false,
            first_half_average: None,
            second_half_average: None,
        }
    }

    /// True when the direction is `dir` and the sample was large enough
    pub fn is_confidently(&self, dir: TrendDirection) -> bool {
        self.confident && self.direction == dir
    }
}

/// Half-split trend classifier
#[derive(Debug, Clone, Copy)]
pub struct TrendAnalyzer {
    min_samples: usize,
    threshold: f64,
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::from_config(&TrendConfig::default())
    }
}

impl TrendAnalyzer {
    pub fn new(min_samples: usize, threshold: f64) -> Self {
        Self {
            min_samples,
            threshold,
        }
    }

    pub fn from_config(config: &TrendConfig) -> Self {
        Self::new(config.min_samples, config.threshold)
    }

    /// Classify records after ordering them by `occurred_on`
    pub fn analyze_records(&self, records: &[MoodRecord]) -> TrendResult {
        let mut ordered: Vec<&MoodRecord> = records.iter().collect();
        ordered.sort_by(|a, b| {
            a.occurred_on
                .cmp(&b.occurred_on)
                .then_with(|| a.logged_at.cmp(&b.logged_at))
        });
        let values: Vec<f64> = ordered.iter().map(|r| f64::from(r.value)).collect();
        self.analyze(&values)
    }

    /// Classify an already-ordered series.
    ///
    /// The earlier half takes the extra element when the length is odd.
    pub fn analyze(&self, values: &[f64]) -> TrendResult {
        let n = values.len();
        if n < self.min_samples || n < 2 {
            return TrendResult::insufficient(n);
        }

        let split = n.div_ceil(2);
        let (first, second) = values.split_at(split);
        let first_avg = mean(first);
        let second_avg = mean(second);
        let magnitude = second_avg - first_avg;

        let direction = if magnitude > self.threshold {
            TrendDirection::Improving
        } else if magnitude < -self.threshold {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        };

        TrendResult {
            direction,
            magnitude,
            sample_size: n,
            confident: true,
            first_half_average: Some(first_avg),
            second_half_average: Some(second_avg),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[i32]) -> Vec<f64> {
        values.iter().map(|&v| f64::from(v)).collect()
    }

    #[test]
    fn test_declining_scenario() {
        let result = TrendAnalyzer::default().analyze(&series(&[8, 7, 6, 5, 4, 3, 2, 1]));
        assert_eq!(result.direction, TrendDirection::Declining);
        assert_eq!(result.first_half_average, Some(6.5));
        assert_eq!(result.second_half_average, Some(2.5));
        assert_eq!(result.magnitude, -4.0);
        assert!(result.confident);
        assert_eq!(result.sample_size, 8);
    }

    #[test]
    fn test_strictly_increasing_is_improving() {
        let result = TrendAnalyzer::default().analyze(&series(&[3, 4, 5, 6]));
        assert_eq!(result.direction, TrendDirection::Improving);
        assert!(result.is_confidently(TrendDirection::Improving));
    }

    #[test]
    fn test_constant_is_stable() {
        let result = TrendAnalyzer::default().analyze(&series(&[5, 5, 5, 5, 5]));
        assert_eq!(result.direction, TrendDirection::Stable);
        assert_eq!(result.magnitude, 0.0);
        assert!(result.confident);
    }

    #[test]
    fn test_odd_length_split() {
        // First half [2, 2, 2], second half [6, 6]
        let result = TrendAnalyzer::default().analyze(&series(&[2, 2, 2, 6, 6]));
        assert_eq!(result.first_half_average, Some(2.0));
        assert_eq!(result.second_half_average, Some(6.0));
    }

    #[test]
    fn test_small_change_is_stable() {
        // 5.0 -> 5.5 is exactly the threshold, not above it
        let result = TrendAnalyzer::default().analyze(&series(&[5, 5, 5, 6]));
        assert_eq!(result.direction, TrendDirection::Stable);
    }

    #[test]
    fn test_insufficient_samples() {
        let result = TrendAnalyzer::default().analyze(&series(&[1, 10, 1]));
        assert_eq!(result.direction, TrendDirection::Stable);
        assert!(!result.confident);
        assert_eq!(result.sample_size, 3);

        let empty = TrendAnalyzer::default().analyze(&[]);
        assert_eq!(empty, TrendResult::insufficient(0));
    }
}
