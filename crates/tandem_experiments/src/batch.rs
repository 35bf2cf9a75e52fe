//! Batch-means statistics over the measured rounds.
//!
//! Each round contributes one observation per metric. Means get a normal
//! confidence interval from the spread of the round means; the two variance
//! metrics get a fixed relative interval around the mean of the round variances.

use std::fmt;

use serde::{Deserialize, Serialize};

use tandem_core::rounds::{sample_variance, RoundEstimates};

use crate::error::ExperimentError;

/// Two-sided 95% quantile of the standard normal distribution.
pub const Z_95: f64 = 1.959963;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    WaitOne,
    SojournOne,
    QueueLenOne,
    PopulationOne,
    WaitTwo,
    SojournTwo,
    QueueLenTwo,
    PopulationTwo,
    WaitOneVariance,
    WaitTwoVariance,
}

impl Metric {
    /// Report order.
    pub const ALL: [Metric; 10] = [
        Metric::WaitOne,
        Metric::SojournOne,
        Metric::QueueLenOne,
        Metric::PopulationOne,
        Metric::WaitTwo,
        Metric::SojournTwo,
        Metric::QueueLenTwo,
        Metric::PopulationTwo,
        Metric::WaitOneVariance,
        Metric::WaitTwoVariance,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::WaitOne => "E[W1]",
            Metric::SojournOne => "E[T1]",
            Metric::QueueLenOne => "E[Nq1]",
            Metric::PopulationOne => "E[N1]",
            Metric::WaitTwo => "E[W2]",
            Metric::SojournTwo => "E[T2]",
            Metric::QueueLenTwo => "E[Nq2]",
            Metric::PopulationTwo => "E[N2]",
            Metric::WaitOneVariance => "V[W1]",
            Metric::WaitTwoVariance => "V[W2]",
        }
    }

    pub fn is_variance(self) -> bool {
        matches!(self, Metric::WaitOneVariance | Metric::WaitTwoVariance)
    }

    pub fn value(self, estimates: &RoundEstimates) -> f64 {
        match self {
            Metric::WaitOne => estimates.wait_one,
            Metric::SojournOne => estimates.sojourn_one,
            Metric::QueueLenOne => estimates.queue_len_one,
            Metric::PopulationOne => estimates.population_one,
            Metric::WaitTwo => estimates.wait_two,
            Metric::SojournTwo => estimates.sojourn_two,
            Metric::QueueLenTwo => estimates.queue_len_two,
            Metric::PopulationTwo => estimates.population_two,
            Metric::WaitOneVariance => estimates.wait_one_variance,
            Metric::WaitTwoVariance => estimates.wait_two_variance,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub mean: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    /// `mean ± Z·s/√n`, where `s` is the standard deviation of the round means.
    ///
    /// Reports produced with the variance in place of `s` have different widths
    /// and precisions, so `p` values are not comparable with theirs.
    pub fn for_mean(observations: &[f64]) -> Self {
        let n = observations.len() as f64;
        let mean = observations.iter().sum::<f64>() / n;
        let std_dev = sample_variance(observations, mean).sqrt();
        let half_width = Z_95 * std_dev / n.sqrt();
        Self {
            lower: mean - half_width,
            mean,
            upper: mean + half_width,
        }
    }

    /// `variance · (1 ± precision)`.
    pub fn for_variance(variance: f64, precision: f64) -> Self {
        Self {
            lower: variance * (1.0 - precision),
            mean: variance,
            upper: variance * (1.0 + precision),
        }
    }

    /// Relative half-width `(upper − lower) / (upper + lower)`; 0 for a degenerate interval.
    pub fn precision(&self) -> f64 {
        let sum = self.upper + self.lower;
        if sum == 0.0 {
            0.0
        } else {
            (self.upper - self.lower) / sum
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub metric: Metric,
    pub interval: ConfidenceInterval,
    pub precision: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub rounds: usize,
    pub metrics: Vec<MetricSummary>,
}

impl BatchSummary {
    pub fn get(&self, metric: Metric) -> Option<&MetricSummary> {
        self.metrics.iter().find(|summary| summary.metric == metric)
    }
}

/// Summarizes the measured rounds, in report order.
pub fn summarize(
    rounds: &[RoundEstimates],
    variance_precision: f64,
) -> Result<BatchSummary, ExperimentError> {
    if rounds.len() < 2 {
        return Err(ExperimentError::NotEnoughRounds(rounds.len()));
    }

    let metrics = Metric::ALL
        .iter()
        .map(|&metric| {
            let observations: Vec<f64> = rounds.iter().map(|r| metric.value(r)).collect();
            let interval = if metric.is_variance() {
                let mean = observations.iter().sum::<f64>() / observations.len() as f64;
                ConfidenceInterval::for_variance(mean, variance_precision)
            } else {
                ConfidenceInterval::for_mean(&observations)
            };
            MetricSummary {
                metric,
                interval,
                precision: interval.precision(),
            }
        })
        .collect();

    Ok(BatchSummary {
        rounds: rounds.len(),
        metrics,
    })
}
