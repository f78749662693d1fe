//! Priority scoring.
//!
//! A score is a pure function of the order, the current instant and the
//! configured weights. Components, in points:
//!
//! | component  | value |
//! |------------|-------|
//! | wait       | `wait × min(elapsed / timeout, 1)` |
//! | complexity | `complexity × max(0, 1 − prep / ceiling)` |
//! | loyalty    | `loyalty` for regular (loyalty) customers |
//! | urgency    | `urgency_boost` once `elapsed ≥ urgency_threshold` |
//!
//! The sum is clamped to `[0, max_score]`.

use crate::clock::{elapsed, minutes};
use crate::config::{EngineConfig, ScoringWeights};
use crate::model::Order;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Individual components of a score, before clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub wait: f64,
    pub complexity: f64,
    pub loyalty: f64,
    pub urgency: f64,
}

impl ScoreBreakdown {
    pub fn raw_total(&self) -> f64 {
        self.wait + self.complexity + self.loyalty + self.urgency
    }
}

#[derive(Debug, Clone)]
pub struct Scorer {
    weights: ScoringWeights,
    timeout: Duration,
    urgency_threshold: Duration,
}

impl Scorer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            weights: config.weights.clone(),
            timeout: config.timeout,
            urgency_threshold: config.urgency_threshold,
        }
    }

    pub fn breakdown(&self, order: &Order, now: DateTime<Utc>) -> ScoreBreakdown {
        let w = &self.weights;
        let waited = elapsed(order.arrival_time, now);

        let wait_fraction = if self.timeout.is_zero() {
            1.0
        } else {
            (waited.as_secs_f64() / self.timeout.as_secs_f64()).min(1.0)
        };

        let complexity_fraction = if w.complexity_ceiling_minutes > 0.0 {
            (1.0 - f64::from(order.total_prep_time) / w.complexity_ceiling_minutes).max(0.0)
        } else {
            0.0
        };

        ScoreBreakdown {
            wait: w.wait * wait_fraction,
            complexity: w.complexity * complexity_fraction,
            loyalty: if order.regular { w.loyalty } else { 0.0 },
            urgency: if waited >= self.urgency_threshold {
                w.urgency_boost
            } else {
                0.0
            },
        }
    }

    /// Final score in `[0, max_score]`.
    pub fn score(&self, order: &Order, now: DateTime<Utc>) -> f64 {
        self.breakdown(order, now)
            .raw_total()
            .clamp(0.0, self.weights.max_score)
    }

    /// Minutes the order has been waiting at `now`.
    pub fn waited_minutes(order: &Order, now: DateTime<Utc>) -> f64 {
        minutes(elapsed(order.arrival_time, now))
    }
}
