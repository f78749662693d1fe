//! Engine configuration.
//!
//! Every tunable of the scheduler lives here with the defaults the café runs
//! with. The binary maps its command-line flags onto [`EngineConfig`]; tests
//! shorten the intervals with the `with_*` setters.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Weights of the priority score components, in score points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Points awarded at full wait (reached at the timeout ceiling).
    pub wait: f64,
    /// Points for an instant order, falling linearly to zero at `complexity_ceiling_minutes`.
    pub complexity: f64,
    /// Flat bonus for loyalty customers.
    pub loyalty: f64,
    /// Flat emergency boost once the urgency threshold is crossed.
    pub urgency_boost: f64,
    /// Prep time at which the complexity bonus reaches zero.
    pub complexity_ceiling_minutes: f64,
    /// Upper clamp of the final score.
    pub max_score: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            wait: 40.0,
            complexity: 25.0,
            loyalty: 10.0,
            urgency_boost: 50.0,
            complexity_ceiling_minutes: 6.0,
            max_score: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Size of the fixed barista roster.
    pub baristas: u32,
    /// Cadence of the full rescoring pass.
    pub rescore_interval: Duration,
    /// Cadence of the timeout & fairness sweep.
    pub sweep_interval: Duration,
    /// Optional cadence of automatic assignment cycles.
    pub assign_interval: Option<Duration>,
    /// Run an assignment cycle after every arrival, completion and unassignment.
    pub auto_assign: bool,
    /// Hard ceiling on waiting time.
    pub timeout: Duration,
    /// Wait after which the urgency boost applies.
    pub urgency_threshold: Duration,
    /// How many top-ranked orders an overloaded barista may pick from.
    pub skip_window: usize,
    /// Orders at or below this prep time are "short" for overloaded baristas.
    pub short_order_minutes: u32,
    /// Skip count above which an order is flagged as a fairness violation.
    pub fairness_skip_limit: u32,
    /// Workload ratio above which a barista is overloaded.
    pub overload_ratio: f64,
    /// Workload ratio at or below which a barista is underutilized.
    pub underutilized_ratio: f64,
    /// How many alerts are retained; the oldest are dropped first.
    pub alert_capacity: usize,
    /// Capacity of the engine's request channel.
    pub channel_capacity: usize,
    pub weights: ScoringWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            baristas: 3,
            rescore_interval: Duration::from_secs(30),
            sweep_interval: Duration::from_secs(5),
            assign_interval: None,
            auto_assign: false,
            timeout: Duration::from_secs(10 * 60),
            urgency_threshold: Duration::from_secs(8 * 60),
            skip_window: 3,
            short_order_minutes: 2,
            fairness_skip_limit: 3,
            overload_ratio: 1.2,
            underutilized_ratio: 0.8,
            alert_capacity: 200,
            channel_capacity: 64,
            weights: ScoringWeights::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_baristas(mut self, baristas: u32) -> Self {
        self.baristas = baristas;
        self
    }

    pub fn with_rescore_interval(mut self, interval: Duration) -> Self {
        self.rescore_interval = interval;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn with_assign_interval(mut self, interval: Option<Duration>) -> Self {
        self.assign_interval = interval;
        self
    }

    pub fn with_auto_assign(mut self, enabled: bool) -> Self {
        self.auto_assign = enabled;
        self
    }
}
