//! Cost breakdowns and the two-period comparison.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::period::DateRange;

/// Days the current period is normalised to when projecting spend
pub const PROJECTION_DAYS: f64 = 30.0;

/// Minimum absolute projected change for a service to count as a mover
pub const MOVER_THRESHOLD: f64 = 0.10;

/// How many of the biggest services are checked for concentration
pub const CONCENTRATION_TOP: usize = 5;

/// Share of the current total above which a service is flagged
pub const CONCENTRATION_SHARE: f64 = 0.20;

/// Relative increase above which a mover counts as a spike
pub const SPIKE_RATIO: f64 = 0.5;

/// Absolute increase above which a mover counts as a spike
pub const SPIKE_MIN: f64 = 1.0;

/// Projected cost above which a newly appearing service is flagged
pub const NEW_SERVICE_MIN: f64 = 1.0;

/// Services that always get a review suggestion when present
pub const REVIEW_SERVICES: &[(&str, &str)] = &[
    (
        "Amazon Elastic Compute Cloud - Compute",
        "Review instance sizing and idle instances; consider Savings Plans or Reserved Instances for steady workloads",
    ),
    (
        "Amazon Relational Database Service",
        "Review DB instance classes and idle databases; consider Reserved Instances",
    ),
    (
        "Amazon Elastic Load Balancing",
        "Review load balancers with no healthy targets or very little traffic",
    ),
];

/// Cost attributed to one service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCost {
    /// Service name as reported by Cost Explorer
    pub service: String,
    /// Unblended cost in the account currency
    pub amount: f64,
}

/// Unblended cost per service for one period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostBreakdown {
    by_service: BTreeMap<String, f64>,
}

impl CostBreakdown {
    /// Create an empty breakdown
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an amount to a service, summing with anything already recorded
    pub fn add(&mut self, service: impl Into<String>, amount: f64) {
        *self.by_service.entry(service.into()).or_insert(0.0) += amount;
    }

    /// Cost of a single service, if present
    #[must_use]
    pub fn get(&self, service: &str) -> Option<f64> {
        self.by_service.get(service).copied()
    }

    /// Whether the service appears in this period at all
    #[must_use]
    pub fn contains(&self, service: &str) -> bool {
        self.by_service.contains_key(service)
    }

    /// Sum across all services
    #[must_use]
    pub fn total(&self) -> f64 {
        self.by_service.values().sum()
    }

    /// Number of services
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_service.len()
    }

    /// Returns true if no service was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_service.is_empty()
    }

    /// Service names in alphabetical order
    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.by_service.keys().map(String::as_str)
    }

    /// Services sorted by cost, highest first (ties by name)
    #[must_use]
    pub fn sorted(&self) -> Vec<ServiceCost> {
        let mut rows: Vec<ServiceCost> = self
            .by_service
            .iter()
            .map(|(service, amount)| ServiceCost {
                service: service.clone(),
                amount: *amount,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.amount
                .total_cmp(&a.amount)
                .then_with(|| a.service.cmp(&b.service))
        });
        rows
    }
}

impl FromIterator<(String, f64)> for CostBreakdown {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut breakdown = Self::new();
        for (service, amount) in iter {
            breakdown.add(service, amount);
        }
        breakdown
    }
}

/// A breakdown together with the period it covers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodCosts {
    /// Period the costs were fetched for
    pub range: DateRange,
    /// Per-service costs
    pub breakdown: CostBreakdown,
}

impl PeriodCosts {
    /// Pair a range with its costs
    #[must_use]
    pub const fn new(range: DateRange, breakdown: CostBreakdown) -> Self {
        Self { range, breakdown }
    }

    /// Total cost for the period
    #[must_use]
    pub fn total(&self) -> f64 {
        self.breakdown.total()
    }
}

/// How a service's spend moved between periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoverKind {
    /// Present in both periods, projected higher
    Increased,
    /// Present in both periods, projected lower
    Decreased,
    /// Absent from, or zero in, the previous period
    New,
    /// Absent from, or zero in, the current period
    Gone,
}

impl MoverKind {
    /// Direction arrow for terminal output
    #[must_use]
    pub const fn arrow(self) -> &'static str {
        match self {
            Self::Increased | Self::New => "↑",
            Self::Decreased | Self::Gone => "↓",
        }
    }

    /// Returns true if spend went up
    #[must_use]
    pub const fn is_increase(self) -> bool {
        matches!(self, Self::Increased | Self::New)
    }
}

/// A service whose projected spend differs from the previous period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mover {
    /// Service name
    pub service: String,
    /// Cost in the previous period (0 if absent)
    pub previous: f64,
    /// Current cost projected to 30 days (0 if absent)
    pub projected: f64,
    /// `projected - previous`
    pub delta: f64,
    /// Delta relative to the previous cost, when there was one
    pub percent: Option<f64>,
    /// Classification
    pub kind: MoverKind,
}

/// A heuristic cost-saving hint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CostAdvice {
    /// One service dominates current spend
    Concentration {
        /// Service name
        service: String,
        /// Current-period cost
        amount: f64,
        /// Fraction of the current total (0.0..=1.0)
        share: f64,
    },
    /// Projected spend jumped relative to the previous period
    Spike {
        /// Service name
        service: String,
        /// Previous-period cost
        previous: f64,
        /// Projected current cost
        projected: f64,
    },
    /// A service that cost nothing last period now costs something
    NewService {
        /// Service name
        service: String,
        /// Projected current cost
        projected: f64,
    },
    /// A well-known expensive service is in use
    Review {
        /// Service name
        service: String,
        /// What to look at
        suggestion: String,
    },
}

impl CostAdvice {
    /// Service the advice is about
    #[must_use]
    pub fn service(&self) -> &str {
        match self {
            Self::Concentration { service, .. }
            | Self::Spike { service, .. }
            | Self::NewService { service, .. }
            | Self::Review { service, .. } => service,
        }
    }

    /// One-line human readable message
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Concentration {
                service,
                amount,
                share,
            } => format!(
                "{service} is {:.1}% of current spend (${amount:.2}); check whether it can be reduced",
                share * 100.0
            ),
            Self::Spike {
                service,
                previous,
                projected,
            } if *previous > 0.0 => {
                let pct = (projected - previous) / previous * 100.0;
                format!(
                    "{service} is projected at ${projected:.2}, up {pct:.1}% from ${previous:.2}; investigate the increase"
                )
            }
            Self::Spike {
                service, projected, ..
            } => format!(
                "{service} is projected at ${projected:.2}, up from nothing; investigate the increase"
            ),
            Self::NewService { service, projected } => format!(
                "{service} is new this period and projected at ${projected:.2}; confirm it is expected"
            ),
            Self::Review {
                service,
                suggestion,
            } => format!("{service}: {suggestion}"),
        }
    }
}

/// Previous vs. current period comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostComparison {
    /// Earlier period
    pub previous: PeriodCosts,
    /// Later, usually partial, period
    pub current: PeriodCosts,
}

impl CostComparison {
    /// Compare two periods
    #[must_use]
    pub const fn new(current: PeriodCosts, previous: PeriodCosts) -> Self {
        Self { previous, current }
    }

    /// Days in the current period
    #[must_use]
    pub fn days(&self) -> i64 {
        self.current.range.days()
    }

    /// Total cost of the current period
    #[must_use]
    pub fn current_total(&self) -> f64 {
        self.current.total()
    }

    /// Total cost of the previous period
    #[must_use]
    pub fn previous_total(&self) -> f64 {
        self.previous.total()
    }

    /// Project a current-period amount to 30 days
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn project(&self, amount: f64) -> f64 {
        amount / self.days() as f64 * PROJECTION_DAYS
    }

    /// Current total divided by the days in the current period
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn daily_average(&self) -> f64 {
        self.current_total() / self.days() as f64
    }

    /// Daily average times 30
    #[must_use]
    pub fn projected(&self) -> f64 {
        self.daily_average() * PROJECTION_DAYS
    }

    /// Projected minus previous total
    #[must_use]
    pub fn change(&self) -> f64 {
        self.projected() - self.previous_total()
    }

    /// Change as a percentage of the previous total, if there was one
    #[must_use]
    pub fn change_percent(&self) -> Option<f64> {
        let previous = self.previous_total();
        (previous > 0.0).then(|| self.change() / previous * 100.0)
    }

    /// Services whose projected cost moved by more than [`MOVER_THRESHOLD`],
    /// largest absolute move first
    #[must_use]
    pub fn movers(&self) -> Vec<Mover> {
        let services: BTreeSet<&str> = self
            .current
            .breakdown
            .services()
            .chain(self.previous.breakdown.services())
            .collect();

        let mut movers: Vec<Mover> = services
            .into_iter()
            .filter_map(|service| {
                let current = self.current.breakdown.get(service);
                let previous = self.previous.breakdown.get(service);
                let projected = current.map_or(0.0, |c| self.project(c));
                let prev = previous.unwrap_or(0.0);
                let delta = projected - prev;
                if delta.abs() <= MOVER_THRESHOLD {
                    return None;
                }
                // a zero row means no spend, same as no row
                let kind = match (previous.filter(|p| *p > 0.0), current.filter(|c| *c > 0.0)) {
                    (None, _) => MoverKind::New,
                    (_, None) => MoverKind::Gone,
                    _ if delta > 0.0 => MoverKind::Increased,
                    _ => MoverKind::Decreased,
                };
                Some(Mover {
                    service: service.to_string(),
                    previous: prev,
                    projected,
                    delta,
                    percent: (prev > 0.0).then(|| delta / prev * 100.0),
                    kind,
                })
            })
            .collect();

        movers.sort_by(|a, b| {
            b.delta
                .abs()
                .total_cmp(&a.delta.abs())
                .then_with(|| a.service.cmp(&b.service))
        });
        movers
    }

    /// Heuristic recommendations, in a stable order
    #[must_use]
    pub fn recommendations(&self) -> Vec<CostAdvice> {
        let mut advice = Vec::new();
        let total = self.current_total();

        if total > 0.0 {
            for row in self.current.breakdown.sorted().into_iter().take(CONCENTRATION_TOP) {
                let share = row.amount / total;
                if share > CONCENTRATION_SHARE {
                    advice.push(CostAdvice::Concentration {
                        service: row.service,
                        amount: row.amount,
                        share,
                    });
                }
            }
        }

        let movers = self.movers();
        for mover in &movers {
            if mover.kind == MoverKind::Increased
                && mover.previous > 0.0
                && mover.delta > mover.previous * SPIKE_RATIO
                && mover.delta > SPIKE_MIN
            {
                advice.push(CostAdvice::Spike {
                    service: mover.service.clone(),
                    previous: mover.previous,
                    projected: mover.projected,
                });
            }
        }
        for mover in &movers {
            if mover.kind == MoverKind::New && mover.projected > NEW_SERVICE_MIN {
                advice.push(CostAdvice::NewService {
                    service: mover.service.clone(),
                    projected: mover.projected,
                });
            }
        }

        for (service, suggestion) in REVIEW_SERVICES {
            if self.current.breakdown.contains(service) {
                advice.push(CostAdvice::Review {
                    service: (*service).to_string(),
                    suggestion: (*suggestion).to_string(),
                });
            }
        }

        advice
    }

    /// Flattened, serialisable view of every derived figure
    #[must_use]
    pub fn summary(&self) -> CostSummary {
        CostSummary {
            previous_period: self.previous.range,
            current_period: self.current.range,
            days: self.days(),
            current_total: self.current_total(),
            previous_total: self.previous_total(),
            daily_average: self.daily_average(),
            projected: self.projected(),
            change: self.change(),
            change_percent: self.change_percent(),
            current_services: self.current.breakdown.sorted(),
            previous_services: self.previous.breakdown.sorted(),
            movers: self.movers(),
            recommendations: self.recommendations(),
        }
    }
}

/// Everything the cost report prints, for machine-readable output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    /// Earlier period
    pub previous_period: DateRange,
    /// Later period
    pub current_period: DateRange,
    /// Days in the current period
    pub days: i64,
    /// Current period total
    pub current_total: f64,
    /// Previous period total
    pub previous_total: f64,
    /// Current total per day
    pub daily_average: f64,
    /// 30-day projection
    pub projected: f64,
    /// Projection minus previous total
    pub change: f64,
    /// Change relative to previous total
    pub change_percent: Option<f64>,
    /// Current services, most expensive first
    pub current_services: Vec<ServiceCost>,
    /// Previous services, most expensive first
    pub previous_services: Vec<ServiceCost>,
    /// Services that moved
    pub movers: Vec<Mover>,
    /// Recommendations
    pub recommendations: Vec<CostAdvice>,
}
