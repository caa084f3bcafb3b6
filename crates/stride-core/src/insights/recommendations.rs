//! Recommendation rules
//!
//! Each rule looks at the computed summary and the series and may emit one
//! recommendation. Rules run in registration order and every applicable rule
//! contributes, so the output order is fixed by [`RecommendationEngine::new`].

use crate::config::InsightConfig;
use crate::series::Series;

use super::types::{Recommendation, RecommendationKind, WeekdayStats};

/// Everything a rule may inspect
pub struct RuleContext<'a> {
    pub series: &'a Series,
    pub config: &'a InsightConfig,
    /// Integer-truncated overall mean
    pub avg_steps: u32,
    pub most_active: (&'a str, WeekdayStats),
    pub least_active: (&'a str, WeekdayStats),
}

/// A single recommendation rule
pub trait RecommendationRule: Send + Sync {
    /// Kind of recommendation this rule produces
    fn kind(&self) -> RecommendationKind;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Evaluate the rule
    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Recommendation>;
}

/// Overall mean below the activity target
pub struct LowActivityRule;

impl RecommendationRule for LowActivityRule {
    fn kind(&self) -> RecommendationKind {
        RecommendationKind::LowActivity
    }

    fn name(&self) -> &'static str {
        "Low Activity"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Recommendation> {
        (ctx.avg_steps < ctx.config.activity_target).then(|| {
            Recommendation::new(
                self.kind(),
                "Try to increase your daily steps to reach the recommended 10,000 steps.",
            )
        })
    }
}

/// Most and least active weekdays far apart
pub struct WeekdayConsistencyRule;

impl RecommendationRule for WeekdayConsistencyRule {
    fn kind(&self) -> RecommendationKind {
        RecommendationKind::WeekdayConsistency
    }

    fn name(&self) -> &'static str {
        "Weekday Consistency"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Recommendation> {
        let (most_name, most) = ctx.most_active;
        let (least_name, least) = ctx.least_active;

        most.exceeds_by(&least, ctx.config.weekday_gap).then(|| {
            Recommendation::new(
                self.kind(),
                format!(
                    "Your activity level on {}s is much lower than {}s. Try to be more consistent throughout the week.",
                    least_name, most_name
                ),
            )
        })
    }
}

/// Trailing window compared against the overall mean
///
/// Skipped when the series is shorter than the trailing window. Decline and
/// improvement are mutually exclusive; comparisons are strict and done in
/// integer arithmetic.
pub struct RecentTrendRule;

impl RecommendationRule for RecentTrendRule {
    fn kind(&self) -> RecommendationKind {
        RecommendationKind::RecentDecline
    }

    fn name(&self) -> &'static str {
        "Recent Trend"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Recommendation> {
        let window = ctx.config.trailing_window;
        let n = ctx.series.len();
        if n < window {
            return None;
        }

        let recent: u128 = ctx
            .series
            .tail(window)
            .iter()
            .map(|p| p.steps as u128)
            .sum();
        let overall = ctx.series.total_steps() as u128;

        // recent / window  vs  pct / 100 * overall / n
        let lhs = 100 * recent * n as u128;
        let scaled = |pct: u32| pct as u128 * overall * window as u128;

        if lhs < scaled(ctx.config.decline_percent) {
            Some(Recommendation::new(
                RecommendationKind::RecentDecline,
                "Your activity has decreased recently. Try to get back to your usual routine.",
            ))
        } else if lhs > scaled(ctx.config.improvement_percent) {
            Some(Recommendation::new(
                RecommendationKind::RecentImprovement,
                "Great job! You've been more active than usual lately.",
            ))
        } else {
            None
        }
    }
}

/// Runs registered rules in order
pub struct RecommendationEngine {
    rules: Vec<Box<dyn RecommendationRule>>,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RecommendationEngine {
    /// Create an engine with the built-in rules
    pub fn new() -> Self {
        let mut engine = Self { rules: vec![] };

        engine.register(Box::new(LowActivityRule));
        engine.register(Box::new(WeekdayConsistencyRule));
        engine.register(Box::new(RecentTrendRule));

        engine
    }

    /// Append a rule; it runs after those already registered
    pub fn register(&mut self, rule: Box<dyn RecommendationRule>) {
        self.rules.push(rule);
    }

    /// Evaluate every rule and collect what fired
    pub fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Recommendation> {
        let mut out = Vec::new();
        for rule in &self.rules {
            if let Some(rec) = rule.evaluate(ctx) {
                tracing::debug!(rule = rule.name(), kind = rec.kind.as_str(), "Rule fired");
                out.push(rec);
            }
        }
        out
    }

    /// Names of registered rules, in evaluation order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }
}
