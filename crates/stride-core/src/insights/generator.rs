//! Insight generator - summary statistics, weekday aggregation, recommendations

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::config::InsightConfig;
use crate::error::{Error, Result};
use crate::series::Series;

use super::recommendations::{RecommendationEngine, RuleContext};
use super::types::{weekday_name, Insights, WeekdayStats};

/// Generate insights with the default thresholds
pub fn generate_insights(series: &Series) -> Result<Insights> {
    InsightGenerator::default().generate(series)
}

/// Computes [`Insights`] from a series
pub struct InsightGenerator {
    config: InsightConfig,
    engine: RecommendationEngine,
}

impl Default for InsightGenerator {
    fn default() -> Self {
        Self::new(InsightConfig::default())
    }
}

impl InsightGenerator {
    pub fn new(config: InsightConfig) -> Self {
        Self {
            config,
            engine: RecommendationEngine::new(),
        }
    }

    /// Use a custom rule set
    pub fn with_engine(config: InsightConfig, engine: RecommendationEngine) -> Self {
        Self { config, engine }
    }

    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    /// Compute insights for a non-empty series
    pub fn generate(&self, series: &Series) -> Result<Insights> {
        let points = series.points();
        let (first, rest) = points.split_first().ok_or_else(|| {
            Error::InsufficientData(format!(
                "No step data available for user {}",
                series.user_id()
            ))
        })?;

        // Strict comparisons keep the first occurrence on ties
        let mut max = first;
        let mut min = first;
        for p in rest {
            if p.steps > max.steps {
                max = p;
            }
            if p.steps < min.steps {
                min = p;
            }
        }

        // Keyed by name so iteration is alphabetical
        let mut by_weekday: BTreeMap<&'static str, WeekdayStats> = BTreeMap::new();
        for p in points {
            by_weekday
                .entry(weekday_name(p.date.weekday()))
                .or_default()
                .add(p.steps);
        }

        let (most_active, least_active) = extremes(&by_weekday);
        let avg_steps = series.mean_steps().unwrap_or(0);

        let ctx = RuleContext {
            series,
            config: &self.config,
            avg_steps,
            most_active,
            least_active,
        };
        let recommendations = self
            .engine
            .evaluate(&ctx)
            .into_iter()
            .map(|r| r.message)
            .collect();

        let insights = Insights {
            total_days: points.len(),
            avg_steps,
            max_steps: max.steps,
            max_steps_date: max.date,
            min_steps: min.steps,
            min_steps_date: min.date,
            day_averages: by_weekday
                .iter()
                .map(|(name, stats)| (name.to_string(), stats.mean()))
                .collect(),
            most_active_day: most_active.0.to_string(),
            least_active_day: least_active.0.to_string(),
            recommendations,
        };

        tracing::debug!(
            user = series.user_id(),
            days = insights.total_days,
            avg = insights.avg_steps,
            recommendations = insights.recommendations.len(),
            "Generated insights"
        );

        Ok(insights)
    }
}

type WeekdayEntry = (&'static str, WeekdayStats);

/// Most and least active weekdays; ties go to the alphabetically first name
fn extremes(by_weekday: &BTreeMap<&'static str, WeekdayStats>) -> (WeekdayEntry, WeekdayEntry) {
    let mut iter = by_weekday.iter().map(|(name, stats)| (*name, *stats));
    // Callers only pass maps built from a non-empty series
    let first = iter.next().unwrap_or(("", WeekdayStats::default()));

    let mut most = first;
    let mut least = first;
    for entry in iter {
        if entry.1.cmp_mean(&most.1).is_gt() {
            most = entry;
        }
        if entry.1.cmp_mean(&least.1).is_lt() {
            least = entry;
        }
    }
    (most, least)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StepPoint;
    use chrono::{Duration, NaiveDate};

    /// 2024-01-01 is a Monday
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn consecutive(steps: &[u32]) -> Series {
        Series::from_points(
            "u",
            steps.iter().enumerate().map(|(i, &s)| StepPoint {
                date: monday() + Duration::days(i as i64),
                steps: s,
            }),
        )
    }

    #[test]
    fn test_empty_series_is_insufficient_data() {
        let err = generate_insights(&Series::empty("u")).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_alternating_fortnight() {
        let steps: Vec<u32> = (0..14)
            .map(|i| if i % 2 == 0 { 5000 } else { 6000 })
            .collect();
        let insights = generate_insights(&consecutive(&steps)).unwrap();

        assert_eq!(insights.total_days, 14);
        assert_eq!(insights.avg_steps, 5500);
        assert_eq!(insights.max_steps, 6000);
        assert_eq!(insights.min_steps, 5000);
        assert_eq!(insights.max_steps_date, monday() + Duration::days(1));
        assert_eq!(insights.min_steps_date, monday());
        assert_eq!(
            insights.recommendations[0],
            "Try to increase your daily steps to reach the recommended 10,000 steps."
        );
    }

    #[test]
    fn test_stats_ordering_property() {
        let samples: Vec<Vec<u32>> = vec![
            vec![0],
            vec![1, 2],
            vec![20000, 0, 15, 7000, 7001],
            (0..40).map(|i| (i * 7919) % 23000).collect(),
        ];
        for steps in samples {
            let insights = generate_insights(&consecutive(&steps)).unwrap();
            assert!(insights.min_steps <= insights.avg_steps);
            assert!(insights.avg_steps <= insights.max_steps);
        }
    }

    #[test]
    fn test_day_averages_match_present_weekdays() {
        // Monday, Wednesday, next Monday
        let series = Series::from_points(
            "u",
            vec![
                StepPoint {
                    date: monday(),
                    steps: 4000,
                },
                StepPoint {
                    date: monday() + Duration::days(2),
                    steps: 9000,
                },
                StepPoint {
                    date: monday() + Duration::days(7),
                    steps: 5001,
                },
            ],
        );
        let insights = generate_insights(&series).unwrap();

        let keys: Vec<&str> = insights.day_averages.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["Monday", "Wednesday"]);
        // (4000 + 5001) / 2 truncates
        assert_eq!(insights.day_averages["Monday"], 4500);
        assert_eq!(insights.most_active_day, "Wednesday");
        assert_eq!(insights.least_active_day, "Monday");
    }

    #[test]
    fn test_weekday_tie_break_is_alphabetical() {
        // Mon..Sun; Friday and Tuesday share the top mean, Saturday and
        // Thursday share the bottom
        let insights = generate_insights(&consecutive(&[
            5000, 9000, 6000, 2000, 9000, 2000, 6000,
        ]))
        .unwrap();
        assert_eq!(insights.most_active_day, "Friday");
        assert_eq!(insights.least_active_day, "Saturday");
    }

    #[test]
    fn test_low_activity_boundary() {
        let at_target = generate_insights(&consecutive(&[7000, 7000, 7000])).unwrap();
        assert!(at_target.recommendations.is_empty());

        // Mean 6999.5 truncates to 6999
        let below = generate_insights(&consecutive(&[7000, 6999])).unwrap();
        assert_eq!(below.avg_steps, 6999);
        assert_eq!(below.recommendations.len(), 1);
    }

    #[test]
    fn test_short_series_never_has_trend_recommendation() {
        let insights = generate_insights(&consecutive(&[20000, 20000, 100, 100, 100, 100])).unwrap();
        assert!(!insights
            .recommendations
            .iter()
            .any(|r| r.contains("recently") || r.contains("lately")));
    }

    #[test]
    fn test_recommendation_order() {
        // Low average, big weekday gap, trailing week collapse
        let mut steps = vec![12000, 1000, 1000, 1000, 1000, 1000, 1000];
        steps.extend([13000, 1000, 1000, 1000, 1000, 1000, 1000]);
        steps.extend([100; 7]);
        let insights = generate_insights(&consecutive(&steps)).unwrap();

        assert_eq!(insights.recommendations.len(), 3);
        assert!(insights.recommendations[0].starts_with("Try to increase"));
        assert!(insights.recommendations[1].contains("more consistent"));
        assert!(insights.recommendations[2].contains("decreased recently"));
    }

    #[test]
    fn test_generate_is_idempotent() {
        let series = consecutive(&[3000, 12000, 8000, 4500, 9100, 15000, 200, 7000]);
        let generator = InsightGenerator::default();
        assert_eq!(
            generator.generate(&series).unwrap(),
            generator.generate(&series).unwrap()
        );
    }

    #[test]
    fn test_serialized_field_names() {
        let insights = generate_insights(&consecutive(&[8000, 9000])).unwrap();
        let json = serde_json::to_value(&insights).unwrap();
        for field in [
            "total_days",
            "avg_steps",
            "max_steps",
            "max_steps_date",
            "min_steps",
            "min_steps_date",
            "day_averages",
            "most_active_day",
            "least_active_day",
            "recommendations",
        ] {
            assert!(json.get(field).is_some(), "missing {}", field);
        }
        assert_eq!(json["max_steps_date"], "2024-01-02");
    }
}
