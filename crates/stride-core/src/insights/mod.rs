//! Insight Generator - descriptive statistics and recommendations
//!
//! Summarizes a user's step series: overall mean, extremes and the dates they
//! occurred on, per-weekday means, the most and least active weekday, and a
//! list of recommendations.
//!
//! ## Recommendation Rules
//!
//! - **Low Activity** - average below the daily target
//! - **Weekday Consistency** - large gap between best and worst weekday
//! - **Recent Trend** - trailing week well below or above the overall mean
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stride_core::insights::generate_insights;
//!
//! let series = db.load_series("default_user")?;
//! let insights = generate_insights(&series)?;
//! ```

pub mod generator;
pub mod recommendations;
pub mod types;

pub use generator::{generate_insights, InsightGenerator};
pub use recommendations::{
    LowActivityRule, RecentTrendRule, RecommendationEngine, RecommendationRule, RuleContext,
    WeekdayConsistencyRule,
};
pub use types::{
    weekday_name, Insights, Recommendation, RecommendationKind, WeekdayStats,
};
