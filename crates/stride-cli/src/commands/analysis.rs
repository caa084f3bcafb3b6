//! Insights, forecast and dashboard output

use anyhow::Result;
use chrono::Datelike;
use stride_core::{
    build_dashboard, db::Database, insights::weekday_name, EngineConfig, ForecastPoint, Forecaster,
    InsightGenerator, Insights,
};

use super::bar;

fn print_insights(insights: &Insights) {
    println!();
    println!("📊 Activity Insights ({} days)", insights.total_days);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Average: {} steps/day", insights.avg_steps);
    println!(
        "   Best day: {} steps on {}",
        insights.max_steps, insights.max_steps_date
    );
    println!(
        "   Lowest day: {} steps on {}",
        insights.min_steps, insights.min_steps_date
    );
    println!("   Most active: {}", insights.most_active_day);
    println!("   Least active: {}", insights.least_active_day);

    let max = insights.day_averages.values().copied().max().unwrap_or(0);
    println!();
    println!("   By weekday:");
    for (day, avg) in &insights.day_averages {
        println!("   {:<9} {:>7}  {}", day, avg, bar(*avg, max, 30));
    }

    println!();
    if insights.recommendations.is_empty() {
        println!("✅ Nice consistency. Keep it up!");
    } else {
        println!("💡 Recommendations");
        for rec in &insights.recommendations {
            println!("   • {}", rec);
        }
    }
}

fn print_forecast(points: &[ForecastPoint]) {
    println!();
    println!("🔮 Forecast");
    println!("   ─────────────────────────────");
    for p in points {
        println!(
            "   {} {:<9} {:>7}",
            p.date,
            weekday_name(p.date.weekday()),
            p.predicted_steps
        );
    }
}

pub fn cmd_insights(db: &Database, config: &EngineConfig, user: &str, json: bool) -> Result<()> {
    let series = db.load_series(user)?;
    if series.is_empty() {
        println!("No steps stored for {}.", user);
        return Ok(());
    }

    let insights = InsightGenerator::new(config.insights.clone()).generate(&series)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&insights)?);
    } else {
        print_insights(&insights);
    }

    Ok(())
}

pub fn cmd_predict(
    db: &Database,
    config: &EngineConfig,
    user: &str,
    days: Option<usize>,
    json: bool,
) -> Result<()> {
    let series = db.load_series(user)?;
    if series.is_empty() {
        println!("Not enough data for prediction: no steps stored for {}.", user);
        return Ok(());
    }

    let forecaster = Forecaster::new(config.forecast.clone()).train(&series);
    let points = forecaster.forecast(&series, days.unwrap_or(config.forecast.horizon))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&points)?);
        return Ok(());
    }

    if !forecaster.is_trained() {
        println!(
            "ℹ️  Only {} days stored ({} needed for a trend model), using your average",
            series.len(),
            config.forecast.min_observations
        );
    }
    print_forecast(&points);

    Ok(())
}

pub fn cmd_dashboard(db: &Database, config: &EngineConfig, user: &str, json: bool) -> Result<()> {
    let series = db.load_series(user)?;
    let forecaster = Forecaster::new(config.forecast.clone()).train(&series);
    let dashboard = build_dashboard(
        &series,
        &InsightGenerator::new(config.insights.clone()),
        &forecaster,
        config.forecast.horizon,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
        return Ok(());
    }

    println!();
    println!("🏠 Stride Dashboard: {}", dashboard.user_id);
    println!("   ─────────────────────────────────────────────────────────────");

    if !dashboard.has_data {
        println!("   No data yet.");
        println!();
        println!("   Import steps: stride import --file steps.csv");
        println!("   Or add a day: stride add --date 2024-01-01 --steps 8000");
        return Ok(());
    }

    if let Some(last) = dashboard.history.last() {
        println!("   Days tracked: {}", dashboard.history.len());
        println!("   Last entry: {} steps on {}", last.steps, last.date);
    }
    if let Some(insights) = &dashboard.insights {
        print_insights(insights);
    }
    print_forecast(&dashboard.forecast);

    Ok(())
}
