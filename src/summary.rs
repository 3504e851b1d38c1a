use crate::models::{BidAction, Metric, Phase, WeeklyRecord};
use crate::network::round1;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidChange {
    pub label: String,
    pub week_num: i32,
    pub month: String,
    pub action: BidAction,
    pub rec_bid: f64,
    pub rec_budget: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSummary {
    pub metric: Metric,
    pub target: Option<f64>,
    pub historical_weeks: usize,
    pub forecast_weeks: usize,
    pub historical_average: f64,
    pub forecast_average: f64,
    pub delta_pct: Option<f64>,
    pub historical_volume: u64,
    pub bid_changes: Vec<BidChange>,
}

/// Headline figures for one metric of a timeline. Missing values count as 0
/// in the averages; `delta_pct` is `None` when there is no historical cost.
pub fn summarize(timeline: &[WeeklyRecord], metric: Metric, target: Option<f64>) -> TimelineSummary {
    let historical: Vec<&WeeklyRecord> = timeline
        .iter()
        .filter(|r| r.phase == Phase::Historical)
        .collect();
    let forecast: Vec<&WeeklyRecord> = timeline
        .iter()
        .filter(|r| r.phase == Phase::Forecast)
        .collect();

    let historical_average = mean(historical.iter().map(|r| {
        r.actual
            .as_ref()
            .and_then(|a| a.cost(metric))
            .unwrap_or(0.0)
    }));
    let forecast_average = mean(forecast.iter().map(|r| {
        r.forecast
            .as_ref()
            .and_then(|f| f.metric(metric))
            .map_or(0.0, |p| p.optimistic)
    }));

    let delta_pct = (historical_average > 0.0)
        .then(|| round1((forecast_average / historical_average - 1.0) * 100.0));

    let historical_volume = historical
        .iter()
        .filter_map(|r| r.actual.as_ref().and_then(|a| a.events(metric)))
        .sum();

    let mut bid_changes = Vec::new();
    let mut previous: Option<BidAction> = None;
    for record in &forecast {
        let Some(projection) = record.forecast.as_ref() else {
            continue;
        };
        if previous != Some(projection.bid_action) {
            bid_changes.push(BidChange {
                label: record.label.clone(),
                week_num: record.week_num,
                month: record.month.clone(),
                action: projection.bid_action,
                rec_bid: projection.rec_bid,
                rec_budget: projection.rec_budget,
            });
        }
        previous = Some(projection.bid_action);
    }

    TimelineSummary {
        metric,
        target,
        historical_weeks: historical.len(),
        forecast_weeks: forecast.len(),
        historical_average,
        forecast_average,
        delta_pct,
        historical_volume,
        bid_changes,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}
