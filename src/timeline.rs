use crate::error::{Result, SimError};
use crate::models::{
    Actuals, BidAction, CampaignSeed, Metric, MetricProjection, Projection, TargetOverrides,
    UploadedRow, WeeklyRecord,
};
use crate::seasonality;
use crate::trend::trend;
use rand::Rng;
use tracing::debug;

pub const HISTORY_WEEKS: usize = 12;
pub const FORECAST_WEEKS: usize = 12;

const UPLOAD_FORECAST_START_MONTH: usize = 5;
const FALLBACK_BASE_CPI: f64 = 342.0;
const PROJECTION_FLOOR: f64 = 10.0;

/// How far an uploaded-data projection leans toward its target, per metric.
#[derive(Debug, Clone, Copy)]
struct ForecastPolicy {
    fallback_target_ratio: f64,
    target_pull: f64,
    pessimism: f64,
}

fn policy(metric: Metric) -> ForecastPolicy {
    match metric {
        Metric::Cpi => ForecastPolicy {
            fallback_target_ratio: 0.92,
            target_pull: 0.08,
            pessimism: 1.18,
        },
        Metric::Cpa => ForecastPolicy {
            fallback_target_ratio: 0.90,
            target_pull: 0.10,
            pessimism: 1.20,
        },
        Metric::Cprt => ForecastPolicy {
            fallback_target_ratio: 0.88,
            target_pull: 0.12,
            pessimism: 1.15,
        },
        Metric::Cpft => ForecastPolicy {
            fallback_target_ratio: 0.85,
            target_pull: 0.15,
            pessimism: 1.22,
        },
    }
}

/// Which optional cost series an upload carries. A metric counts as present
/// when any row has a value for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub cpa: bool,
    pub cprt: bool,
    pub cpft: bool,
}

impl Capabilities {
    pub fn detect(rows: &[UploadedRow]) -> Self {
        Self {
            cpa: rows.iter().any(|r| r.cpa.is_some()),
            cprt: rows.iter().any(|r| r.cprt.is_some()),
            cpft: rows.iter().any(|r| r.cpft.is_some()),
        }
    }

    pub fn has(&self, metric: Metric) -> bool {
        match metric {
            Metric::Cpi => true,
            Metric::Cpa => self.cpa,
            Metric::Cprt => self.cprt,
            Metric::Cpft => self.cpft,
        }
    }
}

/// Per-metric inputs resolved once from the upload.
#[derive(Debug, Clone, Copy)]
struct MetricBasis {
    base: f64,
    slope: f64,
    target: f64,
}

impl MetricBasis {
    fn project(&self, week: usize, policy: ForecastPolicy) -> MetricProjection {
        let baseline = (self.base + self.slope * (week + 1) as f64)
            .round()
            .max(PROJECTION_FLOOR);
        let optimistic =
            (baseline * (1.0 - policy.target_pull) + self.target * policy.target_pull).round();
        MetricProjection {
            optimistic,
            pessimistic: (optimistic * policy.pessimism).round(),
            baseline,
        }
    }
}

fn resolve_basis(
    rows: &[UploadedRow],
    metric: Metric,
    capabilities: Capabilities,
    targets: &TargetOverrides,
) -> Option<MetricBasis> {
    let last = rows.last()?;
    let positive = |v: &f64| *v > 0.0;

    let base = if metric == Metric::Cpi {
        last.cpi.filter(positive).unwrap_or(FALLBACK_BASE_CPI)
    } else if capabilities.has(metric) {
        last.cost(metric).filter(positive)?
    } else {
        return None;
    };

    let slope = if capabilities.has(metric) {
        trend(rows, |r| r.cost(metric))
    } else {
        0.0
    };

    let target = targets
        .get(metric)
        .or_else(|| last.target(metric).filter(positive))
        .unwrap_or(base * policy(metric).fallback_target_ratio);

    Some(MetricBasis { base, slope, target })
}

fn budget_ramp(week: usize, tiers: [f64; 3]) -> f64 {
    match week {
        0..=3 => tiers[0],
        4..=7 => tiers[1],
        _ => tiers[2],
    }
}

/// Builds a timeline from uploaded rows: every row becomes a historical week,
/// followed by twelve forecast weeks projected from the recent trend.
pub fn build_timeline(rows: &[UploadedRow], targets: &TargetOverrides) -> Result<Vec<WeeklyRecord>> {
    if rows.is_empty() {
        return Err(SimError::NoValidRows);
    }
    targets.validate()?;

    let total = rows.len();
    let mut timeline: Vec<WeeklyRecord> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| historical_from_upload(i, total, row))
        .collect();

    let capabilities = Capabilities::detect(rows);
    let cpi = resolve_basis(rows, Metric::Cpi, capabilities, targets).ok_or(SimError::NoValidRows)?;
    let cpa = resolve_basis(rows, Metric::Cpa, capabilities, targets);
    let cprt = resolve_basis(rows, Metric::Cprt, capabilities, targets);
    let cpft = resolve_basis(rows, Metric::Cpft, capabilities, targets);

    let avg_budget = rows
        .iter()
        .map(|r| r.budget.filter(|b| *b > 0.0).unwrap_or(r.spend))
        .sum::<f64>()
        / total as f64;
    let avg_budget = avg_budget.max(0.0);

    debug!(
        weeks = total,
        base_cpi = cpi.base,
        cpi_slope = cpi.slope,
        target_cpi = cpi.target,
        avg_budget,
        ?capabilities,
        "building timeline from upload"
    );

    for w in 0..FORECAST_WEEKS {
        let month = seasonality::month_at(UPLOAD_FORECAST_START_MONTH + w);

        let cpi_projection = cpi.project(w, policy(Metric::Cpi));
        let optimistic_cpi = cpi_projection.optimistic;
        let installs_optimistic = (avg_budget / optimistic_cpi * 1.05).round() as u64;
        let installs_pessimistic = (installs_optimistic as f64 * 0.82).round() as u64;
        let rec_budget = (avg_budget * budget_ramp(w, [1.15, 1.25, 1.35])).round();

        let projection = Projection {
            cpi: cpi_projection,
            cpa: cpa.map(|b| b.project(w, policy(Metric::Cpa))),
            cprt: cprt.map(|b| b.project(w, policy(Metric::Cprt))),
            cpft: cpft.map(|b| b.project(w, policy(Metric::Cpft))),
            installs_optimistic,
            installs_pessimistic,
            spend: (rec_budget * 7.0).min(installs_optimistic as f64 * optimistic_cpi),
            rec_bid: (cpi.target * 0.95).round(),
            rec_budget,
            bid_action: BidAction::decide(optimistic_cpi, cpi.target),
        };

        timeline.push(WeeklyRecord::projected(
            format!("W{}", w + 1),
            w as i32 + 1,
            seasonality::short_name(month),
            seasonality::factor(month),
            projection,
        ));
    }

    Ok(timeline)
}

fn historical_from_upload(index: usize, total: usize, row: &UploadedRow) -> WeeklyRecord {
    let week_num = index as i32 - total as i32;
    let label = if row.week.is_empty() {
        format!("W{week_num}")
    } else {
        row.week.clone()
    };

    let actual = Actuals {
        cpi: row.cpi.unwrap_or(0.0),
        cpa: row.cpa,
        cprt: row.cprt,
        cpft: row.cpft,
        installs: row.installs,
        actions: row.actions,
        reactivations: row.reactivations,
        first_transactions: row.first_transactions,
        spend: row.spend,
        cvr: row.cvr,
        ctr: row.ctr,
        impressions: row.impressions,
        clicks: row.clicks,
        budget: row.budget,
        network: row.network.clone(),
    };

    WeeklyRecord::historical(
        label,
        week_num,
        seasonality::short_name(seasonality::month_at(index)),
        1.0,
        actual,
    )
}

/// Synthesizes twelve historical and twelve forecast weeks from a seed.
/// `start_month` is the zero-based month of the first forecast week.
pub fn build_demo_timeline(seed: &CampaignSeed, start_month: u32) -> Vec<WeeklyRecord> {
    build_demo_timeline_with(seed, start_month, &mut rand::thread_rng())
}

pub fn build_demo_timeline_with<R: Rng + ?Sized>(
    seed: &CampaignSeed,
    start_month: u32,
    rng: &mut R,
) -> Vec<WeeklyRecord> {
    let start = start_month as usize % 12;
    let mut timeline = Vec::with_capacity(HISTORY_WEEKS + FORECAST_WEEKS);

    for w in 0..HISTORY_WEEKS {
        let month = seasonality::month_at(start + w + 24 - HISTORY_WEEKS);
        let season = seasonality::factor(month);
        timeline.push(WeeklyRecord::historical(
            format!("W{}", w as i32 - HISTORY_WEEKS as i32 + 1),
            w as i32 - HISTORY_WEEKS as i32,
            seasonality::short_name(month),
            season,
            synthesize_actuals(seed, season, rng),
        ));
    }

    let weekly_budget = seed.budget * 7.0;
    let mut trend = 1.0_f64;

    for w in 0..FORECAST_WEEKS {
        let month = seasonality::month_at(start + w);
        let season = seasonality::factor(month);
        trend = (trend * 0.97).max(0.78);

        let project = |base: f64, multiplier: f64| {
            let optimistic = (base * season * trend * multiplier).round();
            MetricProjection {
                optimistic,
                pessimistic: (optimistic * 1.18).round(),
                baseline: (base * season * (1.0 + w as f64 * 0.006)).round(),
            }
        };

        let cpi = project(seed.base_cpi, 0.92);
        let installs_optimistic = (weekly_budget / cpi.optimistic.max(1.0) * 1.08).round() as u64;
        let installs_pessimistic = (installs_optimistic as f64 * 0.83).round() as u64;

        let projection = Projection {
            cpi,
            cpa: Some(project(seed.base_cpa, 0.90)),
            cprt: Some(project(seed.base_cprt, 0.94)),
            cpft: Some(project(seed.base_cpft, 0.88)),
            installs_optimistic,
            installs_pessimistic,
            spend: (weekly_budget * 1.35)
                .min(installs_optimistic as f64 * cpi.optimistic)
                .round(),
            rec_bid: (seed.target_cpi * 0.94 * trend).round(),
            rec_budget: (seed.budget * budget_ramp(w, [1.20, 1.35, 1.50])).round(),
            bid_action: BidAction::decide(cpi.optimistic, seed.target_cpi),
        };

        timeline.push(WeeklyRecord::projected(
            format!("W{}", w + 1),
            w as i32 + 1,
            seasonality::short_name(month),
            season,
            projection,
        ));
    }

    timeline
}

/// Builds a week of actuals bottom-up: impressions from budget, clicks from
/// impressions, installs from clicks, downstream events from installs.
fn synthesize_actuals<R: Rng + ?Sized>(seed: &CampaignSeed, season: f64, rng: &mut R) -> Actuals {
    let mut cost = |base: f64| (base * season * rng.gen_range(0.88..1.12)).round();
    let cpi = cost(seed.base_cpi);
    let cpa = cost(seed.base_cpa);
    let cprt = cost(seed.base_cprt);
    let cpft = cost(seed.base_cpft);

    let cvr = round_to(seed.base_cvr * rng.gen_range(0.9..1.1), 4);
    let weekly_budget = seed.budget * 7.0;
    let impressions = (weekly_budget * rng.gen_range(0.85..1.15)).round() as u64;
    let clicks = (impressions as f64 * 0.048 * rng.gen_range(0.85..1.15)).round() as u64;
    let installs = ((clicks as f64 * cvr).round() as u64).max(1);

    let mut events = |metric: Metric| {
        Some((installs as f64 * metric.post_install_rate() * rng.gen_range(0.9..1.1)).round() as u64)
    };
    let actions = events(Metric::Cpa);
    let reactivations = events(Metric::Cprt);
    let first_transactions = events(Metric::Cpft);

    let ctr = if impressions > 0 {
        round_to(clicks as f64 / impressions as f64, 4)
    } else {
        0.0
    };

    Actuals {
        cpi,
        cpa: Some(cpa),
        cprt: Some(cprt),
        cpft: Some(cpft),
        installs,
        actions,
        reactivations,
        first_transactions,
        spend: weekly_budget.min(installs as f64 * cpi).round(),
        cvr,
        ctr,
        impressions,
        clicks,
        budget: Some(seed.budget),
        network: None,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
