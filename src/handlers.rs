use crate::curves::{CurvePoint, build_bid_curves};
use crate::errors::AppError;
use crate::ingest;
use crate::models::{CampaignSeed, Metric, TargetOverrides, WeeklyRecord};
use crate::network::{BaseMetrics, NetworkResponse, simulate_network_response, validate_bid_increase};
use crate::seeds::{self, CAMPAIGN_SEEDS};
use crate::state::AppState;
use crate::summary::{TimelineSummary, summarize};
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::Html,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    pub campaign: Option<String>,
    pub metric: Option<String>,
    pub start_month: Option<u32>,
    pub bid: Option<f64>,
}

impl ViewQuery {
    fn seed(&self) -> Result<&'static CampaignSeed, AppError> {
        Ok(seeds::resolve(self.campaign.as_deref())?)
    }

    fn metric(&self) -> Result<Metric, AppError> {
        match self.metric.as_deref() {
            Some(value) => Ok(value.parse()?),
            None => Ok(Metric::Cpi),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricInfo {
    pub key: Metric,
    pub label: &'static str,
    pub full_name: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub rows: usize,
    pub first_week: String,
    pub last_week: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationStatus {
    pub name: &'static str,
    pub kind: &'static str,
    pub connected: bool,
}

pub async fn index() -> Html<String> {
    Html(render_index(&CAMPAIGN_SEEDS))
}

pub async fn get_seeds() -> Json<Vec<CampaignSeed>> {
    Json(CAMPAIGN_SEEDS.to_vec())
}

pub async fn get_metrics() -> Json<Vec<MetricInfo>> {
    let metrics = Metric::ALL
        .iter()
        .map(|metric| MetricInfo {
            key: *metric,
            label: metric.label(),
            full_name: metric.full_name(),
        })
        .collect();
    Json(metrics)
}

pub async fn upload_csv(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<UploadResponse>, AppError> {
    let rows = match ingest::parse(&body) {
        Ok(rows) => rows,
        Err(err) => {
            warn!("rejected csv upload: {err}");
            return Err(err.into());
        }
    };

    let response = UploadResponse {
        rows: rows.len(),
        first_week: rows.first().map(|r| r.week.clone()).unwrap_or_default(),
        last_week: rows.last().map(|r| r.week.clone()).unwrap_or_default(),
    };
    info!(rows = response.rows, "accepted csv upload");

    let mut session = state.session.lock().await;
    session.upload = Some(rows);
    Ok(Json(response))
}

pub async fn clear_upload(State(state): State<AppState>) -> StatusCode {
    let mut session = state.session.lock().await;
    if session.upload.take().is_some() {
        info!("cleared csv upload");
    }
    StatusCode::NO_CONTENT
}

pub async fn get_targets(State(state): State<AppState>) -> Json<TargetOverrides> {
    let session = state.session.lock().await;
    Json(session.targets)
}

pub async fn put_targets(
    State(state): State<AppState>,
    Json(targets): Json<TargetOverrides>,
) -> Result<Json<TargetOverrides>, AppError> {
    targets.validate()?;
    let mut session = state.session.lock().await;
    session.targets = targets;
    info!(?targets, "updated target overrides");
    Ok(Json(targets))
}

pub async fn get_timeline(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<Vec<WeeklyRecord>>, AppError> {
    let timeline = current_timeline(&state, &query).await?;
    Ok(Json(timeline))
}

pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<TimelineSummary>, AppError> {
    let seed = query.seed()?;
    let metric = query.metric()?;
    let timeline = current_timeline(&state, &query).await?;
    let target = {
        let session = state.session.lock().await;
        session.targets.get(metric)
    };
    Ok(Json(summarize(
        &timeline,
        metric,
        Some(target.unwrap_or(seed.target(metric))),
    )))
}

pub async fn get_network(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<Vec<NetworkResponse>>, AppError> {
    let metric = query.metric()?;
    let bid = validate_bid_increase(query.bid.unwrap_or(state.config.default_bid_increase))?;
    let base = current_base(&state, &query).await?;
    Ok(Json(simulate_network_response(&base, bid, metric)))
}

pub async fn get_curves(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<Vec<CurvePoint>>, AppError> {
    let metric = query.metric()?;
    let base = current_base(&state, &query).await?;
    Ok(Json(build_bid_curves(&base, metric)))
}

pub async fn get_integrations() -> Json<Vec<IntegrationStatus>> {
    let integrations = [
        ("Google Ads", "ad network"),
        ("AppsFlyer", "mobile measurement partner"),
        ("Adjust", "mobile measurement partner"),
    ]
    .into_iter()
    .map(|(name, kind)| IntegrationStatus {
        name,
        kind,
        connected: false,
    })
    .collect();
    Json(integrations)
}

async fn current_timeline(state: &AppState, query: &ViewQuery) -> Result<Vec<WeeklyRecord>, AppError> {
    let seed = query.seed()?;
    let start_month = query.start_month.unwrap_or(state.config.start_month);
    let mut session = state.session.lock().await;
    Ok(session.timeline(seed, start_month)?)
}

async fn current_base(state: &AppState, query: &ViewQuery) -> Result<BaseMetrics, AppError> {
    let seed = query.seed()?;
    let timeline = current_timeline(state, query).await?;
    Ok(BaseMetrics::from_timeline(&timeline, seed))
}
