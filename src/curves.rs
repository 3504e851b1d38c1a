use crate::models::Metric;
use crate::network::{BaseMetrics, Network, round1};
use serde::Serialize;

const STEP_PCT: usize = 5;
const MAX_PCT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveValue {
    pub network: Network,
    pub metric_value: f64,
    pub volume_gain: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurvePoint {
    pub bid_increase: u32,
    pub networks: Vec<CurveValue>,
}

/// Samples every network's elasticity from 0% to 100% bid increase in 5% steps.
pub fn build_bid_curves(base: &BaseMetrics, metric: Metric) -> Vec<CurvePoint> {
    let base_value = base.value(metric);

    (0..=MAX_PCT)
        .step_by(STEP_PCT)
        .map(|pct| {
            let bid_pct = f64::from(pct);
            let networks = Network::ALL
                .iter()
                .map(|network| {
                    let el = network.elasticity();
                    let change = el.metric_change(metric, bid_pct);
                    CurveValue {
                        network: *network,
                        metric_value: (base_value * (1.0 + change / 100.0)).round(),
                        volume_gain: round1(el.volume_gain(bid_pct)),
                    }
                })
                .collect();
            CurvePoint {
                bid_increase: pct,
                networks,
            }
        })
        .collect()
}
