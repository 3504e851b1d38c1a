use crate::error::{Result, SimError};
use crate::models::{CampaignSeed, Metric, Phase, WeeklyRecord};
use serde::Serialize;
use std::fmt;

const REFERENCE_CPM: f64 = 234.0;
const REFERENCE_CPC: f64 = 37.6;
const BID_STEP_PCT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Network {
    Search,
    YouTube,
    Display,
}

impl Network {
    pub const ALL: [Network; 3] = [Network::Search, Network::YouTube, Network::Display];

    pub fn elasticity(self) -> &'static Elasticity {
        match self {
            Network::Search => &SEARCH,
            Network::YouTube => &YOUTUBE,
            Network::Display => &DISPLAY,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Network::Search => "Search",
            Network::YouTube => "YouTube",
            Network::Display => "Display",
        };
        f.write_str(name)
    }
}

/// Linear response coefficients, in percent per percent of bid increase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Elasticity {
    pub volume_slope: f64,
    pub volume_cap: f64,
    pub cpc_slope: f64,
    pub cpm_slope: f64,
    pub cvr_slope: f64,
    pub cpi_slope: f64,
    pub cpa_slope: Option<f64>,
    pub cprt_slope: Option<f64>,
    pub cpft_slope: Option<f64>,
    pub quality_score: f64,
    pub notes: &'static str,
}

const SEARCH: Elasticity = Elasticity {
    volume_slope: 0.85,
    volume_cap: 60.0,
    cpc_slope: 0.70,
    cpm_slope: 0.50,
    cvr_slope: 0.12,
    cpi_slope: 0.55,
    cpa_slope: Some(0.48),
    cprt_slope: Some(0.60),
    cpft_slope: Some(0.42),
    quality_score: 80.0,
    notes: "High-intent traffic. Bid increases yield strong volume gains with moderate CPC rise. CVR typically improves at top positions.",
};

const YOUTUBE: Elasticity = Elasticity {
    volume_slope: 1.20,
    volume_cap: 80.0,
    cpc_slope: 0.40,
    cpm_slope: 0.65,
    cvr_slope: 0.05,
    cpi_slope: 0.62,
    cpa_slope: Some(0.80),
    cprt_slope: Some(0.75),
    cpft_slope: Some(0.95),
    quality_score: 60.0,
    notes: "Reach and awareness first. Bid increases unlock broad audiences quickly while CVR is slower to respond; best for upper-funnel and re-engagement.",
};

const DISPLAY: Elasticity = Elasticity {
    volume_slope: 1.50,
    volume_cap: 90.0,
    cpc_slope: 0.25,
    cpm_slope: 0.80,
    cvr_slope: -0.08,
    cpi_slope: 0.70,
    cpa_slope: Some(0.90),
    cprt_slope: Some(0.55),
    cpft_slope: Some(1.10),
    quality_score: 45.0,
    notes: "Widest reach, lowest CPM. Strong for retargeting (CPRT) but weakest for first transactions; watch for quality dilution as volume scales.",
};

impl Elasticity {
    pub fn volume_gain(&self, bid_pct: f64) -> f64 {
        (bid_pct * self.volume_slope).min(self.volume_cap)
    }

    pub fn cpc_change(&self, bid_pct: f64) -> f64 {
        bid_pct * self.cpc_slope
    }

    pub fn cpm_change(&self, bid_pct: f64) -> f64 {
        bid_pct * self.cpm_slope
    }

    pub fn cvr_boost(&self, bid_pct: f64) -> f64 {
        bid_pct * self.cvr_slope
    }

    /// Percentage change of a cost metric. Metrics without their own
    /// coefficient move like CPI.
    pub fn metric_change(&self, metric: Metric, bid_pct: f64) -> f64 {
        let slope = match metric {
            Metric::Cpi => None,
            Metric::Cpa => self.cpa_slope,
            Metric::Cprt => self.cprt_slope,
            Metric::Cpft => self.cpft_slope,
        };
        bid_pct * slope.unwrap_or(self.cpi_slope)
    }
}

/// Current unit costs the network view projects from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BaseMetrics {
    pub cpi: f64,
    pub cpa: Option<f64>,
    pub cprt: Option<f64>,
    pub cpft: Option<f64>,
}

impl BaseMetrics {
    pub fn from_seed(seed: &CampaignSeed) -> Self {
        Self {
            cpi: seed.base_cpi,
            cpa: Some(seed.base_cpa),
            cprt: Some(seed.base_cprt),
            cpft: Some(seed.base_cpft),
        }
    }

    /// Latest observed costs in a timeline, with the seed filling any gaps.
    pub fn from_timeline(timeline: &[WeeklyRecord], seed: &CampaignSeed) -> Self {
        let latest = timeline
            .iter()
            .rev()
            .find(|r| r.phase == Phase::Historical)
            .and_then(|r| r.actual.as_ref());
        let Some(actual) = latest else {
            return Self::from_seed(seed);
        };

        let observed = |metric: Metric| actual.cost(metric).filter(|v| *v > 0.0);
        Self {
            cpi: observed(Metric::Cpi).unwrap_or(seed.base_cpi),
            cpa: observed(Metric::Cpa).or(Some(seed.base_cpa)),
            cprt: observed(Metric::Cprt).or(Some(seed.base_cprt)),
            cpft: observed(Metric::Cpft).or(Some(seed.base_cpft)),
        }
    }

    /// Base value for a metric; missing downstream costs are estimated from CPI.
    pub fn value(&self, metric: Metric) -> f64 {
        let explicit = match metric {
            Metric::Cpi => Some(self.cpi),
            Metric::Cpa => self.cpa,
            Metric::Cprt => self.cprt,
            Metric::Cpft => self.cpft,
        };
        explicit
            .filter(|v| *v > 0.0)
            .unwrap_or(self.cpi * metric.base_multiplier())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkResponse {
    pub network: Network,
    pub volume_gain_pct: f64,
    pub cvr_boost_pct: f64,
    pub metric_base: f64,
    pub metric_new: f64,
    pub metric_delta: f64,
    pub metric_delta_pct: f64,
    pub cpm_new: f64,
    pub cpc_new: f64,
    pub notes: &'static str,
    pub volume_score: f64,
    pub efficiency_score: f64,
    pub cvr_score: f64,
    pub scale_score: f64,
    pub quality_score: f64,
}

pub fn validate_bid_increase(bid_pct: f64) -> Result<f64> {
    if (5.0..=100.0).contains(&bid_pct) && bid_pct % BID_STEP_PCT == 0.0 {
        Ok(bid_pct)
    } else {
        Err(SimError::InvalidBidIncrease(bid_pct))
    }
}

/// Projects how each network responds to raising bids by `bid_pct` percent.
pub fn simulate_network_response(
    base: &BaseMetrics,
    bid_pct: f64,
    metric: Metric,
) -> Vec<NetworkResponse> {
    let base_value = base.value(metric);

    Network::ALL
        .iter()
        .map(|network| {
            let el = network.elasticity();
            let pct_change = el.metric_change(metric, bid_pct);
            let volume_gain = round1(el.volume_gain(bid_pct));
            let cvr_boost = round1(el.cvr_boost(bid_pct));
            let metric_base = base_value.round();
            let metric_new = (base_value * (1.0 + pct_change / 100.0)).round();
            let metric_delta_pct = round1(pct_change);

            NetworkResponse {
                network: *network,
                volume_gain_pct: volume_gain,
                cvr_boost_pct: cvr_boost,
                metric_base,
                metric_new,
                metric_delta: metric_new - metric_base,
                metric_delta_pct,
                cpm_new: (REFERENCE_CPM * (1.0 + el.cpm_change(bid_pct) / 100.0)).round(),
                cpc_new: (REFERENCE_CPC * (1.0 + el.cpc_change(bid_pct) / 100.0)).round(),
                notes: el.notes,
                volume_score: (volume_gain * 1.2).min(100.0),
                efficiency_score: (100.0 - metric_delta_pct * 1.5).max(0.0),
                cvr_score: (50.0 + cvr_boost * 5.0).max(0.0),
                scale_score: (volume_gain * 1.1).min(100.0),
                quality_score: el.quality_score,
            }
        })
        .collect()
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeds;

    fn base() -> BaseMetrics {
        BaseMetrics::from_seed(seeds::default_seed())
    }

    #[test]
    fn search_volume_is_monotonic_and_capped() {
        let el = Network::Search.elasticity();
        let mut previous = f64::MIN;
        for pct in 0..=100 {
            let gain = el.volume_gain(pct as f64);
            assert!(gain >= previous);
            assert!(gain <= 60.0);
            previous = gain;
        }
        assert_eq!(el.volume_gain(100.0), 60.0);
        assert_eq!(Network::YouTube.elasticity().volume_gain(100.0), 80.0);
        assert_eq!(Network::Display.elasticity().volume_gain(100.0), 90.0);
    }

    #[test]
    fn missing_metric_coefficient_falls_back_to_cpi() {
        let el = Elasticity {
            cpa_slope: None,
            ..SEARCH
        };
        assert_eq!(el.metric_change(Metric::Cpa, 20.0), el.metric_change(Metric::Cpi, 20.0));
        assert_eq!(el.metric_change(Metric::Cprt, 20.0), 20.0 * 0.60);
    }

    #[test]
    fn response_per_network_at_twenty_percent() {
        let responses = simulate_network_response(&base(), 20.0, Metric::Cpi);
        assert_eq!(responses.len(), 3);

        let search = &responses[0];
        assert_eq!(search.network, Network::Search);
        assert_eq!(search.volume_gain_pct, 17.0);
        assert_eq!(search.cvr_boost_pct, 2.4);
        assert_eq!(search.metric_base, 342.0);
        assert_eq!(search.metric_new, (342.0 * 1.11_f64).round());
        assert_eq!(search.metric_delta, search.metric_new - 342.0);
        assert_eq!(search.metric_delta_pct, 11.0);
        assert_eq!(search.cpm_new, 257.0);
        assert_eq!(search.cpc_new, 43.0);
        assert_eq!(search.quality_score, 80.0);

        let display = &responses[2];
        assert_eq!(display.network, Network::Display);
        assert_eq!(display.cvr_boost_pct, -1.6);
        assert_eq!(display.cvr_score, 42.0);
        assert_eq!(display.volume_gain_pct, 30.0);
        assert_eq!(display.volume_score, 36.0);
        assert_eq!(display.quality_score, 45.0);
    }

    #[test]
    fn scores_are_clamped_at_full_increase() {
        let responses = simulate_network_response(&base(), 100.0, Metric::Cpft);
        for response in &responses {
            assert!(response.volume_score <= 100.0);
            assert!(response.scale_score <= 100.0);
            assert!(response.efficiency_score >= 0.0);
            assert!(response.cvr_score >= 0.0);
        }
        // Display's CPFT rises 110%, which bottoms out efficiency
        assert_eq!(responses[2].efficiency_score, 0.0);
        assert_eq!(responses[2].cvr_score, 10.0);
        assert_eq!(responses[2].volume_score, 100.0);
    }

    #[test]
    fn missing_base_is_estimated_from_cpi() {
        let base = BaseMetrics {
            cpi: 100.0,
            cpa: None,
            cprt: None,
            cpft: None,
        };
        assert_eq!(base.value(Metric::Cpft), 850.0);
        let responses = simulate_network_response(&base, 0.0, Metric::Cpa);
        assert_eq!(responses[0].metric_base, 320.0);
        assert_eq!(responses[0].metric_delta, 0.0);
    }

    #[test]
    fn bid_increase_range_is_validated() {
        assert_eq!(validate_bid_increase(20.0).unwrap(), 20.0);
        assert!(validate_bid_increase(5.0).is_ok());
        assert!(validate_bid_increase(100.0).is_ok());
        assert!(validate_bid_increase(0.0).is_err());
        assert!(validate_bid_increase(22.5).is_err());
        assert!(matches!(
            validate_bid_increase(120.0),
            Err(SimError::InvalidBidIncrease(_))
        ));
        assert!(validate_bid_increase(f64::NAN).is_err());
    }

    #[test]
    fn timeline_base_prefers_latest_actuals() {
        let seed = seeds::default_seed();
        let timeline = crate::timeline::build_demo_timeline(seed, 5);
        let base = BaseMetrics::from_timeline(&timeline, seed);
        let latest = timeline[crate::timeline::HISTORY_WEEKS - 1].actual.as_ref().unwrap();
        assert_eq!(base.cpi, latest.cpi);
        assert_eq!(base.cpa, latest.cpa);

        assert_eq!(BaseMetrics::from_timeline(&[], seed), BaseMetrics::from_seed(seed));
    }
}
