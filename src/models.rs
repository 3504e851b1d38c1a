use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Cpi,
    Cpa,
    Cprt,
    Cpft,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::Cpi, Metric::Cpa, Metric::Cprt, Metric::Cpft];

    pub fn key(self) -> &'static str {
        match self {
            Metric::Cpi => "cpi",
            Metric::Cpa => "cpa",
            Metric::Cprt => "cprt",
            Metric::Cpft => "cpft",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Cpi => "CPI",
            Metric::Cpa => "CPA",
            Metric::Cprt => "CPRT",
            Metric::Cpft => "CPFT",
        }
    }

    pub fn full_name(self) -> &'static str {
        match self {
            Metric::Cpi => "Cost Per Install",
            Metric::Cpa => "Cost Per Action",
            Metric::Cprt => "Cost Per Reactivation",
            Metric::Cpft => "Cost Per First Transaction",
        }
    }

    /// Typical cost of this metric relative to CPI.
    pub fn base_multiplier(self) -> f64 {
        match self {
            Metric::Cpi => 1.0,
            Metric::Cpa => 3.2,
            Metric::Cprt => 2.1,
            Metric::Cpft => 8.5,
        }
    }

    /// Share of installs that go on to produce this metric's event.
    pub fn post_install_rate(self) -> f64 {
        match self {
            Metric::Cpi => 1.0,
            Metric::Cpa => 0.31,
            Metric::Cprt => 0.47,
            Metric::Cpft => 0.12,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Metric {
    type Err = SimError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cpi" => Ok(Metric::Cpi),
            "cpa" => Ok(Metric::Cpa),
            "cprt" => Ok(Metric::Cprt),
            "cpft" => Ok(Metric::Cpft),
            _ => Err(SimError::UnknownMetric(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Historical,
    Forecast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BidAction {
    #[serde(rename = "Scale Up")]
    ScaleUp,
    Hold,
    #[serde(rename = "Scale Down")]
    ScaleDown,
}

impl BidAction {
    /// Compares a projected cost with its target inside a ±10% dead-band.
    /// Values sitting exactly on either edge of the band resolve to `Hold`.
    pub fn decide(projected: f64, target: f64) -> Self {
        if projected < target * 0.90 {
            BidAction::ScaleUp
        } else if projected > target * 1.10 {
            BidAction::ScaleDown
        } else {
            BidAction::Hold
        }
    }
}

impl fmt::Display for BidAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BidAction::ScaleUp => "Scale Up",
            BidAction::Hold => "Hold",
            BidAction::ScaleDown => "Scale Down",
        };
        f.write_str(label)
    }
}

/// Observed values for a historical week.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Actuals {
    pub cpi: f64,
    pub cpa: Option<f64>,
    pub cprt: Option<f64>,
    pub cpft: Option<f64>,
    pub installs: u64,
    pub actions: Option<u64>,
    pub reactivations: Option<u64>,
    pub first_transactions: Option<u64>,
    pub spend: f64,
    pub cvr: f64,
    pub ctr: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub budget: Option<f64>,
    pub network: Option<String>,
}

impl Actuals {
    pub fn cost(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Cpi => Some(self.cpi),
            Metric::Cpa => self.cpa,
            Metric::Cprt => self.cprt,
            Metric::Cpft => self.cpft,
        }
    }

    pub fn events(&self, metric: Metric) -> Option<u64> {
        match metric {
            Metric::Cpi => Some(self.installs),
            Metric::Cpa => self.actions,
            Metric::Cprt => self.reactivations,
            Metric::Cpft => self.first_transactions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricProjection {
    pub optimistic: f64,
    pub pessimistic: f64,
    pub baseline: f64,
}

/// Projected values and recommendations for a forecast week.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub cpi: MetricProjection,
    pub cpa: Option<MetricProjection>,
    pub cprt: Option<MetricProjection>,
    pub cpft: Option<MetricProjection>,
    pub installs_optimistic: u64,
    pub installs_pessimistic: u64,
    pub spend: f64,
    pub rec_bid: f64,
    pub rec_budget: f64,
    pub bid_action: BidAction,
}

impl Projection {
    pub fn metric(&self, metric: Metric) -> Option<&MetricProjection> {
        match metric {
            Metric::Cpi => Some(&self.cpi),
            Metric::Cpa => self.cpa.as_ref(),
            Metric::Cprt => self.cprt.as_ref(),
            Metric::Cpft => self.cpft.as_ref(),
        }
    }
}

/// One calendar week of the timeline. Exactly one of `actual` and `forecast`
/// is populated, matching `phase`; build records through the constructors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyRecord {
    pub label: String,
    pub week_num: i32,
    pub phase: Phase,
    pub month: String,
    pub season: f64,
    pub actual: Option<Actuals>,
    pub forecast: Option<Projection>,
}

impl WeeklyRecord {
    pub fn historical(label: String, week_num: i32, month: String, season: f64, actual: Actuals) -> Self {
        Self {
            label,
            week_num,
            phase: Phase::Historical,
            month,
            season,
            actual: Some(actual),
            forecast: None,
        }
    }

    pub fn projected(label: String, week_num: i32, month: String, season: f64, forecast: Projection) -> Self {
        Self {
            label,
            week_num,
            phase: Phase::Forecast,
            month,
            season,
            actual: None,
            forecast: Some(forecast),
        }
    }
}

/// A data row accepted from an uploaded CSV. Required counters default to 0,
/// optional columns stay `None` when missing or unparseable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedRow {
    pub week: String,
    pub campaign: Option<String>,
    pub impressions: u64,
    pub clicks: u64,
    pub installs: u64,
    pub spend: f64,
    pub cpi: Option<f64>,
    pub cvr: f64,
    pub ctr: f64,
    pub budget: Option<f64>,
    pub network: Option<String>,
    pub actions: Option<u64>,
    pub reactivations: Option<u64>,
    pub first_transactions: Option<u64>,
    pub target_cpi: Option<f64>,
    pub target_cpa: Option<f64>,
    pub target_cprt: Option<f64>,
    pub target_cpft: Option<f64>,
    pub cpa: Option<f64>,
    pub cprt: Option<f64>,
    pub cpft: Option<f64>,
}

impl UploadedRow {
    pub fn cost(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Cpi => self.cpi,
            Metric::Cpa => self.cpa,
            Metric::Cprt => self.cprt,
            Metric::Cpft => self.cpft,
        }
    }

    pub fn target(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Cpi => self.target_cpi,
            Metric::Cpa => self.target_cpa,
            Metric::Cprt => self.target_cprt,
            Metric::Cpft => self.target_cpft,
        }
    }
}

/// Baseline economics for a campaign or campaign group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSeed {
    pub id: &'static str,
    pub name: &'static str,
    pub base_cpi: f64,
    pub base_cpa: f64,
    pub base_cprt: f64,
    pub base_cpft: f64,
    pub base_cvr: f64,
    pub budget: f64,
    pub target_cpi: f64,
    pub target_cpa: f64,
    pub target_cprt: f64,
    pub target_cpft: f64,
}

impl CampaignSeed {
    pub fn base(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Cpi => self.base_cpi,
            Metric::Cpa => self.base_cpa,
            Metric::Cprt => self.base_cprt,
            Metric::Cpft => self.base_cpft,
        }
    }

    pub fn target(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Cpi => self.target_cpi,
            Metric::Cpa => self.target_cpa,
            Metric::Cprt => self.target_cprt,
            Metric::Cpft => self.target_cpft,
        }
    }
}

/// User-supplied targets. `None` means "use the uploaded or fallback target".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetOverrides {
    pub cpi: Option<f64>,
    pub cpa: Option<f64>,
    pub cprt: Option<f64>,
    pub cpft: Option<f64>,
}

impl TargetOverrides {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Cpi => self.cpi,
            Metric::Cpa => self.cpa,
            Metric::Cprt => self.cprt,
            Metric::Cpft => self.cpft,
        }
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        for metric in Metric::ALL {
            if let Some(value) = self.get(metric) {
                if !value.is_finite() || value <= 0.0 {
                    return Err(SimError::InvalidTarget {
                        metric: metric.key(),
                        value,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bid_action_band_edges_hold() {
        let target = 317.0;
        assert_eq!(BidAction::decide(target * 0.90, target), BidAction::Hold);
        assert_eq!(BidAction::decide(target * 1.10, target), BidAction::Hold);
        assert_eq!(BidAction::decide(target, target), BidAction::Hold);
    }

    #[test]
    fn bid_action_outside_band() {
        assert_eq!(BidAction::decide(89.0, 100.0), BidAction::ScaleUp);
        assert_eq!(BidAction::decide(111.0, 100.0), BidAction::ScaleDown);
    }

    #[test]
    fn metric_parses_case_insensitively() {
        assert_eq!("CPRT".parse::<Metric>().unwrap(), Metric::Cprt);
        assert!(matches!(
            "roas".parse::<Metric>(),
            Err(SimError::UnknownMetric(_))
        ));
    }

    #[test]
    fn overrides_reject_non_positive_targets() {
        let targets = TargetOverrides {
            cpa: Some(0.0),
            ..Default::default()
        };
        assert!(matches!(
            targets.validate(),
            Err(SimError::InvalidTarget { metric: "cpa", .. })
        ));
        assert!(TargetOverrides::default().validate().is_ok());
    }

    #[test]
    fn forecast_record_serializes_null_actuals() {
        let record = WeeklyRecord::projected(
            "W1".to_string(),
            1,
            "Jun".to_string(),
            1.05,
            Projection {
                cpi: MetricProjection {
                    optimistic: 300.0,
                    pessimistic: 354.0,
                    baseline: 320.0,
                },
                cpa: None,
                cprt: None,
                cpft: None,
                installs_optimistic: 10,
                installs_pessimistic: 8,
                spend: 3000.0,
                rec_bid: 301.0,
                rec_budget: 1000.0,
                bid_action: BidAction::Hold,
            },
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["phase"], "forecast");
        assert!(json["actual"].is_null());
        assert_eq!(json["weekNum"], 1);
        assert_eq!(json["forecast"]["bidAction"], "Hold");
        assert_eq!(json["forecast"]["recBid"], 301.0);
    }
}
