use crate::error::{Result, SimError};
use crate::models::CampaignSeed;

pub static CAMPAIGN_SEEDS: [CampaignSeed; 5] = [
    CampaignSeed {
        id: "all",
        name: "All Campaigns",
        base_cpi: 342.0,
        base_cpa: 1093.0,
        base_cprt: 717.0,
        base_cpft: 2914.0,
        base_cvr: 0.082,
        budget: 200200.0,
        target_cpi: 317.0,
        target_cpa: 1002.0,
        target_cprt: 626.0,
        target_cpft: 2505.0,
    },
    CampaignSeed {
        id: "c1",
        name: "iOS – Metro India",
        base_cpi: 434.0,
        base_cpa: 1385.0,
        base_cprt: 910.0,
        base_cpft: 3691.0,
        base_cvr: 0.091,
        budget: 75150.0,
        target_cpi: 376.0,
        target_cpa: 1169.0,
        target_cprt: 752.0,
        target_cpft: 3173.0,
    },
    CampaignSeed {
        id: "c2",
        name: "Android – Tier 2",
        base_cpi: 234.0,
        base_cpa: 751.0,
        base_cprt: 492.0,
        base_cpft: 1987.0,
        base_cvr: 0.071,
        budget: 58450.0,
        target_cpi: 209.0,
        target_cpa: 668.0,
        target_cprt: 418.0,
        target_cpft: 1670.0,
    },
    CampaignSeed {
        id: "c3",
        name: "iOS – Premium",
        base_cpi: 384.0,
        base_cpa: 1227.0,
        base_cprt: 810.0,
        base_cpft: 3265.0,
        base_cvr: 0.085,
        budget: 41750.0,
        target_cpi: 334.0,
        target_cpa: 1044.0,
        target_cprt: 668.0,
        target_cpft: 2756.0,
    },
    CampaignSeed {
        id: "c4",
        name: "Android – Bharat",
        base_cpi: 159.0,
        base_cpa: 509.0,
        base_cprt: 334.0,
        base_cpft: 1353.0,
        base_cvr: 0.068,
        budget: 25050.0,
        target_cpi: 142.0,
        target_cpa: 459.0,
        target_cprt: 292.0,
        target_cpft: 1169.0,
    },
];

pub fn default_seed() -> &'static CampaignSeed {
    &CAMPAIGN_SEEDS[0]
}

pub fn find(id: &str) -> Result<&'static CampaignSeed> {
    CAMPAIGN_SEEDS
        .iter()
        .find(|seed| seed.id == id)
        .ok_or_else(|| SimError::UnknownCampaign(id.to_string()))
}

/// Resolves an optional campaign id, falling back to the aggregate seed.
pub fn resolve(id: Option<&str>) -> Result<&'static CampaignSeed> {
    match id.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => find(value),
        None => Ok(default_seed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_seed_is_default() {
        assert_eq!(resolve(None).unwrap().id, "all");
        assert_eq!(resolve(Some("  ")).unwrap().id, "all");
    }

    #[test]
    fn unknown_campaign_is_an_error() {
        assert!(matches!(find("c9"), Err(SimError::UnknownCampaign(id)) if id == "c9"));
    }

    #[test]
    fn seed_targets_sit_below_bases() {
        for seed in CAMPAIGN_SEEDS.iter() {
            assert!(seed.target_cpi < seed.base_cpi, "{}", seed.id);
            assert!(seed.target_cpft < seed.base_cpft, "{}", seed.id);
        }
    }
}
