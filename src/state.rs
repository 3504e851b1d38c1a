use crate::config::Config;
use crate::error::Result;
use crate::models::{CampaignSeed, TargetOverrides, UploadedRow, WeeklyRecord};
use crate::timeline::{build_demo_timeline, build_timeline};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

/// In-memory inputs of the dashboard. Nothing here outlives the process.
#[derive(Debug, Default)]
pub struct Session {
    pub upload: Option<Vec<UploadedRow>>,
    pub targets: TargetOverrides,
    demo_timelines: HashMap<(&'static str, u32), Vec<WeeklyRecord>>,
}

impl Session {
    /// The timeline for the current inputs: the upload when there is one,
    /// otherwise the synthetic timeline for `seed`, generated once per
    /// seed and start month so repeated views stay stable.
    pub fn timeline(&mut self, seed: &'static CampaignSeed, start_month: u32) -> Result<Vec<WeeklyRecord>> {
        if let Some(rows) = &self.upload {
            return build_timeline(rows, &self.targets);
        }

        let timeline = self
            .demo_timelines
            .entry((seed.id, start_month % 12))
            .or_insert_with(|| build_demo_timeline(seed, start_month));
        Ok(timeline.clone())
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub session: Arc<Mutex<Session>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session: Arc::new(Mutex::new(Session::default())),
        }
    }
}
