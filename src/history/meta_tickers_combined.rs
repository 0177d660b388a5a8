use crate::history::episode_tickers_combined::EpisodeHistory;

/// Summary of every finished episode, in order
#[derive(Default, Debug, Clone)]
pub struct MetaHistory {
    pub final_assets: Vec<f64>,
    pub cumulative_reward: Vec<f64>,
    pub steps: Vec<usize>,
}

impl MetaHistory {
    pub fn record(&mut self, history: &EpisodeHistory) {
        let Some(final_assets) = history.final_assets() else {
            return;
        };

        self.final_assets.push(final_assets);
        self.cumulative_reward.push(history.cumulative_reward());
        self.steps.push(history.steps());
    }

    pub fn episodes(&self) -> usize {
        self.final_assets.len()
    }

    pub fn mean_final_assets(&self) -> Option<f64> {
        if self.final_assets.is_empty() {
            return None;
        }

        Some(self.final_assets.iter().sum::<f64>() / self.final_assets.len() as f64)
    }

    pub fn best_final_assets(&self) -> Option<f64> {
        self.final_assets.iter().copied().reduce(f64::max)
    }
}
