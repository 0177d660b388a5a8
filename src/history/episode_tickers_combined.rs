use enum_map::EnumMap;
use hashbrown::HashMap;

use crate::{gym::action::TradeAction, types::Account};

/// Per-step record of one episode across all tickers
#[derive(Debug, Clone, Default)]
pub struct EpisodeHistory {
    /// step -> (price, quantity) per ticker
    pub buys: Vec<HashMap<usize, (f64, u64)>>,
    pub sells: Vec<HashMap<usize, (f64, u64)>>,
    pub positioned: Vec<Vec<f64>>,
    pub cash: Vec<f64>,
    pub rewards: Vec<f64>,
    /// Orders per decoded action, filled or not
    pub trades: EnumMap<TradeAction, usize>,
    /// Buys and sells that filled no shares
    pub unfilled: usize,
    pub forced_liquidations: usize,
}

impl EpisodeHistory {
    pub fn new(ticker_count: usize) -> Self {
        EpisodeHistory {
            buys: vec![HashMap::new(); ticker_count],
            sells: vec![HashMap::new(); ticker_count],
            positioned: vec![vec![]; ticker_count],
            cash: Vec::new(),
            rewards: Vec::new(),
            trades: EnumMap::default(),
            unfilled: 0,
            forced_liquidations: 0,
        }
    }

    /// Records an order and, when shares changed hands, its fill
    pub fn record_trade(
        &mut self,
        ticker_index: usize,
        step: usize,
        action: TradeAction,
        price: f64,
        quantity: u64,
    ) {
        self.trades[action] += 1;

        if quantity == 0 {
            if action != TradeAction::Hold {
                self.unfilled += 1;
            }
            return;
        }

        let fills = match action {
            TradeAction::Buy => &mut self.buys,
            TradeAction::Sell => &mut self.sells,
            TradeAction::Hold => return,
        };
        if let Some(fills) = fills.get_mut(ticker_index) {
            fills.insert(step, (price, quantity));
        }
    }

    pub fn record_step(&mut self, account: &Account, prices: &[f64], reward: f64) {
        for (positioned, value) in self
            .positioned
            .iter_mut()
            .zip(account.position_values(prices))
        {
            positioned.push(value);
        }
        self.cash.push(account.cash);
        self.rewards.push(reward);
    }

    pub fn steps(&self) -> usize {
        self.cash.len()
    }

    pub fn total_assets(&self) -> Vec<f64> {
        self.cash
            .iter()
            .enumerate()
            .map(|(step, cash)| {
                cash + self
                    .positioned
                    .iter()
                    .filter_map(|positioned| positioned.get(step))
                    .sum::<f64>()
            })
            .collect()
    }

    pub fn final_assets(&self) -> Option<f64> {
        self.total_assets().last().copied()
    }

    pub fn cumulative_reward(&self) -> f64 {
        self.rewards.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_fills_and_equity() {
        let mut history = EpisodeHistory::new(2);
        let mut account = Account::new(1_000., 2);

        account.buy(0, 10., 5);
        history.record_trade(0, 0, TradeAction::Buy, 10., 5);
        history.record_trade(1, 0, TradeAction::Sell, 20., 0);
        history.record_step(&account, &[12., 20.], 10.);

        assert_eq!(history.buys[0].get(&0), Some(&(10., 5)));
        assert!(history.sells[1].is_empty());
        assert_eq!(history.trades[TradeAction::Buy], 1);
        assert_eq!(history.trades[TradeAction::Sell], 1);
        assert_eq!(history.trades[TradeAction::Hold], 0);
        assert_eq!(history.unfilled, 1);
        assert_eq!(history.steps(), 1);
        assert_eq!(history.final_assets(), Some(1_010.));
        assert_eq!(history.cumulative_reward(), 10.);
    }

    #[test]
    fn holds_are_not_unfilled_orders() {
        let mut history = EpisodeHistory::new(1);

        history.record_trade(0, 0, TradeAction::Hold, 10., 0);
        history.record_trade(0, 1, TradeAction::Buy, 10., 0);

        assert_eq!(history.trades[TradeAction::Hold], 1);
        assert_eq!(history.trades[TradeAction::Buy], 1);
        assert_eq!(history.unfilled, 1);
        assert!(history.buys[0].is_empty());
    }

    #[test]
    fn empty_history_has_no_final_assets() {
        assert_eq!(EpisodeHistory::new(1).final_assets(), None);
    }
}
