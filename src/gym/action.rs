use enum_map::Enum;
use serde::{Deserialize, Serialize};

use super::base::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum TradeAction {
    Hold,
    Buy,
    Sell,
}

impl From<usize> for TradeAction {
    /// Out of range indexes saturate to the last variant
    fn from(value: usize) -> Self {
        match value {
            0 => TradeAction::Hold,
            1 => TradeAction::Buy,
            _ => TradeAction::Sell,
        }
    }
}

impl From<TradeAction> for usize {
    fn from(value: TradeAction) -> Self {
        match value {
            TradeAction::Hold => 0,
            TradeAction::Buy => 1,
            TradeAction::Sell => 2,
        }
    }
}

impl Action for TradeAction {
    fn enumerate() -> Vec<Self> {
        vec![TradeAction::Hold, TradeAction::Buy, TradeAction::Sell]
    }
}

/// The decoded intent for one ticker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerAction {
    pub action: TradeAction,
    pub quantity: u64,
}

impl TickerAction {
    pub fn new(action: TradeAction, quantity: u64) -> Self {
        Self { action, quantity }
    }

    pub fn hold() -> Self {
        Self::new(TradeAction::Hold, 0)
    }

    pub fn buy(quantity: u64) -> Self {
        Self::new(TradeAction::Buy, quantity)
    }

    pub fn sell(quantity: u64) -> Self {
        Self::new(TradeAction::Sell, quantity)
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn index_round_trip() {
        for action in TradeAction::enumerate() {
            assert_eq!(TradeAction::from(usize::from(action)), action);
        }
        assert_eq!(TradeAction::size(), 3);
        assert_eq!(TradeAction::from(7), TradeAction::Sell);
    }

    #[test]
    fn random_covers_every_variant() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = enum_map::EnumMap::<TradeAction, bool>::default();

        for _ in 0..100 {
            seen[TradeAction::random(&mut rng)] = true;
        }

        assert!(seen.values().all(|seen| *seen));
    }
}
