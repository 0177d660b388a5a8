use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    error::{GymError, Result},
    utils::round_to_stock,
};

/// One time step of price data for a single ticker
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Unix seconds
    pub timestamp: i64,
}

impl Bar {
    pub fn date(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(self.timestamp).ok()
    }
}

/// Aligned bars for one episode, indexed `[ticker_index][step]`.
///
/// Ticker order is the order of the accessor's ticker list. A ticker with no
/// bars is unavailable for the whole session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    bars: Vec<Vec<Bar>>,
    len: usize,
}

impl Session {
    pub fn new(mut bars: Vec<Vec<Bar>>) -> Result<Self> {
        let len = bars
            .iter()
            .filter(|ticker_bars| !ticker_bars.is_empty())
            .map(|ticker_bars| ticker_bars.len())
            .min()
            .ok_or(GymError::EmptySession)?;

        for ticker_bars in bars.iter_mut() {
            ticker_bars.truncate(len);
        }

        Ok(Self { bars, len })
    }

    /// Steps in the session, the shortest present ticker
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn ticker_count(&self) -> usize {
        self.bars.len()
    }

    pub fn bar(&self, ticker_index: usize, step: usize) -> Option<&Bar> {
        self.bars.get(ticker_index)?.get(step)
    }

    /// Close price at a step, `None` when the bar is missing
    pub fn price(&self, ticker_index: usize, step: usize) -> Option<f64> {
        self.bar(ticker_index, step).map(|bar| bar.close)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub quantity: u64,
    pub avg_price: f64,
}

impl Position {
    pub fn add(&mut self, price: f64, quantity: u64) {
        if quantity == 0 {
            return;
        }

        let total = self.quantity + quantity;
        self.avg_price =
            (self.avg_price * self.quantity as f64 + price * quantity as f64) / total as f64;
        self.quantity = total;
    }

    pub fn remove(&mut self, quantity: u64) {
        self.quantity -= quantity.min(self.quantity);
        if self.quantity == 0 {
            self.avg_price = 0.;
        }
    }

    pub fn value_with_price(&self, price: f64) -> f64 {
        self.quantity as f64 * price
    }

    /// Unrealized return relative to the average entry price
    pub fn appreciation(&self, price: f64) -> f64 {
        if self.quantity == 0 || self.avg_price <= 0. {
            return 0.;
        }

        (price - self.avg_price) / self.avg_price
    }
}

/// Cash plus whole-share positions, one per ticker index.
///
/// Trades never fail: an impossible request fills as much as is physically
/// possible, which may be nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub cash: f64,
    pub positions: Vec<Position>,
}

impl Account {
    pub fn new(cash: f64, ticker_count: usize) -> Self {
        Self {
            cash: if cash.is_finite() { cash.max(0.) } else { 0. },
            positions: vec![Position::default(); ticker_count],
        }
    }

    /// Buys up to `desired` shares, limited by cash. Returns the filled quantity.
    pub fn buy(&mut self, ticker_index: usize, price: f64, desired: u64) -> u64 {
        let Some(position) = self.positions.get_mut(ticker_index) else {
            return 0;
        };

        let (_, affordable) = round_to_stock(price, self.cash);
        let quantity = desired.min(affordable);
        if quantity == 0 {
            return 0;
        }

        self.cash = (self.cash - price * quantity as f64).max(0.);
        position.add(price, quantity);

        quantity
    }

    /// Sells up to `desired` shares, limited by the held position. Returns the filled quantity.
    pub fn sell(&mut self, ticker_index: usize, price: f64, desired: u64) -> u64 {
        let Some(position) = self.positions.get_mut(ticker_index) else {
            return 0;
        };

        let quantity = desired.min(position.quantity);
        if quantity == 0 {
            return 0;
        }

        let price = if price.is_finite() { price.max(0.) } else { 0. };
        self.cash += price * quantity as f64;
        position.remove(quantity);

        quantity
    }

    pub fn quantity(&self, ticker_index: usize) -> u64 {
        self.positions
            .get(ticker_index)
            .map(|position| position.quantity)
            .unwrap_or(0)
    }

    pub fn position_values(&self, prices: &[f64]) -> Vec<f64> {
        self.positions
            .iter()
            .zip(prices.iter())
            .map(|(position, price)| position.value_with_price(*price))
            .collect()
    }

    /// Cash plus every position marked at `prices`
    pub fn total_assets(&self, prices: &[f64]) -> f64 {
        self.cash + self.position_values(prices).iter().sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    fn flat_bars(price: f64, len: usize) -> Vec<Bar> {
        (0..len)
            .map(|step| Bar {
                open: price,
                high: price,
                low: price,
                close: price,
                volume: 1_000.,
                timestamp: step as i64 * 60,
            })
            .collect()
    }

    #[test]
    fn session_length_is_shortest_present_ticker() {
        let session = Session::new(vec![flat_bars(10., 5), flat_bars(20., 3), vec![]]).unwrap();

        assert_eq!(session.len(), 3);
        assert_eq!(session.ticker_count(), 3);
        assert_eq!(session.price(0, 2), Some(10.));
        assert_eq!(session.price(0, 3), None);
        assert_eq!(session.price(2, 0), None);
    }

    #[test]
    fn session_without_bars_is_rejected() {
        assert!(matches!(
            Session::new(vec![vec![], vec![]]),
            Err(GymError::EmptySession)
        ));
    }

    #[test]
    fn buy_limited_by_cash() {
        let mut account = Account::new(1_050., 1);

        assert_eq!(account.buy(0, 100., 50), 10);
        assert_eq!(account.quantity(0), 10);
        assert!((account.cash - 50.).abs() < 1e-9);
    }

    #[test]
    fn buy_ignores_bad_prices() {
        let mut account = Account::new(1_000., 1);

        assert_eq!(account.buy(0, 0., 5), 0);
        assert_eq!(account.buy(0, -10., 5), 0);
        assert_eq!(account.buy(0, f64::NAN, 5), 0);
        assert_eq!(account.buy(3, 10., 5), 0);
        assert_eq!(account.cash, 1_000.);
    }

    #[test]
    fn sell_limited_by_position() {
        let mut account = Account::new(1_000., 1);
        account.buy(0, 100., 5);

        assert_eq!(account.sell(0, 120., 50), 5);
        assert_eq!(account.quantity(0), 0);
        assert!((account.cash - 1_100.).abs() < 1e-9);
        assert_eq!(account.sell(0, 120., 50), 0);
    }

    #[test]
    fn random_trades_stay_physical() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut account = Account::new(100_000., 2);

        for _ in 0..5_000 {
            let ticker_index = rng.gen_range(0..2);
            let price = rng.gen_range(-10.0..5_000.0);
            let desired = rng.gen_range(0..10_000_000u64);

            if rng.gen_bool(0.5) {
                account.buy(ticker_index, price, desired);
            } else {
                account.sell(ticker_index, price.abs(), desired);
            }

            assert!(account.cash >= 0.);
        }
    }

    #[test]
    fn average_price_tracks_entries() {
        let mut position = Position::default();
        position.add(10., 10);
        position.add(20., 10);

        assert_eq!(position.avg_price, 15.);
        assert_eq!(position.appreciation(30.), 1.);

        position.remove(20);
        assert_eq!(position, Position::default());
    }
}
