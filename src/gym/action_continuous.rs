use rand::Rng;

use crate::{
    constants::{
        env::{ACTIONS_PER_TICKER, HIGH, LOW},
        MAX_PRICE,
    },
    error::{GymError, Result},
};

use super::{
    action::{TickerAction, TradeAction},
    base::Action,
};

/// Raw policy output: `[type, quantity]` per ticker, each in `[-1, 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct ActionsContinuous(pub Vec<f64>);

impl ActionsContinuous {
    pub fn new(values: Vec<f64>) -> Self {
        ActionsContinuous(values)
    }

    pub fn new_random<R: Rng + ?Sized>(rng: &mut R, size: usize) -> Self {
        Self::new_random_with_range(rng, size, LOW, HIGH)
    }

    pub fn new_random_with_range<R: Rng + ?Sized>(
        rng: &mut R,
        size: usize,
        min: f64,
        max: f64,
    ) -> Self {
        let values = (0..size).map(|_| rng.gen_range(min..=max)).collect();
        ActionsContinuous(values)
    }

    /// Inverse of [`ActionsContinuous::decode`], for scripted policies
    pub fn encode(actions: &[TickerAction]) -> Self {
        let type_count = TradeAction::size() as f64;

        let values = actions
            .iter()
            .flat_map(|ticker_action| {
                let index: usize = ticker_action.action.into();
                let type_selector = (index as f64 / type_count) * 2. - 1.;
                let quantity_selector = (ticker_action.quantity as f64 / MAX_PRICE) * 2. - 1.;

                [type_selector, quantity_selector.clamp(LOW, HIGH)]
            })
            .collect();

        ActionsContinuous(values)
    }

    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Decodes one [`TickerAction`] per ticker, in ticker order
    pub fn decode(&self, ticker_count: usize) -> Result<Vec<TickerAction>> {
        let expected = ticker_count * ACTIONS_PER_TICKER;
        if self.size() != expected {
            return Err(GymError::ActionSize {
                expected,
                actual: self.size(),
            });
        }

        Ok(self
            .0
            .chunks_exact(ACTIONS_PER_TICKER)
            .map(|pair| decode_pair(pair[0], pair[1]))
            .collect())
    }
}

/// Maps `[-1, 1]` onto `[0, 1]`. NaN reads as the low bound.
fn unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.;
    }

    (value.clamp(LOW, HIGH) + 1.) / 2.
}

fn decode_pair(type_selector: f64, quantity_selector: f64) -> TickerAction {
    let type_count = TradeAction::size();
    let index = (unit(type_selector) * type_count as f64).round() as usize;
    let action = TradeAction::from(index.min(type_count - 1));

    let quantity = (unit(quantity_selector) * MAX_PRICE).round() as u64;

    TickerAction::new(action, quantity)
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn decode_one(type_selector: f64, quantity_selector: f64) -> TickerAction {
        ActionsContinuous::new(vec![type_selector, quantity_selector])
            .decode(1)
            .unwrap()[0]
    }

    #[test]
    fn type_boundaries() {
        assert_eq!(decode_one(-1., -1.).action, TradeAction::Hold);
        assert_eq!(decode_one(-0.7, -1.).action, TradeAction::Hold);
        assert_eq!(decode_one(-0.6, -1.).action, TradeAction::Buy);
        assert_eq!(decode_one(-0.1, -1.).action, TradeAction::Buy);
        assert_eq!(decode_one(0., -1.).action, TradeAction::Sell);
        assert_eq!(decode_one(1., -1.).action, TradeAction::Sell);
    }

    #[test]
    fn quantity_scaling() {
        assert_eq!(decode_one(-1., -1.).quantity, 0);
        assert_eq!(decode_one(-1., 1.).quantity, MAX_PRICE as u64);
        assert_eq!(decode_one(-1., 0.).quantity, (MAX_PRICE / 2.) as u64);
    }

    #[test]
    fn exact_half_quantity_rounds_away_from_zero() {
        // (1 + x) / 2 == 2^-7 exactly, and 2^-7 * MAX_PRICE == 7812.5
        let selector = -1. + 2f64.powi(-6);

        assert_eq!(decode_one(-1., selector).quantity, 7_813);
    }

    #[test]
    fn out_of_range_saturates() {
        assert_eq!(decode_one(5., 9.), TickerAction::sell(MAX_PRICE as u64));
        assert_eq!(decode_one(-5., -9.), TickerAction::hold());
        assert_eq!(decode_one(f64::NAN, f64::NAN), TickerAction::hold());
    }

    #[test]
    fn encode_decode_scripted_actions() {
        let actions = vec![
            TickerAction::buy(500),
            TickerAction::sell(123_456),
            TickerAction::hold(),
        ];

        assert_eq!(ActionsContinuous::encode(&actions).decode(3).unwrap(), actions);
    }

    #[test]
    fn wrong_length_is_rejected() {
        let actions = ActionsContinuous::new(vec![0.; 3]);

        assert!(matches!(
            actions.decode(2),
            Err(GymError::ActionSize { expected: 4, actual: 3 })
        ));
    }

    #[test]
    fn random_actions_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        let actions = ActionsContinuous::new_random(&mut rng, 10);

        assert_eq!(actions.size(), 10);
        assert!(actions.0.iter().all(|value| (LOW..=HIGH).contains(value)));
    }
}
