use ndarray::Array1;

use crate::{
    constants::env::{FIELDS_PER_TICKER, STATIC_OBSERVATIONS},
    gym::base::State,
    types::{Account, Bar, Session},
    utils::normalize,
};

pub type ObservationData = Array1<f32>;

/// Observation data to feed into the policy.
///
/// `[cash, (position, open, close, high, low, volume) per ticker]`, every
/// value normalized into `[-1, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationState {
    data: ObservationData,
}

impl ObservationState {
    pub fn size_for(ticker_count: usize) -> usize {
        STATIC_OBSERVATIONS + ticker_count * FIELDS_PER_TICKER
    }

    /// Encodes the account and the bars at `step`. Steps past the end of the
    /// session read the last bar; missing bars encode as zeros.
    pub fn new(account: &Account, session: &Session, step: usize) -> Self {
        let ticker_count = account.positions.len();
        let mut data = Vec::with_capacity(Self::size_for(ticker_count));

        data.push(normalize(account.cash) as f32);

        let bar_step = step.min(session.len().saturating_sub(1));
        for (ticker_index, position) in account.positions.iter().enumerate() {
            let bar = session
                .bar(ticker_index, bar_step)
                .copied()
                .unwrap_or_default();

            push_ticker(&mut data, position.quantity, &bar);
        }

        Self {
            data: Array1::from(data),
        }
    }

    /// Observation before any session is loaded: cash and positions only
    pub fn new_empty(account: &Account) -> Self {
        let mut data = Vec::with_capacity(Self::size_for(account.positions.len()));

        data.push(normalize(account.cash) as f32);
        for position in account.positions.iter() {
            push_ticker(&mut data, position.quantity, &Bar::default());
        }

        Self {
            data: Array1::from(data),
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        self.data.as_slice().unwrap_or(&[])
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.data.to_vec()
    }
}

fn push_ticker(data: &mut Vec<f32>, quantity: u64, bar: &Bar) {
    data.push(normalize(quantity as f64) as f32);
    data.push(normalize(bar.open) as f32);
    data.push(normalize(bar.close) as f32);
    data.push(normalize(bar.high) as f32);
    data.push(normalize(bar.low) as f32);
    data.push(normalize(bar.volume) as f32);
}

impl State for ObservationState {
    type Data = ObservationData;

    fn size(&self) -> usize {
        self.data.len()
    }

    fn data(&self) -> &Self::Data {
        &self.data
    }
}
