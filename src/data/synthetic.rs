use rand::Rng;

use crate::{
    constants::synthetic::{BAR_SECONDS, START_PRICE},
    data::historical::SessionFile,
    types::Bar,
};

/// Generates aligned random-walk sessions, one bar series per ticker.
///
/// Prices drift upwards slightly and never fall below 1.
pub fn random_walk_sessions<R: Rng + ?Sized>(
    rng: &mut R,
    tickers: &[&str],
    sessions: usize,
    bars_per_session: usize,
) -> Vec<SessionFile> {
    let mut last_closes = vec![START_PRICE; tickers.len()];

    (0..sessions)
        .map(|session_index| {
            let start = session_index as i64 * 86_400;
            let tickers = tickers
                .iter()
                .zip(last_closes.iter_mut())
                .map(|(ticker, last_close)| {
                    let bars = random_walk(rng, last_close, start, bars_per_session);
                    (ticker.to_string(), bars)
                })
                .collect();

            SessionFile { tickers }
        })
        .collect()
}

fn random_walk<R: Rng + ?Sized>(
    rng: &mut R,
    last_close: &mut f64,
    start: i64,
    len: usize,
) -> Vec<Bar> {
    let mut bars = Vec::with_capacity(len);

    for step in 0..len {
        let open = *last_close;
        let close = (open * (1. + rng.gen_range(-0.01..0.012))).max(1.);
        let high = open.max(close) * (1. + rng.gen_range(0.0..0.003));
        let low = (open.min(close) * (1. - rng.gen_range(0.0..0.003))).max(1.);

        bars.push(Bar {
            open,
            high,
            low,
            close,
            volume: rng.gen_range(1_000.0..50_000.0_f64).round(),
            timestamp: start + step as i64 * BAR_SECONDS,
        });

        *last_close = close;
    }

    bars
}
