/// Ceiling for every normalized magnitude. Larger values saturate.
pub const MAX_PRICE: f64 = 1_000_000.;

pub mod env {
    pub const STARTING_CAPITAL: f64 = 100_000.;
    /// Static observations: cash
    pub const STATIC_OBSERVATIONS: usize = 1;
    /// position, open, close, high, low, volume
    pub const FIELDS_PER_TICKER: usize = 6;
    /// type selector, quantity selector
    pub const ACTIONS_PER_TICKER: usize = 2;
    pub const LOW: f64 = -1.;
    pub const HIGH: f64 = 1.;
}

pub mod files {
    pub const DATA_PATH: &str = ".training_data";
    pub const SESSION_EXTENSION: &str = "bin";
}

pub mod synthetic {
    pub const TICKERS: [&str; 3] = ["TSLA", "AAPL", "MSFT"];
    pub const SESSIONS: usize = 20;
    pub const BARS_PER_SESSION: usize = 390;
    pub const START_PRICE: f64 = 100.;
    /// Seconds between bars
    pub const BAR_SECONDS: i64 = 60;
}
