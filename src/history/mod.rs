pub mod episode_tickers_combined;
pub mod meta_tickers_combined;

pub use episode_tickers_combined::EpisodeHistory;
pub use meta_tickers_combined::MetaHistory;
