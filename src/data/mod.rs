pub mod historical;
pub mod synthetic;

pub use historical::{save_session, HistoricalData, NextSession, Playback, SessionFile};
