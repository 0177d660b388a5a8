use thiserror::Error;

/// Errors surfaced by the trading environment and its data accessor
#[derive(Error, Debug)]
pub enum GymError {
    #[error("no market data available")]
    NoDataAvailable,

    /// Playback ran out of sessions. Callers should stop evaluating.
    #[error("evaluation sessions exhausted")]
    EvaluationExhausted,

    #[error("step called on a terminal session, reset first")]
    StepAfterTerminal,

    #[error("step called before the first reset")]
    NotReset,

    #[error("action vector has {actual} values, expected {expected}")]
    ActionSize { expected: usize, actual: usize },

    #[error("session has no bars for any ticker")]
    EmptySession,

    #[error("environment check failed: {0}")]
    InvalidEnv(String),

    #[error("session covers {actual} tickers, data set has {expected}")]
    TickerCountMismatch { expected: usize, actual: usize },

    #[error("unknown ticker: {0}")]
    UnknownTicker(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session decode error: {0}")]
    Decode(#[from] postcard::Error),
}

pub type Result<T> = std::result::Result<T, GymError>;
