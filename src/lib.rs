pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod gym;
pub mod history;
pub mod types;
pub mod utils;

pub use error::{GymError, Result};
