pub mod action;
pub mod action_continuous;
pub mod base;
pub mod check;
pub mod env;
pub mod obs_state;

pub use action::{TickerAction, TradeAction};
pub use action_continuous::ActionsContinuous;
pub use base::{Action, BoxSpace, Environment, Snapshot, State};
pub use check::check_env;
pub use env::{Env, EnvStatus};
pub use obs_state::ObservationState;
