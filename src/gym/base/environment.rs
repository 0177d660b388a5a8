use crate::error::Result;

use super::{BoxSpace, Snapshot, State};

/// The reset/step cycle a learner drives
pub trait Environment {
    type ActionType;
    type StateType: State;

    /// Starts a new episode and returns its first observation
    fn reset(&mut self) -> Result<Self::StateType>;

    fn step(&mut self, action: Self::ActionType) -> Result<Snapshot<Self>>;

    fn state(&self) -> &Self::StateType;

    fn action_space(&self) -> BoxSpace;

    fn observation_space(&self) -> BoxSpace;

    /// Prints holdings and equity
    fn render(&self);
}
