use std::fmt;

use super::Environment;

/// What one environment step hands back to the learner
pub struct Snapshot<E: Environment + ?Sized> {
    pub state: E::StateType,
    pub reward: f64,
    pub done: bool,
}

impl<E: Environment + ?Sized> Snapshot<E> {
    pub fn new(state: E::StateType, reward: f64, done: bool) -> Self {
        Self {
            state,
            reward,
            done,
        }
    }
}

impl<E: Environment + ?Sized> fmt::Debug for Snapshot<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("state", &self.state)
            .field("reward", &self.reward)
            .field("done", &self.done)
            .finish()
    }
}
