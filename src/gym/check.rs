use rand::Rng;

use crate::{
    error::{GymError, Result},
    gym::{
        action_continuous::ActionsContinuous,
        base::{Environment, State},
        obs_state::ObservationState,
    },
};

/// Drives `env` with random actions for `steps` steps, resetting whenever an
/// episode ends, and checks every observation and reward a learner would see.
///
/// Consumes sessions, so run it on a training environment rather than one in
/// playback mode.
pub fn check_env<E, R>(env: &mut E, rng: &mut R, steps: usize) -> Result<()>
where
    E: Environment<ActionType = ActionsContinuous, StateType = ObservationState>,
    R: Rng + ?Sized,
{
    let action_space = env.action_space();
    let observation_space = env.observation_space();

    if action_space.size == 0 || observation_space.size == 0 {
        return Err(GymError::InvalidEnv("empty action or observation space".into()));
    }
    if !(action_space.low < action_space.high && observation_space.low < observation_space.high) {
        return Err(GymError::InvalidEnv("space bounds are inverted".into()));
    }

    let observation = env.reset()?;
    check_observation(&observation, observation_space.size, "reset", |values| {
        observation_space.contains(values)
    })?;

    for step in 0..steps {
        let action = ActionsContinuous::new_random_with_range(
            rng,
            action_space.size,
            action_space.low,
            action_space.high,
        );
        let snapshot = env.step(action)?;

        check_observation(&snapshot.state, observation_space.size, "step", |values| {
            observation_space.contains(values)
        })?;

        if !snapshot.reward.is_finite() {
            return Err(GymError::InvalidEnv(format!(
                "reward {} at step {step} is not finite",
                snapshot.reward
            )));
        }

        if snapshot.done {
            env.reset()?;
        }
    }

    Ok(())
}

fn check_observation(
    observation: &ObservationState,
    expected: usize,
    stage: &str,
    in_space: impl Fn(Vec<f32>) -> bool,
) -> Result<()> {
    if observation.size() != expected {
        return Err(GymError::InvalidEnv(format!(
            "{stage} observation has {} values, expected {expected}",
            observation.size()
        )));
    }

    if !in_space(observation.to_vec()) {
        return Err(GymError::InvalidEnv(format!(
            "{stage} observation leaves the observation space"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{
        config::EnvConfig,
        constants::synthetic::TICKERS,
        data::{synthetic::random_walk_sessions, HistoricalData},
        gym::env::Env,
    };

    #[test]
    fn synthetic_env_passes() {
        let mut rng = StdRng::seed_from_u64(8);
        let files = random_walk_sessions(&mut rng, &TICKERS, 4, 30);
        let data = Arc::new(HistoricalData::from_files(files).unwrap());
        let mut env = Env::new(data, EnvConfig::default(), StdRng::seed_from_u64(9)).unwrap();

        check_env(&mut env, &mut rng, 200).unwrap();
    }
}
