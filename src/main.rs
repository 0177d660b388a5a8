use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{arg, value_parser, Command};
use rand::{rngs::StdRng, SeedableRng};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use okwsb_gym::{
    config::{EnvConfig, EnvMode},
    constants::{
        env::STARTING_CAPITAL,
        files::DATA_PATH,
        synthetic::{BARS_PER_SESSION, SESSIONS, TICKERS},
    },
    data::{save_session, synthetic::random_walk_sessions, HistoricalData},
    gym::{check_env, ActionsContinuous, Env, Environment},
    GymError,
};

const MODE_TRAIN: &str = "train";
const MODE_TEST: &str = "test";
const MODE_GENERATE: &str = "generate";

/// Random steps used to validate the environment before running it
const CHECK_STEPS: usize = 100;

fn cli() -> Command {
    Command::new("okwsb_gym")
        .about("Multi-asset trading environment for reinforcement learning")
        .arg(
            arg!(--mode <MODE> "The mode to run in")
                .value_parser([MODE_TRAIN, MODE_TEST, MODE_GENERATE])
                .required(true),
        )
        .arg(
            arg!(--starting_capital <CAPITAL> "How much capital each session starts with")
                .value_parser(value_parser!(f64))
                .default_value("100000"),
        )
        .arg(
            arg!(--training_timesteps <STEPS> "How many timesteps to roll out in training")
                .value_parser(value_parser!(usize))
                .default_value("100000"),
        )
        .arg(
            arg!(--test_episodes <EPISODES> "How many sessions to play back in test mode")
                .value_parser(value_parser!(usize))
                .default_value("100"),
        )
        .arg(arg!(--data_folder <FOLDER> "The folder holding session files").default_value(DATA_PATH))
        .arg(arg!(--seed <SEED> "Seed for every random source").value_parser(value_parser!(u64)))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("okwsb_gym=info")),
        )
        .init();

    let matches = cli().get_matches();

    let mode = matches
        .get_one::<String>("mode")
        .map(String::as_str)
        .unwrap_or(MODE_TRAIN);
    let data_folder = matches
        .get_one::<String>("data_folder")
        .cloned()
        .unwrap_or_else(|| DATA_PATH.to_string());
    let starting_capital = matches
        .get_one::<f64>("starting_capital")
        .copied()
        .unwrap_or(STARTING_CAPITAL);
    let mut rng = match matches.get_one::<u64>("seed") {
        Some(seed) => StdRng::seed_from_u64(*seed),
        None => StdRng::from_entropy(),
    };

    if mode == MODE_GENERATE {
        return generate(&data_folder, &mut rng);
    }

    if !HistoricalData::folder_has_data(&data_folder) {
        warn!(folder = %data_folder, "no session files, run with --mode generate first");
    }
    let data = Arc::new(
        HistoricalData::load_folder(&data_folder)
            .with_context(|| format!("loading sessions from {data_folder}"))?,
    );

    let mut check = Env::new(
        Arc::clone(&data),
        EnvConfig::new(starting_capital, EnvMode::Train),
        StdRng::from_rng(&mut rng)?,
    )?;
    check_env(&mut check, &mut rng, CHECK_STEPS).context("environment check")?;
    info!("environment check passed");

    match mode {
        MODE_TEST => {
            let episodes = matches
                .get_one::<usize>("test_episodes")
                .copied()
                .unwrap_or(100);
            test(data, starting_capital, episodes, &mut rng)
        }
        _ => {
            let timesteps = matches
                .get_one::<usize>("training_timesteps")
                .copied()
                .unwrap_or(100_000);
            train(data, starting_capital, timesteps, &mut rng)
        }
    }
}

fn generate(data_folder: &str, rng: &mut StdRng) -> Result<()> {
    let files = random_walk_sessions(rng, &TICKERS, SESSIONS, BARS_PER_SESSION);

    for (index, file) in files.iter().enumerate() {
        let path = save_session(data_folder, &format!("session_{index:04}"), file)
            .with_context(|| format!("writing session {index}"))?;
        info!(path = %path.display(), "wrote session");
    }

    Ok(())
}

/// Rolls out random actions the way a learner would drive the environment
fn train(
    data: Arc<HistoricalData>,
    starting_capital: f64,
    timesteps: usize,
    rng: &mut StdRng,
) -> Result<()> {
    let mut env = Env::new(
        data,
        EnvConfig::new(starting_capital, EnvMode::Train),
        StdRng::from_rng(&mut *rng)?,
    )?;
    env.reset()?;

    for _ in 0..timesteps {
        let action = ActionsContinuous::new_random(rng, env.action_size());
        if env.step(action)?.done {
            env.reset()?;
        }
    }

    let meta = env.meta_history();
    info!(
        episodes = meta.episodes(),
        mean_final_assets = meta.mean_final_assets().unwrap_or(starting_capital),
        best_final_assets = meta.best_final_assets().unwrap_or(starting_capital),
        "rollout finished"
    );

    Ok(())
}

fn test(
    data: Arc<HistoricalData>,
    starting_capital: f64,
    episodes: usize,
    rng: &mut StdRng,
) -> Result<()> {
    let mut env = Env::new(
        data,
        EnvConfig::playback(starting_capital),
        StdRng::from_rng(&mut *rng)?,
    )?;
    info!(
        tickers = ?env.tickers(),
        mode = ?env.config().mode,
        episodes,
        "evaluating"
    );

    for _ in 0..episodes {
        println!("--- BEGINNING EPISODE ---");
        match env.reset() {
            Ok(_) => info!(
                episode = env.episode(),
                session_len = env.session_len().unwrap_or_default(),
                "session loaded"
            ),
            Err(GymError::EvaluationExhausted) => {
                info!("no sessions left to evaluate");
                break;
            }
            Err(err) => return Err(err.into()),
        }

        loop {
            let action = ActionsContinuous::new_random(rng, env.action_size());
            let snapshot = env.step(action)?;
            env.render();

            if snapshot.done {
                break;
            }
        }
    }

    info!(
        episodes = env.meta_history().episodes(),
        total_assets = env.total_assets(),
        "evaluation finished"
    );

    Ok(())
}
