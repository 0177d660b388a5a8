use std::sync::Arc;

use colored::Colorize;
use rand::rngs::StdRng;
#[cfg(feature = "debug_training")]
use tracing::trace;
use tracing::{debug, info, warn};

use crate::{
    config::{EnvConfig, EnvMode},
    constants::env::{ACTIONS_PER_TICKER, HIGH, LOW},
    data::historical::{HistoricalData, NextSession, Playback},
    error::{GymError, Result},
    gym::{
        action::{TickerAction, TradeAction},
        action_continuous::ActionsContinuous,
        base::{BoxSpace, Environment, Snapshot},
        obs_state::ObservationState,
    },
    history::{EpisodeHistory, MetaHistory},
    types::{Account, Session},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvStatus {
    /// Constructed, waiting for the first reset
    Uninitialized,
    Ready,
    /// Session finished, reset before stepping again
    Terminal,
}

/// Multi-ticker trading environment over historical sessions.
///
/// Each step decodes one `[type, quantity]` pair per ticker, trades at the
/// current close, advances one bar and rewards the equity gained since the
/// session started.
#[derive(Debug)]
pub struct Env {
    data: Arc<HistoricalData>,
    config: EnvConfig,
    rng: StdRng,
    playback: Option<Playback>,
    session: Option<Arc<Session>>,
    step: usize,
    status: EnvStatus,
    account: Account,
    /// Last positive close seen per ticker, used when a bar is missing
    last_prices: Vec<f64>,
    session_start_equity: f64,
    state: ObservationState,
    episode: usize,
    episode_history: EpisodeHistory,
    meta_history: MetaHistory,
    ticker_count: usize,
    action_size: usize,
    observation_size: usize,
}

impl Env {
    pub fn new(data: Arc<HistoricalData>, config: EnvConfig, rng: StdRng) -> Result<Self> {
        if !data.has_data() {
            return Err(GymError::NoDataAvailable);
        }

        let ticker_count = data.stock_tickers().len();
        let account = Account::new(config.starting_capital, ticker_count);
        let playback = match config.mode {
            EnvMode::Train => None,
            EnvMode::Playback => Some(data.playback()),
        };

        Ok(Self {
            playback,
            session: None,
            step: 0,
            status: EnvStatus::Uninitialized,
            last_prices: vec![0.; ticker_count],
            session_start_equity: account.cash,
            state: ObservationState::new_empty(&account),
            account,
            episode: 0,
            episode_history: EpisodeHistory::new(ticker_count),
            meta_history: MetaHistory::default(),
            ticker_count,
            action_size: ticker_count * ACTIONS_PER_TICKER,
            observation_size: ObservationState::size_for(ticker_count),
            data,
            config,
            rng,
        })
    }

    pub fn tickers(&self) -> &[String] {
        self.data.stock_tickers()
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn status(&self) -> EnvStatus {
        self.status
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn step_index(&self) -> usize {
        self.step
    }

    /// Episodes finished so far
    pub fn episode(&self) -> usize {
        self.episode
    }

    pub fn session_len(&self) -> Option<usize> {
        self.session.as_ref().map(|session| session.len())
    }

    pub fn action_size(&self) -> usize {
        self.action_size
    }

    pub fn observation_size(&self) -> usize {
        self.observation_size
    }

    pub fn episode_history(&self) -> &EpisodeHistory {
        &self.episode_history
    }

    pub fn meta_history(&self) -> &MetaHistory {
        &self.meta_history
    }

    /// Equity marked at the current step
    pub fn total_assets(&self) -> f64 {
        match &self.session {
            Some(session) => self
                .account
                .total_assets(&self.mark_prices(session, self.step)),
            None => self.account.cash,
        }
    }

    fn next_session(&mut self) -> Result<Arc<Session>> {
        match self.playback.as_mut() {
            None => self.data.random_session(&mut self.rng),
            Some(playback) => match playback.next_session() {
                NextSession::Session(session) => Ok(session),
                NextSession::Exhausted => Err(GymError::EvaluationExhausted),
            },
        }
    }

    /// Valid close at `step`, if there is one
    fn market_price(session: &Session, ticker_index: usize, step: usize) -> Option<f64> {
        session
            .price(ticker_index, step)
            .filter(|price| price.is_finite() && *price > 0.)
    }

    /// Close at `step` per ticker, falling back to the last known price
    fn mark_prices(&self, session: &Session, step: usize) -> Vec<f64> {
        (0..self.ticker_count)
            .map(|ticker_index| {
                Self::market_price(session, ticker_index, step)
                    .unwrap_or(self.last_prices[ticker_index])
            })
            .collect()
    }

    fn remember_prices(&mut self, session: &Session, step: usize) {
        for (ticker_index, last_price) in self.last_prices.iter_mut().enumerate() {
            if let Some(price) = Self::market_price(session, ticker_index, step) {
                *last_price = price;
            }
        }
    }

    /// Trades one ticker at the current step, returning the filled quantity
    fn trade(&mut self, session: &Session, ticker_index: usize, decoded: TickerAction) -> u64 {
        let held = self.account.quantity(ticker_index);

        let (ticker_action, price) = match Self::market_price(session, ticker_index, self.step) {
            Some(price) => (decoded, price),
            None if held > 0 => {
                let price = self.last_prices[ticker_index];
                warn!(
                    ticker = %self.data.stock_tickers()[ticker_index],
                    step = self.step,
                    quantity = held,
                    price,
                    "forced liquidation of untradeable position"
                );
                self.episode_history.forced_liquidations += 1;

                (TickerAction::sell(held), price)
            }
            None => (decoded, 0.),
        };

        let filled = match ticker_action.action {
            TradeAction::Hold => 0,
            TradeAction::Buy => self.account.buy(ticker_index, price, ticker_action.quantity),
            TradeAction::Sell => self.account.sell(ticker_index, price, ticker_action.quantity),
        };

        #[cfg(feature = "debug_training")]
        trace!(
            ticker_index,
            step = self.step,
            action = ?ticker_action.action,
            requested = ticker_action.quantity,
            filled,
            price,
            "trade"
        );

        self.episode_history.record_trade(
            ticker_index,
            self.step,
            ticker_action.action,
            price,
            filled,
        );

        filled
    }

    fn handle_episode_end(&mut self, total_assets: f64) {
        self.status = EnvStatus::Terminal;
        self.meta_history.record(&self.episode_history);

        info!(
            episode = self.episode,
            total_assets,
            cumulative_reward = self.episode_history.cumulative_reward(),
            steps = self.episode_history.steps(),
            forced_liquidations = self.episode_history.forced_liquidations,
            "episode finished"
        );

        self.episode += 1;
    }
}

impl Environment for Env {
    type ActionType = ActionsContinuous;
    type StateType = ObservationState;

    fn reset(&mut self) -> Result<Self::StateType> {
        let session = self.next_session()?;

        let keep_account =
            self.config.mode == EnvMode::Playback && self.status != EnvStatus::Uninitialized;
        if !keep_account {
            self.account = Account::new(self.config.starting_capital, self.ticker_count);
            self.last_prices = vec![0.; self.ticker_count];
        }

        self.step = 0;
        self.remember_prices(&session, 0);
        self.session_start_equity = self
            .account
            .total_assets(&self.mark_prices(&session, 0));

        self.episode_history = EpisodeHistory::new(self.ticker_count);
        self.state = ObservationState::new(&self.account, &session, 0);
        self.status = EnvStatus::Ready;

        debug!(
            episode = self.episode,
            session_len = session.len(),
            start_equity = self.session_start_equity,
            "reset"
        );

        self.session = Some(session);
        Ok(self.state.clone())
    }

    fn step(&mut self, action: Self::ActionType) -> Result<Snapshot<Self>> {
        match self.status {
            EnvStatus::Uninitialized => return Err(GymError::NotReset),
            EnvStatus::Terminal => return Err(GymError::StepAfterTerminal),
            EnvStatus::Ready => {}
        }

        let session = self.session.clone().ok_or(GymError::NotReset)?;
        let decoded = action.decode(self.ticker_count)?;

        for (ticker_index, ticker_action) in decoded.into_iter().enumerate() {
            self.trade(&session, ticker_index, ticker_action);
        }
        self.remember_prices(&session, self.step);

        // Next step

        self.step += 1;
        self.state = ObservationState::new(&self.account, &session, self.step);

        // Reward

        let prices = self.mark_prices(&session, self.step);
        let total_assets = self.account.total_assets(&prices);
        let reward = total_assets - self.session_start_equity;

        self.episode_history
            .record_step(&self.account, &prices, reward);

        // Done

        let is_done = self.step >= session.len().saturating_sub(1);
        if is_done {
            self.handle_episode_end(total_assets);
        }

        Ok(Snapshot::new(self.state.clone(), reward, is_done))
    }

    fn state(&self) -> &Self::StateType {
        &self.state
    }

    fn action_space(&self) -> BoxSpace {
        BoxSpace::new(LOW, HIGH, self.action_size)
    }

    fn observation_space(&self) -> BoxSpace {
        BoxSpace::new(LOW, HIGH, self.observation_size)
    }

    fn render(&self) {
        let Some(session) = &self.session else {
            println!("{}", "environment not reset".dimmed());
            return;
        };

        let prices = self.mark_prices(session, self.step);
        let total_assets = self.account.total_assets(&prices);
        let profit = total_assets - self.session_start_equity;
        let profit = if profit >= 0. {
            format!("{profit:+.2}").green()
        } else {
            format!("{profit:+.2}").red()
        };

        let date = session
            .bar(0, self.step.min(session.len().saturating_sub(1)))
            .and_then(|bar| bar.date())
            .map(|date| date.to_string())
            .unwrap_or_default();

        println!(
            "{} {} step {}/{} {}",
            "Episode".bold(),
            self.episode,
            self.step,
            session.len().saturating_sub(1),
            date.dimmed()
        );

        for (ticker_index, ticker) in self.data.stock_tickers().iter().enumerate() {
            let position = &self.account.positions[ticker_index];
            if position.quantity == 0 {
                continue;
            }

            let price = prices[ticker_index];
            println!(
                "  {:<6} {:>8} @ {:>10.2} = {:>12.2} ({:+.2}%)",
                ticker.cyan(),
                position.quantity,
                price,
                position.value_with_price(price),
                position.appreciation(price) * 100.
            );
        }

        println!(
            "  cash {:.2} total assets {:.2} profit {}",
            self.account.cash, total_assets, profit
        );
    }
}
