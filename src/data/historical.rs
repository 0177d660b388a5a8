use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    constants::files::SESSION_EXTENSION,
    error::{GymError, Result},
    types::{Bar, Session},
    utils::create_folder_if_not_exists,
};

/// On-disk form of one session: bars keyed by ticker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionFile {
    pub tickers: BTreeMap<String, Vec<Bar>>,
}

/// Read-only store of sessions over a fixed, sorted ticker list.
///
/// Safe to share between environments behind an [`Arc`]; sampling takes the
/// caller's random source.
#[derive(Debug)]
pub struct HistoricalData {
    tickers: Vec<String>,
    sessions: Vec<Arc<Session>>,
}

impl HistoricalData {
    pub fn from_files(files: Vec<SessionFile>) -> Result<Self> {
        let tickers: Vec<String> = files
            .iter()
            .flat_map(|file| file.tickers.keys().cloned())
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect();

        let mut sessions = Vec::with_capacity(files.len());

        for (index, mut file) in files.into_iter().enumerate() {
            let bars = tickers
                .iter()
                .map(|ticker| file.tickers.remove(ticker).unwrap_or_default())
                .collect();

            match Session::new(bars) {
                Ok(session) => sessions.push(Arc::new(session)),
                Err(GymError::EmptySession) => warn!(index, "skipping session without bars"),
                Err(err) => return Err(err),
            }
        }

        Self::from_sessions(tickers, sessions)
    }

    /// Bars in each session must follow the order of `tickers`
    pub fn from_sessions(tickers: Vec<String>, sessions: Vec<Arc<Session>>) -> Result<Self> {
        if tickers.is_empty() || sessions.is_empty() {
            return Err(GymError::NoDataAvailable);
        }

        if let Some(session) = sessions
            .iter()
            .find(|session| session.ticker_count() != tickers.len())
        {
            return Err(GymError::TickerCountMismatch {
                expected: tickers.len(),
                actual: session.ticker_count(),
            });
        }

        Ok(Self { tickers, sessions })
    }

    /// Loads every session file in `folder`, in file name order
    pub fn load_folder(folder: impl AsRef<Path>) -> Result<Self> {
        let folder = folder.as_ref();
        let paths = session_paths(folder)?;

        let mut files = Vec::with_capacity(paths.len());
        for path in paths.iter() {
            debug!(path = %path.display(), "loading session");
            let bytes = fs::read(path)?;
            files.push(postcard::from_bytes::<SessionFile>(&bytes)?);
        }

        let data = Self::from_files(files)?;
        info!(
            folder = %folder.display(),
            sessions = data.sessions.len(),
            tickers = ?data.tickers,
            "loaded historical data"
        );

        Ok(data)
    }

    /// Whether `folder` holds at least one session file
    pub fn folder_has_data(folder: impl AsRef<Path>) -> bool {
        session_paths(folder.as_ref())
            .map(|paths| !paths.is_empty())
            .unwrap_or(false)
    }

    pub fn has_data(&self) -> bool {
        !self.sessions.is_empty()
    }

    pub fn stock_tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn ticker_index(&self, ticker: &str) -> Result<usize> {
        self.tickers
            .iter()
            .position(|known| known == ticker)
            .ok_or_else(|| GymError::UnknownTicker(ticker.to_string()))
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Uniform choice over all stored sessions
    pub fn random_session<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Arc<Session>> {
        self.sessions
            .choose(rng)
            .cloned()
            .ok_or(GymError::NoDataAvailable)
    }

    /// One pass over the sessions in stored order
    pub fn playback(self: &Arc<Self>) -> Playback {
        Playback {
            data: Arc::clone(self),
            next: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub enum NextSession {
    Session(Arc<Session>),
    Exhausted,
}

/// Finite sequential cursor over a [`HistoricalData`]
#[derive(Debug, Clone)]
pub struct Playback {
    data: Arc<HistoricalData>,
    next: usize,
}

impl Playback {
    pub fn next_session(&mut self) -> NextSession {
        match self.data.sessions.get(self.next) {
            Some(session) => {
                self.next += 1;
                NextSession::Session(Arc::clone(session))
            }
            None => NextSession::Exhausted,
        }
    }

    pub fn remaining(&self) -> usize {
        self.data.sessions.len().saturating_sub(self.next)
    }
}

impl Iterator for Playback {
    type Item = Arc<Session>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_session() {
            NextSession::Session(session) => Some(session),
            NextSession::Exhausted => None,
        }
    }
}

/// Writes one session file as `<folder>/<name>.bin`
pub fn save_session(folder: impl AsRef<Path>, name: &str, file: &SessionFile) -> Result<PathBuf> {
    let folder = folder.as_ref();
    create_folder_if_not_exists(folder)?;

    let path = folder.join(format!("{name}.{SESSION_EXTENSION}"));
    let encoded = postcard::to_allocvec(file)?;
    fs::write(&path, encoded)?;

    Ok(path)
}

fn session_paths(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(GymError::NoDataAvailable);
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(folder)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == SESSION_EXTENSION) {
            paths.push(path);
        }
    }
    paths.sort();

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashSet,
        time::{SystemTime, UNIX_EPOCH},
    };

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn bars(close: f64, len: usize) -> Vec<Bar> {
        (0..len)
            .map(|step| Bar {
                open: close,
                high: close,
                low: close,
                close,
                volume: 10.,
                timestamp: step as i64,
            })
            .collect()
    }

    fn file(entries: &[(&str, f64, usize)]) -> SessionFile {
        SessionFile {
            tickers: entries
                .iter()
                .map(|(ticker, close, len)| (ticker.to_string(), bars(*close, *len)))
                .collect(),
        }
    }

    fn temp_folder(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_nanos())
            .unwrap_or_default();
        std::env::temp_dir().join(format!("okwsb_gym_{name}_{}_{nanos}", std::process::id()))
    }

    #[test]
    fn tickers_are_sorted_union() {
        let data = HistoricalData::from_files(vec![
            file(&[("MSFT", 1., 3)]),
            file(&[("AAPL", 2., 4), ("TSLA", 3., 2)]),
        ])
        .unwrap();

        assert_eq!(data.stock_tickers(), ["AAPL", "MSFT", "TSLA"]);
        assert_eq!(data.stock_tickers(), data.stock_tickers());
        assert_eq!(data.ticker_index("TSLA").unwrap(), 2);
        assert!(matches!(data.ticker_index("IBM"), Err(GymError::UnknownTicker(_))));
        assert_eq!(data.session_count(), 2);
    }

    #[test]
    fn sessions_must_cover_every_ticker() {
        let session = Arc::new(Session::new(vec![bars(1., 3)]).unwrap());

        assert!(matches!(
            HistoricalData::from_sessions(vec!["AAPL".into(), "MSFT".into()], vec![session]),
            Err(GymError::TickerCountMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn empty_store_is_rejected() {
        assert!(matches!(
            HistoricalData::from_files(vec![]),
            Err(GymError::NoDataAvailable)
        ));
        assert!(matches!(
            HistoricalData::from_files(vec![file(&[("AAPL", 1., 0)])]),
            Err(GymError::NoDataAvailable)
        ));
        assert!(matches!(
            HistoricalData::load_folder(temp_folder("missing")),
            Err(GymError::NoDataAvailable)
        ));
    }

    #[test]
    fn random_session_is_seeded() {
        let data = HistoricalData::from_files(
            (1..=10).map(|len| file(&[("AAPL", 1., len)])).collect(),
        )
        .unwrap();

        let draw = |seed: u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..20)
                .map(|_| data.random_session(&mut rng).unwrap().len())
                .collect::<Vec<usize>>()
        };

        assert_eq!(draw(3), draw(3));
        assert!(draw(3).iter().collect::<HashSet<_>>().len() > 1);
    }

    #[test]
    fn playback_is_one_ordered_pass() {
        let data = Arc::new(
            HistoricalData::from_files(vec![
                file(&[("AAPL", 1., 2)]),
                file(&[("AAPL", 1., 3)]),
            ])
            .unwrap(),
        );

        let mut playback = data.playback();
        assert_eq!(playback.remaining(), 2);
        assert!(matches!(playback.next_session(), NextSession::Session(s) if s.len() == 2));
        assert!(matches!(playback.next_session(), NextSession::Session(s) if s.len() == 3));
        assert!(matches!(playback.next_session(), NextSession::Exhausted));
        assert!(matches!(playback.next_session(), NextSession::Exhausted));

        assert_eq!(data.playback().map(|session| session.len()).collect::<Vec<_>>(), [2, 3]);
    }

    #[test]
    fn folder_round_trip() {
        let folder = temp_folder("round_trip");
        assert!(!HistoricalData::folder_has_data(&folder));

        save_session(&folder, "2020_01_03", &file(&[("AAPL", 5., 4)])).unwrap();
        save_session(&folder, "2020_01_02", &file(&[("AAPL", 7., 6), ("MSFT", 8., 6)])).unwrap();
        fs::write(folder.join("notes.txt"), "ignored").unwrap();

        assert!(HistoricalData::folder_has_data(&folder));

        let data = Arc::new(HistoricalData::load_folder(&folder).unwrap());
        assert_eq!(data.stock_tickers(), ["AAPL", "MSFT"]);

        let sessions: Vec<Arc<Session>> = data.playback().collect();
        assert_eq!(sessions[0].price(0, 0), Some(7.));
        assert_eq!(sessions[1].price(0, 0), Some(5.));
        assert_eq!(sessions[1].price(1, 0), None);

        fs::remove_dir_all(&folder).unwrap();
    }
}
