// Cross-session balance and win/loss record

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TradingResult;

/// Older records use Spanish keys; they are read through aliases and
/// rewritten with the English ones on the next `record`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    pub balance: f64,
    #[serde(alias = "sesiones")]
    pub sessions: u32,
    #[serde(alias = "ganancias")]
    pub wins: u32,
    #[serde(alias = "perdidas")]
    pub losses: u32,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current record; a missing file is a fresh record
    pub fn load(&self) -> TradingResult<SessionState> {
        if !self.path.exists() {
            return Ok(SessionState::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Close one session: overwrite the balance and bump the counters
    pub fn record(&self, balance: f64, won: bool) -> TradingResult<SessionState> {
        let mut state = self.load()?;
        state.balance = balance;
        state.sessions += 1;
        if won {
            state.wins += 1;
        } else {
            state.losses += 1;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&state)?)?;
        fs::rename(&tmp, &self.path)?;

        Ok(state)
    }
}
