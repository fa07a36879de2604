use crate::tracker::Rules;
use crate::tracker::Series;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Default staleness window for resumed matches: a day-old snapshot is a
/// different event.
pub const RESUME_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

/// Why a persisted bundle was refused. Every refusal is recoverable: the
/// caller falls back to a fresh match and the refused blob is simply stale
/// bytes, never a crash.
#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("unreadable bundle: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("bundle is {age_ms}ms old, past the {max_ms}ms window")]
    Stale { age_ms: i64, max_ms: i64 },
    #[error("bundle state disagrees with its own throw log")]
    Inconsistent,
}

/// A whole match as one opaque, JSON-round-trippable blob: the full state of
/// a [`Series`] plus the moment it was captured. The engine performs no I/O;
/// callers decide where these bytes live and how often to write them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Bundle<R: Rules> {
    pub saved_at: i64,
    pub series: Series<R>,
}

impl<R: Rules> Bundle<R> {
    pub fn capture(series: &Series<R>) -> Self {
        Self {
            saved_at: chrono::Utc::now().timestamp_millis(),
            series: series.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, ResumeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Hand the match back, refusing stale or internally inconsistent
    /// snapshots. `now_ms` is passed in rather than read off the clock so
    /// the staleness policy stays with the caller.
    pub fn restore(self, now_ms: i64, max_age_ms: i64) -> Result<Series<R>, ResumeError> {
        let age_ms = now_ms.saturating_sub(self.saved_at);
        if age_ms > max_age_ms {
            return Err(ResumeError::Stale {
                age_ms,
                max_ms: max_age_ms,
            });
        }
        if !self.series.coherent() {
            return Err(ResumeError::Inconsistent);
        }
        Ok(self.series)
    }
}
