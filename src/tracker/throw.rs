use super::side::Side;
use crate::Cups;
use serde::Deserialize;
use serde::Serialize;

/// hit or miss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Hit,
    Miss,
}

impl Outcome {
    pub fn is_hit(self) -> bool {
        matches!(self, Self::Hit)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hit => write!(f, "HIT"),
            Self::Miss => write!(f, "MISS"),
        }
    }
}

/// A player identity: side plus slot within that side's roster.
/// Stable for the whole match, unique across both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Shooter {
    pub side: Side,
    pub slot: usize,
}

impl Shooter {
    pub fn new(side: Side, slot: usize) -> Self {
        Self { side, slot }
    }
}

impl From<(Side, usize)> for Shooter {
    fn from((side, slot): (Side, usize)) -> Self {
        Self { side, slot }
    }
}

impl std::fmt::Display for Shooter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.side, self.slot)
    }
}

/// Solo bookkeeping stamped onto each event at append time from the
/// post-throw state, and restamped identically whenever the log is replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marks {
    /// Sub-game number within the best-of-N match.
    pub game: u8,
    pub round: u8,
    /// Which throw of the shooter's round this was (1-based).
    pub throw_in_round: u8,
    /// Cups the shooter still needs after this throw.
    pub cups_left: Cups,
    /// The shooter's cumulative hits in this sub-game after this throw.
    pub cups_hit: Cups,
}

/// One recorded throw: the atomic unit of the event log.
///
/// Immutable once appended. Ordering is by log position; `at` is an
/// informational epoch-millisecond creation stamp only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Throw {
    pub outcome: Outcome,
    pub shooter: Shooter,
    pub at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<Marks>,
}

impl Throw {
    pub fn new(outcome: Outcome, shooter: Shooter) -> Self {
        Self {
            outcome,
            shooter,
            at: chrono::Utc::now().timestamp_millis(),
            marks: None,
        }
    }
}

impl std::fmt::Display for Throw {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.shooter, self.outcome)
    }
}
