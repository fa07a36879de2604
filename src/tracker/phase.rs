use super::side::Side;
use super::throw::Shooter;
use crate::Cups;
use serde::Deserialize;
use serde::Serialize;

/// Rebuttal flavor, selected by the size of the deficit and by whether the
/// shot that triggered it was the first throw of its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rebuttal {
    /// More than 3 cups down: unlimited alternating attempts, sudden death.
    Gt3,
    /// 1-3 cups down: same discipline, with alternation forced on step 1.
    Lte3,
    /// Exactly 1 cup down off a non-opening throw: two attempts total.
    OneCupDouble,
}

/// Rule phase with its phase-specific working fields. Fields that only mean
/// something in one phase live in that phase's variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    Regular,
    /// Sudden-death periods, scored in separate counters layered over the
    /// frozen main score.
    Overtime { home: Cups, away: Cups },
    /// The trailing side's window to tie after `leader` reached the target.
    ReturnServe {
        mode: Rebuttal,
        /// Cups the trailing side still has to make.
        need: Cups,
        /// Successful rebuttal shots taken so far (Lte3 alternation).
        step: u8,
        /// Attempts left, OneCupDouble only.
        attempts: Option<u8>,
        /// Last rebuttal shooter, for teammate alternation.
        shooter: Option<Shooter>,
        leader: Side,
    },
}

impl Phase {
    pub fn is_regular(&self) -> bool {
        matches!(self, Self::Regular)
    }
    pub fn is_overtime(&self) -> bool {
        matches!(self, Self::Overtime { .. })
    }
    pub fn is_return_serve(&self) -> bool {
        matches!(self, Self::ReturnServe { .. })
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Regular => write!(f, "regular"),
            Self::Overtime { home, away } => write!(f, "overtime {}-{}", home, away),
            Self::ReturnServe { need, .. } => write!(f, "return serve ({} to make)", need),
        }
    }
}
