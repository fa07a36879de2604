use super::side::Side;

/// Who acts next, as derived from the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Turn {
    /// Blocked on starting-side selection.
    Pending,
    /// The named side throws next.
    Choice(Side),
    /// Game or match over; no throws accepted.
    Terminal,
}

impl Turn {
    pub fn side(&self) -> Option<Side> {
        match self {
            Self::Choice(side) => Some(*side),
            _ => None,
        }
    }
}

impl std::fmt::Display for Turn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Choice(side) => write!(f, "{}", side),
            Self::Pending => write!(f, "--"),
            Self::Terminal => write!(f, "XX"),
        }
    }
}
