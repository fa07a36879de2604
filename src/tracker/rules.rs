use super::side::Side;
use super::throw::Marks;
use super::throw::Shooter;
use super::throw::Throw;
use super::turn::Turn;
use crate::Cups;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A per-variant rule machine over the shared throw log.
///
/// There is exactly one transition (`act`): live play, undo replay, and
/// rehydration all feed throws through it, so a rule only ever has to change
/// in one place. Implementations never see the log; [`super::Game`] owns it.
pub trait Rules: Clone + PartialEq + std::fmt::Debug + Serialize + DeserializeOwned {
    /// Fresh game with the chosen starting side up first.
    fn start(side: Side) -> Self;

    /// Players fielded per side.
    fn roster() -> usize;

    /// Advance the state by one throw. Callers validate via `turn` and
    /// `may_throw` first; replay feeds an already-accepted log through
    /// unchecked.
    fn act(&mut self, throw: &Throw);

    /// Whose throw is next.
    fn turn(&self) -> Turn;

    /// Whether this shooter may take the next throw.
    fn may_throw(&self, shooter: Shooter) -> bool;

    /// Effective score per side, overtime cups included.
    fn score(&self) -> (Cups, Cups);

    /// Set exactly when the game has ended.
    fn winner(&self) -> Option<Side>;

    fn over(&self) -> bool {
        self.winner().is_some()
    }

    /// Derived-but-stored bookkeeping stamped onto the event just applied.
    /// Solo overrides this; duo stores nothing beyond the event itself.
    fn marks(&self, game: u8) -> Option<Marks> {
        let _ = game;
        None
    }
}
