use super::rules::Rules;
use super::side::Side;
use super::throw::Outcome;
use super::throw::Shooter;
use super::throw::Throw;
use super::turn::Turn;
use crate::Cups;
use serde::Deserialize;
use serde::Serialize;

/// One game: the authoritative throw log plus the state derived from it.
///
/// The log is the single source of truth. State is only ever produced by
/// feeding throws through [`Rules::act`], for live play and for the replay
/// behind `rewind` and rehydration alike, so every rule exists in exactly
/// one place. The log is append-only; `rewind` truncates the tail by one
/// event and never splices the middle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Game<R: Rules> {
    state: R,
    log: Vec<Throw>,
    starting: Side,
    number: u8,
}

impl<R: Rules> Game<R> {
    pub fn start(number: u8, side: Side) -> Self {
        Self {
            state: R::start(side),
            log: Vec::new(),
            starting: side,
            number,
        }
    }

    /// Rebuild a game by replaying a log from empty state through the live
    /// transition. Stored marks are restamped along the way; a log recorded
    /// by this engine replays to byte-identical state and marks.
    pub fn replay(number: u8, side: Side, log: Vec<Throw>) -> Self {
        let mut game = Self::start(number, side);
        for throw in log {
            game.push(throw);
        }
        game
    }

    /// Record one throw. Precondition violations (game over, wrong shooter)
    /// are rejected as no-ops with a diagnostic: routine races with the
    /// caller's UI, not errors. A rejected throw never touches the log.
    pub fn apply(&self, outcome: Outcome, shooter: Shooter) -> Self {
        let mut next = self.clone();
        next.toss(outcome, shooter);
        next
    }

    /// Drop the last throw and rederive the state from scratch. False on an
    /// empty log; the caller decides whether to reach into a prior game.
    pub fn rewind(&mut self) -> bool {
        if self.log.pop().is_none() {
            return false;
        }
        let log = std::mem::take(&mut self.log);
        *self = Self::replay(self.number, self.starting, log);
        true
    }

    /// Rederive state from the log with full turn validation: true when
    /// every throw was legal at its position and the stored state (marks
    /// included) matches the replay. Used to vet resumed bundles.
    pub fn audit(&self) -> bool {
        let mut fresh = Self::start(self.number, self.starting);
        for throw in &self.log {
            if fresh.state.over() || !fresh.state.may_throw(throw.shooter) {
                return false;
            }
            fresh.push(throw.clone());
        }
        fresh.state == self.state && fresh.log == self.log
    }

    fn toss(&mut self, outcome: Outcome, shooter: Shooter) -> bool {
        if self.state.over() {
            log::warn!("game {} is over, throw by {} ignored", self.number, shooter);
            return false;
        }
        if !self.state.may_throw(shooter) {
            log::warn!("not {}'s throw, ignored", shooter);
            return false;
        }
        self.push(Throw::new(outcome, shooter));
        true
    }

    fn push(&mut self, mut throw: Throw) {
        self.state.act(&throw);
        throw.marks = self.state.marks(self.number);
        self.log.push(throw);
    }

    pub fn state(&self) -> &R {
        &self.state
    }
    pub fn log(&self) -> &[Throw] {
        &self.log
    }
    pub fn number(&self) -> u8 {
        self.number
    }
    pub fn starting(&self) -> Side {
        self.starting
    }
    pub fn turn(&self) -> Turn {
        self.state.turn()
    }
    pub fn score(&self) -> (Cups, Cups) {
        self.state.score()
    }
    pub fn winner(&self) -> Option<Side> {
        self.state.winner()
    }
    pub fn over(&self) -> bool {
        self.state.over()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::duo::Duo;
    use crate::tracker::solo::Solo;

    #[test]
    fn replay_is_deterministic() {
        let mut game = Game::<Duo>::start(1, Side::Home);
        for (outcome, slot) in [
            (Outcome::Hit, 0),
            (Outcome::Miss, 1),
            (Outcome::Miss, 0),
            (Outcome::Hit, 0),
            (Outcome::Hit, 1),
            (Outcome::Hit, 0),
        ] {
            let side = game.turn().side().expect("live game");
            game = game.apply(outcome, Shooter::new(side, slot));
        }
        let once = Game::<Duo>::replay(1, Side::Home, game.log().to_vec());
        let twice = Game::<Duo>::replay(1, Side::Home, game.log().to_vec());
        assert_eq!(once, twice);
        assert_eq!(once.state(), game.state());
    }

    #[test]
    fn undo_restores_the_previous_state() {
        let mut game = Game::<Duo>::start(1, Side::Away);
        game = game.apply(Outcome::Hit, Shooter::new(Side::Away, 0));
        game = game.apply(Outcome::Miss, Shooter::new(Side::Home, 1));
        let before = game.clone();
        game = game.apply(Outcome::Hit, Shooter::new(Side::Home, 0));
        assert_ne!(game, before);
        assert!(game.rewind());
        assert_eq!(game, before);
    }

    #[test]
    fn undo_on_empty_log_is_a_noop() {
        let mut game = Game::<Duo>::start(1, Side::Home);
        assert!(!game.rewind());
        assert_eq!(game, Game::<Duo>::start(1, Side::Home));
    }

    #[test]
    fn rejected_throws_leave_the_log_alone() {
        let game = Game::<Duo>::start(1, Side::Home);
        // away has no business throwing yet
        let next = game.apply(Outcome::Hit, Shooter::new(Side::Away, 0));
        assert_eq!(next, game);
    }

    #[test]
    fn solo_marks_are_stamped_and_replayed() {
        let mut game = Game::<Solo>::start(2, Side::Home);
        game = game.apply(Outcome::Hit, Shooter::new(Side::Home, 0));
        game = game.apply(Outcome::Miss, Shooter::new(Side::Away, 0));
        let marks = game.log()[0].marks.expect("solo events carry marks");
        assert_eq!(marks.game, 2);
        assert_eq!(marks.round, 1);
        assert_eq!(marks.cups_hit, 1);
        let replayed = Game::<Solo>::replay(2, Side::Home, game.log().to_vec());
        assert_eq!(replayed.log(), game.log());
        assert!(game.audit());
    }

    #[test]
    fn audit_rejects_a_doctored_log() {
        let mut game = Game::<Duo>::start(1, Side::Home);
        game = game.apply(Outcome::Hit, Shooter::new(Side::Home, 0));
        game = game.apply(Outcome::Miss, Shooter::new(Side::Away, 1));
        assert!(game.audit());
        let mut forged = game.clone();
        // duplicate the last throw: an out-of-turn shooter on replay
        let copy = forged.log[1].clone();
        forged.log.push(copy);
        assert!(!forged.audit());
    }
}
