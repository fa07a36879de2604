use super::game::Game;
use super::roster::Roster;
use super::rules::Rules;
use super::side::Side;
use super::solo::Solo;
use super::throw::Outcome;
use super::throw::Shooter;
use super::throw::Throw;
use super::turn::Turn;
use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

/// A completed game's record: who won, who started, and its full log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub number: u8,
    pub winner: Side,
    pub starting: Side,
    pub log: Vec<Throw>,
}

/// Best-of-N controller: owns the active game, the win tally, and the
/// archive of every game's log. The archive is what lets undo reach back
/// across a game boundary.
///
/// Every operation is a synchronous transition; rejected operations are
/// no-ops with a diagnostic and never corrupt the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Series<R: Rules> {
    roster: Roster,
    best_of: u8,
    game: Game<R>,
    wins: [u8; 2],
    played: Vec<Record>,
    archive: BTreeMap<u8, Vec<Throw>>,
    /// True while the next game is blocked on starting-side selection.
    waiting: bool,
    /// Default starting side offered while waiting: alternates per game.
    proposed: Side,
    over: bool,
}

impl<R: Rules> Series<R> {
    /// `best_of` is a positive odd integer; anything else is normalized up
    /// with a warning rather than refused.
    pub fn new(best_of: u8, roster: Roster) -> Self {
        let best_of = match best_of {
            0 => {
                log::warn!("best-of 0 requested, playing a single game");
                1
            }
            n if n % 2 == 0 => {
                log::warn!("best-of must be odd, playing best-of {}", n + 1);
                n + 1
            }
            n => n,
        };
        Self {
            roster,
            best_of,
            game: Game::start(1, Side::Home),
            wins: [0, 0],
            played: Vec::new(),
            archive: BTreeMap::new(),
            waiting: true,
            proposed: Side::Home,
            over: false,
        }
    }

    /// Valid only while waiting on a starting side: at match start, or after
    /// `advance`.
    pub fn select_starting_side(&mut self, side: Side) {
        if self.over || !self.waiting {
            log::warn!("starting side selection out of place, ignored");
            return;
        }
        self.waiting = false;
        self.game = Game::start(self.game.number(), side);
    }

    /// Record one throw. No-op while the match is over, while blocked on
    /// starting-side selection, or between a game's end and `advance`;
    /// shooter mismatches are rejected inside the game itself.
    pub fn toss(&mut self, outcome: Outcome, shooter: Shooter) {
        if self.over {
            log::warn!("match is over, throw by {} ignored", shooter);
            return;
        }
        if self.waiting {
            log::warn!("waiting on starting side, throw by {} ignored", shooter);
            return;
        }
        if self.game.over() {
            log::warn!("game {} is over, advance first", self.game.number());
            return;
        }
        self.game = self.game.apply(outcome, shooter);
        if let Some(winner) = self.game.winner() {
            self.conclude(winner);
        }
    }

    /// Move on to the next game: valid only between a game's end and the
    /// match's end. Proposes the flipped starting side and waits for
    /// selection.
    pub fn advance(&mut self) {
        if self.over {
            log::warn!("match is over, nothing to advance to");
            return;
        }
        if !self.game.over() {
            log::warn!("game {} is still live, advance ignored", self.game.number());
            return;
        }
        self.proposed = self.game.starting().flip();
        self.game = Game::start(self.game.number() + 1, self.proposed);
        self.waiting = true;
    }

    /// Take back the most recent throw, reaching into the previous game's
    /// archived log when the active one is empty. Rederives state by full
    /// replay; with nothing anywhere to undo, this is a no-op.
    pub fn undo(&mut self) {
        if self.game.log().is_empty() {
            self.regress();
            return;
        }
        let concluded = self.game.winner();
        let mut game = self.game.clone();
        game.rewind();
        if let Some(winner) = concluded {
            // the tally recorded at this game's conclusion comes back out
            self.wins[winner.index()] -= 1;
            self.played.pop();
            self.archive.remove(&game.number());
            self.over = false;
        }
        self.game = game;
    }

    fn conclude(&mut self, winner: Side) {
        self.wins[winner.index()] += 1;
        self.played.push(Record {
            number: self.game.number(),
            winner,
            starting: self.game.starting(),
            log: self.game.log().to_vec(),
        });
        self.archive
            .insert(self.game.number(), self.game.log().to_vec());
        if self.wins[winner.index()] >= self.needed() {
            self.over = true;
        }
    }

    fn regress(&mut self) {
        let Some(record) = self.played.pop() else {
            log::warn!("nothing to undo");
            return;
        };
        self.archive.remove(&record.number);
        self.wins[record.winner.index()] -= 1;
        self.over = false;
        self.waiting = false;
        self.proposed = record.starting;
        let mut log = record.log;
        log.pop();
        self.game = Game::replay(record.number, record.starting, log);
    }

    /// Internal consistency of a resumed snapshot: the active game and every
    /// archived one must replay to exactly what is stored, and the tallies
    /// must agree with the records.
    pub fn coherent(&self) -> bool {
        if !self.game.audit() {
            return false;
        }
        let mut wins = [0u8; 2];
        for record in &self.played {
            let replayed = Game::<R>::replay(record.number, record.starting, record.log.clone());
            if replayed.winner() != Some(record.winner) {
                return false;
            }
            if self.archive.get(&record.number) != Some(&record.log) {
                return false;
            }
            wins[record.winner.index()] += 1;
        }
        wins == self.wins
            && self.archive.len() == self.played.len()
            && self.over == (wins[0] >= self.needed() || wins[1] >= self.needed())
    }

    pub fn needed(&self) -> u8 {
        self.best_of / 2 + 1
    }
    pub fn best_of(&self) -> u8 {
        self.best_of
    }
    pub fn game(&self) -> &Game<R> {
        &self.game
    }
    pub fn number(&self) -> u8 {
        self.game.number()
    }
    pub fn wins(&self) -> (u8, u8) {
        (self.wins[0], self.wins[1])
    }
    pub fn records(&self) -> &[Record] {
        &self.played
    }
    pub fn archive(&self) -> &BTreeMap<u8, Vec<Throw>> {
        &self.archive
    }
    pub fn roster(&self) -> &Roster {
        &self.roster
    }
    pub fn waiting(&self) -> bool {
        self.waiting
    }
    pub fn proposed(&self) -> Side {
        self.proposed
    }
    pub fn over(&self) -> bool {
        self.over
    }
    /// The match winner, once the tally reaches the threshold.
    pub fn winner(&self) -> Option<Side> {
        [Side::Home, Side::Away]
            .into_iter()
            .find(|side| self.wins[side.index()] >= self.needed())
    }
    pub fn turn(&self) -> Turn {
        if self.over || self.game.over() {
            Turn::Terminal
        } else if self.waiting {
            Turn::Pending
        } else {
            self.game.turn()
        }
    }
    /// Every log in play order: archived games first, then the active one.
    /// A just-concluded game sits in the archive before `advance` moves past
    /// it; its archive entry is skipped so no throw is yielded twice.
    pub fn logs(&self) -> impl Iterator<Item = &[Throw]> {
        self.archive
            .iter()
            .filter(move |(number, _)| **number != self.game.number())
            .map(|(_, log)| log.as_slice())
            .chain(std::iter::once(self.game.log()))
    }
}

impl Series<Solo> {
    /// Replay-derived finish query for sub-game `n`, live or archived.
    pub fn who_finished(&self, n: u8) -> Option<Side> {
        self.sub(n).and_then(|game| game.state().finisher())
    }

    /// Whether sub-game `n` is confirmed over: a finish plus an exhausted
    /// revenge sequence.
    pub fn is_settled(&self, n: u8) -> bool {
        self.sub(n).is_some_and(|game| game.over())
    }

    fn sub(&self, n: u8) -> Option<Game<Solo>> {
        if n == self.game.number() {
            return Some(self.game.clone());
        }
        let record = self.played.iter().find(|r| r.number == n)?;
        Some(Game::replay(n, record.starting, record.log.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::duo::Duo;

    fn roster() -> Roster {
        Roster::duo(["Ann", "Ben"], ["Cat", "Dan"])
    }

    /// Drive the active duo game to its end: the starting side sweeps, the
    /// other side never answers the return serve.
    fn blowout(series: &mut Series<Duo>) {
        while !series.game().over() {
            let side = match series.turn() {
                Turn::Choice(side) => side,
                turn => panic!("expected a live game, got {}", turn),
            };
            let slot = (0..2)
                .find(|s| series.game().state().may_throw(Shooter::new(side, *s)))
                .expect("some shooter");
            let outcome = match series.game().state().phase().is_return_serve() {
                true => Outcome::Miss,
                false => Outcome::Hit,
            };
            series.toss(outcome, Shooter::new(side, slot));
        }
    }

    #[test]
    fn throws_blocked_until_side_selected() {
        let mut series = Series::<Duo>::new(1, roster());
        assert_eq!(series.turn(), Turn::Pending);
        series.toss(Outcome::Hit, Shooter::new(Side::Home, 0));
        assert!(series.game().log().is_empty());
        series.select_starting_side(Side::Away);
        assert_eq!(series.turn(), Turn::Choice(Side::Away));
        series.toss(Outcome::Hit, Shooter::new(Side::Away, 0));
        assert_eq!(series.game().log().len(), 1);
        // re-selection mid-game is rejected
        series.select_starting_side(Side::Home);
        assert_eq!(series.game().log().len(), 1);
    }

    #[test]
    fn best_of_three_progression() {
        let mut series = Series::<Duo>::new(3, roster());
        assert_eq!(series.needed(), 2);
        series.select_starting_side(Side::Home);
        blowout(&mut series);
        assert_eq!(series.wins(), (1, 0));
        assert!(!series.over());
        assert_eq!(series.winner(), None);
        series.advance();
        // serve alternates: away proposed for game two
        assert_eq!(series.proposed(), Side::Away);
        assert!(series.waiting());
        series.select_starting_side(series.proposed());
        blowout(&mut series);
        assert_eq!(series.wins(), (1, 1));
        series.advance();
        series.select_starting_side(series.proposed());
        blowout(&mut series);
        assert_eq!(series.wins(), (2, 1));
        assert!(series.over());
        assert_eq!(series.winner(), Some(Side::Home));
        // no further throws accepted
        let log = series.game().log().len();
        series.toss(Outcome::Hit, Shooter::new(Side::Home, 0));
        assert_eq!(series.game().log().len(), log);
        series.advance();
        assert_eq!(series.number(), 3);
    }

    #[test]
    fn even_best_of_is_normalized() {
        let series = Series::<Duo>::new(4, roster());
        assert_eq!(series.best_of(), 5);
        assert_eq!(series.needed(), 3);
        let series = Series::<Duo>::new(0, roster());
        assert_eq!(series.best_of(), 1);
    }

    #[test]
    fn undo_reverses_a_game_winning_throw() {
        let mut series = Series::<Duo>::new(3, roster());
        series.select_starting_side(Side::Home);
        let mut before = None;
        while !series.game().over() {
            before = Some(series.clone());
            let side = series.turn().side().expect("live");
            let slot = (0..2)
                .find(|s| series.game().state().may_throw(Shooter::new(side, *s)))
                .unwrap();
            let outcome = match series.game().state().phase().is_return_serve() {
                true => Outcome::Miss,
                false => Outcome::Hit,
            };
            series.toss(outcome, Shooter::new(side, slot));
        }
        assert_eq!(series.wins(), (1, 0));
        series.undo();
        assert_eq!(series, before.expect("at least one throw"));
        assert_eq!(series.wins(), (0, 0));
    }

    #[test]
    fn undo_reaches_across_the_game_boundary() {
        let mut series = Series::<Duo>::new(5, roster());
        series.select_starting_side(Side::Home);
        blowout(&mut series);
        series.advance();
        series.select_starting_side(series.proposed());
        blowout(&mut series);
        assert_eq!(series.records().len(), 2);
        series.advance();
        assert_eq!(series.number(), 3);
        assert!(series.game().log().is_empty());
        let game_two_len = series.archive()[&2].len();
        series.undo();
        // back inside game two, one throw shorter, its win rescinded
        assert_eq!(series.number(), 2);
        assert_eq!(series.wins(), (1, 0));
        assert_eq!(series.records().len(), 1);
        assert_eq!(series.game().log().len(), game_two_len - 1);
        assert!(!series.game().over());
        assert!(!series.waiting());
    }

    #[test]
    fn undo_on_a_fresh_match_is_a_noop() {
        let mut series = Series::<Duo>::new(1, roster());
        let before = series.clone();
        series.undo();
        assert_eq!(series, before);
        series.select_starting_side(Side::Home);
        let before = series.clone();
        series.undo();
        assert_eq!(series, before);
    }

    #[test]
    fn solo_finish_queries_are_replay_derived() {
        let mut series = Series::<Solo>::new(3, Roster::solo("Ann", "Cat"));
        series.select_starting_side(Side::Home);
        // home sweeps, away never converts its throws or its revenge
        while !series.game().over() {
            let side = series.turn().side().expect("live");
            let outcome = match side {
                Side::Home => Outcome::Hit,
                Side::Away => Outcome::Miss,
            };
            series.toss(outcome, Shooter::new(side, 0));
        }
        assert_eq!(series.who_finished(1), Some(Side::Home));
        assert!(series.is_settled(1));
        assert_eq!(series.who_finished(2), None);
        series.advance();
        series.select_starting_side(series.proposed());
        // archived game one still answers from its log
        assert_eq!(series.who_finished(1), Some(Side::Home));
        assert!(series.is_settled(1));
        assert!(!series.is_settled(2));
    }

    #[test]
    fn undo_then_replay_reaches_the_same_end() {
        let mut series = Series::<Duo>::new(1, roster());
        series.select_starting_side(Side::Home);
        blowout(&mut series);
        let done = series.clone();
        // unwind the whole game, then land every throw again
        let throws: Vec<Throw> = series.game().log().to_vec();
        for _ in 0..throws.len() {
            series.undo();
        }
        assert!(series.game().log().is_empty());
        for throw in throws {
            series.toss(throw.outcome, throw.shooter);
        }
        assert_eq!(series.wins(), done.wins());
        assert_eq!(series.game().state(), done.game().state());
    }
}
