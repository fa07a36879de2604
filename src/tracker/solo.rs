use super::rules::Rules;
use super::side::Side;
use super::throw::Marks;
use super::throw::Shooter;
use super::throw::Throw;
use super::turn::Turn;
use crate::Cups;
use crate::OVERTIME_CUPS;
use crate::SOLO_MIN_THROWS;
use crate::TARGET;
use serde::Deserialize;
use serde::Serialize;

/// A confirmed-pending finish: `side` reached the target and the opponent's
/// revenge sequence is running. `used` is how many throws the finisher took
/// in its finishing turn; it bounds the opponent's guaranteed attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finish {
    pub side: Side,
    pub used: u8,
}

/// Post-throw bookkeeping held for mark stamping, captured before any
/// turn/round reset can clobber it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    pub round: u8,
    pub throw_in_round: u8,
    pub cups_left: Cups,
    pub cups_hit: Cups,
}

/// 1v1 rule state.
///
/// Round 1 is a single alternating throw per side. From round 2 each side
/// throws twice per round with a third bonus throw when both hit. The cup
/// target starts at 10 and grows by 3 per overtime period; a finish must be
/// confirmed by exhausting the opponent's revenge throws, and a revenge tie
/// escalates into the next period instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solo {
    hits: [Cups; 2],
    target: Cups,
    period: u8,
    round: u8,
    throws_in_round: u8,
    hits_in_round: u8,
    active: Side,
    /// Side that opens each round; flips only when a period escalates.
    opener: Side,
    throws: u16,
    finish: Option<Finish>,
    revenge_throws: u8,
    /// Whether the one-time retry at the last cup has been spent.
    grace_used: bool,
    stamp: Option<Stamp>,
    winner: Option<Side>,
}

impl Solo {
    pub fn target(&self) -> Cups {
        self.target
    }
    pub fn period(&self) -> u8 {
        self.period
    }
    pub fn round(&self) -> u8 {
        self.round
    }
    pub fn cups_left(&self, side: Side) -> Cups {
        self.target.saturating_sub(self.hits[side.index()])
    }
    /// The side whose finish is pending or confirmed, if any.
    pub fn finisher(&self) -> Option<Side> {
        self.winner.or(self.finish.map(|f| f.side))
    }
    pub fn finish(&self) -> Option<Finish> {
        self.finish
    }

    fn settle(&mut self, side: Side, hit: bool) {
        if self.finished(side) {
            // revenge runs at its own round, opponent up
            self.finish = Some(Finish {
                side,
                used: self.throws_in_round,
            });
            self.revenge_throws = 0;
            self.round += 1;
            self.throws_in_round = 0;
            self.hits_in_round = 0;
            self.active = side.flip();
        } else if self.round == 1 || !self.keeps(hit) {
            self.pass();
        }
    }

    fn revenge(&mut self, side: Side, hit: bool, finish: Finish) {
        self.revenge_throws += 1;
        if hit {
            if self.hits[side.index()] >= self.target {
                self.escalate(finish.side);
            }
            // a non-tying hit keeps the revenge side up
        } else if self.revenge_throws < finish.used {
            // guaranteed window: owed as many throws as the finisher used
        } else if self.cups_left(side) == 1 && finish.used >= 2 && !self.grace_used {
            // one extra look at the last cup, once per period
            self.grace_used = true;
        } else {
            self.winner = Some(finish.side);
        }
    }

    fn finished(&self, side: Side) -> bool {
        let own = self.hits[side.index()];
        let other = self.hits[side.flip().index()];
        own >= self.target
            && (own - TARGET) % OVERTIME_CUPS == 0
            && own > other
            && self.throws as usize >= SOLO_MIN_THROWS
    }

    /// Retention outside revenge, for rounds past the first: the side keeps
    /// its first throw of the round, keeps a second only off two straight
    /// hits (bonus throw), and never a fourth. Cups must remain throughout.
    fn keeps(&self, hit: bool) -> bool {
        let left = self.cups_left(self.active);
        match self.throws_in_round {
            1 => left > 0,
            2 => left > 0 && hit && self.hits_in_round == 2,
            _ => false,
        }
    }

    fn escalate(&mut self, finisher: Side) {
        self.target += OVERTIME_CUPS;
        self.period += 1;
        self.finish = None;
        self.revenge_throws = 0;
        self.grace_used = false;
        self.round += 1;
        self.throws_in_round = 0;
        self.hits_in_round = 0;
        self.active = finisher;
        self.opener = finisher;
    }

    fn pass(&mut self) {
        self.active = self.active.flip();
        self.throws_in_round = 0;
        self.hits_in_round = 0;
        if self.active == self.opener {
            self.round += 1;
        }
    }
}

impl Rules for Solo {
    fn start(side: Side) -> Self {
        Self {
            hits: [0, 0],
            target: TARGET,
            period: 0,
            round: 1,
            throws_in_round: 0,
            hits_in_round: 0,
            active: side,
            opener: side,
            throws: 0,
            finish: None,
            revenge_throws: 0,
            grace_used: false,
            stamp: None,
            winner: None,
        }
    }

    fn roster() -> usize {
        1
    }

    fn act(&mut self, throw: &Throw) {
        debug_assert!(self.winner.is_none(), "throw applied after game end");
        let side = throw.shooter.side;
        let hit = throw.outcome.is_hit();
        self.throws += 1;
        self.throws_in_round += 1;
        if hit {
            self.hits[side.index()] += 1;
            self.hits_in_round += 1;
        }
        self.stamp = Some(Stamp {
            round: self.round,
            throw_in_round: self.throws_in_round,
            cups_left: self.cups_left(side),
            cups_hit: self.hits[side.index()],
        });
        match self.finish {
            Some(finish) => self.revenge(side, hit, finish),
            None => self.settle(side, hit),
        }
    }

    fn turn(&self) -> Turn {
        match self.winner {
            Some(_) => Turn::Terminal,
            None => Turn::Choice(self.active),
        }
    }

    fn may_throw(&self, shooter: Shooter) -> bool {
        self.winner.is_none() && shooter.side == self.active && shooter.slot == 0
    }

    fn score(&self) -> (Cups, Cups) {
        (self.hits[0], self.hits[1])
    }

    fn winner(&self) -> Option<Side> {
        self.winner
    }

    fn marks(&self, game: u8) -> Option<Marks> {
        self.stamp.map(|s| Marks {
            game,
            round: s.round,
            throw_in_round: s.throw_in_round,
            cups_left: s.cups_left,
            cups_hit: s.cups_hit,
        })
    }
}

impl std::fmt::Display for Solo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:>2}-{:<2} to {} r{} {}",
            self.hits[0], self.hits[1], self.target, self.round, self.turn()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::throw::Outcome;

    fn home() -> Shooter {
        Shooter::new(Side::Home, 0)
    }
    fn away() -> Shooter {
        Shooter::new(Side::Away, 0)
    }

    fn toss(solo: &mut Solo, outcome: Outcome, shooter: Shooter) {
        assert!(solo.may_throw(shooter), "illegal throw by {}", shooter);
        solo.act(&Throw::new(outcome, shooter));
    }

    /// Home hits every throw, away misses every throw, until home's finish
    /// is pending. Returns the state at the start of away's revenge.
    fn sweep() -> Solo {
        let mut solo = Solo::start(Side::Home);
        while solo.finish.is_none() {
            let side = solo.turn().side().expect("live game");
            let outcome = match side {
                Side::Home => Outcome::Hit,
                Side::Away => Outcome::Miss,
            };
            let shooter = Shooter::new(side, 0);
            toss(&mut solo, outcome, shooter);
        }
        solo
    }

    #[test]
    fn round_one_is_single_alternating_throws() {
        let mut solo = Solo::start(Side::Away);
        assert_eq!(solo.turn(), Turn::Choice(Side::Away));
        toss(&mut solo, Outcome::Hit, away());
        assert_eq!(solo.turn(), Turn::Choice(Side::Home));
        assert_eq!(solo.round(), 1);
        toss(&mut solo, Outcome::Hit, home());
        // both sides have thrown: round 2, two throws each
        assert_eq!(solo.round(), 2);
        assert_eq!(solo.turn(), Turn::Choice(Side::Away));
        toss(&mut solo, Outcome::Miss, away());
        assert_eq!(solo.turn(), Turn::Choice(Side::Away));
        toss(&mut solo, Outcome::Miss, away());
        assert_eq!(solo.turn(), Turn::Choice(Side::Home));
    }

    #[test]
    fn bonus_throw_after_two_hits_in_round() {
        let mut solo = Solo::start(Side::Home);
        toss(&mut solo, Outcome::Miss, home());
        toss(&mut solo, Outcome::Miss, away());
        // round 2: home hits twice, earning a third throw
        toss(&mut solo, Outcome::Hit, home());
        toss(&mut solo, Outcome::Hit, home());
        assert_eq!(solo.turn(), Turn::Choice(Side::Home));
        toss(&mut solo, Outcome::Hit, home());
        assert_eq!(solo.turn(), Turn::Choice(Side::Away));
        assert_eq!(solo.score(), (3, 0));
    }

    #[test]
    fn sweep_finishes_at_the_minimum_throw_count() {
        let solo = sweep();
        assert_eq!(solo.score(), (TARGET, 0));
        assert_eq!(solo.throws as usize, SOLO_MIN_THROWS);
        assert_eq!(solo.finisher(), Some(Side::Home));
        assert_eq!(solo.winner(), None);
        // revenge runs at the next round, opponent up
        assert_eq!(solo.turn(), Turn::Choice(Side::Away));
    }

    #[test]
    fn failed_revenge_confirms_the_finish() {
        let mut solo = sweep();
        let used = solo.finish().expect("pending finish").used;
        assert_eq!(used, 3);
        // away is owed exactly `used` throws; all missed
        for _ in 0..used {
            assert_eq!(solo.winner(), None);
            toss(&mut solo, Outcome::Miss, away());
        }
        assert_eq!(solo.winner(), Some(Side::Home));
        assert_eq!(solo.turn(), Turn::Terminal);
    }

    #[test]
    fn nine_hits_do_not_finish() {
        let mut solo = Solo::start(Side::Home);
        // round 1
        toss(&mut solo, Outcome::Hit, home());
        toss(&mut solo, Outcome::Miss, away());
        // rounds 2-3: home goes 3 for 3, away misses out
        for _ in 0..2 {
            for _ in 0..3 {
                toss(&mut solo, Outcome::Hit, home());
            }
            toss(&mut solo, Outcome::Miss, away());
            toss(&mut solo, Outcome::Miss, away());
        }
        // round 4: hit, hit, then a miss on the bonus throw: 9 hits total
        toss(&mut solo, Outcome::Hit, home());
        toss(&mut solo, Outcome::Hit, home());
        toss(&mut solo, Outcome::Miss, home());
        assert_eq!(solo.score(), (9, 0));
        assert!(solo.throws as usize >= SOLO_MIN_THROWS);
        assert_eq!(solo.finisher(), None);
        assert_eq!(solo.winner(), None);
        assert_eq!(solo.turn(), Turn::Choice(Side::Away));
    }

    #[test]
    fn revenge_streak_keeps_the_throw() {
        let mut solo = sweep();
        // hits keep the revenge alive past the guaranteed allotment
        for _ in 0..5 {
            toss(&mut solo, Outcome::Hit, away());
            assert_eq!(solo.winner(), None);
            assert_eq!(solo.turn(), Turn::Choice(Side::Away));
        }
    }

    #[test]
    fn revenge_tie_escalates_the_target() {
        let mut solo = sweep();
        for _ in 0..TARGET {
            toss(&mut solo, Outcome::Hit, away());
        }
        assert_eq!(solo.score(), (TARGET, TARGET));
        assert_eq!(solo.target(), TARGET + OVERTIME_CUPS);
        assert_eq!(solo.period(), 1);
        assert_eq!(solo.finisher(), None);
        // the side that had finished opens the overtime rounds
        assert_eq!(solo.turn(), Turn::Choice(Side::Home));
    }

    #[test]
    fn overtime_finish_requires_the_escalated_target() {
        let mut solo = sweep();
        for _ in 0..TARGET {
            toss(&mut solo, Outcome::Hit, away());
        }
        // home needs 13 now; 3 straight hits re-finish
        toss(&mut solo, Outcome::Hit, home());
        toss(&mut solo, Outcome::Hit, home());
        assert_eq!(solo.finisher(), None);
        toss(&mut solo, Outcome::Hit, home());
        assert_eq!(solo.score(), (TARGET + OVERTIME_CUPS, TARGET));
        assert_eq!(solo.finisher(), Some(Side::Home));
        assert_eq!(solo.turn(), Turn::Choice(Side::Away));
    }

    #[test]
    fn last_cup_miss_gets_one_retry() {
        let mut solo = sweep();
        let used = solo.finish().expect("pending finish").used;
        assert_eq!(used, 3);
        // away claws back to one cup short, then misses twice
        for _ in 0..TARGET - 1 {
            toss(&mut solo, Outcome::Hit, away());
        }
        assert_eq!(solo.cups_left(Side::Away), 1);
        toss(&mut solo, Outcome::Miss, away());
        assert_eq!(solo.winner(), None);
        toss(&mut solo, Outcome::Miss, away());
        assert_eq!(solo.winner(), Some(Side::Home));
    }

    #[test]
    fn marks_follow_the_thrower() {
        let mut solo = Solo::start(Side::Home);
        toss(&mut solo, Outcome::Hit, home());
        let marks = solo.marks(1).expect("stamped");
        assert_eq!(marks.round, 1);
        assert_eq!(marks.throw_in_round, 1);
        assert_eq!(marks.cups_hit, 1);
        assert_eq!(marks.cups_left, TARGET - 1);
        toss(&mut solo, Outcome::Miss, away());
        let marks = solo.marks(1).expect("stamped");
        assert_eq!(marks.cups_hit, 0);
        assert_eq!(marks.cups_left, TARGET);
    }
}
