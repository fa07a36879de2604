use super::phase::Phase;
use super::phase::Rebuttal;
use super::rules::Rules;
use super::side::Side;
use super::throw::Outcome;
use super::throw::Shooter;
use super::throw::Throw;
use super::turn::Turn;
use crate::Cups;
use crate::OVERTIME_CUPS;
use crate::TARGET;
use serde::Deserialize;
use serde::Serialize;

/// 2v2 rule state.
///
/// A turn is two throws, with a third bonus throw when the first two both
/// hit; teammates alternate within the turn. The very first throw of the
/// game is a lone serve that always passes to the other side. Reaching the
/// cup target while the opponent is below it opens a return serve; a failed
/// return serve is the only way a duo game ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duo {
    score: [Cups; 2],
    phase: Phase,
    active: Side,
    /// False until the opening serve has been taken.
    opened: bool,
    throws_in_turn: u8,
    hits_in_turn: u8,
    last_thrower: Option<Shooter>,
    /// Last overtime shooter to hit; stale values are kept on purpose, see
    /// `may_throw`.
    last_ot_thrower: Option<Shooter>,
    period: u8,
    winner: Option<Side>,
}

impl Duo {
    pub fn phase(&self) -> &Phase {
        &self.phase
    }
    pub fn period(&self) -> u8 {
        self.period
    }
    /// Cups the trailing side still needs, while a return serve is live.
    pub fn rebuttal(&self) -> Option<Cups> {
        match self.phase {
            Phase::ReturnServe { need, .. } => Some(need),
            _ => None,
        }
    }
    /// Main score only, overtime counters excluded.
    pub fn frozen(&self) -> (Cups, Cups) {
        (self.score[0], self.score[1])
    }

    fn regular(&mut self, throw: &Throw) {
        let side = throw.shooter.side;
        if throw.outcome.is_hit() {
            self.score[side.index()] += 1;
            self.hits_in_turn += 1;
        }
        self.throws_in_turn += 1;
        let exit_throw = self.throws_in_turn;
        self.rotate(side, throw.outcome);
        let (home, away) = (self.score[0], self.score[1]);
        if home >= TARGET && away < TARGET {
            self.serve_return(Side::Home, TARGET - away, exit_throw);
        } else if away >= TARGET && home < TARGET {
            self.serve_return(Side::Away, TARGET - home, exit_throw);
        } else if home >= TARGET && away >= TARGET {
            // unreachable through live play; kept so a foreign log can't wedge
            self.phase = Phase::Overtime { home: 0, away: 0 };
            self.period = 1;
            self.fresh_turn();
        }
    }

    fn extra(&mut self, throw: &Throw, mut home: Cups, mut away: Cups) {
        let side = throw.shooter.side;
        if throw.outcome.is_hit() {
            match side {
                Side::Home => home += 1,
                Side::Away => away += 1,
            }
            self.hits_in_turn += 1;
            self.last_ot_thrower = Some(throw.shooter);
            if self.period == 0 {
                self.period = 1;
            }
        }
        self.throws_in_turn += 1;
        let exit_throw = self.throws_in_turn;
        self.phase = Phase::Overtime { home, away };
        self.rotate(side, throw.outcome);
        if home >= OVERTIME_CUPS && away < OVERTIME_CUPS {
            self.fold(home, away);
            self.serve_return(Side::Home, OVERTIME_CUPS - away, exit_throw);
        } else if away >= OVERTIME_CUPS && home < OVERTIME_CUPS {
            self.fold(home, away);
            self.serve_return(Side::Away, OVERTIME_CUPS - home, exit_throw);
        }
    }

    fn rebut(&mut self, throw: &Throw) {
        let Phase::ReturnServe {
            mode,
            need,
            step,
            attempts,
            shooter,
            leader,
        } = self.phase
        else {
            unreachable!("rebut outside return serve");
        };
        let side = throw.shooter.side;
        match mode {
            Rebuttal::Gt3 | Rebuttal::Lte3 => {
                if throw.outcome.is_hit() {
                    self.score[side.index()] += 1;
                    let left = need.saturating_sub(1);
                    if left == 0 {
                        self.overtime(leader);
                    } else {
                        self.phase = Phase::ReturnServe {
                            mode,
                            need: left,
                            step: match mode {
                                Rebuttal::Lte3 => step + 1,
                                _ => step,
                            },
                            attempts,
                            shooter: Some(throw.shooter),
                            leader,
                        };
                    }
                } else {
                    self.winner = Some(leader);
                }
            }
            Rebuttal::OneCupDouble => {
                if throw.outcome.is_hit() {
                    self.score[side.index()] += 1;
                    self.overtime(leader);
                } else {
                    let before = attempts.unwrap_or(match shooter {
                        Some(_) => 1,
                        None => 2,
                    });
                    let left = before.saturating_sub(1);
                    self.phase = Phase::ReturnServe {
                        mode,
                        need,
                        step,
                        attempts: Some(left),
                        shooter: shooter.or(Some(throw.shooter)),
                        leader,
                    };
                    if left == 0 {
                        self.winner = Some(leader);
                    }
                }
            }
        }
        self.fresh_turn();
    }

    /// Turn passing shared by regular play and overtime: stay on throw 1,
    /// stay on throw 2 only when both hit (bonus throw), pass otherwise.
    fn rotate(&mut self, side: Side, outcome: Outcome) {
        match self.throws_in_turn {
            1 => {}
            2 if self.hits_in_turn == 2 && outcome.is_hit() => {}
            _ => {
                self.active = side.flip();
                self.fresh_turn();
            }
        }
    }

    fn serve_return(&mut self, leader: Side, need: Cups, exit_throw: u8) {
        let mode = if need > OVERTIME_CUPS {
            Rebuttal::Gt3
        } else if need == 1 && exit_throw > 1 {
            Rebuttal::OneCupDouble
        } else {
            Rebuttal::Lte3
        };
        let attempts = match mode {
            Rebuttal::OneCupDouble => Some(2),
            _ => None,
        };
        self.phase = Phase::ReturnServe {
            mode,
            need,
            step: 0,
            attempts,
            shooter: None,
            leader,
        };
        self.active = leader.flip();
        self.fresh_turn();
    }

    fn overtime(&mut self, leader: Side) {
        self.phase = Phase::Overtime { home: 0, away: 0 };
        self.period += 1;
        self.active = leader;
        self.fresh_turn();
    }

    fn fold(&mut self, home: Cups, away: Cups) {
        self.score[0] += home;
        self.score[1] += away;
    }

    fn fresh_turn(&mut self) {
        self.throws_in_turn = 0;
        self.hits_in_turn = 0;
    }
}

impl Rules for Duo {
    fn start(side: Side) -> Self {
        Self {
            score: [0, 0],
            phase: Phase::Regular,
            active: side,
            opened: false,
            throws_in_turn: 0,
            hits_in_turn: 0,
            last_thrower: None,
            last_ot_thrower: None,
            period: 0,
            winner: None,
        }
    }

    fn roster() -> usize {
        2
    }

    fn act(&mut self, throw: &Throw) {
        debug_assert!(self.winner.is_none(), "throw applied after game end");
        let side = throw.shooter.side;
        self.last_thrower = Some(throw.shooter);
        if !self.opened {
            if throw.outcome.is_hit() {
                self.score[side.index()] += 1;
            }
            self.opened = true;
            self.fresh_turn();
            self.active = side.flip();
            return;
        }
        match self.phase {
            Phase::ReturnServe { .. } => self.rebut(throw),
            Phase::Overtime { home, away } => self.extra(throw, home, away),
            Phase::Regular => self.regular(throw),
        }
    }

    fn turn(&self) -> Turn {
        match self.winner {
            Some(_) => Turn::Terminal,
            None => Turn::Choice(self.active),
        }
    }

    fn may_throw(&self, s: Shooter) -> bool {
        if self.winner.is_some() || s.side != self.active || s.slot >= Self::roster() {
            return false;
        }
        match &self.phase {
            Phase::ReturnServe {
                mode,
                step,
                attempts,
                shooter,
                ..
            } => match mode {
                Rebuttal::Gt3 => shooter.is_none_or(|last| last != s),
                Rebuttal::Lte3 => *step != 1 || shooter.is_none_or(|last| last != s),
                Rebuttal::OneCupDouble => match attempts.unwrap_or(2) {
                    0 => false,
                    1 => shooter.is_none_or(|last| last != s),
                    _ => true,
                },
            },
            Phase::Overtime { .. } => {
                self.throws_in_turn != 1
                    || self
                        .last_ot_thrower
                        .or(self.last_thrower)
                        .is_none_or(|last| last != s)
            }
            Phase::Regular => {
                !self.opened
                    || self.throws_in_turn != 1
                    || self.last_thrower.is_none_or(|last| last != s)
            }
        }
    }

    fn score(&self) -> (Cups, Cups) {
        match self.phase {
            Phase::Overtime { home, away } => (self.score[0] + home, self.score[1] + away),
            _ => (self.score[0], self.score[1]),
        }
    }

    fn winner(&self) -> Option<Side> {
        self.winner
    }
}

impl std::fmt::Display for Duo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (home, away) = self.score();
        write!(f, "{:>2}-{:<2} {} {}", home, away, self.phase, self.turn())
    }
}
