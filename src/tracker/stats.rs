use super::rules::Rules;
use super::series::Series;
use super::throw::Shooter;
use super::throw::Throw;
use std::collections::BTreeMap;

/// Made/attempted tally for one shooter. Read-only projection, rebuildable
/// from the log at any time; never authoritative for game state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accuracy {
    pub made: u16,
    pub taken: u16,
}

impl Accuracy {
    pub fn pct(&self) -> f32 {
        match self.taken {
            0 => 0.0,
            taken => self.made as f32 / taken as f32 * 100.0,
        }
    }
}

impl std::fmt::Display for Accuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({:.0}%)", self.made, self.taken, self.pct())
    }
}

/// Per-shooter accuracy lines for one log.
pub fn accuracy(log: &[Throw]) -> BTreeMap<Shooter, Accuracy> {
    let mut lines: BTreeMap<Shooter, Accuracy> = BTreeMap::new();
    for throw in log {
        let line = lines.entry(throw.shooter).or_default();
        line.taken += 1;
        if throw.outcome.is_hit() {
            line.made += 1;
        }
    }
    lines
}

/// Running raw score after each throw: cumulative hits per side by log
/// position, exactly what the score strip under each throw shows.
pub fn timeline(log: &[Throw]) -> Vec<(u16, u16)> {
    let mut home = 0u16;
    let mut away = 0u16;
    log.iter()
        .map(|throw| {
            if throw.outcome.is_hit() {
                match throw.shooter.side.index() {
                    0 => home += 1,
                    _ => away += 1,
                }
            }
            (home, away)
        })
        .collect()
}

/// The throw strip grouped into team volleys: consecutive same-side runs,
/// never longer than the three-throw turn.
pub fn volleys(log: &[Throw]) -> Vec<&[Throw]> {
    let mut groups = Vec::new();
    let mut start = 0;
    for i in 1..=log.len() {
        let split = i == log.len()
            || log[i].shooter.side != log[start].shooter.side
            || i - start >= 3;
        if split {
            groups.push(&log[start..i]);
            start = i;
        }
    }
    groups
}

impl<R: Rules> Series<R> {
    /// Cross-game accuracy totals: archived games plus the active one.
    pub fn totals(&self) -> BTreeMap<Shooter, Accuracy> {
        let mut lines: BTreeMap<Shooter, Accuracy> = BTreeMap::new();
        for log in self.logs() {
            for (shooter, line) in accuracy(log) {
                let total = lines.entry(shooter).or_default();
                total.made += line.made;
                total.taken += line.taken;
            }
        }
        lines
    }
}
