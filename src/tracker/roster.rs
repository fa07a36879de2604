use super::side::Side;
use super::throw::Shooter;
use serde::Deserialize;
use serde::Serialize;

/// Player labels per side: one for solo, two for duo. Purely presentational;
/// the engine identifies players by [`Shooter`] alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    home: Vec<String>,
    away: Vec<String>,
}

impl Roster {
    pub fn solo(home: &str, away: &str) -> Self {
        Self {
            home: vec![home.to_string()],
            away: vec![away.to_string()],
        }
    }
    pub fn duo(home: [&str; 2], away: [&str; 2]) -> Self {
        Self {
            home: home.iter().map(|s| s.to_string()).collect(),
            away: away.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn side(&self, side: Side) -> &[String] {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    /// Falls back to the shooter's own notation for out-of-roster slots.
    pub fn label(&self, shooter: Shooter) -> String {
        self.side(shooter.side)
            .get(shooter.slot)
            .cloned()
            .unwrap_or_else(|| shooter.to_string())
    }
}
