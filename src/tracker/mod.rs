pub mod duo;
pub use duo::*;

pub mod game;
pub use game::*;

pub mod phase;
pub use phase::*;

pub mod roster;
pub use roster::*;

pub mod rules;
pub use rules::*;

pub mod series;
pub use series::*;

pub mod side;
pub use side::*;

pub mod solo;
pub use solo::*;

pub mod stats;
pub use stats::*;

pub mod throw;
pub use throw::*;

pub mod turn;
pub use turn::*;
