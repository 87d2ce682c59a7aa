pub mod game;
pub mod picker;
pub mod result;
pub mod state;

pub use game::{GameSession, SessionError, SessionSummary, TickOutcome};
