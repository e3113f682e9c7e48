//! Game rules on top of the core data structures.
//!
//! - [`PairGenerator`] - Colors of upcoming pairs (seeded or scripted)
//! - [`ChainController`] - Step-wise gravity and clear cascade after a lock
//! - [`GameSession`] - Session state machine: input, timing, spawning, game over
//! - [`GameStats`] - Score, locked pairs and chain statistics
//! - [`SessionConfig`] - Palette and timing settings
//! - [`GameEvent`] / [`Command`] / [`SessionSnapshot`] - What presentation and input layers exchange with a session
//!
//! # Game Flow
//!
//! 1. Create a [`GameSession`]; it starts in [`SessionState::Ready`] with the first pair spawned
//! 2. [`GameSession::start`], then move and rotate the falling pair
//! 3. The pair locks on a hard drop or when the automatic fall is blocked
//! 4. [`GameSession::tick`] runs the chain resolution with presentation delays
//! 5. The next pair spawns; the game ends when it has no room
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use rensa_engine::{Command, GameSession, ResolveDelays, SessionConfig};
//!
//! let config = SessionConfig {
//!     delays: ResolveDelays::NONE,
//!     ..SessionConfig::default()
//! };
//! let mut session = GameSession::new(config).unwrap();
//! session.apply(Command::TogglePause).unwrap();
//!
//! while !session.state().is_game_over() {
//!     session.apply(Command::HardDrop).unwrap();
//!     session.tick(Duration::ZERO);
//! }
//! assert!(session.stats().locked_pairs() >= 6);
//! ```

pub use self::{
    chain::*, command::*, config::*, event::*, game_session::*, game_stats::*, pair_generator::*,
    snapshot::*,
};

mod chain;
mod command;
mod config;
mod event;
mod game_session;
mod game_stats;
mod pair_generator;
mod snapshot;
