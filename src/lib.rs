//! An in-memory, score-proximity matchmaking engine.
//!
//! Players announce themselves with an id and a numeric skill score;
//! a periodic matching pass forms fixed-size groups of players whose
//! scores are close, widening the acceptable score window the longer
//! a player has been waiting. The core — [`engine::TimeScoreGrid`],
//! [`engine::WaitEstimator`], [`engine::Group`] and [`engine::Matcher`]
//! — holds no clock and no lock; [`facade::ServerFacade`] adds both so
//! the HTTP layer in [`http`] can drive it safely from concurrent
//! request handlers.
//!
//! # Quick start
//!
//! ```rust
//! use gridmatch::engine::Matcher;
//!
//! let mut matcher = Matcher::new(180, 300, 10).unwrap();
//! matcher.join_queue("alice", 0, 100).unwrap();
//! matcher.join_queue("bob", 0, 102).unwrap();
//! matcher.run_match(0, 2);
//! assert_eq!(matcher.get_matched_players("alice").unwrap(), vec!["alice", "bob"]);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod facade;
pub mod http;

pub use error::{MatchError, Result};
pub use facade::ServerFacade;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
