//! The matchmaking core: `TimeScoreGrid`, `WaitEstimator`, `Group` and
//! the `Matcher` that wires them together. None of this module touches
//! a clock, a socket, or a lock — that's the facade's job.

pub mod estimator;
pub mod grid;
pub mod group;
pub mod matcher;

pub use estimator::WaitEstimator;
pub use grid::TimeScoreGrid;
pub use group::{Group, GroupMember};
pub use matcher::{GroupMatchedCallback, Matcher, ScoreRadiusFn};
