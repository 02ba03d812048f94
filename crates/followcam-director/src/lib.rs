//! followcam Director - keeps the spectator camera on the target player
//!
//! Provides the follower task, its events, and the error classification
//! shared with the interactive surface.

pub mod error;
pub mod follower;

pub use error::DirectorError;
pub use follower::{
    FollowEvent, FollowState, Follower, FollowerConfig, SharedCorrections, StopReason,
};
