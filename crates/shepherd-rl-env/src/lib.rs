//! Environment-facing pieces of the shepherd training loop
//!
//! - [`MissionLifecycle`]: bounded-retry mission start and begin polling
//! - [`CoordinateCorrector`]: snaps a drifting agent back onto the grid
//! - [`ActionTable`]: action id to command-sequence translation
//! - [`farm`]: in-process farm simulator implementing both collaborator traits

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod commands;
pub mod correction;
pub mod farm;
pub mod lifecycle;

pub use commands::{ActionCommand, ActionTable, Heading};
pub use correction::CoordinateCorrector;
pub use farm::{FarmHost, FarmMission, FarmWorld};
pub use lifecycle::{LifecycleTiming, MissionAttempt, MissionLifecycle, MissionStatus};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ActionTable, CoordinateCorrector, FarmHost, FarmMission, FarmWorld, MissionLifecycle,
    };
    pub use shepherd_rl_core::prelude::*;
}
