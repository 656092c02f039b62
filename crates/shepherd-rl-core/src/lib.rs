//! Core data model and collaborator contracts for the shepherd training loop
//!
//! This crate holds the types every other crate agrees on: observations,
//! actions, transitions, the world-state snapshot reported by a mission host,
//! and the traits the orchestrator drives (`MissionHost`, `World`, `QModel`,
//! `Clock`).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod clock;
pub mod environment;
pub mod error;
pub mod model;
pub mod observation;
pub mod trajectory;
pub mod world;

// Re-export core traits and types
pub use action::{argmax, ActionId};
pub use clock::{Clock, RecordingClock, TokioClock};
pub use environment::{Episode, EpisodeOutcome, MissionHost, StepUpdate, World};
pub use error::{RLError, Result};
pub use model::QModel;
pub use observation::ObservationVector;
pub use trajectory::{GameStatus, Reward, Transition};
pub use world::{Entity, MissionSpec, Position, WorldState};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ActionId, Clock, GameStatus, MissionHost, MissionSpec, ObservationVector, QModel,
        Result, RLError, Transition, World, WorldState,
    };
}
