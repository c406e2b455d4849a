//! Core domain logic for the ward simulation training tool: the scenario
//! data model, the keyword response evaluator, the countdown timer, and the
//! playback engine that drives one learner session from start to result.

pub mod engine;
pub mod evaluator;
pub mod repository;
pub mod result;
pub mod scenario;
pub mod timer;
