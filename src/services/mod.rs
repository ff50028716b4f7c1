//! Service layer for dataset-verify
//!
//! This module contains service types that separate infrastructure concerns
//! (file access, directory moves, progress output) from validation logic.

pub mod io;
pub mod progress;
pub mod quarantine;

pub use io::ImageIOService;
pub use progress::{
    CompletionStats, ConsoleProgressReporter, NoOpProgressReporter, ProgressReporter,
    ValidationStage, WalkProgress,
};
pub use quarantine::QuarantineService;
