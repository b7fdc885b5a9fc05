//! Iterative research workflow
//!
//! - [`state`]: rounds, analyses and the final result
//! - [`progress`]: notification sink for UIs
//! - [`orchestrator`]: the round state machine

pub mod orchestrator;
pub mod progress;
pub mod state;

pub use orchestrator::{ResearchOptions, ResearchOrchestrator, ResearchPhase};
pub use progress::{ProgressReporter, ProgressUpdate};
pub use state::{collect_sources, AnalysisResult, ContentMap, ResearchResult, ResearchRound};
