//! Orchestration layer for VOXPOP.
//!
//! Composes the core domain into the research flow: persona generation
//! and selection, the interview guide, the two interview rounds with
//! follow-up probing, and the synthesis chain (summaries, analysis,
//! hypothesis, final report). `usecase::InterviewUseCase` is the single
//! entry point callers drive.

pub mod insight;
pub mod interview;
pub mod questions;
pub mod report;
pub mod usecase;

pub use usecase::InterviewUseCase;
