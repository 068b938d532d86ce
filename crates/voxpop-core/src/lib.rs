//! Core domain for VOXPOP, the persona-based synthetic-interview system.
//!
//! This crate holds everything the orchestration needs that is independent
//! of any transport or concrete provider: the error taxonomy, the text
//! generation gateway, persona parsing, conversation sessions, project
//! context, per-session state, and the run history.

pub mod conversation;
pub mod error;
pub mod gateway;
pub mod history;
pub mod interview;
pub mod persona;
pub mod project;
pub mod questions;
pub mod session;

// Re-export common error type
pub use error::{Result, VoxError};
