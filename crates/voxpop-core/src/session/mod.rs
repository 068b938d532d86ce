//! Session domain module.
//!
//! - `model`: per-project mutable state (`ProjectSession`)
//! - `store`: the keyed registry of live sessions (`SessionStore`)

mod model;
mod store;

pub use model::{PersonaInterview, ProjectSession, SELECTION_SIZE, SessionStats, SessionStatus};
pub use store::SessionStore;
