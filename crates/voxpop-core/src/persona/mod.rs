//! Persona domain module.
//!
//! - `model`: the `Persona` record and its attribute vocabulary
//! - `parser`: layered extraction of personas from generated text

mod model;
mod parser;

pub use model::{ATTRIBUTE_VOCABULARY, PERSONA_MARKER, Persona, normalize_attribute_key};
pub use parser::parse_personas;
