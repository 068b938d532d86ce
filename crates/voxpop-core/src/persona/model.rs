//! Persona domain model.
//!
//! A persona is a synthetic consumer profile generated by the provider and
//! used as the interviewee for the simulated interviews.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The keyword the generation prompt asks the provider to put in front of
/// every persona block (`Persona N: [name]`). All parser strategies key off
/// this marker.
pub const PERSONA_MARKER: &str = "Persona";

/// Controlled attribute vocabulary: canonical key plus the substrings that
/// map a generated label onto it.
pub const ATTRIBUTE_VOCABULARY: &[(&str, &[&str])] = &[
    ("name", &["name"]),
    ("age", &["age"]),
    ("gender", &["gender", "sex"]),
    ("occupation", &["occupation", "job", "profession", "work"]),
    ("income", &["income", "salary", "earning"]),
    ("residence", &["residence", "location", "lives in", "city", "region"]),
    ("family", &["family", "household", "marital"]),
    ("hobbies", &["hobby", "hobbies", "leisure", "pastime", "free time"]),
    ("concerns", &["concern", "worry", "worries", "interest", "pain point"]),
];

/// Unrecognized keys longer than this are dropped instead of retained
/// verbatim; long labels are usually prose that happened to contain a colon.
const MAX_PASSTHROUGH_KEY_CHARS: usize = 40;

/// Maps a generated attribute label onto the controlled vocabulary.
///
/// Returns the canonical key when any vocabulary substring matches, the
/// lowercased label itself when it is short enough to plausibly be a field
/// name, and `None` otherwise.
pub fn normalize_attribute_key(raw: &str) -> Option<String> {
    let lowered = raw.trim().trim_start_matches(['*', '-', '•']).trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }

    for (canonical, needles) in ATTRIBUTE_VOCABULARY {
        if needles.iter().any(|needle| lowered.contains(needle)) {
            return Some((*canonical).to_string());
        }
    }

    if lowered.chars().count() <= MAX_PASSTHROUGH_KEY_CHARS {
        Some(lowered)
    } else {
        None
    }
}

/// A synthetic consumer profile used as an interviewee.
///
/// Attribute extraction is lossy, so `raw_text` keeps the full generated
/// block; downstream prompts re-inject the whole block for fidelity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Position of the persona in its generation batch.
    pub id: usize,
    /// Display name extracted from the generated text.
    pub name: String,
    /// Extracted attributes keyed by the controlled vocabulary.
    pub attributes: BTreeMap<String, String>,
    /// The persona's full untouched generation block.
    pub raw_text: String,
}
