//! Layered persona extraction from generated text.
//!
//! The generator is asked for `Persona N: [name]` blocks but is not
//! contractually bound to that format. Extraction therefore runs an
//! explicit ordered list of strategies, each returning `Option<Vec<Block>>`;
//! the first strategy that finds anything wins, and later strategies only
//! run when the earlier ones found nothing. Format drift degrades the
//! extraction quality, never the pipeline.

use super::model::{PERSONA_MARKER, Persona, normalize_attribute_key};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// A named block-extraction strategy.
struct ExtractionStrategy {
    name: &'static str,
    extract: fn(&str) -> Option<Vec<String>>,
}

const STRATEGIES: &[ExtractionStrategy] = &[
    ExtractionStrategy {
        name: "header-blocks",
        extract: extract_header_blocks,
    },
    ExtractionStrategy {
        name: "marker-split",
        extract: extract_marker_split,
    },
    ExtractionStrategy {
        name: "numbered-list",
        extract: extract_numbered_split,
    },
];

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mi)^[ \t]*[*#\->•]*[ \t]*persona[ \t]*\d+[ \t]*[:.]").unwrap());

// Line-start only: a mid-sentence mention of the marker word inside a
// block must not open a new block.
static MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mi)^[ \t]*[*#\->•]*[ \t]*persona\b").unwrap());

static NUMBERED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*\d+[.)][ \t]+").unwrap());

static NAME_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^persona\s*\d*\s*[:.\-]?\s*(.*)$").unwrap());

static NUMBERED_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[.)]\s*(.+)$").unwrap());

/// Parses loosely-structured generated text into persona records.
///
/// Returns an empty vector only when every strategy found nothing; the
/// caller treats that as a hard failure since selection needs at least 3
/// personas.
pub fn parse_personas(text: &str) -> Vec<Persona> {
    for strategy in STRATEGIES {
        if let Some(blocks) = (strategy.extract)(text) {
            tracing::debug!(
                target: "persona",
                strategy = strategy.name,
                blocks = blocks.len(),
                "persona blocks extracted"
            );
            return blocks
                .iter()
                .enumerate()
                .map(|(index, block)| persona_from_block(index, block))
                .collect();
        }
    }

    tracing::warn!(target: "persona", "no persona blocks found in generated text");
    Vec::new()
}

/// Primary path: `Persona N:` header lines delimit the blocks.
fn extract_header_blocks(text: &str) -> Option<Vec<String>> {
    split_at_match_starts(text, &HEADER_RE, 1)
}

/// Fallback: split where a line opens with the marker keyword.
fn extract_marker_split(text: &str) -> Option<Vec<String>> {
    split_at_match_starts(text, &MARKER_RE, 1)
}

/// Last resort: split on leading numbered-list markers.
fn extract_numbered_split(text: &str) -> Option<Vec<String>> {
    split_at_match_starts(text, &NUMBERED_RE, 2)
}

/// Splits `text` at the start offset of every regex match, discarding the
/// preamble before the first match. Returns `None` unless at least
/// `min_matches` blocks with content remain.
fn split_at_match_starts(text: &str, re: &Regex, min_matches: usize) -> Option<Vec<String>> {
    let starts: Vec<usize> = re.find_iter(text).map(|m| m.start()).collect();
    if starts.len() < min_matches {
        return None;
    }

    let mut blocks = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        let block = text[start..end].trim();
        if !block.is_empty() {
            blocks.push(block.to_string());
        }
    }

    if blocks.is_empty() { None } else { Some(blocks) }
}

/// Strips decorative bullets and markdown emphasis from one line.
fn clean_line(line: &str) -> String {
    line.trim()
        .trim_start_matches(|c: char| matches!(c, '*' | '-' | '•' | '#') || c.is_whitespace())
        .trim_end_matches('*')
        .trim()
        .to_string()
}

fn persona_from_block(index: usize, block: &str) -> Persona {
    let lines: Vec<String> = block.lines().map(clean_line).collect();
    let cleaned_block = lines
        .iter()
        .filter(|line| !line.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join("\n");

    let mut attributes = BTreeMap::new();
    let mut header_name = None;

    for (line_index, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }

        if line_index == 0 {
            if let Some(name) = name_from_header(line) {
                header_name = Some(name);
                continue;
            }
        }

        if let Some((raw_key, raw_value)) = line.split_once(':') {
            let value = raw_value.trim().trim_end_matches('*').trim();
            if value.is_empty() {
                continue;
            }
            if let Some(key) = normalize_attribute_key(raw_key) {
                attributes.entry(key).or_insert_with(|| value.to_string());
            }
        }
    }

    // Explicit name attribute wins, then the header line, then a
    // positional placeholder.
    let name = attributes
        .get("name")
        .cloned()
        .or(header_name)
        .unwrap_or_else(|| format!("{PERSONA_MARKER} {}", index + 1));

    Persona {
        id: index,
        name,
        attributes,
        raw_text: cleaned_block,
    }
}

/// Pulls the display name out of a `Persona N: Name` or `1. Name` line.
fn name_from_header(line: &str) -> Option<String> {
    let candidate = NAME_LINE_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .or_else(|| NUMBERED_NAME_RE.captures(line).and_then(|caps| caps.get(1)))?
        .as_str()
        .trim()
        .trim_matches(|c| matches!(c, '[' | ']' | '"'))
        .trim()
        .to_string();

    if candidate.is_empty() { None } else { Some(candidate) }
}
