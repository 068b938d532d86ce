//! Interview question sets: the built-in default guide, extraction of
//! generated question lines, and filtering of uploaded rows.

use once_cell::sync::Lazy;
use regex::Regex;

/// Built-in interview guide used when question generation is unavailable
/// or yields too few usable lines.
pub const DEFAULT_QUESTIONS: &[&str] = &[
    "Please give a short introduction of yourself (age, where you live, occupation, family).",
    "How do you usually spend your weekends, and with whom?",
    "What are you currently into, or looking forward to?",
    "How much do you spend on dining out, leisure, and hobbies, and how do you decide what deserves the money?",
    "When did you first come into contact with this kind of product or service? What was that experience like?",
    "How often have you used it over the past year, with whom, and for what purpose?",
    "Walk me through a typical occasion from start to finish.",
    "Which brands do you usually pick, and why those?",
    "In what situations do you feel the urge to use it?",
    "Besides the obvious use, is there anything else you do with it?",
    "How does using it make you feel?",
    "Does the way you use it change depending on who you are with?",
    "How would you compare it with the alternatives you could use instead?",
    "Do you ever use it alone? What is the mood or purpose then?",
    "If it disappeared tomorrow, would that be a problem for you? Why?",
    "How do the brands you know differ in facilities, cleanliness, service, and price?",
    "What new feature or improvement would genuinely excite you?",
    "Has a change in your life (moving, job, family) changed how you use it?",
    "Do you expect to keep using it as your life stage changes?",
    "Is there anything about it you have never told anyone but that bugs you?",
];

/// Minimum number of usable generated lines before the built-in set is
/// substituted instead.
pub const MIN_GENERATED_QUESTIONS: usize = 15;

/// Rows and lines shorter than this are treated as noise, not questions.
pub const MIN_QUESTION_CHARS: usize = 5;

static QUESTION_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(?:Q?\d+[:.)]|#+|[*-])\s*(.+)$").unwrap());

/// Extracts question lines from generated text: numbered (`1.`, `Q3:`),
/// heading (`##`), or bulleted (`-`, `*`) lines, trimmed and de-noised.
pub fn extract_question_lines(text: &str) -> Vec<String> {
    QUESTION_LINE_RE
        .captures_iter(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|line| line.chars().count() >= MIN_QUESTION_CHARS)
        .collect()
}

/// Filters first-column spreadsheet rows down to usable questions: trims
/// whitespace, drops blanks, spreadsheet NaN artifacts, and rows too short
/// to be a question.
pub fn filter_question_rows<I, S>(rows: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    rows.into_iter()
        .filter_map(|row| {
            let cell = row.as_ref().trim();
            if cell.is_empty()
                || cell.eq_ignore_ascii_case("nan")
                || cell.eq_ignore_ascii_case("null")
                || cell.chars().count() < MIN_QUESTION_CHARS
            {
                None
            } else {
                Some(cell.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_set_has_twenty_entries() {
        assert_eq!(DEFAULT_QUESTIONS.len(), 20);
    }

    #[test]
    fn extraction_handles_numbered_heading_and_bulleted_lines() {
        let text = "Here are the questions:\n\
            1. How often do you brew coffee at home?\n\
            Q2: What equipment do you own?\n\
            ## Where did you learn to brew?\n\
            - What would make you switch methods?\n\
            not a list line\n";

        let questions = extract_question_lines(text);
        assert_eq!(questions.len(), 4);
        assert_eq!(questions[0], "How often do you brew coffee at home?");
        assert_eq!(questions[2], "Where did you learn to brew?");
    }

    #[test]
    fn uploaded_rows_are_filtered_to_usable_questions() {
        let rows = ["", "  ", "Why do you use this product?", "nan"];
        let questions = filter_question_rows(rows);
        assert_eq!(questions, vec!["Why do you use this product?".to_string()]);
    }

    #[test]
    fn short_rows_and_null_artifacts_are_dropped() {
        let rows = ["ok?", "NULL", "NaN", "What changed since last year?"];
        let questions = filter_question_rows(rows);
        assert_eq!(questions, vec!["What changed since last year?".to_string()]);
    }
}
