//! Interview result records and phases.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Which interview round a batch of questions belongs to.
///
/// The two rounds are structurally identical; the hypothesis-verification
/// round frames its follow-up probes around validating a stated hypothesis
/// instead of generic curiosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum InterviewPhase {
    Initial,
    HypothesisVerification,
}

/// A dynamically generated probe and the persona's answer to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUp {
    pub question: String,
    pub answer: String,
}

/// The outcome of one primary question: the main answer plus the bounded
/// list of follow-up probes that were completed before the loop ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question: String,
    pub main_answer: String,
    pub follow_ups: Vec<FollowUp>,
}

/// Renders an accumulated transcript the way synthesis prompts consume it.
pub fn transcript_text(results: &[QuestionResult]) -> String {
    let mut out = String::new();
    for result in results {
        out.push_str(&format!("Question: {}\n", result.question));
        out.push_str(&format!("Answer: {}\n", result.main_answer));
        for follow_up in &result.follow_ups {
            out.push_str(&format!("Follow-up: {}\n", follow_up.question));
            out.push_str(&format!("Follow-up answer: {}\n", follow_up.answer));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_interleaves_follow_ups_in_order() {
        let results = vec![QuestionResult {
            question: "Describe your morning routine".to_string(),
            main_answer: "Coffee first, always.".to_string(),
            follow_ups: vec![FollowUp {
                question: "Could you tell me more about the coffee?".to_string(),
                answer: "Pour-over, single origin.".to_string(),
            }],
        }];

        let text = transcript_text(&results);
        let q = text.find("Question:").unwrap();
        let a = text.find("Answer:").unwrap();
        let f = text.find("Follow-up:").unwrap();
        assert!(q < a && a < f);
    }
}
