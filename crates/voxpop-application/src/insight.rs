//! Transcript summarization, analysis, hypothesis, and final synthesis.

use crate::report::{FINAL_ANALYSIS, INITIAL_ANALYSIS};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use voxpop_core::error::Result;
use voxpop_core::gateway::{Gateway, UsageMeter};
use voxpop_core::interview::{QuestionResult, transcript_text};
use voxpop_core::persona::Persona;
use voxpop_core::project::ProjectInfo;
use voxpop_core::questions::extract_question_lines;

/// Summaries compress faithfully rather than creatively.
pub const SUMMARY_TEMPERATURE: f32 = 0.5;
/// Reports and hypotheses are allowed to interpret.
pub const ANALYSIS_TEMPERATURE: f32 = 0.8;

/// Upper bound on verification questions carried into the second round.
pub const MAX_VERIFICATION_QUESTIONS: usize = 8;

/// Fallback second-round questions used when none can be extracted from
/// the hypothesis text.
pub const DEFAULT_VERIFICATION_QUESTIONS: &[&str] = &[
    "Earlier you described how you use this product. If it improved in the one way that matters most to you, what would that be?",
    "You mentioned what you currently pay for alternatives. At what price would this stop feeling worth it?",
    "Thinking about the people around you, who would you recommend this to, and how would you describe it to them?",
    "What would have to be true for you to switch from what you use today?",
    "Is there anything about the product's claims that you simply do not believe? Why?",
];

static VERIFICATION_SECTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)verification\s+questions?[^\n]*\n(.*)$").unwrap());

/// A proposed marketing hypothesis plus the questions to verify it.
///
/// `degraded` is set when the verification questions are the built-in
/// fallback rather than ones extracted from the generated text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub text: String,
    pub questions: Vec<String>,
    pub degraded: bool,
}

/// Turns accumulated transcripts into summaries, reports, and hypotheses.
#[derive(Debug, Default, Clone, Copy)]
pub struct Synthesizer;

impl Synthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Summarizes one persona's accumulated transcript, preserving the
    /// motivations and objections the analysis prompts feed on.
    pub async fn summarize(
        &self,
        gateway: &Gateway,
        meter: &UsageMeter,
        persona: &Persona,
        results: &[QuestionResult],
    ) -> Result<String> {
        let prompt = format!(
            "You are a qualitative researcher. Summarize the interview below, \
             preserving the respondent's motivations, emotions, and decision \
             criteria. Keep the concrete details that reveal needs or \
             objections; drop pleasantries.\n\n\
             --- Respondent profile ---\n{}\n\n\
             --- Interview transcript ---\n{}",
            persona.raw_text,
            transcript_text(results)
        );
        gateway
            .generate_prompt(&prompt, SUMMARY_TEMPERATURE, meter)
            .await
    }

    /// Produces the first-round analysis report from labeled summaries.
    pub async fn analyze(
        &self,
        gateway: &Gateway,
        meter: &UsageMeter,
        project: &ProjectInfo,
        summaries: &[(String, String)],
    ) -> Result<String> {
        let mut blocks = vec![("Market context".to_string(), project.market_context())];
        for (name, summary) in summaries {
            blocks.push((format!("Interview summary: {name}"), summary.clone()));
        }
        gateway
            .generate_prompt(&INITIAL_ANALYSIS.render(&blocks), ANALYSIS_TEMPERATURE, meter)
            .await
    }

    /// Derives marketing hypotheses and second-round verification
    /// questions from the first-round report.
    pub async fn hypothesize(
        &self,
        gateway: &Gateway,
        meter: &UsageMeter,
        project: &ProjectInfo,
        initial_analysis: &str,
    ) -> Result<Hypothesis> {
        let prompt = format!(
            "You are a marketing strategy planner. Based on the research \
             report below, propose the marketing hypotheses most worth \
             betting on, then list the interview questions needed to verify \
             them with the same respondents.\n\n\
             --- Market context ---\n{}\n\n\
             --- Research report ---\n{initial_analysis}\n\n\
             Output format:\n\
             **Marketing Hypotheses**\n\
             - one hypothesis per line\n\
             **Verification Questions**\n\
             - one question per line",
            project.market_context()
        );
        let text = gateway
            .generate_prompt(&prompt, ANALYSIS_TEMPERATURE, meter)
            .await?;

        let mut questions = extract_verification_questions(&text);
        let degraded = questions.is_empty();
        if degraded {
            tracing::warn!(
                target: "insight",
                "no verification questions could be extracted, using the fallback set"
            );
            questions = DEFAULT_VERIFICATION_QUESTIONS
                .iter()
                .map(|q| q.to_string())
                .collect();
        }

        Ok(Hypothesis {
            text,
            questions,
            degraded,
        })
    }

    /// Produces the final report after the hypothesis-verification round.
    pub async fn finalize(
        &self,
        gateway: &Gateway,
        meter: &UsageMeter,
        project: &ProjectInfo,
        hypothesis: &str,
        summaries: &[(String, String)],
    ) -> Result<String> {
        let mut blocks = vec![
            ("Market context".to_string(), project.market_context()),
            ("Tested hypothesis".to_string(), hypothesis.to_string()),
        ];
        for (name, summary) in summaries {
            blocks.push((format!("Full interview summary: {name}"), summary.clone()));
        }
        gateway
            .generate_prompt(&FINAL_ANALYSIS.render(&blocks), ANALYSIS_TEMPERATURE, meter)
            .await
    }
}

/// Pulls verification questions out of hypothesis text.
///
/// Prefers the listed lines under a "Verification Questions" heading; if
/// the heading is missing, falls back to any listed lines in the whole
/// text. The result is capped at `MAX_VERIFICATION_QUESTIONS`.
fn extract_verification_questions(text: &str) -> Vec<String> {
    let scope = VERIFICATION_SECTION_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map_or(text, |section| section.as_str());

    let mut questions = extract_question_lines(scope);
    questions.truncate(MAX_VERIFICATION_QUESTIONS);
    questions
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use voxpop_core::gateway::{GenerationRequest, ProviderResult, TextGenerator};

    struct Fixed(&'static str);

    #[async_trait]
    impl TextGenerator for Fixed {
        async fn generate(&self, _request: &GenerationRequest) -> ProviderResult {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn extraction_prefers_the_labeled_section() {
        let text = "**Marketing Hypotheses**\n\
                    - Convenience beats price for this segment\n\
                    **Verification Questions**\n\
                    - How often did convenience decide your last purchase?\n\
                    - What price increase would you tolerate for delivery?\n";

        let questions = extract_verification_questions(text);
        assert_eq!(questions.len(), 2);
        assert!(questions[0].starts_with("How often"));
    }

    #[test]
    fn extraction_falls_back_to_any_listed_lines() {
        let text = "Some prose without headings.\n\
                    1. Would you pay extra for same-day delivery?\n\
                    2. What almost stopped your last purchase?\n";

        let questions = extract_verification_questions(text);
        assert_eq!(questions.len(), 2);
    }

    #[test]
    fn extraction_is_bounded() {
        let mut text = String::from("**Verification Questions**\n");
        for i in 0..12 {
            text.push_str(&format!("- Question number {i} about buying habits?\n"));
        }
        assert_eq!(
            extract_verification_questions(&text).len(),
            MAX_VERIFICATION_QUESTIONS
        );
    }

    #[tokio::test]
    async fn hypothesize_extracts_questions_when_present() {
        let gateway = Gateway::new(Arc::new(Fixed(
            "**Marketing Hypotheses**\n- Price is secondary\n\
             **Verification Questions**\n- What did you pay last time, and did it matter?\n",
        )));
        let meter = UsageMeter::new();

        let hypothesis = Synthesizer::new()
            .hypothesize(
                &gateway,
                &meter,
                &ProjectInfo::with_topic("coffee"),
                "initial report",
            )
            .await
            .unwrap();

        assert!(!hypothesis.degraded);
        assert_eq!(hypothesis.questions.len(), 1);
        assert!(hypothesis.text.contains("Price is secondary"));
    }

    #[tokio::test]
    async fn hypothesize_degrades_to_the_fallback_set() {
        let gateway = Gateway::new(Arc::new(Fixed(
            "The respondents were interesting but nothing is listed here.",
        )));
        let meter = UsageMeter::new();

        let hypothesis = Synthesizer::new()
            .hypothesize(
                &gateway,
                &meter,
                &ProjectInfo::with_topic("coffee"),
                "initial report",
            )
            .await
            .unwrap();

        assert!(hypothesis.degraded);
        assert_eq!(
            hypothesis.questions.len(),
            DEFAULT_VERIFICATION_QUESTIONS.len()
        );
    }
}
