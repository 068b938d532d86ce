//! Interview guide generation with a built-in fallback.

use serde::{Deserialize, Serialize};
use voxpop_core::gateway::{Gateway, UsageMeter};
use voxpop_core::questions::{DEFAULT_QUESTIONS, MIN_GENERATED_QUESTIONS, extract_question_lines};

const GENERATION_TEMPERATURE: f32 = 0.7;

/// An interview guide plus a flag marking whether it is the built-in
/// fallback rather than freshly generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSet {
    pub questions: Vec<String>,
    pub degraded: bool,
}

/// Generates topic-tailored interview guides, falling back to the
/// built-in set whenever generation fails or yields too little.
#[derive(Debug, Default, Clone, Copy)]
pub struct QuestionService;

impl QuestionService {
    pub fn new() -> Self {
        Self
    }

    /// Produces the default interview guide for `topic`.
    ///
    /// Without a topic there is nothing to tailor, so the built-in set is
    /// returned as-is. With one, generation is attempted and never fails:
    /// a provider error or a thin result both degrade to the built-in set.
    pub async fn default_questions(
        &self,
        gateway: &Gateway,
        meter: &UsageMeter,
        topic: Option<&str>,
    ) -> QuestionSet {
        let Some(topic) = topic else {
            return QuestionSet {
                questions: DEFAULT_QUESTIONS.iter().map(|q| q.to_string()).collect(),
                degraded: false,
            };
        };
        let prompt = format!(
            "You are a marketing researcher. Write 20 questions for a \
             one-on-one depth interview about {topic}, ordered from warm-up \
             profile questions to deeper attitudes, habits, and unmet needs. \
             Output a numbered list with one question per line and nothing \
             else."
        );

        match gateway
            .generate_prompt(&prompt, GENERATION_TEMPERATURE, meter)
            .await
        {
            Ok(text) => {
                let questions = extract_question_lines(&text);
                if questions.len() >= MIN_GENERATED_QUESTIONS {
                    QuestionSet {
                        questions,
                        degraded: false,
                    }
                } else {
                    tracing::warn!(
                        target: "questions",
                        usable = questions.len(),
                        minimum = MIN_GENERATED_QUESTIONS,
                        "generated guide too thin, using the built-in set"
                    );
                    Self::fallback()
                }
            }
            Err(err) => {
                tracing::warn!(
                    target: "questions",
                    error = %err,
                    "question generation failed, using the built-in set"
                );
                Self::fallback()
            }
        }
    }

    fn fallback() -> QuestionSet {
        QuestionSet {
            questions: DEFAULT_QUESTIONS.iter().map(|q| q.to_string()).collect(),
            degraded: true,
        }
    }
}
