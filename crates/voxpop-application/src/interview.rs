//! The interview loop: primary questions plus bounded follow-up probing.
//!
//! For each primary question the interviewer asks the persona, then runs a
//! short probe loop: a single-shot prompt turns the latest exchange into
//! one follow-up question, the persona answers it in conversation, and the
//! pair is recorded. The loop is bounded by `follow_up_limit` and degrades
//! rather than fails: a probe that cannot be generated or answered ends
//! the loop for that question only, and the interview moves on.

use tokio_util::sync::CancellationToken;
use voxpop_core::error::{Result, VoxError};
use voxpop_core::gateway::{Gateway, UsageMeter};
use voxpop_core::interview::{FollowUp, InterviewPhase, QuestionResult};
use voxpop_core::session::PersonaInterview;

/// Tunables for one interview run.
#[derive(Debug, Clone, Copy)]
pub struct InterviewConfig {
    /// Maximum follow-up probes per primary question.
    pub follow_up_limit: usize,
    /// Sampling temperature for persona answers.
    pub answer_temperature: f32,
    /// Sampling temperature for probe generation.
    pub probe_temperature: f32,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            follow_up_limit: 2,
            answer_temperature: 0.8,
            probe_temperature: 0.7,
        }
    }
}

/// Drives the question/probe loop against one persona's conversation.
#[derive(Debug, Default, Clone, Copy)]
pub struct Interviewer {
    config: InterviewConfig,
}

impl Interviewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: InterviewConfig) -> Self {
        Self { config }
    }

    /// Runs `questions` against the persona, appending each completed
    /// result to the interview's running transcript.
    ///
    /// A failed primary question aborts the run (results completed so far
    /// stay recorded); a failed probe only ends that question's follow-up
    /// loop. Cancellation is honored between questions and between probes.
    pub async fn conduct(
        &self,
        gateway: &Gateway,
        meter: &UsageMeter,
        interview: &mut PersonaInterview,
        questions: &[String],
        phase: InterviewPhase,
        cancel: &CancellationToken,
    ) -> Result<Vec<QuestionResult>> {
        let persona_name = interview.persona.name.clone();
        let mut completed = Vec::with_capacity(questions.len());

        for question in questions {
            if cancel.is_cancelled() {
                tracing::info!(
                    target: "interview",
                    persona = %persona_name,
                    "interview cancelled, stopping before next question"
                );
                break;
            }

            let wrapped = format!(
                "Please answer the following question concisely and concretely: {question}"
            );
            let main_answer = interview
                .conversation
                .ask(gateway, meter, wrapped, self.config.answer_temperature)
                .await?;

            let follow_ups = self
                .probe_loop(gateway, meter, interview, phase, question, &main_answer, cancel)
                .await;

            let result = QuestionResult {
                question: question.clone(),
                main_answer,
                follow_ups,
            };
            interview.results.push(result.clone());
            completed.push(result);
        }

        tracing::info!(
            target: "interview",
            persona = %persona_name,
            phase = %phase,
            questions = completed.len(),
            "interview run finished"
        );
        Ok(completed)
    }

    /// Probes the latest exchange up to the follow-up limit. Never fails;
    /// any error ends the loop with the follow-ups gathered so far.
    async fn probe_loop(
        &self,
        gateway: &Gateway,
        meter: &UsageMeter,
        interview: &mut PersonaInterview,
        phase: InterviewPhase,
        question: &str,
        main_answer: &str,
        cancel: &CancellationToken,
    ) -> Vec<FollowUp> {
        let persona_name = interview.persona.name.clone();
        let mut follow_ups: Vec<FollowUp> = Vec::new();
        let mut last_question = question.to_string();
        let mut last_answer = main_answer.to_string();

        for _ in 0..self.config.follow_up_limit {
            if cancel.is_cancelled() {
                break;
            }

            let probe = match self
                .generate_probe(gateway, meter, phase, &last_question, &last_answer)
                .await
            {
                Ok(probe) => probe,
                Err(err) => {
                    tracing::warn!(
                        target: "interview",
                        persona = %persona_name,
                        error = %err,
                        "probe generation failed, ending follow-up loop"
                    );
                    break;
                }
            };
            if probe.is_empty() {
                tracing::warn!(
                    target: "interview",
                    persona = %persona_name,
                    "probe generation returned no text, ending follow-up loop"
                );
                break;
            }

            let answer = match interview
                .conversation
                .ask(gateway, meter, probe.clone(), self.config.answer_temperature)
                .await
            {
                Ok(answer) => answer,
                Err(err) => {
                    let err = VoxError::interview_turn_failed(err.to_string());
                    tracing::warn!(
                        target: "interview",
                        persona = %persona_name,
                        error = %err,
                        "follow-up went unanswered, ending follow-up loop"
                    );
                    break;
                }
            };

            follow_ups.push(FollowUp {
                question: probe.clone(),
                answer: answer.clone(),
            });
            last_question = probe;
            last_answer = answer;
        }

        follow_ups
    }

    async fn generate_probe(
        &self,
        gateway: &Gateway,
        meter: &UsageMeter,
        phase: InterviewPhase,
        question: &str,
        answer: &str,
    ) -> Result<String> {
        let prompt = match phase {
            InterviewPhase::Initial => format!(
                "You are a skilled interviewer. Based on the exchange below, \
                 write one short follow-up question that digs deeper into the \
                 respondent's real feelings and reasons. Output only the \
                 question text.\n\n\
                 Question: {question}\nAnswer: {answer}"
            ),
            InterviewPhase::HypothesisVerification => format!(
                "You are a strategic interviewer verifying a marketing \
                 hypothesis. Based on the exchange below, write one short \
                 follow-up question that tests whether the respondent's \
                 stated behavior really supports what the answer implies. \
                 Output only the question text.\n\n\
                 Question: {question}\nAnswer: {answer}"
            ),
        };

        let probe = gateway
            .generate_prompt(&prompt, self.config.probe_temperature, meter)
            .await?;
        Ok(probe.trim().to_string())
    }
}
