//! Per-persona conversation sessions.
//!
//! A session owns the ordered turn history for exactly one persona. It is
//! seeded with a priming pair (interviewer instruction embedding the full
//! persona block, plus a canned acknowledgment) so that every later turn
//! carries the persona context, and it replays the accumulated history to
//! the gateway on every `ask`. History is strictly append-only.

use crate::error::Result;
use crate::gateway::{Gateway, GenerationRequest, PromptTurn, UsageMeter};
use crate::persona::Persona;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Canned acknowledgment seeded as the persona's first reply.
pub const READY_ACKNOWLEDGMENT: &str = "Yes, I'm ready. Ask me anything.";

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum TurnRole {
    Interviewer,
    Persona,
}

/// A single turn in a persona's interview conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: String,
    /// Timestamp when the turn was recorded (ISO 8601 format).
    pub timestamp: String,
}

impl ConversationTurn {
    fn new(role: TurnRole, text: String) -> Self {
        Self {
            role,
            text,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Append-only chat state owned by one persona for the lifetime of the
/// active project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSession {
    persona_name: String,
    turns: Vec<ConversationTurn>,
    /// Optional cap on the number of turns replayed to the provider.
    /// `None` replays the full history.
    context_window: Option<usize>,
}

impl ConversationSession {
    /// Creates a session seeded with the priming turn pair for `persona`.
    pub fn new(persona: &Persona) -> Self {
        let priming = format!(
            "Assume the role of the persona described below and answer the \
             interviewer's questions in character. Your answers must be \
             concrete and lifelike, consistent with the persona's \
             personality, values, and lifestyle.\n\
             ---\n{}\n---\n\
             The interview starts now. When you are ready, answer \
             \"Yes, I'm ready.\"",
            persona.raw_text
        );

        Self {
            persona_name: persona.name.clone(),
            turns: vec![
                ConversationTurn::new(TurnRole::Interviewer, priming),
                ConversationTurn::new(TurnRole::Persona, READY_ACKNOWLEDGMENT.to_string()),
            ],
            context_window: None,
        }
    }

    /// Caps the history slice replayed to the provider. The priming pair
    /// is always retained at the front of the slice, and the cap is
    /// clamped so the trailing interviewer turn (the question being asked)
    /// always fits after it.
    pub fn with_context_window(mut self, max_turns: usize) -> Self {
        self.context_window = Some(max_turns.max(3));
        self
    }

    pub fn persona_name(&self) -> &str {
        &self.persona_name
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Asks the persona a question: appends the interviewer turn, replays
    /// the history through the gateway, and appends the reply.
    pub async fn ask(
        &mut self,
        gateway: &Gateway,
        meter: &UsageMeter,
        question: impl Into<String>,
        temperature: f32,
    ) -> Result<String> {
        self.turns
            .push(ConversationTurn::new(TurnRole::Interviewer, question.into()));

        let request = GenerationRequest::from_turns(self.prompt_turns(), temperature);
        let answer = match gateway.generate(&request, meter).await {
            Ok(answer) => answer,
            Err(err) => {
                // The unanswered question stays in the history; the
                // provider never saw a reply to it.
                self.turns.pop();
                return Err(err);
            }
        };

        self.turns
            .push(ConversationTurn::new(TurnRole::Persona, answer.clone()));
        Ok(answer)
    }

    fn prompt_turns(&self) -> Vec<PromptTurn> {
        let window: Vec<&ConversationTurn> = match self.context_window {
            Some(cap) if self.turns.len() > cap => {
                let tail_len = cap - 2;
                self.turns[..2]
                    .iter()
                    .chain(self.turns[self.turns.len() - tail_len..].iter())
                    .collect()
            }
            _ => self.turns.iter().collect(),
        };

        window
            .into_iter()
            .map(|turn| match turn.role {
                TurnRole::Interviewer => PromptTurn::user(turn.text.clone()),
                TurnRole::Persona => PromptTurn::model(turn.text.clone()),
            })
            .collect()
    }
}
