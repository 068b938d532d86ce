//! Per-project session state.

use crate::conversation::ConversationSession;
use crate::error::{Result, VoxError};
use crate::gateway::UsageMeter;
use crate::interview::QuestionResult;
use crate::persona::Persona;
use crate::project::ProjectInfo;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Number of personas a selection must name.
pub const SELECTION_SIZE: usize = 3;

/// A selected persona's conversation plus its accumulated transcript.
///
/// The transcript is only ever extended; both interview phases contribute
/// to the same running history.
#[derive(Debug)]
pub struct PersonaInterview {
    pub persona: Persona,
    pub conversation: ConversationSession,
    pub results: Vec<QuestionResult>,
}

/// Timing and cost stats reported alongside every synthesis response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub elapsed_seconds: f64,
    pub input_chars: u64,
    pub output_chars: u64,
    pub estimated_cost_usd: f64,
}

/// Snapshot of one session for client polling/resync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub topic: Option<String>,
    pub has_personas: bool,
    pub personas: Vec<(usize, String)>,
    pub has_selected_personas: bool,
    pub selected_personas: Vec<String>,
    pub has_initial_analysis: bool,
    pub has_hypothesis: bool,
    pub has_final_analysis: bool,
}

/// All mutable state for one research project.
///
/// One session is driven sequentially by one client; the store wraps each
/// session in its own lock so concurrent API calls serialize safely.
#[derive(Debug)]
pub struct ProjectSession {
    id: String,
    pub project: Option<ProjectInfo>,
    pub personas: Vec<Persona>,
    context_window: Option<usize>,
    selected: Vec<Persona>,
    interviews: HashMap<String, PersonaInterview>,
    meter: Arc<UsageMeter>,
    started_at: Instant,
    pub initial_analysis: Option<String>,
    pub hypothesis: Option<String>,
    pub final_analysis: Option<String>,
}

impl ProjectSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            project: None,
            personas: Vec::new(),
            context_window: None,
            selected: Vec::new(),
            interviews: HashMap::new(),
            meter: Arc::new(UsageMeter::new()),
            started_at: Instant::now(),
            initial_analysis: None,
            hypothesis: None,
            final_analysis: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Shared usage meter for this session's gateway calls.
    pub fn meter(&self) -> Arc<UsageMeter> {
        self.meter.clone()
    }

    /// Caps the conversation history replayed to the provider for every
    /// conversation seeded after this call.
    pub fn set_context_window(&mut self, max_turns: Option<usize>) {
        self.context_window = max_turns;
    }

    /// Installs a fresh persona batch, implicitly discarding any prior
    /// selection, conversations, and reports. The character counters keep
    /// accumulating; only the wall clock restarts.
    pub fn set_personas(&mut self, project: ProjectInfo, personas: Vec<Persona>) {
        self.project = Some(project);
        self.personas = personas;
        self.selected.clear();
        self.interviews.clear();
        self.initial_analysis = None;
        self.hypothesis = None;
        self.final_analysis = None;
        self.started_at = Instant::now();
    }

    /// Selects exactly `SELECTION_SIZE` distinct personas by index and
    /// seeds a conversation session for each.
    pub fn select_personas(&mut self, indices: &[usize]) -> Result<Vec<Persona>> {
        if self.personas.is_empty() {
            return Err(VoxError::invalid_selection("no personas have been generated"));
        }
        if indices.len() != SELECTION_SIZE {
            return Err(VoxError::invalid_selection(format!(
                "expected exactly {SELECTION_SIZE} indices, got {}",
                indices.len()
            )));
        }
        let mut distinct = indices.to_vec();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() != SELECTION_SIZE {
            return Err(VoxError::invalid_selection("indices must be distinct"));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.personas.len()) {
            return Err(VoxError::invalid_selection(format!(
                "index {bad} out of range (0..{})",
                self.personas.len()
            )));
        }

        self.selected = indices.iter().map(|&i| self.personas[i].clone()).collect();
        self.interviews.clear();
        for persona in &self.selected {
            let mut conversation = ConversationSession::new(persona);
            if let Some(cap) = self.context_window {
                conversation = conversation.with_context_window(cap);
            }
            self.interviews.insert(
                persona.name.clone(),
                PersonaInterview {
                    persona: persona.clone(),
                    conversation,
                    results: Vec::new(),
                },
            );
        }

        tracing::info!(
            target: "session",
            session = %self.id,
            selected = ?self.selected.iter().map(|p| &p.name).collect::<Vec<_>>(),
            "personas selected"
        );
        Ok(self.selected.clone())
    }

    /// The currently selected personas (empty or exactly 3).
    pub fn selected_personas(&self) -> &[Persona] {
        &self.selected
    }

    /// Resolves a selected persona by its position in the selection.
    pub fn selected_persona(&self, index: usize) -> Result<&Persona> {
        if self.selected.is_empty() {
            return Err(VoxError::NoActiveSelection);
        }
        self.selected.get(index).ok_or_else(|| {
            VoxError::invalid_selection(format!(
                "persona index {index} out of range (0..{})",
                self.selected.len()
            ))
        })
    }

    /// Requires a non-empty selection.
    pub fn require_selection(&self) -> Result<&[Persona]> {
        if self.selected.is_empty() {
            return Err(VoxError::NoActiveSelection);
        }
        Ok(&self.selected)
    }

    pub fn interview(&self, persona_name: &str) -> Result<&PersonaInterview> {
        self.interviews
            .get(persona_name)
            .ok_or_else(|| VoxError::not_found("interview", persona_name))
    }

    pub fn interview_mut(&mut self, persona_name: &str) -> Result<&mut PersonaInterview> {
        self.interviews
            .get_mut(persona_name)
            .ok_or_else(|| VoxError::not_found("interview", persona_name))
    }

    pub fn stats(&self) -> SessionStats {
        let usage = self.meter.snapshot();
        SessionStats {
            elapsed_seconds: self.started_at.elapsed().as_secs_f64(),
            input_chars: usage.input_chars,
            output_chars: usage.output_chars,
            estimated_cost_usd: usage.estimated_cost_usd,
        }
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            session_id: self.id.clone(),
            topic: self.project.as_ref().map(|p| p.topic.clone()),
            has_personas: !self.personas.is_empty(),
            personas: self
                .personas
                .iter()
                .map(|p| (p.id, p.name.clone()))
                .collect(),
            has_selected_personas: !self.selected.is_empty(),
            selected_personas: self.selected.iter().map(|p| p.name.clone()).collect(),
            has_initial_analysis: self.initial_analysis.is_some(),
            has_hypothesis: self.hypothesis.is_some(),
            has_final_analysis: self.final_analysis.is_some(),
        }
    }
}
