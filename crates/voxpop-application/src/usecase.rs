//! The command surface driving the whole research flow.
//!
//! One `InterviewUseCase` owns the session store, the run history, and the
//! gateway, and exposes each step of the flow as a command: generate
//! personas, select three, build the question guide, interview, analyze,
//! hypothesize, verify, and synthesize. Commands address sessions by id;
//! each session serializes behind its own lock.

use crate::insight::Synthesizer;
use crate::interview::{InterviewConfig, Interviewer};
use crate::questions::{QuestionService, QuestionSet};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use voxpop_core::error::{Result, VoxError};
use voxpop_core::gateway::{Gateway, TextGenerator, UsageMeter};
use voxpop_core::history::{HistoryLog, HistoryRecord, HistorySummary};
use voxpop_core::interview::{InterviewPhase, QuestionResult};
use voxpop_core::persona::{Persona, parse_personas};
use voxpop_core::project::ProjectInfo;
use voxpop_core::questions::filter_question_rows;
use voxpop_core::session::{ProjectSession, SessionStats, SessionStatus, SessionStore};

const PERSONA_TEMPERATURE: f32 = 0.8;

/// One generated persona as presented to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaSummary {
    /// Index used when selecting personas for interviews.
    pub index: usize,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonasResponse {
    pub session_id: String,
    pub personas: Vec<PersonaSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResponse {
    pub selected: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionsResponse {
    pub questions: Vec<String>,
    pub count: usize,
    pub degraded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewResponse {
    pub persona_name: String,
    pub phase: InterviewPhase,
    pub results: Vec<QuestionResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportResponse {
    pub report: String,
    pub stats: SessionStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisResponse {
    pub hypothesis: String,
    pub verification_questions: Vec<String>,
    pub degraded: bool,
    pub stats: SessionStats,
}

/// The application facade over the whole interview research flow.
pub struct InterviewUseCase {
    store: SessionStore,
    history: HistoryLog,
    gateway: Arc<Gateway>,
    interviewer: Interviewer,
    synthesizer: Synthesizer,
    questions: QuestionService,
    context_window: Option<usize>,
}

impl InterviewUseCase {
    pub fn new(provider: Arc<dyn TextGenerator>) -> Self {
        Self::with_gateway(Arc::new(Gateway::new(provider)))
    }

    pub fn with_gateway(gateway: Arc<Gateway>) -> Self {
        Self {
            store: SessionStore::new(),
            history: HistoryLog::new(),
            gateway,
            interviewer: Interviewer::new(),
            synthesizer: Synthesizer::new(),
            questions: QuestionService::new(),
            context_window: None,
        }
    }

    /// Overrides the interview loop tunables.
    pub fn with_interview_config(mut self, config: InterviewConfig) -> Self {
        self.interviewer = Interviewer::with_config(config);
        self
    }

    /// Caps the conversation history replayed to the provider.
    pub fn with_context_window(mut self, max_turns: Option<usize>) -> Self {
        self.context_window = max_turns;
        self
    }

    pub async fn create_session(&self) -> String {
        let (id, _) = self.store.create().await;
        id
    }

    pub async fn remove_session(&self, session_id: &str) -> Result<()> {
        self.store.remove(session_id).await
    }

    pub async fn session_status(&self, session_id: &str) -> Result<SessionStatus> {
        let session = self.store.get(session_id).await?;
        let status = session.read().await.status();
        Ok(status)
    }

    /// Generates a fresh persona batch for the session, replacing any
    /// prior personas and downstream state.
    pub async fn generate_personas(
        &self,
        session_id: &str,
        project: ProjectInfo,
        count: usize,
        characteristics: Option<&str>,
    ) -> Result<PersonasResponse> {
        let session = self.store.get(session_id).await?;
        let mut session = session.write().await;

        let prompt = persona_prompt(&project, count, characteristics);
        let text = self
            .gateway
            .generate_prompt(&prompt, PERSONA_TEMPERATURE, &session.meter())
            .await
            .map_err(|err| VoxError::generation_failed(err.to_string()))?;

        let personas = parse_personas(&text);
        if personas.is_empty() {
            return Err(VoxError::generation_failed(
                "no personas could be parsed from the generated text",
            ));
        }
        tracing::info!(
            target: "usecase",
            session = %session_id,
            count = personas.len(),
            "personas generated"
        );

        session.set_personas(project, personas);
        Ok(PersonasResponse {
            session_id: session_id.to_string(),
            personas: persona_summaries(&session.personas),
        })
    }

    /// Selects exactly three distinct personas by index for interviewing.
    pub async fn select_personas(
        &self,
        session_id: &str,
        indices: &[usize],
    ) -> Result<SelectionResponse> {
        let session = self.store.get(session_id).await?;
        let mut session = session.write().await;
        session.set_context_window(self.context_window);
        let selected = session.select_personas(indices)?;
        Ok(SelectionResponse {
            selected: selected.into_iter().map(|p| p.name).collect(),
        })
    }

    /// Builds the default interview guide, tailored to the session's
    /// topic when one is set.
    pub async fn default_questions(&self, session_id: &str) -> Result<QuestionsResponse> {
        let session = self.store.get(session_id).await?;
        let (topic, meter) = {
            let session = session.read().await;
            (
                session.project.as_ref().map(|p| p.topic.clone()),
                session.meter(),
            )
        };

        let set = self
            .questions
            .default_questions(&self.gateway, &meter, topic.as_deref())
            .await;
        Ok(questions_response(set))
    }

    /// Builds an interview guide for a topic outside any session. Usage
    /// is not metered against a session.
    pub async fn guide_for_topic(&self, topic: &str) -> QuestionsResponse {
        let meter = UsageMeter::new();
        let set = self
            .questions
            .default_questions(&self.gateway, &meter, Some(topic))
            .await;
        questions_response(set)
    }

    /// Filters uploaded first-column rows down to a usable guide.
    pub fn upload_questions(&self, rows: Vec<String>) -> Result<QuestionsResponse> {
        let questions = filter_question_rows(rows);
        if questions.is_empty() {
            return Err(VoxError::NoValidQuestions);
        }
        Ok(questions_response(QuestionSet {
            questions,
            degraded: false,
        }))
    }

    /// Runs one interview round against a selected persona.
    pub async fn conduct_interview(
        &self,
        session_id: &str,
        persona_index: usize,
        questions: &[String],
        phase: InterviewPhase,
        cancel: &CancellationToken,
    ) -> Result<InterviewResponse> {
        let session = self.store.get(session_id).await?;
        let mut session = session.write().await;

        let persona_name = session.selected_persona(persona_index)?.name.clone();
        let meter = session.meter();
        let interview = session.interview_mut(&persona_name)?;

        let results = self
            .interviewer
            .conduct(&self.gateway, &meter, interview, questions, phase, cancel)
            .await?;

        Ok(InterviewResponse {
            persona_name,
            phase,
            results,
        })
    }

    /// Summarizes every interviewed persona and produces the first-round
    /// analysis report.
    pub async fn generate_analysis(&self, session_id: &str) -> Result<ReportResponse> {
        let session = self.store.get(session_id).await?;
        let mut session = session.write().await;

        let project = self.project_of(&session);
        let meter = session.meter();
        let summaries = self.summarize_selected(&session, &meter).await?;

        let report = self
            .synthesizer
            .analyze(&self.gateway, &meter, &project, &summaries)
            .await?;
        session.initial_analysis = Some(report.clone());

        Ok(ReportResponse {
            report,
            stats: session.stats(),
        })
    }

    /// Derives marketing hypotheses and verification questions from the
    /// stored first-round report.
    pub async fn generate_hypothesis(&self, session_id: &str) -> Result<HypothesisResponse> {
        let session = self.store.get(session_id).await?;
        let mut session = session.write().await;

        let initial = session
            .initial_analysis
            .clone()
            .ok_or_else(|| VoxError::not_found("initial analysis", session_id))?;
        let project = self.project_of(&session);
        let meter = session.meter();

        let hypothesis = self
            .synthesizer
            .hypothesize(&self.gateway, &meter, &project, &initial)
            .await?;
        session.hypothesis = Some(hypothesis.text.clone());

        Ok(HypothesisResponse {
            hypothesis: hypothesis.text,
            verification_questions: hypothesis.questions,
            degraded: hypothesis.degraded,
            stats: session.stats(),
        })
    }

    /// Produces the final report over both interview rounds and the
    /// tested hypothesis.
    pub async fn generate_final_analysis(&self, session_id: &str) -> Result<ReportResponse> {
        let session = self.store.get(session_id).await?;
        let mut session = session.write().await;

        let hypothesis = session
            .hypothesis
            .clone()
            .ok_or_else(|| VoxError::not_found("hypothesis", session_id))?;
        let project = self.project_of(&session);
        let meter = session.meter();
        let summaries = self.summarize_selected(&session, &meter).await?;

        let report = self
            .synthesizer
            .finalize(&self.gateway, &meter, &project, &hypothesis, &summaries)
            .await?;
        session.final_analysis = Some(report.clone());

        Ok(ReportResponse {
            report,
            stats: session.stats(),
        })
    }

    /// Snapshots the session's reports into the run history.
    pub async fn save_history(&self, session_id: &str) -> Result<String> {
        let session = self.store.get(session_id).await?;
        let session = session.read().await;
        let id = self
            .history
            .record(
                session.project.clone(),
                session.initial_analysis.clone(),
                session.final_analysis.clone(),
                session.hypothesis.clone(),
                session
                    .selected_personas()
                    .iter()
                    .map(|p| p.name.clone())
                    .collect(),
            )
            .await;
        Ok(id)
    }

    pub async fn list_history(&self) -> Vec<HistorySummary> {
        self.history.list().await
    }

    pub async fn history_detail(&self, id: &str) -> Result<HistoryRecord> {
        self.history.detail(id).await
    }

    fn project_of(&self, session: &ProjectSession) -> ProjectInfo {
        session.project.clone().unwrap_or_default()
    }

    /// Summarizes, concurrently, every selected persona that has a
    /// transcript. Fails if nobody has been interviewed yet.
    async fn summarize_selected(
        &self,
        session: &ProjectSession,
        meter: &UsageMeter,
    ) -> Result<Vec<(String, String)>> {
        let mut corpus: Vec<(Persona, Vec<QuestionResult>)> = Vec::new();
        for persona in session.require_selection()?.to_vec() {
            let interview = session.interview(&persona.name)?;
            if interview.results.is_empty() {
                continue;
            }
            corpus.push((persona, interview.results.clone()));
        }
        if corpus.is_empty() {
            return Err(VoxError::not_found("interview transcripts", session.id()));
        }

        let summaries = futures::future::try_join_all(corpus.iter().map(|(persona, results)| {
            self.synthesizer
                .summarize(&self.gateway, meter, persona, results)
        }))
        .await?;

        Ok(corpus
            .iter()
            .map(|(persona, _)| persona.name.clone())
            .zip(summaries)
            .collect())
    }
}

fn persona_prompt(project: &ProjectInfo, count: usize, characteristics: Option<&str>) -> String {
    let mut prompt = format!(
        "You are a marketing expert. Create {count} personas with diverse \
         values and lifestyles for a depth interview about \"{}\".\n\
         For each persona include: name, age, gender, occupation, income \
         band, residence, family structure, hobbies, concerns, current \
         usage of and attitude toward the topic, and personality and \
         values.\n",
        project.topic
    );
    if let Some(characteristics) = characteristics {
        prompt.push_str(&format!(
            "All personas must share these characteristics: {characteristics}\n"
        ));
    }
    prompt.push_str(&format!("\n{}\n", project.market_context()));
    prompt.push_str(
        "Write each persona as a clearly separated block of attribute lines \
         starting with a heading of the form \"Persona N: [name]\".",
    );
    prompt
}

fn persona_summaries(personas: &[Persona]) -> Vec<PersonaSummary> {
    personas
        .iter()
        .map(|persona| PersonaSummary {
            index: persona.id,
            name: persona.name.clone(),
            description: persona.raw_text.clone(),
        })
        .collect()
}

fn questions_response(set: QuestionSet) -> QuestionsResponse {
    QuestionsResponse {
        count: set.questions.len(),
        questions: set.questions,
        degraded: set.degraded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use voxpop_core::gateway::{GatewayError, GenerationRequest, ProviderResult};

    const PROBE: &str = "Could you tell me more about that?";

    /// Plays every role in the flow by pattern-matching the prompt, with a
    /// switch that makes every call fail transiently.
    struct Studio {
        fail: AtomicBool,
    }

    impl Studio {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                fail: AtomicBool::new(false),
            })
        }

        fn persona_text() -> String {
            ["Maya Sato", "Ken Abe", "Rin Ito", "Joe Oda", "Amy Kai"]
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    format!(
                        "Persona {}: {name}\n- age: {}\n- occupation: analyst\n\n",
                        i + 1,
                        25 + i
                    )
                })
                .collect()
        }
    }

    #[async_trait]
    impl TextGenerator for Studio {
        async fn generate(&self, request: &GenerationRequest) -> ProviderResult {
            if self.fail.load(Ordering::SeqCst) {
                return Err(GatewayError::overloaded("model is overloaded"));
            }
            let last = &request.turns.last().unwrap().text;
            if last.contains("marketing expert") {
                Ok(Self::persona_text())
            } else if last.contains("qualitative researcher") {
                Ok("Prefers convenience over price; skeptical of subscriptions.".to_string())
            } else if last.contains("seasoned marketing analyst") {
                Ok("Initial analysis report.".to_string())
            } else if last.contains("marketing strategy planner") {
                Ok("**Marketing Hypotheses**\n- Convenience drives adoption\n\
                    **Verification Questions**\n\
                    - What almost made you cancel last month?\n\
                    - What would a competitor need to win you over?\n"
                    .to_string())
            } else if last.contains("strategy advisor") {
                Ok("Final analysis report.".to_string())
            } else if last.starts_with("You are a skilled interviewer")
                || last.starts_with("You are a strategic interviewer")
            {
                Ok(PROBE.to_string())
            } else if last == PROBE {
                Ok("Honestly, it saves me a trip to the store.".to_string())
            } else {
                Ok("I order a bag of beans every two weeks.".to_string())
            }
        }
    }

    fn project() -> ProjectInfo {
        ProjectInfo::with_topic("coffee subscription service")
    }

    #[tokio::test]
    async fn full_flow_runs_end_to_end() {
        let usecase = InterviewUseCase::new(Studio::new());
        let session = usecase.create_session().await;

        let personas = usecase
            .generate_personas(&session, project(), 5, None)
            .await
            .unwrap();
        assert_eq!(personas.personas.len(), 5);
        assert_eq!(personas.personas[0].name, "Maya Sato");

        let selection = usecase
            .select_personas(&session, &[0, 2, 4])
            .await
            .unwrap();
        assert_eq!(selection.selected, vec!["Maya Sato", "Rin Ito", "Amy Kai"]);

        let questions = vec!["How often do you buy coffee?".to_string()];
        let cancel = CancellationToken::new();
        let first_round = usecase
            .conduct_interview(&session, 0, &questions, InterviewPhase::Initial, &cancel)
            .await
            .unwrap();
        assert_eq!(first_round.persona_name, "Maya Sato");
        assert_eq!(first_round.results.len(), 1);
        assert_eq!(first_round.results[0].follow_ups.len(), 2);

        let analysis = usecase.generate_analysis(&session).await.unwrap();
        assert_eq!(analysis.report, "Initial analysis report.");
        assert!(analysis.stats.estimated_cost_usd > 0.0);

        let hypothesis = usecase.generate_hypothesis(&session).await.unwrap();
        assert!(!hypothesis.degraded);
        assert_eq!(hypothesis.verification_questions.len(), 2);

        let second_round = usecase
            .conduct_interview(
                &session,
                0,
                &hypothesis.verification_questions,
                InterviewPhase::HypothesisVerification,
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(second_round.results.len(), 2);

        let final_report = usecase.generate_final_analysis(&session).await.unwrap();
        assert_eq!(final_report.report, "Final analysis report.");

        let history_id = usecase.save_history(&session).await.unwrap();
        let listing = usecase.list_history().await;
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].id, history_id);
        let record = usecase.history_detail(&history_id).await.unwrap();
        assert_eq!(record.final_analysis.as_deref(), Some("Final analysis report."));

        let status = usecase.session_status(&session).await.unwrap();
        assert!(status.has_initial_analysis);
        assert!(status.has_hypothesis);
        assert!(status.has_final_analysis);
    }

    #[tokio::test]
    async fn duplicate_selection_indices_are_rejected() {
        let usecase = InterviewUseCase::new(Studio::new());
        let session = usecase.create_session().await;
        usecase
            .generate_personas(&session, project(), 5, None)
            .await
            .unwrap();

        let err = usecase
            .select_personas(&session, &[0, 0, 1])
            .await
            .unwrap_err();
        assert!(matches!(err, VoxError::InvalidSelection(_)));
    }

    #[tokio::test]
    async fn interviewing_without_a_selection_is_rejected() {
        let usecase = InterviewUseCase::new(Studio::new());
        let session = usecase.create_session().await;
        usecase
            .generate_personas(&session, project(), 5, None)
            .await
            .unwrap();

        let err = usecase
            .conduct_interview(
                &session,
                0,
                &["How often do you buy coffee?".to_string()],
                InterviewPhase::Initial,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VoxError::NoActiveSelection));
    }

    #[tokio::test(start_paused = true)]
    async fn persona_generation_failure_is_reported_as_generation_failed() {
        let studio = Studio::new();
        studio.fail.store(true, Ordering::SeqCst);
        let usecase = InterviewUseCase::new(studio);
        let session = usecase.create_session().await;

        let err = usecase
            .generate_personas(&session, project(), 5, None)
            .await
            .unwrap_err();
        assert!(matches!(err, VoxError::GenerationFailed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn analysis_surfaces_service_unavailable_when_retries_exhaust() {
        let studio = Studio::new();
        let usecase = InterviewUseCase::new(studio.clone());
        let session = usecase.create_session().await;
        usecase
            .generate_personas(&session, project(), 5, None)
            .await
            .unwrap();
        usecase
            .select_personas(&session, &[0, 1, 2])
            .await
            .unwrap();
        usecase
            .conduct_interview(
                &session,
                0,
                &["How often do you buy coffee?".to_string()],
                InterviewPhase::Initial,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        studio.fail.store(true, Ordering::SeqCst);
        let err = usecase.generate_analysis(&session).await.unwrap_err();
        assert!(err.is_service_unavailable(), "got {err:?}");
    }

    #[tokio::test]
    async fn analysis_without_any_transcript_is_rejected() {
        let usecase = InterviewUseCase::new(Studio::new());
        let session = usecase.create_session().await;
        usecase
            .generate_personas(&session, project(), 5, None)
            .await
            .unwrap();
        usecase
            .select_personas(&session, &[0, 1, 2])
            .await
            .unwrap();

        let err = usecase.generate_analysis(&session).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn hypothesis_requires_a_stored_analysis() {
        let usecase = InterviewUseCase::new(Studio::new());
        let session = usecase.create_session().await;
        usecase
            .generate_personas(&session, project(), 5, None)
            .await
            .unwrap();

        let err = usecase.generate_hypothesis(&session).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn uploaded_questions_are_filtered_and_empty_uploads_rejected() {
        let usecase = InterviewUseCase::new(Studio::new());

        let response = usecase
            .upload_questions(vec![
                "".to_string(),
                "Why do you use this product?".to_string(),
                "nan".to_string(),
            ])
            .unwrap();
        assert_eq!(response.count, 1);
        assert!(!response.degraded);

        let err = usecase
            .upload_questions(vec!["".to_string(), "nan".to_string()])
            .unwrap_err();
        assert!(matches!(err, VoxError::NoValidQuestions));
    }
}
