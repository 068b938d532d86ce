pub mod guide;
pub mod inspect;
pub mod run;

use std::sync::Arc;
use voxpop_application::InterviewUseCase;
use voxpop_application::interview::InterviewConfig;
use voxpop_infrastructure::{ConfigService, GeminiClient};

/// Builds the use case facade wired to the real Gemini client, applying
/// any overrides from the config file.
pub fn build_usecase() -> anyhow::Result<InterviewUseCase> {
    let service = ConfigService::new()?;
    let config = service.load()?;

    let mut interview_config = InterviewConfig::default();
    if let Some(limit) = config.follow_up_limit {
        interview_config.follow_up_limit = limit;
    }

    let client = GeminiClient::new(service.api_key()?)?;
    Ok(InterviewUseCase::new(Arc::new(client))
        .with_interview_config(interview_config)
        .with_context_window(config.context_window))
}
