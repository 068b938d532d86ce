//! The end-to-end research flow.

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use voxpop_application::InterviewUseCase;
use voxpop_core::interview::InterviewPhase;
use voxpop_core::project::ProjectInfo;
use voxpop_core::session::SELECTION_SIZE;

#[derive(Args)]
pub struct RunArgs {
    /// Research topic, e.g. "coffee subscription service".
    #[arg(long)]
    pub topic: String,

    /// Number of personas to generate.
    #[arg(long, default_value_t = 5)]
    pub count: usize,

    /// Comma-separated persona indices to interview (exactly three).
    /// Defaults to the first three.
    #[arg(long, value_delimiter = ',')]
    pub select: Option<Vec<usize>>,

    /// Characteristics every persona must share.
    #[arg(long)]
    pub characteristics: Option<String>,

    /// Spreadsheet with custom first-round questions in the first column.
    #[arg(long)]
    pub questions_file: Option<PathBuf>,
}

pub async fn execute(args: RunArgs) -> anyhow::Result<()> {
    let usecase = super::build_usecase()?;
    let cancel = spawn_ctrl_c_handler();

    let session = usecase.create_session().await;
    let project = ProjectInfo::with_topic(args.topic.clone());

    println!("Generating {} personas for \"{}\"...", args.count, args.topic);
    let personas = usecase
        .generate_personas(&session, project, args.count, args.characteristics.as_deref())
        .await?;
    for persona in &personas.personas {
        println!("  [{}] {}", persona.index, persona.name);
    }

    let indices = args
        .select
        .unwrap_or_else(|| (0..SELECTION_SIZE).collect());
    let selection = usecase.select_personas(&session, &indices).await?;
    println!("Interviewing: {}", selection.selected.join(", "));

    let questions = match &args.questions_file {
        Some(path) => {
            let rows = voxpop_infrastructure::spreadsheet::read_first_column(path)
                .with_context(|| format!("reading {}", path.display()))?;
            usecase.upload_questions(rows)?
        }
        None => usecase.default_questions(&session).await?,
    };
    println!(
        "Interview guide: {} questions{}",
        questions.count,
        if questions.degraded { " (built-in fallback)" } else { "" }
    );

    run_round(&usecase, &session, &questions.questions, InterviewPhase::Initial, &cancel).await?;
    anyhow::ensure!(!cancel.is_cancelled(), "cancelled");

    println!("\nSynthesizing the first-round analysis...");
    let analysis = usecase.generate_analysis(&session).await?;
    println!("\n===== Initial analysis =====\n{}", analysis.report);

    let hypothesis = usecase.generate_hypothesis(&session).await?;
    println!("\n===== Hypothesis =====\n{}", hypothesis.hypothesis);
    if hypothesis.degraded {
        println!("(verification questions are the built-in fallback)");
    }

    run_round(
        &usecase,
        &session,
        &hypothesis.verification_questions,
        InterviewPhase::HypothesisVerification,
        &cancel,
    )
    .await?;
    anyhow::ensure!(!cancel.is_cancelled(), "cancelled");

    println!("\nSynthesizing the final report...");
    let final_report = usecase.generate_final_analysis(&session).await?;
    println!("\n===== Final report =====\n{}", final_report.report);

    let history_id = usecase.save_history(&session).await?;
    let stats = final_report.stats;
    println!(
        "\nSaved as {history_id}. {:.0}s elapsed, {} chars in / {} chars out, est. ${:.6}",
        stats.elapsed_seconds, stats.input_chars, stats.output_chars, stats.estimated_cost_usd
    );
    Ok(())
}

/// Interviews each selected persona in turn with the same guide.
async fn run_round(
    usecase: &InterviewUseCase,
    session: &str,
    questions: &[String],
    phase: InterviewPhase,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    for index in 0..SELECTION_SIZE {
        if cancel.is_cancelled() {
            break;
        }
        let response = usecase
            .conduct_interview(session, index, questions, phase, cancel)
            .await?;
        println!(
            "  {} ({phase}): {} questions answered",
            response.persona_name,
            response.results.len()
        );
    }
    Ok(())
}

fn spawn_ctrl_c_handler() -> CancellationToken {
    let cancel = CancellationToken::new();
    let handle = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, finishing the current turn");
            handle.cancel();
        }
    });
    cancel
}
