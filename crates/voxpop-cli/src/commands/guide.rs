//! Prints the default interview guide for a topic.

pub async fn execute(topic: &str) -> anyhow::Result<()> {
    let usecase = super::build_usecase()?;

    let guide = usecase.guide_for_topic(topic).await;
    if guide.degraded {
        eprintln!("note: generation was unavailable, this is the built-in guide");
    }
    for (i, question) in guide.questions.iter().enumerate() {
        println!("{}. {question}", i + 1);
    }
    Ok(())
}
