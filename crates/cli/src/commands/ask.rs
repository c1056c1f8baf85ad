//! `docsgpt ask`: Answer one question.

use tracing::info;

use super::pipeline;

pub async fn run(
    question: Option<String>,
    print_prompt: bool,
    json: bool,
    offline: bool,
) -> anyhow::Result<()> {
    let config = pipeline::load_config()?;
    let question = question.unwrap_or_else(|| config.gateway.showcase_question.clone());

    let agent = pipeline::build_agent(&config, offline).await?;
    let settings = agent.settings();
    info!(
        model = %settings.chat_model,
        top_n = settings.top_n,
        budget = settings.token_budget,
        "Answering"
    );
    let result = agent.ask(&question).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if print_prompt {
        println!("{}", result.prompt);
        println!();
    }
    println!("Q: {}\nA: {}", result.question, result.answer);
    eprintln!(
        "  ({} of {} sections, {} / {} tokens)",
        result.metadata.included.len(),
        result.metadata.sections_total,
        result.metadata.total_tokens,
        result.metadata.budget
    );
    Ok(())
}
