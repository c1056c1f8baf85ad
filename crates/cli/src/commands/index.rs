//! `docsgpt index`: Provision the index and load embeddings.

use docsgpt_agent::PopulateOutcome;

use super::pipeline;

pub async fn run(force: bool) -> anyhow::Result<()> {
    let config = pipeline::load_config()?;

    println!("Index: {}", config.pinecone.index_name);
    let (index, outcome) = pipeline::open_index(&config, false, force).await?;

    match outcome {
        PopulateOutcome::Skipped { existing } => {
            println!("  Already populated ({existing} vectors). Use --force to upsert again.");
        }
        PopulateOutcome::Upserted { vectors, batches } => {
            println!("  Upserted {vectors} vectors in {batches} batches.");
        }
    }

    let stats = index.stats().await?;
    println!(
        "  Index reports {} vectors of dimension {}.",
        stats.vector_count, stats.dimension
    );
    Ok(())
}
