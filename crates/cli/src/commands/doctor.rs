//! `docsgpt doctor`: Diagnose configuration, corpus files, and services.

use docsgpt_agent::TiktokenCounter;
use docsgpt_config::AppConfig;
use docsgpt_core::{CorpusLookup, Provider, TokenCounter};
use docsgpt_store::{CorpusStore, load_embeddings};

use super::pipeline;

pub async fn run() -> anyhow::Result<()> {
    println!("docsgpt doctor: System Diagnostics");
    println!("==================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  ⚠️  No config file, using defaults (run `docsgpt onboard`)");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  Fix the config before running further checks.");
            return Ok(());
        }
    };

    let credentials_ok = match config.require_credentials() {
        Ok(_) => {
            println!("  ✅ Credentials present");
            true
        }
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
            false
        }
    };

    let text_path = &config.corpus.text_path;
    let corpus = match CorpusStore::load(text_path) {
        Ok(corpus) => {
            println!("  ✅ Corpus: {} chunks ({})", corpus.len(), text_path.display());
            Some(corpus)
        }
        Err(e) => {
            println!("  ❌ Corpus: {e}");
            issues += 1;
            None
        }
    };

    let embeddings_path = &config.corpus.embeddings_path;
    match load_embeddings(embeddings_path) {
        Ok(records) => {
            println!(
                "  ✅ Embeddings: {} vectors ({})",
                records.len(),
                embeddings_path.display()
            );
            if let Some(bad) = records
                .iter()
                .find(|r| r.values.len() != config.pinecone.dimension)
            {
                println!(
                    "  ❌ Embedding {} has {} dimensions, pinecone.dimension is {}",
                    bad.id,
                    bad.values.len(),
                    config.pinecone.dimension
                );
                issues += 1;
            }
            if let Some(corpus) = &corpus {
                let missing = records.iter().filter(|r| !corpus.contains(r.id)).count();
                if missing > 0 {
                    println!("  ❌ {missing} embedded chunks have no text in the corpus");
                    issues += 1;
                }
            }
        }
        Err(e) => {
            println!("  ❌ Embeddings: {e}");
            issues += 1;
        }
    }

    match TiktokenCounter::new().count_tokens("visionOS", &config.openai.chat_model) {
        Ok(_) => println!("  ✅ Tokenizer for {}", config.openai.chat_model),
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    if credentials_ok {
        match pipeline::openai_provider(&config) {
            Ok(provider) => match provider.health_check().await {
                Ok(true) => println!("  ✅ OpenAI reachable"),
                Ok(false) => {
                    println!("  ❌ OpenAI rejected the health check");
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ OpenAI: {e}");
                    issues += 1;
                }
            },
            Err(e) => {
                println!("  ❌ OpenAI: {e}");
                issues += 1;
            }
        }

        match pipeline::pinecone_client(&config) {
            Ok(client) => match client.list_indexes().await {
                Ok(names) if names.contains(&config.pinecone.index_name) => {
                    println!("  ✅ Pinecone index '{}' exists", config.pinecone.index_name)
                }
                Ok(_) => {
                    println!(
                        "  ⚠️  Pinecone index '{}' missing (run `docsgpt index`)",
                        config.pinecone.index_name
                    );
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ Pinecone: {e}");
                    issues += 1;
                }
            },
            Err(e) => {
                println!("  ❌ Pinecone: {e}");
                issues += 1;
            }
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
