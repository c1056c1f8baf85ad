//! `docsgpt onboard`: First-time setup.

use anyhow::Context;
use docsgpt_config::AppConfig;

pub fn run() -> anyhow::Result<()> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("docsgpt: First-Time Setup");
    println!("=========================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create {}", config_dir.display()))?;
        println!("  Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n  Config already exists at: {}", config_path.display());
        println!("  Edit it manually or delete and re-run onboard.\n");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("  Created config.toml at: {}", config_path.display());
    println!("\n  Next steps:");
    println!("   1. Put credentials in a .env file next to the corpus CSVs:");
    println!("        OPENAI_API_KEY=sk-...");
    println!("        PINECONE_API_KEY=...");
    println!("        PINECONE_ENVIRONMENT=us-west1-gcp");
    println!("   2. Run: docsgpt index");
    println!("   3. Run: docsgpt ask \"How do I open an immersive space?\"\n");

    Ok(())
}
