//! `docsgpt serve`: Start the HTTP gateway.

use super::pipeline;

pub async fn run(port_override: Option<u16>, offline: bool) -> anyhow::Result<()> {
    let mut config = pipeline::load_config()?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("docsgpt gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Index:     {}", if offline { "in-memory" } else { "pinecone" });

    let agent = pipeline::build_agent(&config, offline).await?;
    docsgpt_gateway::start(&config, agent)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(())
}
