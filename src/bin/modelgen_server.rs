//! Standalone model generation service: serves `POST /generate_model`.

use anyhow::Result;

use modelbench::config::{DEFAULT_GENERATOR_ADDR, GENERATOR_ADDR_ENV};
use modelbench::generate::server;

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();

    let addr = std::env::var(GENERATOR_ADDR_ENV)
        .unwrap_or_else(|_| DEFAULT_GENERATOR_ADDR.to_string());

    server::run(&addr).await?;

    Ok(())
}
