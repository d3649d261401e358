//! imagetovideo-ai.net site gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ listener (TCP / TLS)
//!                     │
//!                     ▼
//!                 tower layers: request id, trace, security headers,
//!                               timeout, body limit
//!                     │
//!        ┌────────────┼──────────────────────────────┐
//!        ▼            ▼                              ▼
//!   /api/health   /api/generation/*            everything else
//!                     │                              │
//!                     ▼                              ▼
//!              generation API               path scope → normalizer
//!              (reqwest, streaming)           308 www / https redirect
//!                                                    │ delegate
//!                                                    ▼
//!                                             locale router
//!                                               307 redirect | rewrite
//!                                                    │
//!                                                    ▼
//!                                             page renderer
//!                                             (hyper-util client)
//! ```

use std::path::PathBuf;

use clap::Parser;

use imagetovideo_gateway::config::{load_config, GatewayConfig};
use imagetovideo_gateway::lifecycle::startup;
use imagetovideo_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "imagetovideo-gateway")]
#[command(about = "Site gateway for imagetovideo-ai.net", version)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "IMAGETOVIDEO_CONFIG")]
    config: Option<PathBuf>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    if cli.check {
        println!("configuration OK");
        return Ok(());
    }

    logging::init_logging(&config.observability);
    tracing::info!(
        config = ?cli.config,
        "imagetovideo-gateway v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    startup::run(config).await?;
    Ok(())
}
