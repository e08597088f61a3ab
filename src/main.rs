use anyhow::{bail, Context, Result};
use config_manager::SystemConfig;
use tracing::info;
use trace_core::ChainId;

const USAGE: &str = "usage: fund_tracer <address> <base|solana> [depth]";

/// One-shot trace from the command line, printed as JSON.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 || args.len() > 3 {
        bail!(USAGE);
    }

    let config = SystemConfig::load()?;
    let address = &args[0];
    let chain: ChainId = args[1].parse()?;
    let depth = match args.get(2) {
        Some(depth) => depth
            .parse::<u32>()
            .with_context(|| format!("invalid depth '{}'\n{}", depth, USAGE))?,
        None => config.trace.default_depth,
    };

    let engine = explorer_client::build_trace_engine(&config)?;
    let deadline = config
        .trace
        .deadline()
        .map(|budget| tokio::time::Instant::now() + budget);

    let outcome = engine.trace_until(address, chain, depth, deadline).await?;
    info!("Trace {} finished: {:?}", outcome.trace_id, outcome.termination);

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
