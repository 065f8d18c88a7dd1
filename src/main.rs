//! Escrow keeper entry point.
//!
//! Loads configuration, initialises structured logging, connects to the
//! JSON-RPC endpoint and evaluates the escrow scan, either once or on a
//! fixed interval until Ctrl+C. Each result is printed to stdout as one
//! JSON line; submitting the proposed call is left to the scheduler.

use anyhow::Result;
use secrecy::SecretString;
use std::time::Duration;
use tracing::{error, info, Instrument};

use escrow_keeper::chain::rpc::RpcClient;
use escrow_keeper::config::{self, UserArgs};
use escrow_keeper::engine::scanner::EscrowScanner;
use escrow_keeper::types::ExecResult;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path =
        std::env::var("KEEPER_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let cfg = config::AppConfig::load(&config_path)?;

    init_logging();

    info!(
        keeper = %cfg.keeper.name,
        network = %cfg.chain.network,
        run_once = cfg.keeper.run_once,
        interval_secs = cfg.keeper.interval_secs,
        "Escrow keeper starting up"
    );

    let rpc_url = config::AppConfig::resolve_env(&cfg.chain.rpc_url_env)?;
    let client = RpcClient::new(
        SecretString::new(rpc_url),
        cfg.chain.network.clone(),
        cfg.chain.timeout_secs,
    )?;
    info!(network = client.network(), "JSON-RPC client ready");
    let scanner = EscrowScanner::new(client);
    let user_args = cfg.user_args.clone().with_env_overrides();

    if cfg.keeper.run_once {
        run_evaluation(&scanner, &user_args).await?;
        return Ok(());
    }

    // -- Watch loop --------------------------------------------------------

    let mut interval = watch_interval(cfg.keeper.interval_secs);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        interval_secs = cfg.keeper.interval_secs,
        "Entering watch loop. Press Ctrl+C to stop."
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = run_evaluation(&scanner, &user_args).await {
                    error!(error = %e, "Failed to emit result, continuing to next round");
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    info!("Escrow keeper shut down cleanly.");
    Ok(())
}

/// Watch-loop ticker. A slow scan delays the next tick instead of
/// triggering a burst of catch-up evaluations.
fn watch_interval(interval_secs: u64) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    interval
}

/// Evaluate once and print the scheduler-facing JSON result.
async fn run_evaluation(scanner: &EscrowScanner<RpcClient>, args: &UserArgs) -> Result<()> {
    let run_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("evaluate", %run_id);

    let outcome = scanner.evaluate(args).instrument(span).await;
    info!(%run_id, can_exec = outcome.can_exec(), "Evaluation finished");

    let result = ExecResult::from(outcome);
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}

/// Initialise the `tracing` subscriber. Logs go to stderr so stdout
/// carries only results.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("escrow_keeper=info"));

    let json_logging = std::env::var("KEEPER_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
