use std::{path::PathBuf, time::Duration};

use abion_dns01::{
    AbionClient, ChallengeRequest, ChallengeSolver,
    config::{ClientConfig, DEFAULT_BASE_URL},
};
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tokio::signal;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, rename_all = "kebab-case")]
struct Cli {
    /// Abion API key
    #[arg(long, value_name = "KEY", env = "ABION_API_KEY", hide_env_values = true)]
    api_key: String,
    /// Zone API base URL
    #[arg(long, value_name = "URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 5)]
    timeout_secs: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Command {
    /// Add the challenge TXT record
    Present(ChallengeArgs),
    /// Remove the challenge TXT record, leaving other tokens in place
    CleanUp(ChallengeArgs),
}

#[derive(Args, Debug)]
#[command(rename_all = "kebab-case")]
struct ChallengeArgs {
    /// Resolved zone (e.g. example.com.)
    #[arg(long, value_name = "ZONE", required_unless_present = "request")]
    zone: Option<String>,
    /// Fully-qualified challenge record name (e.g. _acme-challenge.example.com.)
    #[arg(long, value_name = "FQDN", required_unless_present = "request")]
    fqdn: Option<String>,
    /// Challenge token
    #[arg(long, value_name = "TOKEN", required_unless_present = "request")]
    key: Option<String>,
    /// JSON challenge request file; replaces --zone, --fqdn and --key
    #[arg(long, value_name = "PATH", conflicts_with_all = ["zone", "fqdn", "key"])]
    request: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = ClientConfig::new(cli.api_key.as_str())
        .with_base_url(cli.base_url.as_str())
        .with_timeout(Duration::from_secs(cli.timeout_secs));
    let client = AbionClient::new(&config).context("failed to set up zone API client")?;
    let solver = ChallengeSolver::new(client);

    let run = async {
        match &cli.command {
            Command::Present(args) => {
                let ch = load_challenge(args)?;
                solver
                    .present_challenge(&ch)
                    .await
                    .with_context(|| format!("present failed for {}", ch.resolved_fqdn))
            }
            Command::CleanUp(args) => {
                let ch = load_challenge(args)?;
                solver
                    .clean_up_challenge(&ch)
                    .await
                    .with_context(|| format!("clean-up failed for {}", ch.resolved_fqdn))
            }
        }
    };

    tokio::select! {
        res = run => res?,
        _ = shutdown_signal() => bail!("interrupted before the zone update completed"),
    }

    info!("done");
    Ok(())
}

fn load_challenge(args: &ChallengeArgs) -> Result<ChallengeRequest> {
    if let Some(path) = &args.request {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read challenge request {}", path.display()))?;
        return serde_json::from_str(&raw)
            .with_context(|| format!("invalid challenge request {}", path.display()));
    }

    match (&args.zone, &args.fqdn, &args.key) {
        (Some(zone), Some(fqdn), Some(key)) => Ok(ChallengeRequest {
            resolved_zone: zone.clone(),
            resolved_fqdn: fqdn.clone(),
            key: key.clone(),
            resource_namespace: None,
        }),
        _ => bail!("--zone, --fqdn and --key are required without --request"),
    }
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!("failed to install CTRL+C handler: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
