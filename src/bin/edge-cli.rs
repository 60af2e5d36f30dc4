use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::Value;

use edge_gateway::config::loader::apply_env_overrides;
use edge_gateway::config::{EdgeConfig, GeolocationConfig};
use edge_gateway::geo::{classify_user_agent, IpApiClient, Resolution, Resolver};

#[derive(Parser)]
#[command(name = "edge-cli")]
#[command(about = "Inspection CLI for the edge gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve an IP address to location metadata
    Locate {
        ip: String,

        /// Lookup service base URL; defaults to `IPAPI_URL`, then ipapi.co
        #[arg(long)]
        geo_url: Option<String>,

        #[arg(long, default_value_t = 5)]
        timeout_secs: u64,
    },
    /// Classify a user-agent string
    Classify { user_agent: String },
    /// Ask a running edge what it knows about this client
    Client {
        #[arg(short, long, default_value = "http://localhost:3000")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Locate {
            ip,
            geo_url,
            timeout_secs,
        } => {
            let defaults = apply_env_overrides(EdgeConfig::default(), |key| std::env::var(key).ok());
            let mut config: GeolocationConfig = defaults.geolocation;
            if let Some(url) = geo_url {
                config.base_url = url;
            }
            config.timeout_secs = timeout_secs;
            let resolver = Resolver::new(
                IpApiClient::new(&config)?,
                Duration::from_secs(config.timeout_secs),
            );

            let resolution = resolver.resolve(&ip).await;
            if let Resolution::Degraded { reason, .. } = &resolution {
                eprintln!("Lookup degraded: {}", reason);
            }
            println!("{}", serde_json::to_string_pretty(resolution.location())?);
        }
        Commands::Classify { user_agent } => {
            let profile = classify_user_agent(&user_agent);
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Commands::Client { url } => {
            let res = reqwest::get(format!("{}/edge/client", url.trim_end_matches('/'))).await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: edge returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
