use clap::Parser;
use serde_json::json;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod models;
mod services;
mod utils;

use config::Config;
use models::ConversionInput;
use services::{conversion_service, market_service, report_service};

/// Bitcoin, gold and silver prices with USD conversion
#[derive(Parser, Debug)]
#[command(name = "sats-oracle", version, about)]
struct Args {
    /// USD amount to convert (negative amounts are allowed)
    #[arg(allow_negative_numbers = true)]
    amount: Option<String>,

    /// Print the snapshot and conversion as JSON instead of tables
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    let mut filter = EnvFilter::from_default_env();
    for directive in ["sats_oracle=debug", "reqwest=warn", "hyper=warn"] {
        match directive.parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("Invalid log directive {}: {}", directive, e),
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };
    debug!("Loaded configuration: feed={}, cache_file={:?}", config.feed, config.cache_file);

    info!("Loading market data...");
    let snapshot = market_service::load_snapshot(&config).await;
    if snapshot.is_error() {
        warn!("Market data unavailable, rendering degraded view");
    }

    let outcome = args
        .amount
        .map(|amount| conversion_service::convert(&snapshot, &ConversionInput::from(amount)));

    if args.json {
        let body = json!({
            "snapshot": &snapshot,
            "conversion": outcome.as_ref().map(|o| match o {
                Ok(result) => json!({ "result": result }),
                Err(rejected) => json!({ "rejected": rejected }),
            }),
        });
        match serde_json::to_string_pretty(&body) {
            Ok(text) => println!("{}", text),
            Err(e) => error!("Failed to serialize output: {}", e),
        }
        return;
    }

    print!("{}", report_service::render_market_dashboard(&snapshot));
    if let Some(outcome) = &outcome {
        println!();
        print!("{}", report_service::render_conversion(outcome));
    }
}
