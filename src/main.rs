use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use lume_gateway::config::{Args, key_fingerprint};
use lume_gateway::handlers::build_router;
use lume_gateway::rate_limit::{RateLimiter, sweeper};
use lume_gateway::state::AppState;
use lume_gateway::upstream::OpenAiClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // parse cli arguments, fails fast without OPENAI_API_KEY
    let args = Args::parse();

    let filter = if args.verbose {
        "lume_gateway=debug"
    } else {
        "lume_gateway=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_target(true)
        .init();

    args.validate()?;

    let upstream = OpenAiClient::new(
        reqwest::Client::new(),
        &args.openai_base_url,
        &args.openai_api_key,
    );
    let rate_limiter = Arc::new(RateLimiter::new(
        args.rate_limit,
        Duration::from_secs(args.rate_window),
    ));

    // spawn the expired-window sweeper
    tokio::spawn(sweeper(
        rate_limiter.clone(),
        Duration::from_secs(args.sweep_interval),
    ));

    let state = Arc::new(AppState::new(
        Arc::new(upstream),
        rate_limiter,
        &args.text_model,
    ));
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        port = args.port,
        upstream = %args.openai_base_url,
        model = %args.text_model,
        key_fingerprint = %key_fingerprint(&args.openai_api_key),
        "Gateway running"
    );
    info!(
        rate_limit = args.rate_limit,
        rate_window_secs = args.rate_window,
        "Rate limit configured"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
