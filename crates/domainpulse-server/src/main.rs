use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use domainpulse_server::{config::Config, source::CsvFileSource, state::AppState};

/// `domainpulse health`: liveness check for container health checks.
///
/// Calls `GET http://localhost:$DOMAINPULSE_PORT/health`.
/// Exits 0 if the server responds with HTTP 200, exits 1 otherwise.
fn run_health_check() -> ! {
    let port = std::env::var("DOMAINPULSE_PORT").unwrap_or_else(|_| "5000".to_string());
    let url = format!("http://localhost:{}/health", port);
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("health") {
        run_health_check();
    }
    // Structured JSON logging. Level controlled via RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("domainpulse=info".parse()?),
        )
        .json()
        .init();

    let cfg = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    if !std::path::Path::new(&cfg.data_path).exists() {
        tracing::warn!(
            data_path = %cfg.data_path,
            "Data file not found. Set DOMAINPULSE_DATA_PATH to the dashboard CSV export \
             and POST /api/reload once it is in place."
        );
    }

    let source = Arc::new(CsvFileSource::new(cfg.data_path.clone()));
    let state = Arc::new(AppState::bootstrap(cfg.clone(), source).await);

    let addr = format!("0.0.0.0:{}", cfg.port);
    let app = domainpulse_server::app::build_app(Arc::clone(&state));

    info!(
        port = cfg.port,
        top_n = cfg.engine.default_top_n,
        threshold_pct = cfg.engine.decline_threshold_pct,
        tie_break = ?cfg.engine.tie_break,
        "DomainPulse listening on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
