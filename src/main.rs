use std::sync::Arc;

use clap::Parser;
use tokio::time::{interval, Duration};

use gridmatch::config::Config;
use gridmatch::engine::Matcher;
use gridmatch::facade::ServerFacade;
use gridmatch::http;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::new().default_filter_or("info")).init();

    let config = Config::parse();

    let matcher = match Matcher::new(config.max_time, config.max_score, config.score_group_len) {
        Ok(matcher) => matcher,
        Err(e) => {
            log::error!("configuration rejected: {e}");
            std::process::exit(1);
        }
    };

    let facade = Arc::new(ServerFacade::new(matcher));

    log::info!(
        "starting gridmatch on {} (max_time={}, max_score={}, score_group_len={}, match_count={})",
        config.bind,
        config.max_time,
        config.max_score,
        config.score_group_len,
        config.match_count,
    );

    let matcher_ticker = tokio::spawn(run_matcher_ticker(facade.clone(), config.match_count));
    let sweeper_ticker = tokio::spawn(run_sweeper_ticker(facade.clone(), config.max_time));

    let app = http::router(facade.clone());
    let listener = match tokio::net::TcpListener::bind(&config.bind).await {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("failed to bind {}: {e}", config.bind);
            std::process::exit(1);
        }
    };

    let shutdown_facade = facade.clone();
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("shutdown signal received");
            shutdown_facade.request_shutdown();
        })
        .await;

    if let Err(e) = result {
        log::error!("server error: {e}");
    }

    facade.request_shutdown();
    let _ = matcher_ticker.await;
    let _ = sweeper_ticker.await;
    log::info!("gridmatch stopped");
}

/// Invokes `Match` once per second until the facade's shutdown flag is observed.
async fn run_matcher_ticker(facade: Arc<ServerFacade>, match_count: usize) {
    let mut ticker = interval(Duration::from_secs(1));
    loop {
        ticker.tick().await;
        if facade.is_shutting_down() {
            break;
        }
        facade.run_match(match_count);
    }
}

/// Invokes `Sweep` once per `max_time` seconds until shutdown.
async fn run_sweeper_ticker(facade: Arc<ServerFacade>, max_time: i64) {
    let period = Duration::from_secs(max_time.max(1) as u64);
    let mut ticker = interval(period);
    loop {
        ticker.tick().await;
        if facade.is_shutting_down() {
            break;
        }
        facade.run_sweep(max_time);
    }
}
