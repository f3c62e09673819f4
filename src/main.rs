use habit_tracker::{AppState, Config, FsSlotStore, Outcome, Prompt, StateStore, router};
use std::net::SocketAddr;
use tokio::fs;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    fs::create_dir_all(&config.data_dir).await?;

    let mut store = StateStore::load(FsSlotStore::new(config.data_dir.clone()));
    let answer = config.auto_recover;
    let outcome = store.auto_recover(&mut |prompt: Prompt| {
        info!(answer, "{}", prompt.message());
        answer
    })?;
    if outcome == Outcome::Applied {
        info!("restored previous data at startup");
    }

    let app = router(AppState::new(store));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
