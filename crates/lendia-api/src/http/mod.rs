//! REST API: router, handlers, error mapping, and the serve loop.

pub mod error;
pub mod handlers;
pub mod router;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::state::AppState;

/// Bind the listener, start the session sweeper, and serve until Ctrl-C.
pub async fn serve(state: AppState, addr: &str) -> anyhow::Result<()> {
    let sweeper_token = CancellationToken::new();
    let sweeper = state
        .desk
        .sessions()
        .clone()
        .spawn_sweeper(sweeper_token.clone());

    let app = router::build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Lendia API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    sweeper_token.cancel();
    sweeper.await?;
    Ok(())
}
