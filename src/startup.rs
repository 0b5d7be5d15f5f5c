use tokio::net::TcpListener;
use tracing::info;

use crate::context::AppContext;
use crate::routes::routes;

/// Binds and serves the application until a shutdown signal arrives.
pub async fn run(listener: TcpListener, ctx: AppContext) -> anyhow::Result<()> {
    let app = routes(ctx);
    let local_addr = listener.local_addr()?;
    info!(%local_addr, "listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
