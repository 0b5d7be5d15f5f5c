use tokio::net::TcpListener;

use crate::config::Settings;
use crate::context::AppContext;
use crate::db;
use crate::startup;

/// Opens the database, builds the application context, and serves until a
/// shutdown signal arrives.
pub async fn run(settings: &'static Settings) -> anyhow::Result<()> {
    let pool = db::open_pool(&settings.db_path, 16)?;
    let ctx = AppContext::new(pool, settings);

    let listener = TcpListener::bind(settings.address()).await?;
    startup::run(listener, ctx).await
}
