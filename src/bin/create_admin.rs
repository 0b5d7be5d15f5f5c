use clap::Parser;

use vitrari::cmd::create_admin;
use vitrari::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = create_admin::Args::parse();
    let settings = config::settings();
    tracing_subscriber::fmt().with_env_filter(&settings.log_level).init();

    create_admin::run(settings, args).await
}
