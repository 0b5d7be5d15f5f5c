use vitrari::cmd;
use vitrari::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = config::settings();
    tracing_subscriber::fmt().with_env_filter(&settings.log_level).init();

    cmd::serve::run(settings).await
}
