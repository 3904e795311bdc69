use sdksync::presentation::cli::CliApp;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app = CliApp::new();

    // RUST_LOG wins over --verbose
    let default_level = if app.verbose() { "sdksync=debug" } else { "sdksync=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!app.no_color())
        .with_writer(std::io::stderr)
        .init();

    app.run().await
}
