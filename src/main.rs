use clap::Parser;
use profit_first::api::{Cli, run_cli};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    if let Err(e) = run_cli(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

// Logs go to stderr so `calculate` and `reconcile` output stays pipeable.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
}
