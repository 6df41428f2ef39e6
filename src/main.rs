use std::env;

use tracing_subscriber::filter::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let args: Vec<String> = env::args().collect();
    std::process::exit(bgrview::cli::run_with_args(&args));
}
