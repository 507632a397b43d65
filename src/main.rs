use std::io;
use std::process;

use clap::Parser;
use nestegg::cli::{Cli, run};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "warn,nestegg=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(err) = run(cli, &mut stdin.lock(), &mut stdout.lock()) {
        tracing::error!(error = %err, "command failed");
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
