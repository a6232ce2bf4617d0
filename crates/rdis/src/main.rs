//! rdis CLI - recursive disassembler

mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "rdis=debug"
    } else if cli.quiet {
        "rdis=warn"
    } else {
        "rdis=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();

    std::process::exit(cli::run(&cli));
}
