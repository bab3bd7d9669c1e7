use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod core;
mod parsing;
mod pipeline;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flags
    let filter = if cli.verbose {
        EnvFilter::new("incr_aligner=debug,info")
    } else if cli.quiet {
        EnvFilter::new("incr_aligner=warn")
    } else {
        EnvFilter::new("incr_aligner=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Align(args) => {
            cli::align::run(args, cli.format)?;
        }
    }

    Ok(())
}
