//! `facet` command line tool.
//!
//! Inspects filter queries and drives a filter menu over a fixed option list,
//! using the same controllers a UI would.

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;

/// Log filter used with `--verbose` when `RUST_LOG` is unset.
const VERBOSE_FILTER: &str = "facet_cli=debug,facet_filter=debug,facet_menu=debug,facet_worker=debug,warn";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	setup_tracing(cli.verbose);

	let config = commands::load_config(cli.config.as_deref())?;
	let output = commands::run(cli.command, &config).await?;
	if !output.is_empty() {
		println!("{output}");
	}
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new(VERBOSE_FILTER)
		} else {
			EnvFilter::new("warn")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.init();
}
