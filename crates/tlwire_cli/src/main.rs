#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "tlwire", version, about = "Inspect TL schemas and decode TL wire payloads")]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Print schema layer and definition counts.
	Info(cmd::info::Args),
	/// List constructors and methods with ids and parameter types.
	Schema(cmd::schema::Args),
	/// Compute canonical signatures and ids, or audit a schema's explicit ids.
	Id(cmd::id::Args),
	/// Decode a hex or binary payload against a schema.
	Decode(cmd::decode::Args),
}

fn main() {
	init_tracing();

	let cli = Cli::parse();
	if let Err(err) = run(cli.command) {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run(command: Command) -> Result<(), cmd::CliError> {
	match command {
		Command::Info(args) => cmd::info::run(args),
		Command::Schema(args) => cmd::schema::run(args),
		Command::Id(args) => cmd::id::run(args),
		Command::Decode(args) => cmd::decode::run(args),
	}
}

fn init_tracing() {
	let filter = EnvFilter::try_from_env("TLWIRE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
