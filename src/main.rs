#![allow(missing_docs)]

use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "gm3doc", about = "3GM model container inspection and conversion tools")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Print file-level information and a chunk summary.
	Info(cmd::info::Args),
	/// List every chunk in the stream.
	Chunks(cmd::chunks::Args),
	/// List the surfaces registered during decode.
	Surfaces(cmd::surfaces::Args),
	/// Print animation data carried by the file.
	Anim(cmd::anim::Args),
	/// Decode and export to Wavefront OBJ/MTL.
	Export(cmd::export::Args),
}

fn main() {
	if let Err(err) = run() {
		match err.code() {
			Some(code) => eprintln!("error: {err} (code {code})"),
			None => eprintln!("error: {err}"),
		}
		std::process::exit(1);
	}
}

fn run() -> gm3doc::gm::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Info(args) => cmd::info::run(args),
		Commands::Chunks(args) => cmd::chunks::run(args),
		Commands::Surfaces(args) => cmd::surfaces::run(args),
		Commands::Anim(args) => cmd::anim::run(args),
		Commands::Export(args) => cmd::export::run(args),
	}
}
