use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use nestcfg::Store;
use nestcfg::config::{check_config_file, discover_configs, load_cascade};
use nestcfg::export::to_toml;
use nestcfg::overlay::{Assignment, DEFAULT_ENV_PREFIX, apply_all, process_env_assignments};

#[derive(Parser)]
#[command(name = "nestcfg")]
#[command(
	author,
	version,
	about = "Query and check nested curly-brace configuration files"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Config file to load; repeat to layer files, later ones win.
	/// Defaults to the discovered .nestcfg.conf cascade
	#[arg(short, long = "file", value_name = "FILE", global = true)]
	files: Vec<PathBuf>,

	/// Override a value after loading, e.g. --set server.port=9090
	#[arg(long = "set", value_name = "PATH=VALUE", global = true)]
	set: Vec<Assignment>,

	/// Prefix of environment variables applied as overrides
	#[arg(long, value_name = "PREFIX", default_value = DEFAULT_ENV_PREFIX, global = true)]
	env_prefix: String,

	/// Ignore environment overrides
	#[arg(long, global = true)]
	no_env: bool,

	/// More log output on stderr (-v info, -vv debug, -vvv trace)
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
	/// Print the value stored at a dotted path
	Get {
		/// Dotted path, e.g. section_a.section_b.name_1
		path: String,

		/// Index into the entry's value list
		#[arg(short, long, default_value_t = 0, conflicts_with = "all")]
		index: usize,

		/// Print every value in the list, one per line
		#[arg(long)]
		all: bool,

		/// Print the text as written, without macro expansion
		#[arg(long)]
		raw: bool,
	},
	/// Print every entry of the effective configuration
	Dump {
		#[arg(long, value_enum, default_value_t = DumpFormat::Text)]
		format: DumpFormat,
	},
	/// Check config files for errors without stopping at the first one
	Check,
}

#[derive(Clone, Copy, ValueEnum)]
enum DumpFormat {
	Text,
	Toml,
}

fn main() -> ExitCode {
	match run() {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn run() -> Result<ExitCode> {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	let files = config_files(&cli.files)?;

	match &cli.command {
		Commands::Check => handle_check(&files),
		Commands::Get {
			path,
			index,
			all,
			raw,
		} => {
			let store = load_store(&cli, &files)?;
			handle_get(&store, path, *index, *all, *raw)
		}
		Commands::Dump { format } => {
			let store = load_store(&cli, &files)?;
			handle_dump(&store, *format)
		}
	}
}

fn init_tracing(verbose: u8) {
	let filter = match verbose {
		0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
		1 => EnvFilter::new("info"),
		2 => EnvFilter::new("debug"),
		_ => EnvFilter::new("trace"),
	};
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();
}

fn config_files(explicit: &[PathBuf]) -> Result<Vec<PathBuf>> {
	if !explicit.is_empty() {
		return Ok(explicit.to_vec());
	}
	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	discover_configs(&cwd).context("Failed to discover config files")
}

/// Files, then environment, then --set: the last writer wins.
fn load_store(cli: &Cli, files: &[PathBuf]) -> Result<Store> {
	let outcome = load_cascade(files).context("Failed to load configuration")?;
	let mut store = outcome.store;

	if !cli.no_env {
		let env = process_env_assignments(&cli.env_prefix);
		apply_all(&mut store, &env).context("Failed to apply environment overrides")?;
	}
	apply_all(&mut store, &cli.set).context("Failed to apply --set overrides")?;

	Ok(store)
}

fn handle_get(store: &Store, path: &str, index: usize, all: bool, raw: bool) -> Result<ExitCode> {
	let literals = if all {
		let entry = store
			.find(path)
			.ok_or_else(|| anyhow::anyhow!("No entry at path: {}", path))?;
		entry.iter().collect::<Vec<_>>()
	} else {
		vec![store.get(path, index)?]
	};

	for literal in literals {
		if raw {
			println!("{}", literal.raw());
		} else {
			let text = store
				.render(literal)
				.with_context(|| format!("Failed to expand value of {}", path))?;
			println!("{}", text);
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_dump(store: &Store, format: DumpFormat) -> Result<ExitCode> {
	match format {
		DumpFormat::Text => print!("{}", store),
		DumpFormat::Toml => print!("{}", to_toml(store).context("Failed to export TOML")?),
	}
	Ok(ExitCode::SUCCESS)
}

fn handle_check(files: &[PathBuf]) -> Result<ExitCode> {
	if files.is_empty() {
		println!("No configuration files found.");
		return Ok(ExitCode::SUCCESS);
	}

	let mut failed = false;
	for path in files {
		failed |= check_file(path)?;
	}

	Ok(if failed {
		ExitCode::FAILURE
	} else {
		ExitCode::SUCCESS
	})
}

/// Report on one file. Returns true if it has errors.
fn check_file(path: &Path) -> Result<bool> {
	let outcome = check_config_file(path)
		.with_context(|| format!("Failed to check {}", path.display()))?;
	let diagnostics = &outcome.diagnostics;

	for diagnostic in diagnostics.iter() {
		println!("{}: {}", path.display(), diagnostic);
	}
	println!(
		"{}: {} entries, {} warnings, {} errors",
		path.display(),
		outcome.store.len(),
		diagnostics.warning_count(),
		diagnostics.error_count()
	);

	Ok(diagnostics.has_errors())
}
