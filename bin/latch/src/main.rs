//! Latch command-line driver.
//!
//! Applies a sequence of verbs to toggles in one shared namespace and
//! prints the resulting readings as JSON.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use latch_binding::{Scope, Toggles};
use latch_core::{LatchConfig, ToggleRegistry, Verb};
use tracing::{debug, warn};

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "latch")]
#[command(about = "Apply verbs to shared toggles and print their readings")]
struct Args {
	/// TOML configuration file
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Namespace for shared toggles
	#[arg(short, long, default_value = "latch")]
	namespace: String,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,

	/// Operations, each `verb:noun` or `verb:noun=initial`
	#[arg(value_name = "OP", required = true)]
	ops: Vec<Op>,
}

/// One `verb:noun[=initial]` operation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Op {
	verb: String,
	noun: String,
	initial: bool,
}

impl FromStr for Op {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (verb, target) = s.split_once(':').ok_or_else(|| format!("expected verb:noun, got '{s}'"))?;
		Verb::resolve(verb).map_err(|e| e.to_string())?;

		let (noun, initial) = match target.split_once('=') {
			None => (target, false),
			Some((noun, "true")) => (noun, true),
			Some((noun, "false")) => (noun, false),
			Some((_, other)) => return Err(format!("initial value must be true or false, got '{other}'")),
		};
		if noun.is_empty() {
			return Err(format!("missing noun in '{s}'"));
		}

		Ok(Self {
			verb: verb.to_string(),
			noun: noun.to_string(),
			initial,
		})
	}
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	let config = match &args.config {
		Some(path) => LatchConfig::load(path).with_context(|| format!("loading config from {}", path.display()))?,
		None => LatchConfig::default(),
	};
	debug!(?config, "configuration loaded");

	let registry = ToggleRegistry::new(config);
	registry.start()?;

	let toggles = Toggles::new(Scope::shared(args.namespace), registry.clone(), || {
		tracing::trace!("refresh requested");
	});

	for op in &args.ops {
		let Some(_) = toggles.noun(&op.noun, op.initial)? else {
			warn!(noun = %op.noun, "skipping operation on reserved name");
			continue;
		};
		let outcome = toggles.apply(&op.verb, &op.noun)?;
		debug!(verb = %op.verb, noun = %op.noun, ?outcome, "applied");
	}

	println!("{}", serde_json::to_string_pretty(&toggles.nouns())?);

	drop(toggles);
	registry.destroy();
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("latch_core=trace,latch_binding=trace,latch_cli=debug,info")
		} else {
			EnvFilter::new("warn")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}
