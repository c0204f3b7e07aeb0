//! Error types for toggle registries and verb dispatch.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced across the registry, noun and verb boundary.
///
/// Only integration bugs become errors. Conflicting initial values and
/// verbs applied to targets without a setter are logged and degrade to
/// no-ops instead.
#[derive(Debug, Error)]
pub enum LatchError {
	/// A subscription was requested for a key that was never created.
	#[error("toggle not found: {key}")]
	UnknownKey {
		/// The missing registry key.
		key: String,
	},

	/// A noun was requested under a name reserved for a verb.
	#[error("noun name '{name}' collides with a verb of the same name")]
	ReservedName {
		/// The offending noun name.
		name: String,
	},

	/// A verb name is not in the verb table.
	#[error("unknown verb '{name}'{}", did_you_mean(.suggestion))]
	UnknownVerb {
		/// The requested verb.
		name: String,
		/// Closest known verb, when one is near enough.
		suggestion: Option<String>,
	},

	/// The eviction sweeper needs an async runtime and none is running.
	#[error("no tokio runtime available to drive the eviction sweeper")]
	NoRuntime,

	/// The registry was destroyed and its sweeper cannot restart.
	#[error("registry has been destroyed")]
	Destroyed,

	/// Configuration text failed to parse.
	#[error("config parse error: {0}")]
	Config(#[from] toml::de::Error),

	/// Configuration file could not be read.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},
}

fn did_you_mean(suggestion: &Option<String>) -> String {
	suggestion
		.as_deref()
		.map(|s| format!(" (did you mean '{s}'?)"))
		.unwrap_or_default()
}

/// Result type for toggle operations.
pub type Result<T> = std::result::Result<T, LatchError>;
