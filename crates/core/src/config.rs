//! Registry and binding configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{LatchError, Result};

/// Default idle time after which an unreferenced toggle may be evicted.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);
/// Default period of the eviction sweep.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);
/// Longest accepted sweep period.
pub const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
/// Default bound on nested fan-out triggered from inside subscribers.
pub const DEFAULT_MAX_NOTIFY_DEPTH: usize = 32;

/// How a noun named after a verb is handled when a binding resolves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingPolicy {
	/// Fail with [`LatchError::ReservedName`].
	Strict,
	/// Log an error and resolve to no noun.
	Lenient,
}

impl NamingPolicy {
	/// Returns the policy matching the build configuration.
	#[inline]
	pub fn for_build() -> Self {
		if cfg!(debug_assertions) {
			NamingPolicy::Strict
		} else {
			NamingPolicy::Lenient
		}
	}
}

impl Default for NamingPolicy {
	fn default() -> Self {
		Self::for_build()
	}
}

/// Configuration for a [`ToggleRegistry`](crate::ToggleRegistry) and the
/// bindings built on it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LatchConfig {
	/// Idle seconds before an unreferenced toggle becomes evictable.
	pub ttl_secs: u64,
	/// Seconds between eviction sweeps.
	pub sweep_interval_secs: u64,
	/// Handling of nouns named after verbs.
	pub naming: NamingPolicy,
	/// Maximum nesting of fan-out triggered by subscribers mutating toggles.
	pub max_notify_depth: usize,
}

impl Default for LatchConfig {
	fn default() -> Self {
		Self {
			ttl_secs: DEFAULT_TTL.as_secs(),
			sweep_interval_secs: DEFAULT_SWEEP_INTERVAL.as_secs(),
			naming: NamingPolicy::default(),
			max_notify_depth: DEFAULT_MAX_NOTIFY_DEPTH,
		}
	}
}

impl LatchConfig {
	/// Parses configuration from TOML text.
	pub fn from_toml_str(text: &str) -> Result<Self> {
		Ok(toml::from_str(text)?)
	}

	/// Reads and parses a TOML configuration file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path).map_err(|error| LatchError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&text)
	}

	/// Idle duration after which an unreferenced toggle is evictable.
	pub fn ttl(&self) -> Duration {
		Duration::from_secs(self.ttl_secs)
	}

	/// Period of the eviction sweep, between one second and one day.
	pub fn sweep_interval(&self) -> Duration {
		if self.sweep_interval_secs == 0 {
			tracing::warn!("sweep_interval_secs = 0 is not a valid period; using 1s");
			return Duration::from_secs(1);
		}
		let period = Duration::from_secs(self.sweep_interval_secs);
		if period > MAX_SWEEP_INTERVAL {
			tracing::warn!(
				requested = self.sweep_interval_secs,
				"sweep_interval_secs exceeds one day; using {}s",
				MAX_SWEEP_INTERVAL.as_secs()
			);
			return MAX_SWEEP_INTERVAL;
		}
		period
	}

	/// Fan-out nesting bound, at least one so top-level writes always notify.
	pub fn notify_depth(&self) -> usize {
		if self.max_notify_depth == 0 {
			tracing::warn!("max_notify_depth = 0 would silence every subscriber; using 1");
			return 1;
		}
		self.max_notify_depth
	}
}
