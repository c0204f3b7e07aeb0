//! Shared toggle registry.
//!
//! The [`ToggleRegistry`] maps string keys to shared boolean cells. Each
//! entry carries its current state, change observers, a reference count,
//! the time it was last touched and the value it was created with.
//!
//! # Lifetime
//!
//! - [`ToggleRegistry::get`] creates an entry on first use and refreshes its
//!   access time on every call.
//! - [`ToggleRegistry::acquire`] / [`ToggleRegistry::release`] pin an entry.
//! - An entry is evicted by a sweep once its reference count is zero and it
//!   has been idle longer than the configured TTL. Referenced entries are
//!   never evicted, however old.
//!
//! # Fan-out
//!
//! Writing a cell through its noun synchronously calls every subscriber of
//! that entry, once per change, in subscription order. No registry lock is
//! held while a subscriber runs, so subscribers may read, mutate, subscribe
//! or unsubscribe freely. Nested fan-out is bounded by
//! [`LatchConfig::max_notify_depth`].

mod entry;
mod sweep;

use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub use entry::Subscription;
use entry::ToggleEntry;
use parking_lot::Mutex;
use rustc_hash::FxHashMap as HashMap;
use sweep::SweepHandle;
use tokio::time::Instant;

use crate::config::LatchConfig;
use crate::error::{LatchError, Result};
use crate::noun::Noun;

/// Counters describing a registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
	/// Live entries.
	pub entries: usize,
	/// Initial-value conflicts reported by [`ToggleRegistry::get`].
	pub conflicts: u64,
	/// Entries removed by eviction sweeps.
	pub evicted: u64,
}

enum SweeperState {
	Stopped,
	Running(SweepHandle),
	Destroyed,
}

pub(crate) struct RegistryInner {
	config: LatchConfig,
	/// `config.max_notify_depth`, clamped once at construction.
	notify_depth: usize,
	entries: Mutex<HashMap<Box<str>, ToggleEntry>>,
	sweeper: Mutex<SweeperState>,
	conflicts: AtomicU64,
	evicted: AtomicU64,
}

impl RegistryInner {
	/// Removes every unreferenced entry idle for longer than the TTL.
	pub(crate) fn evict_idle(&self, now: Instant) -> usize {
		let ttl = self.config.ttl();
		let mut entries = self.entries.lock();
		let before = entries.len();
		entries.retain(|key, entry| {
			let keep = entry.ref_count > 0 || now.saturating_duration_since(entry.last_accessed) <= ttl;
			if !keep {
				tracing::debug!(key = &**key, "evicting idle toggle");
			}
			keep
		});
		let evicted = before - entries.len();
		self.evicted.fetch_add(evicted as u64, Ordering::Relaxed);
		evicted
	}
}

impl Drop for RegistryInner {
	fn drop(&mut self) {
		if let SweeperState::Running(handle) = self.sweeper.get_mut() {
			handle.stop();
		}
	}
}

/// Reference-counted, idle-evicting map of shared boolean toggles.
///
/// Handles are cheap to clone and all refer to the same registry. Whether
/// a process keeps one registry or several is up to the caller, as is when
/// the eviction sweeper runs ([`Self::start`] / [`Self::stop`]).
#[derive(Clone)]
pub struct ToggleRegistry {
	inner: Arc<RegistryInner>,
}

impl Default for ToggleRegistry {
	fn default() -> Self {
		Self::new(LatchConfig::default())
	}
}

impl fmt::Debug for ToggleRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ToggleRegistry")
			.field("entries", &self.len())
			.field("running", &self.is_running())
			.finish()
	}
}

impl ToggleRegistry {
	/// Creates an empty registry. The sweeper is not started.
	pub fn new(config: LatchConfig) -> Self {
		Self {
			inner: Arc::new(RegistryInner {
				notify_depth: config.notify_depth(),
				config,
				entries: Mutex::new(HashMap::default()),
				sweeper: Mutex::new(SweeperState::Stopped),
				conflicts: AtomicU64::new(0),
				evicted: AtomicU64::new(0),
			}),
		}
	}

	/// Returns the registry configuration.
	pub fn config(&self) -> &LatchConfig {
		&self.inner.config
	}

	/// Returns the noun for `key`, creating the entry with `initial` if absent.
	///
	/// Every call refreshes the entry's access time. When the entry exists
	/// and was created with a different initial value, the existing state is
	/// kept and a conflict naming both call sites is logged.
	#[track_caller]
	pub fn get(&self, key: &str, initial: bool) -> Noun {
		let site = Location::caller();
		let now = Instant::now();
		let mut entries = self.inner.entries.lock();

		if let Some(entry) = entries.get_mut(key) {
			entry.last_accessed = now;
			if entry.initial != initial {
				self.inner.conflicts.fetch_add(1, Ordering::Relaxed);
				tracing::error!(
					key = key,
					existing = entry.initial,
					requested = initial,
					first_site = %entry.origin,
					site = %site,
					"toggle '{key}' requested with initial value {initial} but was created with {}; keeping the original",
					entry.initial,
				);
			}
			return entry.noun.clone();
		}

		tracing::trace!(key = key, initial, site = %site, "toggle.create");
		let entry = ToggleEntry::new(key, initial, self.inner.notify_depth, site, now);
		let noun = entry.noun.clone();
		entries.insert(key.into(), entry);
		noun
	}

	/// Adds a reference to `key`. Unknown keys are ignored.
	pub fn acquire(&self, key: &str) {
		let mut entries = self.inner.entries.lock();
		let Some(entry) = entries.get_mut(key) else {
			tracing::trace!(key = key, "acquire of unknown toggle ignored");
			return;
		};
		entry.ref_count += 1;
		tracing::trace!(key = key, refs = entry.ref_count, "toggle.acquire");
	}

	/// Drops a reference to `key`, never below zero. Unknown keys are ignored.
	///
	/// The access time is refreshed so the TTL counts from the last release.
	pub fn release(&self, key: &str) {
		let mut entries = self.inner.entries.lock();
		let Some(entry) = entries.get_mut(key) else {
			tracing::trace!(key = key, "release of unknown toggle ignored");
			return;
		};
		if entry.ref_count == 0 {
			tracing::debug!(key = key, "release without a matching acquire");
		} else {
			entry.ref_count -= 1;
		}
		entry.last_accessed = Instant::now();
		tracing::trace!(key = key, refs = entry.ref_count, "toggle.release");
	}

	/// Registers a change observer for `key`.
	///
	/// The callback receives the toggle's value at the time it runs and is
	/// called once per change. Writing the value a toggle already holds does
	/// not notify.
	///
	/// # Errors
	///
	/// Returns [`LatchError::UnknownKey`] if `key` was never created.
	pub fn subscribe<F>(&self, key: &str, callback: F) -> Result<Subscription>
	where
		F: Fn(bool) + Send + Sync + 'static,
	{
		let entries = self.inner.entries.lock();
		let entry = entries.get(key).ok_or_else(|| LatchError::UnknownKey { key: key.to_string() })?;
		let id = entry.cell.subscribe(Arc::new(callback));
		tracing::trace!(key = key, id, "toggle.subscribe");
		Ok(Subscription::new(&entry.cell, id))
	}

	/// Returns true if `key` exists. Does not touch access time or refcount.
	pub fn has(&self, key: &str) -> bool {
		self.inner.entries.lock().contains_key(key)
	}

	/// Returns the reference count of `key`, if it exists.
	pub fn ref_count(&self, key: &str) -> Option<usize> {
		self.inner.entries.lock().get(key).map(|e| e.ref_count)
	}

	/// Returns the number of live subscribers of `key`, if it exists.
	pub fn subscriber_count(&self, key: &str) -> Option<usize> {
		self.inner.entries.lock().get(key).map(|e| e.cell.subscriber_count())
	}

	/// Returns the number of live entries.
	pub fn len(&self) -> usize {
		self.inner.entries.lock().len()
	}

	/// Returns true if the registry holds no entries.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns registry counters.
	pub fn stats(&self) -> RegistryStats {
		RegistryStats {
			entries: self.len(),
			conflicts: self.inner.conflicts.load(Ordering::Relaxed),
			evicted: self.inner.evicted.load(Ordering::Relaxed),
		}
	}

	/// Runs one eviction pass now and returns the number of evicted entries.
	pub fn sweep(&self) -> usize {
		self.inner.evict_idle(Instant::now())
	}

	/// Starts the periodic eviction sweeper on the current tokio runtime.
	///
	/// Idempotent while running.
	///
	/// # Errors
	///
	/// [`LatchError::NoRuntime`] outside a runtime, [`LatchError::Destroyed`]
	/// after [`Self::destroy`].
	pub fn start(&self) -> Result<()> {
		let mut sweeper = self.inner.sweeper.lock();
		match &*sweeper {
			SweeperState::Running(_) => Ok(()),
			SweeperState::Destroyed => Err(LatchError::Destroyed),
			SweeperState::Stopped => {
				let handle = SweepHandle::spawn(Arc::downgrade(&self.inner), self.inner.config.sweep_interval())?;
				*sweeper = SweeperState::Running(handle);
				Ok(())
			}
		}
	}

	/// Stops the eviction sweeper. Entries are kept.
	pub fn stop(&self) {
		let mut sweeper = self.inner.sweeper.lock();
		if let SweeperState::Running(handle) = &*sweeper {
			handle.stop();
			*sweeper = SweeperState::Stopped;
		}
	}

	/// Returns true while the eviction sweeper is running.
	pub fn is_running(&self) -> bool {
		matches!(*self.inner.sweeper.lock(), SweeperState::Running(_))
	}

	/// Drops every entry and restarts a running sweeper's timer.
	///
	/// Meant for full resets such as test isolation.
	pub fn clear(&self) {
		let dropped = std::mem::take(&mut *self.inner.entries.lock());
		let mut sweeper = self.inner.sweeper.lock();
		*sweeper = match std::mem::replace(&mut *sweeper, SweeperState::Stopped) {
			SweeperState::Running(handle) => {
				SweeperState::Running(handle.restart(Arc::downgrade(&self.inner), self.inner.config.sweep_interval()))
			}
			other => other,
		};
		tracing::debug!(entries = dropped.len(), "toggle registry cleared");
	}

	/// Drops every entry and stops the sweeper for good.
	pub fn destroy(&self) {
		let dropped = std::mem::take(&mut *self.inner.entries.lock());
		let mut sweeper = self.inner.sweeper.lock();
		if let SweeperState::Running(handle) = &*sweeper {
			handle.stop();
		}
		*sweeper = SweeperState::Destroyed;
		tracing::debug!(entries = dropped.len(), "toggle registry destroyed");
	}
}
