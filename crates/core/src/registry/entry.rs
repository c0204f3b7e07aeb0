use std::panic::Location;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::noun::Noun;

/// Change observer invoked with the cell value current at call time.
pub(crate) type Callback = Arc<dyn Fn(bool) + Send + Sync>;

/// Authoritative cell for one shared toggle, plus its observers.
pub(crate) struct SharedCell {
	key: Box<str>,
	state: AtomicBool,
	subscribers: Mutex<Vec<(u64, Callback)>>,
	next_subscriber: AtomicU64,
	/// Current nesting of fan-out on this cell.
	depth: AtomicUsize,
	max_depth: usize,
}

impl SharedCell {
	fn new(key: &str, initial: bool, max_depth: usize) -> Self {
		Self {
			key: key.into(),
			state: AtomicBool::new(initial),
			subscribers: Mutex::new(Vec::new()),
			next_subscriber: AtomicU64::new(0),
			depth: AtomicUsize::new(0),
			max_depth,
		}
	}

	pub(crate) fn get(&self) -> bool {
		self.state.load(Ordering::Acquire)
	}

	/// Writes the cell and notifies subscribers when the value changed.
	pub(crate) fn set(&self, value: bool) {
		if self.state.swap(value, Ordering::AcqRel) == value {
			return;
		}
		self.notify();
	}

	fn notify(&self) {
		let guard = DepthGuard::enter(&self.depth);
		if guard.level > self.max_depth {
			tracing::error!(
				key = &*self.key,
				depth = guard.level,
				"toggle fan-out nested too deeply; subscribers not notified"
			);
			return;
		}

		// Snapshot so callbacks may (un)subscribe or mutate without holding the lock.
		let snapshot: Vec<Callback> = self.subscribers.lock().iter().map(|(_, cb)| cb.clone()).collect();
		// Nested fan-out may have changed the cell; hand out the live value.
		for callback in snapshot {
			callback(self.get());
		}
	}

	pub(crate) fn subscribe(&self, callback: Callback) -> u64 {
		let id = self.next_subscriber.fetch_add(1, Ordering::Relaxed);
		self.subscribers.lock().push((id, callback));
		id
	}

	fn unsubscribe(&self, id: u64) {
		self.subscribers.lock().retain(|(sid, _)| *sid != id);
	}

	pub(crate) fn subscriber_count(&self) -> usize {
		self.subscribers.lock().len()
	}
}

struct DepthGuard<'a> {
	depth: &'a AtomicUsize,
	level: usize,
}

impl<'a> DepthGuard<'a> {
	fn enter(depth: &'a AtomicUsize) -> Self {
		let level = depth.fetch_add(1, Ordering::AcqRel) + 1;
		Self { depth, level }
	}
}

impl Drop for DepthGuard<'_> {
	fn drop(&mut self) {
		self.depth.fetch_sub(1, Ordering::AcqRel);
	}
}

/// Registry record for one shared toggle.
pub(crate) struct ToggleEntry {
	pub(crate) cell: Arc<SharedCell>,
	pub(crate) noun: Noun,
	pub(crate) ref_count: usize,
	pub(crate) last_accessed: Instant,
	/// Value supplied at creation, kept for conflict checks.
	pub(crate) initial: bool,
	/// Call site that created the entry.
	pub(crate) origin: &'static Location<'static>,
}

impl ToggleEntry {
	pub(crate) fn new(key: &str, initial: bool, max_depth: usize, origin: &'static Location<'static>, now: Instant) -> Self {
		let cell = Arc::new(SharedCell::new(key, initial, max_depth));
		let read_cell = cell.clone();
		let write_cell = cell.clone();
		let noun = Noun::from_parts(
			key,
			Arc::new(move || read_cell.get()),
			Some(Arc::new(move |value| write_cell.set(value))),
		);
		Self {
			cell,
			noun,
			ref_count: 0,
			last_accessed: now,
			initial,
			origin,
		}
	}
}

/// Capability that removes one subscriber.
///
/// The callback runs once per change of the toggle's value. Writes that
/// leave the value unchanged do not notify.
///
/// [`Subscription::unsubscribe`] is idempotent and safe to call from inside
/// a fan-out or after the toggle was evicted. Dropping the handle
/// unsubscribes as well.
#[must_use = "dropping a Subscription unsubscribes its callback"]
pub struct Subscription {
	cell: Weak<SharedCell>,
	id: u64,
	active: AtomicBool,
}

impl Subscription {
	pub(crate) fn new(cell: &Arc<SharedCell>, id: u64) -> Self {
		Self {
			cell: Arc::downgrade(cell),
			id,
			active: AtomicBool::new(true),
		}
	}

	/// Stops this subscription's callback from firing.
	pub fn unsubscribe(&self) {
		if !self.active.swap(false, Ordering::AcqRel) {
			return;
		}
		if let Some(cell) = self.cell.upgrade() {
			tracing::trace!(key = &*cell.key, id = self.id, "toggle.unsubscribe");
			cell.unsubscribe(self.id);
		}
	}

	/// Returns true until [`Self::unsubscribe`] has been called.
	pub fn is_active(&self) -> bool {
		self.active.load(Ordering::Acquire)
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.unsubscribe();
	}
}

impl std::fmt::Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription")
			.field("id", &self.id)
			.field("active", &self.is_active())
			.finish()
	}
}
