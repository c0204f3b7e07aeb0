//! Named read-only views over one boolean cell.
//!
//! A [`Noun`] owns no state. It holds a reader and, optionally, a writer
//! closed over one authoritative cell, and answers every predicate in the
//! [`PREDICATES`](crate::PREDICATES) table from a fresh read. The writer is
//! crate-private: consumers mutate a noun only through the verb dispatcher.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

use crate::predicate::{Predicate, Readings};

/// Reads the authoritative cell behind a noun.
pub type Reader = Arc<dyn Fn() -> bool + Send + Sync>;
/// Writes the authoritative cell behind a noun.
pub type Writer = Arc<dyn Fn(bool) + Send + Sync>;

/// Named view over one boolean cell.
///
/// Clones share identity; use [`Noun::ptr_eq`] to test it.
#[derive(Clone)]
pub struct Noun {
	inner: Arc<NounInner>,
}

struct NounInner {
	name: Box<str>,
	read: Reader,
	write: Option<Writer>,
}

impl Noun {
	/// Creates a noun over a reader/writer pair closed over one cell.
	pub fn new<R, W>(name: impl Into<Box<str>>, read: R, write: W) -> Self
	where
		R: Fn() -> bool + Send + Sync + 'static,
		W: Fn(bool) + Send + Sync + 'static,
	{
		Self::from_parts(name, Arc::new(read), Some(Arc::new(write)))
	}

	/// Creates a noun that can be read but not mutated.
	///
	/// Verbs applied to it log a "No setter" diagnostic and do nothing.
	pub fn read_only<R>(name: impl Into<Box<str>>, read: R) -> Self
	where
		R: Fn() -> bool + Send + Sync + 'static,
	{
		Self::from_parts(name, Arc::new(read), None)
	}

	/// Creates a noun backed by its own private cell.
	pub fn detached(name: impl Into<Box<str>>, initial: bool) -> Self {
		let cell = Arc::new(AtomicBool::new(initial));
		let read_cell = cell.clone();
		Self::new(
			name,
			move || read_cell.load(Ordering::Acquire),
			move |value| cell.store(value, Ordering::Release),
		)
	}

	pub(crate) fn from_parts(name: impl Into<Box<str>>, read: Reader, write: Option<Writer>) -> Self {
		Self {
			inner: Arc::new(NounInner {
				name: name.into(),
				read,
				write,
			}),
		}
	}

	/// Returns the noun's name.
	pub fn name(&self) -> &str {
		&self.inner.name
	}

	/// Samples the underlying cell.
	#[inline]
	pub(crate) fn sample(&self) -> bool {
		(self.inner.read)()
	}

	#[inline]
	pub(crate) fn writer(&self) -> Option<&Writer> {
		self.inner.write.as_ref()
	}

	/// Answers a predicate by its table name, e.g. `"isOpen"`.
	///
	/// Names outside the predicate table yield `None`.
	pub fn predicate(&self, name: &str) -> Option<bool> {
		Predicate::lookup(name).map(|polarity| polarity.read(self.sample()))
	}

	/// Captures every predicate from one sample of the cell.
	pub fn readings(&self) -> Readings {
		Readings::capture(self.sample())
	}

	/// Returns true when both handles refer to the same noun.
	pub fn ptr_eq(a: &Self, b: &Self) -> bool {
		Arc::ptr_eq(&a.inner, &b.inner)
	}
}

impl fmt::Debug for Noun {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Noun")
			.field("name", &self.name())
			.field("is_active", &self.sample())
			.finish()
	}
}

impl Serialize for Noun {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		#[derive(Serialize)]
		struct Repr<'a> {
			name: &'a str,
			#[serde(flatten)]
			readings: Readings,
		}

		Repr {
			name: self.name(),
			readings: self.readings(),
		}
		.serialize(serializer)
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::AtomicBool;

	use super::*;

	#[test]
	fn reads_track_the_cell_without_caching() {
		let cell = Arc::new(AtomicBool::new(false));
		let read = cell.clone();
		let noun = Noun::read_only("panel", move || read.load(Ordering::Acquire));

		assert!(!noun.is_open());
		assert!(noun.is_closed());
		cell.store(true, Ordering::Release);
		assert!(noun.is_open());
		assert!(!noun.is_closed());
	}

	#[test]
	fn predicate_lookup_answers_table_names_only() {
		let noun = Noun::detached("menu", true);
		assert_eq!(noun.predicate("isVisible"), Some(true));
		assert_eq!(noun.predicate("isHidden"), Some(false));
		assert_eq!(noun.predicate("hasStarted"), Some(true));
		assert_eq!(noun.predicate("isPurple"), None);
		assert_eq!(noun.predicate("open"), None);
		assert_eq!(noun.predicate("name"), None);
	}

	#[test]
	fn same_cell_nouns_differ_only_by_name() {
		let cell = Arc::new(AtomicBool::new(true));
		let (a_cell, b_cell) = (cell.clone(), cell.clone());
		let a = Noun::read_only("a", move || a_cell.load(Ordering::Acquire));
		let b = Noun::read_only("b", move || b_cell.load(Ordering::Acquire));

		assert_eq!(a.readings(), b.readings());
		assert_ne!(a.name(), b.name());
		assert!(!Noun::ptr_eq(&a, &b));
	}

	#[test]
	fn detached_nouns_never_share_state() {
		let a = Noun::detached("x", false);
		let b = Noun::detached("x", false);
		(a.writer().unwrap())(true);
		assert!(a.is_active());
		assert!(!b.is_active());
	}

	#[test]
	fn serialization_exposes_readings_but_no_setter() {
		let noun = Noun::detached("modal", true);
		let json = serde_json::to_value(&noun).unwrap();
		let object = json.as_object().unwrap();

		assert_eq!(object["name"], "modal");
		assert_eq!(object["isOpen"], true);
		assert_eq!(object["isClosed"], false);
		assert_eq!(object.len(), 1 + crate::PREDICATES.len());
	}

	#[test]
	fn debug_omits_setter() {
		let noun = Noun::detached("drawer", false);
		assert_eq!(format!("{noun:?}"), "Noun { name: \"drawer\", is_active: false }");
	}
}
