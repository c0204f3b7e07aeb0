use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use latch_core::{
	LatchError, NamingPolicy, Noun, Result, Subscription, ToggleRegistry, Verb, VerbOutcome,
	is_reserved,
};
use parking_lot::Mutex;
use rustc_hash::FxHashMap as HashMap;
use uuid::Uuid;

use crate::refresh::RefreshScheduler;
use crate::scope::Scope;


struct Bound {
	noun: Noun,
	/// Registry key pinned by this binding, for shared nouns.
	key: Option<String>,
	subscription: Option<Subscription>,
}

/// A set of named toggles resolved in one [`Scope`].
///
/// Each name is bound once and cached for the binding's lifetime. Shared
/// names hold a registry reference and a refresh subscription until the
/// binding is dropped.
pub struct Toggles {
	scope: Scope,
	registry: ToggleRegistry,
	scheduler: Arc<dyn RefreshScheduler>,
	bound: Mutex<HashMap<Box<str>, Bound>>,
}

impl Toggles {
	/// Creates a binding. Local scopes never touch `registry`.
	pub fn new(scope: Scope, registry: ToggleRegistry, scheduler: impl RefreshScheduler + 'static) -> Self {
		Self {
			scope,
			registry,
			scheduler: Arc::new(scheduler),
			bound: Mutex::new(HashMap::default()),
		}
	}

	/// Returns the binding's scope.
	pub fn scope(&self) -> &Scope {
		&self.scope
	}

	/// Returns the noun bound to `name`, binding it with `initial` on first use.
	///
	/// Names that are also verbs are refused: under
	/// [`NamingPolicy::Strict`] with [`LatchError::ReservedName`], under
	/// [`NamingPolicy::Lenient`] with an error log and `Ok(None)`.
	#[track_caller]
	pub fn noun(&self, name: &str, initial: bool) -> Result<Option<Noun>> {
		if is_reserved(name) {
			return match self.registry.config().naming {
				NamingPolicy::Strict => Err(LatchError::ReservedName { name: name.to_string() }),
				NamingPolicy::Lenient => {
					tracing::error!(noun = name, "noun name '{name}' collides with a verb; no noun bound");
					Ok(None)
				}
			};
		}

		let mut bound = self.bound.lock();
		if let Some(existing) = bound.get(name) {
			return Ok(Some(existing.noun.clone()));
		}
		let entry = match self.scope.key(name) {
			None => self.bind_local(name, initial),
			Some(key) => self.bind_shared(key, initial)?,
		};
		let noun = entry.noun.clone();
		bound.insert(name.into(), entry);
		Ok(Some(noun))
	}

	/// Binds a private single-cell noun under a random name.
	pub fn anonymous(&self, initial: bool) -> Noun {
		let token = Uuid::new_v4().simple().to_string();
		let entry = self.bind_local(&token, initial);
		let noun = entry.noun.clone();
		self.bound.lock().insert(token.into(), entry);
		noun
	}

	/// Applies `verb` to the noun bound as `name`.
	///
	/// An unbound name is reported like any target without a setter.
	///
	/// # Errors
	///
	/// [`LatchError::UnknownVerb`] if `verb` is not in the verb table.
	pub fn apply(&self, verb: &str, name: &str) -> Result<VerbOutcome> {
		let verb = Verb::resolve(verb)?;
		// Clone out so fan-out may re-enter this binding.
		let noun = self.bound.lock().get(name).map(|b| b.noun.clone());
		if noun.is_none() {
			tracing::debug!(noun = name, "verb applied to an unbound toggle");
		}
		Ok(latch_core::apply(verb, noun.as_ref()))
	}

	/// Returns the bound nouns, sorted by name.
	pub fn nouns(&self) -> Vec<Noun> {
		let mut nouns: Vec<Noun> = self.bound.lock().values().map(|b| b.noun.clone()).collect();
		nouns.sort_by(|a, b| a.name().cmp(b.name()));
		nouns
	}

	fn bind_local(&self, name: &str, initial: bool) -> Bound {
		let cell = Arc::new(AtomicBool::new(initial));
		let read = cell.clone();
		let scheduler = self.scheduler.clone();
		let noun = Noun::new(
			name,
			move || read.load(Ordering::Acquire),
			move |value| {
				if cell.swap(value, Ordering::AcqRel) != value {
					scheduler.request_refresh();
				}
			},
		);
		tracing::trace!(noun = name, initial, "binding.local");
		Bound {
			noun,
			key: None,
			subscription: None,
		}
	}

	#[track_caller]
	fn bind_shared(&self, key: String, initial: bool) -> Result<Bound> {
		let noun = self.registry.get(&key, initial);
		self.registry.acquire(&key);
		let scheduler = self.scheduler.clone();
		let subscription = match self.registry.subscribe(&key, move |_| scheduler.request_refresh()) {
			Ok(subscription) => subscription,
			Err(err) => {
				self.registry.release(&key);
				return Err(err);
			}
		};
		tracing::trace!(key = %key, initial, "binding.shared");
		Ok(Bound {
			noun,
			key: Some(key),
			subscription: Some(subscription),
		})
	}
}

impl Drop for Toggles {
	fn drop(&mut self) {
		for (_, entry) in self.bound.get_mut().drain() {
			if let Some(subscription) = &entry.subscription {
				subscription.unsubscribe();
			}
			if let Some(key) = &entry.key {
				self.registry.release(key);
			}
		}
	}
}

impl fmt::Debug for Toggles {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Toggles")
			.field("scope", &self.scope)
			.field("bound", &self.bound.lock().len())
			.finish()
	}
}
