//! Shared, named boolean toggles.
//!
//! A toggle is one boolean cell read through many differently phrased
//! predicates ([`Noun::is_open`], [`Noun::is_hidden`], ...) and mutated
//! through paired verbs (`open`/`close`, `show`/`hide`, `toggle`). Shared
//! cells live in a [`ToggleRegistry`] keyed by string, reference counted
//! and evicted once idle past a TTL.

/// Runtime configuration for registries and bindings.
pub mod config;
/// Error taxonomy.
pub mod error;
/// Named read-only views over one boolean cell.
pub mod noun;
/// Predicate name to polarity table.
pub mod predicate;
/// Shared toggle registry with refcounting, fan-out and idle eviction.
pub mod registry;
/// Verb table and dispatcher.
pub mod verb;

pub use config::{LatchConfig, NamingPolicy};
pub use error::{LatchError, Result};
pub use noun::{Noun, Reader, Writer};
pub use predicate::{PREDICATES, Polarity, Predicate, Readings};
pub use registry::{RegistryStats, Subscription, ToggleRegistry};
pub use verb::{TOGGLE, VERB_PAIRS, Verb, VerbOutcome, apply, apply_verb, is_reserved, verb_names};
