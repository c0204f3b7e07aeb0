//! Verb table and dispatcher.
//!
//! Verbs come in positive/negative pairs (`open`/`close`, `show`/`hide`, ...)
//! plus the reserved [`TOGGLE`]. A positive verb forces the cell true, its
//! partner forces it false, and `toggle` writes the negation of the value
//! sampled at dispatch time.

use std::sync::LazyLock;

use crate::error::{LatchError, Result};
use crate::noun::Noun;

/// Positive verb to negative verb.
pub const VERB_PAIRS: &[(&str, &str)] = &[
	("open", "close"),
	("show", "hide"),
	("activate", "deactivate"),
	("enable", "disable"),
	("start", "stop"),
	("expand", "collapse"),
	("select", "deselect"),
	("check", "uncheck"),
	("turnOn", "turnOff"),
];

/// The verb that inverts a cell.
pub const TOGGLE: &str = "toggle";

static VERB_NAMES: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
	VERB_PAIRS
		.iter()
		.flat_map(|&(positive, negative)| [positive, negative])
		.chain(std::iter::once(TOGGLE))
		.collect()
});

/// Every valid verb name: each pair in table order, then `toggle`.
pub fn verb_names() -> &'static [&'static str] {
	&VERB_NAMES
}

/// Returns true when `name` is a verb and therefore unusable as a noun name.
pub fn is_reserved(name: &str) -> bool {
	Verb::parse(name).is_some()
}

/// A resolved verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
	/// Force the cell to the given value.
	Set(bool),
	/// Invert the cell.
	Toggle,
}

impl Verb {
	/// Resolves a verb name.
	pub fn parse(name: &str) -> Option<Self> {
		if name == TOGGLE {
			return Some(Verb::Toggle);
		}
		VERB_PAIRS.iter().find_map(|&(positive, negative)| {
			if name == positive {
				Some(Verb::Set(true))
			} else if name == negative {
				Some(Verb::Set(false))
			} else {
				None
			}
		})
	}

	/// Resolves a verb name, suggesting the closest known verb on failure.
	pub fn resolve(name: &str) -> Result<Self> {
		Self::parse(name).ok_or_else(|| LatchError::UnknownVerb {
			name: name.to_string(),
			suggestion: suggest_verb(name),
		})
	}
}

/// Returns the closest verb name within a small edit distance.
pub fn suggest_verb(name: &str) -> Option<String> {
	verb_names()
		.iter()
		.min_by_key(|v| strsim::levenshtein(name, v))
		.filter(|v| strsim::levenshtein(name, v) <= 3)
		.map(|v| v.to_string())
}

/// Result of dispatching a verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbOutcome {
	/// The cell was written with this value.
	Applied(bool),
	/// The target had no setter; nothing was written.
	NoSetter,
}

/// Applies a resolved verb to a noun.
///
/// A missing target or a read-only noun is logged and leaves state alone;
/// this never fails.
pub fn apply(verb: Verb, noun: Option<&Noun>) -> VerbOutcome {
	let Some(write) = noun.and_then(Noun::writer) else {
		let target = noun.map_or("undefined", Noun::name);
		match verb {
			Verb::Set(value) => tracing::warn!(noun = target, polarity = value, "No setter for {target}; cannot set {value}"),
			Verb::Toggle => tracing::warn!(noun = target, polarity = "toggle", "No setter for {target}; cannot toggle"),
		}
		return VerbOutcome::NoSetter;
	};
	let value = match verb {
		Verb::Set(value) => value,
		Verb::Toggle => !noun.is_some_and(Noun::is_active),
	};
	write(value);
	VerbOutcome::Applied(value)
}

/// Resolves `name` and applies it to a noun.
pub fn apply_verb(name: &str, noun: Option<&Noun>) -> Result<VerbOutcome> {
	Verb::resolve(name).map(|verb| apply(verb, noun))
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case("open", true)]
	#[case("close", false)]
	#[case("show", true)]
	#[case("hide", false)]
	#[case("activate", true)]
	#[case("deactivate", false)]
	#[case("enable", true)]
	#[case("disable", false)]
	#[case("start", true)]
	#[case("stop", false)]
	#[case("expand", true)]
	#[case("collapse", false)]
	#[case("select", true)]
	#[case("deselect", false)]
	#[case("check", true)]
	#[case("uncheck", false)]
	#[case("turnOn", true)]
	#[case("turnOff", false)]
	fn paired_verbs_force_their_value(#[case] name: &str, #[case] expected: bool) {
		for initial in [false, true] {
			let noun = Noun::detached("cell", initial);
			assert_eq!(apply_verb(name, Some(&noun)).unwrap(), VerbOutcome::Applied(expected));
			assert_eq!(noun.is_active(), expected);
			apply_verb(name, Some(&noun)).unwrap();
			assert_eq!(noun.is_active(), expected, "{name} is idempotent");
		}
	}

	#[test]
	fn toggle_is_an_involution() {
		for initial in [false, true] {
			let noun = Noun::detached("cell", initial);
			apply_verb(TOGGLE, Some(&noun)).unwrap();
			assert_eq!(noun.is_active(), !initial);
			apply_verb(TOGGLE, Some(&noun)).unwrap();
			assert_eq!(noun.is_active(), initial);
		}
	}

	#[test]
	fn verb_names_enumerate_the_table() {
		let names = verb_names();
		assert_eq!(names.len(), VERB_PAIRS.len() * 2 + 1);
		assert_eq!(names.last(), Some(&TOGGLE));
		assert!(names.iter().all(|n| is_reserved(n)));
		assert!(!is_reserved("modal"));
	}

	#[test]
	fn unknown_verb_suggests_closest_name() {
		let err = Verb::resolve("opne").unwrap_err();
		match &err {
			LatchError::UnknownVerb { name, suggestion } => {
				assert_eq!(name, "opne");
				assert_eq!(suggestion.as_deref(), Some("open"));
			}
			other => panic!("unexpected error: {other:?}"),
		}
		assert_eq!(err.to_string(), "unknown verb 'opne' (did you mean 'open'?)");
		assert_eq!(suggest_verb("frobnicate-everything"), None);
	}

	#[test]
	fn missing_setter_is_a_no_op() {
		let noun = Noun::read_only("fixed", || true);
		assert_eq!(apply(Verb::Set(false), Some(&noun)), VerbOutcome::NoSetter);
		assert!(noun.is_active());
		assert_eq!(apply(Verb::Toggle, None), VerbOutcome::NoSetter);
	}
}
