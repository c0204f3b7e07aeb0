//! Predicate table.
//!
//! Every boolean accessor a [`Noun`] exposes is listed here once, with its
//! polarity. The table is flat: families such as `is<Positive>`,
//! `is<Negative>` and `has<State>` are a naming convention only.

use serde::Serialize;

use crate::noun::Noun;

/// Whether a predicate reads the cell directly or its negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
	/// Reads the cell as-is.
	Positive,
	/// Reads the negated cell.
	Negative,
}

impl Polarity {
	/// Applies this polarity to a sampled cell value.
	#[inline]
	pub const fn read(self, active: bool) -> bool {
		match self {
			Polarity::Positive => active,
			Polarity::Negative => !active,
		}
	}
}

/// One entry of the predicate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predicate {
	/// Name as exposed to lookups and serialization, e.g. `"isOpen"`.
	pub name: &'static str,
	/// Polarity relative to the underlying cell.
	pub polarity: Polarity,
}

impl Predicate {
	/// Returns the polarity for a predicate name.
	pub fn lookup(name: &str) -> Option<Polarity> {
		PREDICATES.iter().find(|p| p.name == name).map(|p| p.polarity)
	}
}

macro_rules! predicate_table {
	($($method:ident => $name:literal : $polarity:ident),+ $(,)?) => {
		/// Every predicate a noun answers, in declaration order.
		pub const PREDICATES: &[Predicate] = &[
			$(Predicate { name: $name, polarity: Polarity::$polarity }),+
		];

		impl Noun {
			$(
				#[doc = concat!("Reads `", $name, "`.")]
				#[inline]
				pub fn $method(&self) -> bool {
					Polarity::$polarity.read(self.sample())
				}
			)+
		}

		/// All predicate values captured from one sample of a cell.
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
		pub struct Readings {
			$(
				#[serde(rename = $name)]
				pub $method: bool,
			)+
		}

		impl Readings {
			/// Evaluates every predicate against `active`.
			pub const fn capture(active: bool) -> Self {
				Self {
					$($method: Polarity::$polarity.read(active)),+
				}
			}
		}
	};
}

predicate_table! {
	is_active => "isActive": Positive,
	is_open => "isOpen": Positive,
	is_visible => "isVisible": Positive,
	is_shown => "isShown": Positive,
	is_enabled => "isEnabled": Positive,
	is_on => "isOn": Positive,
	is_started => "isStarted": Positive,
	is_running => "isRunning": Positive,
	is_expanded => "isExpanded": Positive,
	is_selected => "isSelected": Positive,
	is_checked => "isChecked": Positive,
	is_inactive => "isInactive": Negative,
	is_closed => "isClosed": Negative,
	is_hidden => "isHidden": Negative,
	is_disabled => "isDisabled": Negative,
	is_off => "isOff": Negative,
	is_stopped => "isStopped": Negative,
	is_collapsed => "isCollapsed": Negative,
	is_deselected => "isDeselected": Negative,
	is_unchecked => "isUnchecked": Negative,
	has_started => "hasStarted": Positive,
	has_stopped => "hasStopped": Negative,
	has_opened => "hasOpened": Positive,
	has_closed => "hasClosed": Negative,
}
