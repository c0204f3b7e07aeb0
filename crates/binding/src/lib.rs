//! Scoped bindings over latch toggles.
//!
//! A [`Toggles`] binding resolves toggle names either onto private cells
//! ([`Scope::Local`]) or onto keys of a shared [`ToggleRegistry`]
//! ([`Scope::Shared`]). It pins every shared key it touches, asks its
//! [`RefreshScheduler`] for a refresh whenever a bound toggle changes, and
//! lets go of both when dropped.
//!
//! [`ToggleRegistry`]: latch_core::ToggleRegistry

/// Refresh requests toward the consumer's rendering mechanism.
pub mod refresh;
/// Local versus namespaced resolution of toggle names.
pub mod scope;
/// The binding itself.
pub mod toggles;

pub use refresh::RefreshScheduler;
pub use scope::Scope;
pub use toggles::Toggles;
