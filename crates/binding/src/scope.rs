/// Where a binding keeps its toggles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
	/// Private cells owned by the binding.
	Local,
	/// Registry cells under `namespace`, shared with every binding using it.
	Shared(String),
}

impl Scope {
	/// Creates a shared scope.
	pub fn shared(namespace: impl Into<String>) -> Self {
		Scope::Shared(namespace.into())
	}

	/// Returns the registry key for `name`, or `None` for local scopes.
	pub fn key(&self, name: &str) -> Option<String> {
		match self {
			Scope::Local => None,
			Scope::Shared(namespace) => Some(format!("{namespace}:{name}")),
		}
	}

	/// Returns true for [`Scope::Shared`].
	pub fn is_shared(&self) -> bool {
		matches!(self, Scope::Shared(_))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn shared_keys_are_namespaced() {
		assert_eq!(Scope::shared("dialogs").key("confirm").as_deref(), Some("dialogs:confirm"));
		assert_eq!(Scope::Local.key("confirm"), None);
		assert!(!Scope::Local.is_shared());
	}
}
