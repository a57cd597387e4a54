/// A trait name that cannot be used as part of a cache key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid trait name {name:?}: names must be non-empty and must not contain ':'")]
pub struct InvalidTraitName {
	pub name: String,
}

/// Errors raised while declaring a definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
	#[error(transparent)]
	InvalidTraitName(#[from] InvalidTraitName),
}

/// Errors raised by a [`PlanCompiler`](crate::PlanCompiler).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
	/// A selected trait is not registered on the definition.
	#[error("trait {name:?} is not defined on {definition:?}")]
	UnknownTrait { definition: String, name: String },

	/// Compiler-specific failure.
	#[error("{0}")]
	Custom(String),
}

/// Errors raised while building [`CallOptions`](crate::CallOptions) from a raw value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionsError {
	#[error("call options must be an object, got {got}")]
	NotAnObject { got: &'static str },

	#[error("`traits` must be a string or an array of strings")]
	InvalidTraits,
}

/// Errors returned by [`Definition::call`](crate::Definition::call).
///
/// Compiler and adapter failures are passed through transparently: their
/// message and source chain are the collaborator's own.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError<E> {
	/// The object to duplicate was absent.
	#[error("nothing to duplicate: source object is absent")]
	UnprocessableSource,

	/// No adapter is reachable from the definition.
	#[error("no adapter configured for definition {definition:?}")]
	Configuration { definition: String },

	#[error(transparent)]
	InvalidTraitName(#[from] InvalidTraitName),

	#[error(transparent)]
	Compile(#[from] CompileError),

	#[error(transparent)]
	Adapter(E),
}

impl<E> DispatchError<E> {
	/// Returns the adapter error, if this is one.
	pub fn adapter_error(&self) -> Option<&E> {
		match self {
			DispatchError::Adapter(e) => Some(e),
			_ => None,
		}
	}
}
