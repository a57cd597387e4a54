//! The duplication seam.

use crate::plan::Plan;

/// Adapter-specific call parameters, passed through untouched.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// Performs a duplication by walking a compiled [`Plan`].
///
/// The plan is borrowed immutably; adapters must not rely on anything but its
/// rules and the caller's params. Errors are returned to the caller of
/// [`Definition::call`](crate::Definition::call) as
/// [`DispatchError::Adapter`](crate::DispatchError::Adapter), unchanged.
pub trait Adapter<R>: Send + Sync {
	type Source: ?Sized;
	type Output;
	type Error: std::error::Error + Send + Sync + 'static;

	fn duplicate(
		&self,
		source: &Self::Source,
		plan: &Plan<R>,
		params: &Params,
	) -> Result<Self::Output, Self::Error>;
}
