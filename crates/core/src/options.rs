//! Per-call options.

use serde_json::Value;

use crate::adapter::Params;
use crate::error::OptionsError;

/// Ordered trait names requested for one call.
///
/// A single name converts into a one-element selection. Order and duplicates
/// are kept exactly as given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraitSelection {
	names: Vec<String>,
}

impl TraitSelection {
	pub fn names(&self) -> &[String] {
		&self.names
	}

	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}

	fn from_value(value: Value) -> Result<Self, OptionsError> {
		match value {
			Value::String(name) => Ok(Self::from(name)),
			Value::Array(items) => items
				.into_iter()
				.map(|item| match item {
					Value::String(name) => Ok(name),
					_ => Err(OptionsError::InvalidTraits),
				})
				.collect::<Result<Vec<_>, _>>()
				.map(|names| Self { names }),
			Value::Null => Ok(Self::default()),
			_ => Err(OptionsError::InvalidTraits),
		}
	}
}

impl From<&str> for TraitSelection {
	fn from(name: &str) -> Self {
		Self {
			names: vec![name.to_string()],
		}
	}
}

impl From<String> for TraitSelection {
	fn from(name: String) -> Self {
		Self { names: vec![name] }
	}
}

impl<S: Into<String>> From<Vec<S>> for TraitSelection {
	fn from(names: Vec<S>) -> Self {
		Self {
			names: names.into_iter().map(Into::into).collect(),
		}
	}
}

impl<S: Into<String>, const N: usize> From<[S; N]> for TraitSelection {
	fn from(names: [S; N]) -> Self {
		Self {
			names: names.into_iter().map(Into::into).collect(),
		}
	}
}

impl<S: Into<String>> FromIterator<S> for TraitSelection {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		Self {
			names: iter.into_iter().map(Into::into).collect(),
		}
	}
}

/// Options bag for [`Definition::call`](crate::Definition::call).
///
/// The `traits` entry selects the plan; every other entry is an adapter
/// parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallOptions {
	traits: Option<TraitSelection>,
	params: Params,
}

impl CallOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_traits(mut self, traits: impl Into<TraitSelection>) -> Self {
		self.traits = Some(traits.into());
		self
	}

	pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.params.insert(key.into(), value.into());
		self
	}

	pub fn with_params(mut self, params: Params) -> Self {
		self.params.extend(params);
		self
	}

	/// Builds options from a JSON object, moving its `"traits"` entry into the
	/// trait selection and keeping every other entry as a param.
	pub fn from_json(value: Value) -> Result<Self, OptionsError> {
		let mut params = match value {
			Value::Object(params) => params,
			other => {
				return Err(OptionsError::NotAnObject {
					got: json_type_name(&other),
				});
			}
		};
		let traits = params
			.remove("traits")
			.map(TraitSelection::from_value)
			.transpose()?;
		Ok(Self { traits, params })
	}

	pub fn traits(&self) -> Option<&TraitSelection> {
		self.traits.as_ref()
	}

	pub fn params(&self) -> &Params {
		&self.params
	}

	pub fn into_parts(self) -> (Option<TraitSelection>, Params) {
		(self.traits, self.params)
	}
}

fn json_type_name(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "bool",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}
