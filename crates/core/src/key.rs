//! Trait names and the canonical keys plans are cached under.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use crate::error::InvalidTraitName;

/// Separator used when joining trait names into a [`TraitKey`].
///
/// [`TraitName`] rejects names containing it, so distinct selections never
/// render to the same key.
pub const TRAIT_KEY_SEPARATOR: char = ':';

/// Validated name of a trait.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraitName(Arc<str>);

impl TraitName {
	/// Validates `name` for use as a trait name.
	pub fn new(name: impl AsRef<str>) -> Result<Self, InvalidTraitName> {
		let name = name.as_ref();
		if name.is_empty() || name.contains(TRAIT_KEY_SEPARATOR) {
			return Err(InvalidTraitName {
				name: name.to_string(),
			});
		}
		Ok(Self(Arc::from(name)))
	}

	/// Validates every name in `names`, preserving order and duplicates.
	pub fn parse_all<S: AsRef<str>>(names: &[S]) -> Result<Vec<Self>, InvalidTraitName> {
		names.iter().map(Self::new).collect()
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for TraitName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&*self.0, f)
	}
}

impl fmt::Display for TraitName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for TraitName {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl Borrow<str> for TraitName {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl TryFrom<&str> for TraitName {
	type Error = InvalidTraitName;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}

impl TryFrom<String> for TraitName {
	type Error = InvalidTraitName;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}

/// Canonical cache key for an ordered trait selection.
///
/// Names are joined in the order given. No sorting and no deduplication:
/// `[a, b]`, `[b, a]` and `[a, a]` are three different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraitKey(Box<str>);

impl TraitKey {
	pub fn from_names(names: &[TraitName]) -> Self {
		let mut key = String::new();
		for (i, name) in names.iter().enumerate() {
			if i > 0 {
				key.push(TRAIT_KEY_SEPARATOR);
			}
			key.push_str(name.as_str());
		}
		Self(key.into_boxed_str())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for TraitKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl Borrow<str> for TraitKey {
	fn borrow(&self) -> &str {
		&self.0
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case::empty("")]
	#[case::separator("a:b")]
	#[case::trailing("a:")]
	fn test_trait_name_rejects(#[case] raw: &str) {
		let err = TraitName::new(raw).unwrap_err();
		assert_eq!(err.name, raw);
	}

	#[test]
	fn test_key_preserves_order_and_duplicates() {
		let names = TraitName::parse_all(&["b", "a", "b"]).unwrap();
		assert_eq!(TraitKey::from_names(&names).as_str(), "b:a:b");
	}

	#[test]
	fn test_key_single_name_has_no_separator() {
		let names = TraitName::parse_all(&["only"]).unwrap();
		assert_eq!(TraitKey::from_names(&names).to_string(), "only");
	}
}
