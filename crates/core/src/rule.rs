//! Rule collection for registration blocks.

/// Collects rules produced by one registration block.
///
/// Registration APIs hand a builder to the caller's closure and take the
/// rules it accumulated afterwards. Rule vocabularies are layered on top of
/// this type through extension traits.
#[derive(Debug)]
pub struct RuleBuilder<R> {
	rules: Vec<R>,
}

impl<R> Default for RuleBuilder<R> {
	fn default() -> Self {
		Self { rules: Vec::new() }
	}
}

impl<R> RuleBuilder<R> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends one rule.
	pub fn push(&mut self, rule: R) -> &mut Self {
		self.rules.push(rule);
		self
	}

	/// Appends rules in iteration order.
	pub fn extend(&mut self, rules: impl IntoIterator<Item = R>) -> &mut Self {
		self.rules.extend(rules);
		self
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	pub fn into_rules(self) -> Vec<R> {
		self.rules
	}

	/// Runs `block` against a fresh builder and returns what it produced.
	pub fn collect(block: impl FnOnce(&mut Self)) -> Vec<R> {
		let mut builder = Self::new();
		block(&mut builder);
		builder.into_rules()
	}
}

/// Named, accumulating bundle of rules.
///
/// Cloning a trait copies its rule list, so a derived definition can extend
/// an inherited trait without affecting its parent's copy.
#[derive(Debug, Clone)]
pub struct Trait<R> {
	rules: Vec<R>,
}

impl<R> Default for Trait<R> {
	fn default() -> Self {
		Self { rules: Vec::new() }
	}
}

impl<R> Trait<R> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends the rules produced by `block` after the existing ones.
	pub fn extend_with(&mut self, block: impl FnOnce(&mut RuleBuilder<R>)) -> usize {
		let added = RuleBuilder::collect(block);
		let count = added.len();
		self.rules.extend(added);
		count
	}

	pub fn rules(&self) -> &[R] {
		&self.rules
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_extend_with_appends_in_order() {
		let mut t = Trait::new();
		assert_eq!(
			t.extend_with(|b| {
				b.push(1).push(2);
			}),
			2
		);
		t.extend_with(|b| {
			b.extend([3, 4, 5]);
		});
		assert_eq!(t.rules(), &[1, 2, 3, 4, 5]);
	}

	#[test]
	fn test_clone_is_independent() {
		let mut original = Trait::new();
		original.extend_with(|b| {
			b.push("a");
		});
		let mut copy = original.clone();
		copy.extend_with(|b| {
			b.push("b");
		});
		assert_eq!(original.rules(), &["a"]);
		assert_eq!(copy.rules(), &["a", "b"]);
	}
}
