//! Compiled plans and the compiler seam.

use std::ops::Deref;

use crate::definition::DefinitionView;
use crate::error::CompileError;
use crate::key::TraitName;

/// Immutable, fully resolved rule sequence for one definition and one trait
/// selection.
///
/// Plans are shared as `Arc<Plan<R>>` once cached; nothing hands out mutable
/// access after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan<R> {
	rules: Box<[R]>,
	traits: Box<[TraitName]>,
}

impl<R> Plan<R> {
	pub fn new(rules: Vec<R>, traits: &[TraitName]) -> Self {
		Self {
			rules: rules.into_boxed_slice(),
			traits: traits.into(),
		}
	}

	pub fn rules(&self) -> &[R] {
		&self.rules
	}

	/// Trait selection this plan was compiled for, in caller order.
	pub fn traits(&self) -> &[TraitName] {
		&self.traits
	}
}

impl<R> Deref for Plan<R> {
	type Target = [R];

	fn deref(&self) -> &[R] {
		&self.rules
	}
}

impl<'a, R> IntoIterator for &'a Plan<R> {
	type Item = &'a R;
	type IntoIter = std::slice::Iter<'a, R>;

	fn into_iter(self) -> Self::IntoIter {
		self.rules.iter()
	}
}

/// Turns a definition and an ordered trait selection into a [`Plan`].
///
/// Results are memoized indefinitely per definition, so implementations must
/// be pure in the definition's rules, its traits and `traits`.
pub trait PlanCompiler<R>: Send + Sync {
	fn compile(
		&self,
		def: DefinitionView<'_, R>,
		traits: &[TraitName],
	) -> Result<Plan<R>, CompileError>;
}

impl<R, F> PlanCompiler<R> for F
where
	F: Fn(DefinitionView<'_, R>, &[TraitName]) -> Result<Plan<R>, CompileError> + Send + Sync,
{
	fn compile(
		&self,
		def: DefinitionView<'_, R>,
		traits: &[TraitName],
	) -> Result<Plan<R>, CompileError> {
		self(def, traits)
	}
}

/// Concatenating compiler: base declarations, then each selected trait's
/// rules in selection order.
///
/// Overrides are left to whoever interprets the plan. A trait selected twice
/// contributes its rules twice.
#[derive(Debug, Default, Clone, Copy)]
pub struct MergeCompiler;

impl MergeCompiler {
	/// Merges without wrapping the result into a [`Plan`].
	pub fn merge<R: Clone>(
		def: DefinitionView<'_, R>,
		traits: &[TraitName],
	) -> Result<Vec<R>, CompileError> {
		let mut rules = def.declarations().to_vec();
		for name in traits {
			let Some(t) = def.trait_named(name.as_str()) else {
				return Err(CompileError::UnknownTrait {
					definition: def.name().to_string(),
					name: name.to_string(),
				});
			};
			rules.extend_from_slice(t.rules());
		}
		Ok(rules)
	}
}

impl<R: Clone> PlanCompiler<R> for MergeCompiler {
	fn compile(
		&self,
		def: DefinitionView<'_, R>,
		traits: &[TraitName],
	) -> Result<Plan<R>, CompileError> {
		Ok(Plan::new(Self::merge(def, traits)?, traits))
	}
}
