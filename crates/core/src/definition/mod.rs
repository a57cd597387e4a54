//! Definition hierarchy, registration and dispatch.
//!
//! # Role
//!
//! A [`Definition`] is one node of the rule inheritance tree. The tree has a
//! single root created with [`Definition::root`]; every other node is created
//! with [`Definition::derive`] from an existing one.
//!
//! # Invariants
//!
//! - Deriving copies the parent's declarations and deep-copies each of its
//!   traits, so nothing mutable is shared between parent and child except the
//!   adapter and compiler `Arc`s (see `tests::test_child_mutation_never_reaches_parent`).
//! - The plan cache is never inherited; a derived node starts empty.
//! - Compiling and caching never touch declarations or traits. Only `&mut self`
//!   registration does, and it does not evict cached plans.

use std::sync::Arc;

use rustc_hash::FxHashMap as HashMap;

use crate::adapter::Adapter;
use crate::cache::{Lookup, PlanCache};
use crate::error::{CompileError, DefinitionError, DispatchError};
use crate::key::{TraitKey, TraitName};
use crate::options::CallOptions;
use crate::plan::{Plan, PlanCompiler};
use crate::rule::{RuleBuilder, Trait};


/// Trait name to trait bundle.
pub type TraitMap<R> = HashMap<TraitName, Trait<R>>;

/// Read-only view of a definition handed to a [`PlanCompiler`].
///
/// Exposes rules and traits only; caches and the adapter stay out of reach.
pub struct DefinitionView<'a, R> {
	name: &'a str,
	declarations: &'a [R],
	traits: &'a TraitMap<R>,
}

impl<R> Clone for DefinitionView<'_, R> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<R> Copy for DefinitionView<'_, R> {}

impl<'a, R> DefinitionView<'a, R> {
	pub fn name(&self) -> &'a str {
		self.name
	}

	pub fn declarations(&self) -> &'a [R] {
		self.declarations
	}

	pub fn trait_named(&self, name: &str) -> Option<&'a Trait<R>> {
		self.traits.get(name)
	}

	pub fn traits(&self) -> &'a TraitMap<R> {
		self.traits
	}
}

/// One node of the duplication rule hierarchy.
///
/// `R` is the rule type, opaque to this crate. `A` is the adapter that
/// performs duplications; it may be unsized (`dyn Adapter<R, ..>`).
pub struct Definition<R, A: ?Sized> {
	name: Box<str>,
	parent: Option<Box<str>>,
	declarations: Vec<R>,
	traits: TraitMap<R>,
	adapter: Option<Arc<A>>,
	compiler: Arc<dyn PlanCompiler<R>>,
	cache: PlanCache<R>,
}

impl<R, A: ?Sized> Definition<R, A> {
	/// Creates the root of a hierarchy.
	///
	/// The root is a sentinel: children derived directly from it never inherit
	/// its adapter and must set their own.
	pub fn root(name: impl Into<Box<str>>, compiler: Arc<dyn PlanCompiler<R>>) -> Self {
		Self {
			name: name.into(),
			parent: None,
			declarations: Vec::new(),
			traits: TraitMap::default(),
			adapter: None,
			compiler,
			cache: PlanCache::new(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn parent_name(&self) -> Option<&str> {
		self.parent.as_deref()
	}

	pub fn is_root(&self) -> bool {
		self.parent.is_none()
	}

	pub fn declarations(&self) -> &[R] {
		&self.declarations
	}

	pub fn traits(&self) -> impl Iterator<Item = (&TraitName, &Trait<R>)> {
		self.traits.iter()
	}

	pub fn trait_named(&self, name: &str) -> Option<&Trait<R>> {
		self.traits.get(name)
	}

	pub fn adapter(&self) -> Option<&Arc<A>> {
		self.adapter.as_ref()
	}

	pub fn cache(&self) -> &PlanCache<R> {
		&self.cache
	}

	pub fn view(&self) -> DefinitionView<'_, R> {
		DefinitionView {
			name: &self.name,
			declarations: &self.declarations,
			traits: &self.traits,
		}
	}

	/// Associates `adapter` with this definition.
	///
	/// Children derived afterwards inherit it; existing children keep theirs.
	pub fn set_adapter(&mut self, adapter: Arc<A>) -> &mut Self {
		self.adapter = Some(adapter);
		self
	}

	/// Appends one base declaration.
	pub fn declare(&mut self, rule: R) -> &mut Self {
		self.declarations.push(rule);
		self
	}

	/// Appends the base declarations produced by `block`.
	pub fn declare_with(&mut self, block: impl FnOnce(&mut RuleBuilder<R>)) -> &mut Self {
		self.declarations.extend(RuleBuilder::collect(block));
		self
	}

	/// Extends the trait `name` with the rules produced by `block`, creating it
	/// on first use.
	///
	/// Registering an existing name accumulates: the new rules follow the ones
	/// already registered.
	pub fn register_trait(
		&mut self,
		name: &str,
		block: impl FnOnce(&mut RuleBuilder<R>),
	) -> Result<&mut Self, DefinitionError> {
		let name = TraitName::new(name)?;
		let added = self.traits.entry(name.clone()).or_default().extend_with(block);
		tracing::trace!(
			definition = &*self.name,
			name = %name,
			added,
			"registered trait rules"
		);
		Ok(self)
	}

	/// Returns the plan for the empty trait selection, compiling it on first use.
	pub fn default_plan(&self) -> Result<Arc<Plan<R>>, CompileError> {
		let (plan, lookup) = self.cache.default_or_try_insert_with(|| {
			let plan = self.compiler.compile(self.view(), &[])?;
			tracing::debug!(
				definition = &*self.name,
				rules = plan.len(),
				"compiled default plan"
			);
			Ok::<_, CompileError>(plan)
		})?;
		if lookup == Lookup::Hit {
			tracing::trace!(definition = &*self.name, "default plan cache hit");
		}
		Ok(plan)
	}

	/// Returns the plan for the ordered selection `traits`, compiling it on
	/// first use.
	pub fn plan_with_traits(&self, traits: &[TraitName]) -> Result<Arc<Plan<R>>, CompileError> {
		let key = TraitKey::from_names(traits);
		let (plan, lookup) = self.cache.get_or_try_insert_with(&key, || {
			let plan = self.compiler.compile(self.view(), traits)?;
			tracing::debug!(
				definition = &*self.name,
				key = %key,
				rules = plan.len(),
				"compiled plan"
			);
			Ok::<_, CompileError>(plan)
		})?;
		if lookup == Lookup::Hit {
			tracing::trace!(definition = &*self.name, key = %key, "plan cache hit");
		}
		Ok(plan)
	}
}

impl<R: Clone, A: ?Sized> Definition<R, A> {
	/// Creates a child of this definition.
	///
	/// The child starts with a copy of the current declarations, a deep copy
	/// of every trait, this definition's adapter (unless this is the root) and
	/// an empty plan cache. Later changes on either side are not shared.
	pub fn derive(&self, name: impl Into<Box<str>>) -> Self {
		let name = name.into();
		tracing::debug!(
			definition = &*name,
			parent = &*self.name,
			declarations = self.declarations.len(),
			traits = self.traits.len(),
			"derived definition"
		);
		Self {
			name,
			parent: Some(self.name.clone()),
			declarations: self.declarations.clone(),
			traits: self
				.traits
				.iter()
				.map(|(name, t)| (name.clone(), t.clone()))
				.collect(),
			adapter: if self.is_root() {
				None
			} else {
				self.adapter.clone()
			},
			compiler: self.compiler.clone(),
			cache: PlanCache::new(),
		}
	}
}

impl<R, A> Definition<R, A>
where
	A: Adapter<R> + ?Sized,
{
	/// Duplicates `source` through this definition.
	///
	/// The `traits` entry of `options` selects the plan (none or empty means
	/// the default plan); the remaining entries reach the adapter as params.
	pub fn call(
		&self,
		source: Option<&A::Source>,
		options: CallOptions,
	) -> Result<A::Output, DispatchError<A::Error>> {
		let Some(source) = source else {
			return Err(DispatchError::UnprocessableSource);
		};
		let Some(adapter) = self.adapter.as_deref() else {
			return Err(DispatchError::Configuration {
				definition: self.name.to_string(),
			});
		};

		let (traits, params) = options.into_parts();
		let plan = match traits {
			Some(selection) if !selection.is_empty() => {
				let names = TraitName::parse_all(selection.names())?;
				self.plan_with_traits(&names)?
			}
			_ => self.default_plan()?,
		};

		adapter
			.duplicate(source, &plan, &params)
			.map_err(DispatchError::Adapter)
	}
}

impl<R: std::fmt::Debug, A: ?Sized> std::fmt::Debug for Definition<R, A> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut trait_names: Vec<_> = self.traits.keys().collect();
		trait_names.sort();
		f.debug_struct("Definition")
			.field("name", &self.name)
			.field("parent", &self.parent)
			.field("declarations", &self.declarations)
			.field("traits", &trait_names)
			.field("has_adapter", &self.adapter.is_some())
			.field("cache", &self.cache)
			.finish()
	}
}
