//! Per-definition plan memoization.
//!
//! # Role
//!
//! Holds the compiled "no traits" plan and one plan per ordered trait
//! selection. Entries are computed once and never invalidated.
//!
//! # Invariants
//!
//! - Every caller resolving the same key observes the same `Arc<Plan>`, even
//!   when several threads compile it concurrently (see
//!   `tests::test_concurrent_first_resolution_shares_one_plan`).
//! - Compilation runs with no lock held; the write lock only guards the
//!   insert-if-absent step.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;

use crate::key::TraitKey;
use crate::plan::Plan;


/// How a plan lookup was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
	/// Served from the cache without compiling.
	Hit,
	/// Compiled by this call. The stored plan may still be another caller's
	/// when both compiled concurrently.
	Miss,
}

/// Compute-once storage for a definition's plans.
pub struct PlanCache<R> {
	default: RwLock<Option<Arc<Plan<R>>>>,
	by_traits: RwLock<HashMap<TraitKey, Arc<Plan<R>>>>,
}

impl<R> Default for PlanCache<R> {
	fn default() -> Self {
		Self {
			default: RwLock::new(None),
			by_traits: RwLock::new(HashMap::default()),
		}
	}
}

impl<R> PlanCache<R> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the cached default plan, if compiled.
	pub fn default_plan(&self) -> Option<Arc<Plan<R>>> {
		self.default.read().clone()
	}

	pub fn has_default(&self) -> bool {
		self.default.read().is_some()
	}

	/// Returns the cached plan for `key`, if compiled.
	pub fn get(&self, key: &str) -> Option<Arc<Plan<R>>> {
		self.by_traits.read().get(key).cloned()
	}

	pub fn contains(&self, key: &str) -> bool {
		self.by_traits.read().contains_key(key)
	}

	/// Number of cached trait combinations (the default plan is not counted).
	pub fn len(&self) -> usize {
		self.by_traits.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_traits.read().is_empty() && !self.has_default()
	}

	/// Cached trait-combination keys, sorted.
	pub fn keys(&self) -> Vec<TraitKey> {
		let mut keys: Vec<_> = self.by_traits.read().keys().cloned().collect();
		keys.sort();
		keys
	}

	/// Returns the default plan, compiling it with `compile` if absent.
	pub fn default_or_try_insert_with<E>(
		&self,
		compile: impl FnOnce() -> Result<Plan<R>, E>,
	) -> Result<(Arc<Plan<R>>, Lookup), E> {
		if let Some(plan) = self.default.read().as_ref() {
			return Ok((plan.clone(), Lookup::Hit));
		}

		let compiled = Arc::new(compile()?);
		let mut slot = self.default.write();
		if let Some(existing) = slot.as_ref() {
			tracing::debug!("default plan compiled concurrently; keeping stored plan");
			return Ok((existing.clone(), Lookup::Miss));
		}
		*slot = Some(compiled.clone());
		Ok((compiled, Lookup::Miss))
	}

	/// Returns the plan for `key`, compiling it with `compile` if absent.
	pub fn get_or_try_insert_with<E>(
		&self,
		key: &TraitKey,
		compile: impl FnOnce() -> Result<Plan<R>, E>,
	) -> Result<(Arc<Plan<R>>, Lookup), E> {
		if let Some(plan) = self.by_traits.read().get(key) {
			return Ok((plan.clone(), Lookup::Hit));
		}

		let compiled = Arc::new(compile()?);
		let mut map = self.by_traits.write();
		let stored = map.entry(key.clone()).or_insert_with(|| compiled.clone());
		if !Arc::ptr_eq(stored, &compiled) {
			tracing::debug!(key = %key, "plan compiled concurrently; keeping stored plan");
		}
		Ok((stored.clone(), Lookup::Miss))
	}
}

impl<R> std::fmt::Debug for PlanCache<R> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PlanCache")
			.field("has_default", &self.has_default())
			.field("keys", &self.keys())
			.finish()
	}
}
