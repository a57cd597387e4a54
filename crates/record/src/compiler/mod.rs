//! Plan compilation for record rules.
//!
//! Base declarations and the selected traits are merged in selection order,
//! then overrides are resolved:
//!
//! - a later include of the same association replaces the earlier one in place;
//! - an exclude drops any earlier include of that association;
//! - the last `InitAs` wins.
//!
//! The resulting plan is ordered by [`Phase`](crate::rule::Phase), stable within each phase.

use indexmap::IndexMap;
use replica_core::{CompileError, DefinitionView, MergeCompiler, Plan, PlanCompiler, TraitName};

use crate::rule::{IncludeAssociation, Rule};

#[cfg(test)]
mod tests;

/// The [`PlanCompiler`] for [`Rule`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordCompiler;

impl PlanCompiler<Rule> for RecordCompiler {
	fn compile(
		&self,
		def: DefinitionView<'_, Rule>,
		traits: &[TraitName],
	) -> Result<Plan<Rule>, CompileError> {
		let merged = MergeCompiler::merge(def, traits)?;
		let merged_len = merged.len();
		let rules = resolve_overrides(merged);
		tracing::trace!(
			definition = def.name(),
			merged = merged_len,
			resolved = rules.len(),
			"resolved record rule overrides"
		);
		Ok(Plan::new(rules, traits))
	}
}

fn resolve_overrides(rules: Vec<Rule>) -> Vec<Rule> {
	let mut init = None;
	let mut associations: IndexMap<String, IncludeAssociation> = IndexMap::new();
	let mut attributes = Vec::new();
	let mut finalizers = Vec::new();

	for rule in rules {
		match rule {
			Rule::InitAs(_) => init = Some(rule),
			Rule::IncludeAssociation(include) => {
				associations.insert(include.name.clone(), include);
			}
			Rule::ExcludeAssociation(name) => {
				associations.shift_remove(&name);
			}
			Rule::Nullify(_) | Rule::Set { .. } => attributes.push(rule),
			Rule::Finalize(_) => finalizers.push(rule),
		}
	}

	let mut resolved = Vec::with_capacity(
		usize::from(init.is_some()) + associations.len() + attributes.len() + finalizers.len(),
	);
	resolved.extend(init);
	resolved.extend(associations.into_values().map(Rule::IncludeAssociation));
	resolved.extend(attributes);
	resolved.extend(finalizers);
	debug_assert!(resolved.is_sorted_by_key(Rule::phase));
	resolved
}
