//! Applies record plans.

use std::collections::BTreeMap;

use replica_core::{Adapter, CallOptions, DispatchError, Params, Plan, TraitSelection};
use serde_json::Value;

use crate::record::{Association, Record};
use crate::rule::{IncludeAssociation, Rule};


/// Errors raised while duplicating a record.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
	/// A nested definition failed on one of the association's records.
	#[error("failed to duplicate association {association:?}")]
	Nested {
		association: String,
		#[source]
		source: Box<DispatchError<RecordError>>,
	},
}

/// The [`Adapter`] for [`Record`]s.
///
/// Starts from the `InitAs` hook's output, or from a copy of the source's
/// attributes. Associations are only carried over when a plan includes them.
/// Finalize hooks run last, after every other rule.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordAdapter;

impl Adapter<Rule> for RecordAdapter {
	type Source = Record;
	type Output = Record;
	type Error = RecordError;

	fn duplicate(
		&self,
		source: &Record,
		plan: &Plan<Rule>,
		params: &Params,
	) -> Result<Record, RecordError> {
		let init = plan.iter().rev().find_map(|rule| match rule {
			Rule::InitAs(hook) => Some(hook),
			_ => None,
		});
		let mut copy = match init {
			Some(hook) => hook.call(source, params),
			None => Record {
				attributes: source.attributes.clone(),
				associations: BTreeMap::new(),
			},
		};

		for rule in plan {
			match rule {
				Rule::InitAs(_) | Rule::Finalize(_) => {}
				Rule::IncludeAssociation(include) => {
					let Some(association) = source.associations.get(&include.name) else {
						continue;
					};
					let duplicated = duplicate_association(include, association, params)?;
					copy.associations.insert(include.name.clone(), duplicated);
				}
				Rule::ExcludeAssociation(name) => {
					copy.associations.remove(name);
				}
				Rule::Nullify(attributes) => {
					for attribute in attributes {
						copy.attributes.insert(attribute.clone(), Value::Null);
					}
				}
				Rule::Set { attribute, value } => {
					copy.attributes.insert(attribute.clone(), value.clone());
				}
			}
		}

		for rule in plan {
			if let Rule::Finalize(hook) = rule {
				hook.call(source, &mut copy, params);
			}
		}

		tracing::trace!(
			rules = plan.len(),
			associations = copy.associations.len(),
			"duplicated record"
		);
		Ok(copy)
	}
}

fn duplicate_association(
	include: &IncludeAssociation,
	association: &Association,
	params: &Params,
) -> Result<Association, RecordError> {
	let Some(definition) = &include.definition else {
		return Ok(association.clone());
	};

	let duplicate_one = |record: &Record| {
		let mut options = CallOptions::new().with_params(params.clone());
		if !include.traits.is_empty() {
			options = options.with_traits(
				include
					.traits
					.iter()
					.map(|name| name.as_str())
					.collect::<TraitSelection>(),
			);
		}
		definition
			.call(Some(record), options)
			.map_err(|err| RecordError::Nested {
				association: include.name.clone(),
				source: Box::new(err),
			})
	};

	match association {
		Association::One(None) => Ok(Association::One(None)),
		Association::One(Some(record)) => {
			Ok(Association::One(Some(Box::new(duplicate_one(record)?))))
		}
		Association::Many(records) => records
			.iter()
			.map(duplicate_one)
			.collect::<Result<Vec<_>, _>>()
			.map(Association::Many),
	}
}
