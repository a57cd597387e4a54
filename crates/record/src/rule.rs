//! Rule vocabulary for record duplication.

use std::fmt;
use std::sync::Arc;

use replica_core::{Params, RuleBuilder, TraitName};
use serde_json::Value;

use crate::RecordDefinition;
use crate::record::Record;

/// Builds the initial duplicate from the source and the call params.
pub type InitFn = dyn Fn(&Record, &Params) -> Record + Send + Sync;

/// Adjusts the finished duplicate; receives the source, the duplicate and the
/// call params.
pub type FinalizeFn = dyn Fn(&Record, &mut Record, &Params) + Send + Sync;

/// Labelled callback shared between definitions.
pub struct Hook<F: ?Sized> {
	label: Arc<str>,
	f: Arc<F>,
}

impl<F: ?Sized> Hook<F> {
	pub fn label(&self) -> &str {
		&self.label
	}
}

impl<F: ?Sized> Clone for Hook<F> {
	fn clone(&self) -> Self {
		Self {
			label: self.label.clone(),
			f: self.f.clone(),
		}
	}
}

impl<F: ?Sized> fmt::Debug for Hook<F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Hook").field(&self.label).finish()
	}
}

impl Hook<InitFn> {
	pub fn init(
		label: &str,
		f: impl Fn(&Record, &Params) -> Record + Send + Sync + 'static,
	) -> Self {
		Self {
			label: Arc::from(label),
			f: Arc::new(f),
		}
	}

	pub fn call(&self, source: &Record, params: &Params) -> Record {
		(self.f)(source, params)
	}
}

impl Hook<FinalizeFn> {
	pub fn finalize(
		label: &str,
		f: impl Fn(&Record, &mut Record, &Params) + Send + Sync + 'static,
	) -> Self {
		Self {
			label: Arc::from(label),
			f: Arc::new(f),
		}
	}

	pub fn call(&self, source: &Record, copy: &mut Record, params: &Params) {
		(self.f)(source, copy, params)
	}
}

/// Duplicate an association, optionally through a nested definition.
#[derive(Debug, Clone)]
pub struct IncludeAssociation {
	pub name: String,
	/// Definition applied to each related record; plain copy when absent.
	pub definition: Option<Arc<RecordDefinition>>,
	/// Traits selected on the nested definition.
	pub traits: Vec<TraitName>,
}

/// One record duplication rule.
#[derive(Debug, Clone)]
pub enum Rule {
	/// Build the initial duplicate instead of copying the source's attributes.
	InitAs(Hook<InitFn>),
	IncludeAssociation(IncludeAssociation),
	ExcludeAssociation(String),
	/// Set the listed attributes to `null`.
	Nullify(Vec<String>),
	Set { attribute: String, value: Value },
	/// Runs after every other rule.
	Finalize(Hook<FinalizeFn>),
}

/// Order in which rule kinds take effect within a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
	Init,
	Associations,
	Attributes,
	Finalize,
}

impl Rule {
	pub fn phase(&self) -> Phase {
		match self {
			Rule::InitAs(_) => Phase::Init,
			Rule::IncludeAssociation(_) | Rule::ExcludeAssociation(_) => Phase::Associations,
			Rule::Nullify(_) | Rule::Set { .. } => Phase::Attributes,
			Rule::Finalize(_) => Phase::Finalize,
		}
	}
}

/// Record rule vocabulary for registration blocks.
pub trait RecordRules {
	fn nullify<I, S>(&mut self, attributes: I) -> &mut Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>;

	fn set(&mut self, attribute: impl Into<String>, value: impl Into<Value>) -> &mut Self;

	/// Copies the association as-is.
	fn include(&mut self, association: impl Into<String>) -> &mut Self;

	/// Duplicates each related record through `definition` with `traits`.
	fn include_with(
		&mut self,
		association: impl Into<String>,
		definition: Arc<RecordDefinition>,
		traits: &[TraitName],
	) -> &mut Self;

	fn exclude(&mut self, association: impl Into<String>) -> &mut Self;

	fn init_as(
		&mut self,
		label: &str,
		f: impl Fn(&Record, &Params) -> Record + Send + Sync + 'static,
	) -> &mut Self;

	fn finalize(
		&mut self,
		label: &str,
		f: impl Fn(&Record, &mut Record, &Params) + Send + Sync + 'static,
	) -> &mut Self;
}

impl RecordRules for RuleBuilder<Rule> {
	fn nullify<I, S>(&mut self, attributes: I) -> &mut Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.push(Rule::Nullify(attributes.into_iter().map(Into::into).collect()))
	}

	fn set(&mut self, attribute: impl Into<String>, value: impl Into<Value>) -> &mut Self {
		self.push(Rule::Set {
			attribute: attribute.into(),
			value: value.into(),
		})
	}

	fn include(&mut self, association: impl Into<String>) -> &mut Self {
		self.push(Rule::IncludeAssociation(IncludeAssociation {
			name: association.into(),
			definition: None,
			traits: Vec::new(),
		}))
	}

	fn include_with(
		&mut self,
		association: impl Into<String>,
		definition: Arc<RecordDefinition>,
		traits: &[TraitName],
	) -> &mut Self {
		self.push(Rule::IncludeAssociation(IncludeAssociation {
			name: association.into(),
			definition: Some(definition),
			traits: traits.to_vec(),
		}))
	}

	fn exclude(&mut self, association: impl Into<String>) -> &mut Self {
		self.push(Rule::ExcludeAssociation(association.into()))
	}

	fn init_as(
		&mut self,
		label: &str,
		f: impl Fn(&Record, &Params) -> Record + Send + Sync + 'static,
	) -> &mut Self {
		self.push(Rule::InitAs(Hook::init(label, f)))
	}

	fn finalize(
		&mut self,
		label: &str,
		f: impl Fn(&Record, &mut Record, &Params) + Send + Sync + 'static,
	) -> &mut Self {
		self.push(Rule::Finalize(Hook::finalize(label, f)))
	}
}
