//! Named record definitions loaded from TOML.
//!
//! ```toml
//! [definitions.user]
//! nullify = ["email"]
//! include = [{ association = "posts", definition = "post", traits = ["published"] }]
//!
//! [definitions.user.traits.anonymous]
//! nullify = ["name"]
//!
//! [definitions.admin]
//! parent = "user"
//! ```
//!
//! Definitions are built in dependency order (parents and included
//! definitions first), whatever their order in the file. Top-level
//! definitions get a [`RecordAdapter`](crate::RecordAdapter); derived ones
//! inherit their parent's.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use replica_core::{CallOptions, DefinitionError, DispatchError, InvalidTraitName, TraitName};

use crate::adapter::RecordError;
use crate::record::Record;
use crate::rule::{IncludeAssociation, Rule};
use crate::{RecordDefinition, record_definition, record_root};

pub mod config;


pub use config::{CatalogConfig, DefinitionConfig, IncludeConfig, RulesConfig};

/// Errors from loading or calling a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
	#[error("failed to read catalog {}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid catalog")]
	Parse(#[from] toml::de::Error),

	#[error("definition {definition:?} references unknown definition {reference:?}")]
	UnknownReference {
		definition: String,
		reference: String,
	},

	#[error("unknown key {key:?} in [{table}]")]
	UnknownKey { table: String, key: String },

	#[error("definition cycle: {}", .chain.join(" -> "))]
	Cycle { chain: Vec<String> },

	#[error("definition {definition:?} is invalid")]
	Definition {
		definition: String,
		#[source]
		source: DefinitionError,
	},

	#[error("definition {definition:?} selects an invalid trait")]
	InvalidTraitName {
		definition: String,
		#[source]
		source: InvalidTraitName,
	},

	#[error("unknown definition {0:?}")]
	UnknownDefinition(String),

	#[error(transparent)]
	Dispatch(#[from] DispatchError<RecordError>),
}

/// Named, immutable set of record definitions.
#[derive(Debug, Default)]
pub struct Catalog {
	definitions: BTreeMap<String, Arc<RecordDefinition>>,
}

impl Catalog {
	/// Reads and builds the catalog at `path`.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		tracing::debug!(path = %path.display(), "loading catalog");
		Self::from_toml_str(&text)
	}

	pub fn from_toml_str(text: &str) -> Result<Self, CatalogError> {
		let config: CatalogConfig = toml::from_str(text)?;
		Self::from_config(&config)
	}

	pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
		let order = load_order(config)?;
		let root = record_root("catalog");
		let mut definitions: BTreeMap<String, Arc<RecordDefinition>> = BTreeMap::new();

		for name in order {
			let cfg = &config.definitions[name];
			let mut def = match cfg.parent.as_deref() {
				Some(parent) => definitions[parent].derive(name),
				None => record_definition(&root, name),
			};

			let table = format!("definitions.{name}");
			let base = build_rules(name, &table, &cfg.rules, &definitions)?;
			def.declare_with(|b| {
				b.extend(base);
			});
			for (trait_name, rules) in &cfg.traits {
				let table = format!("definitions.{name}.traits.{trait_name}");
				let rules = build_rules(name, &table, rules, &definitions)?;
				def.register_trait(trait_name, |b| {
					b.extend(rules);
				})
				.map_err(|source| CatalogError::Definition {
					definition: name.to_string(),
					source,
				})?;
			}

			definitions.insert(name.to_string(), Arc::new(def));
		}

		tracing::debug!(definitions = definitions.len(), "built catalog");
		Ok(Self { definitions })
	}

	pub fn get(&self, name: &str) -> Option<&Arc<RecordDefinition>> {
		self.definitions.get(name)
	}

	/// Definition names, sorted.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.definitions.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.definitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.definitions.is_empty()
	}

	/// Duplicates `source` through the definition called `name`.
	pub fn call(
		&self,
		name: &str,
		source: Option<&Record>,
		options: CallOptions,
	) -> Result<Record, CatalogError> {
		let def = self
			.get(name)
			.ok_or_else(|| CatalogError::UnknownDefinition(name.to_string()))?;
		Ok(def.call(source, options)?)
	}
}

/// Orders definitions so every reference is built before its referrer.
fn load_order(config: &CatalogConfig) -> Result<Vec<&str>, CatalogError> {
	#[derive(Clone, Copy, PartialEq, Eq)]
	enum Mark {
		Visiting,
		Done,
	}

	fn visit<'a>(
		name: &'a str,
		config: &'a CatalogConfig,
		marks: &mut BTreeMap<&'a str, Mark>,
		stack: &mut Vec<&'a str>,
		order: &mut Vec<&'a str>,
	) -> Result<(), CatalogError> {
		match marks.get(name) {
			Some(Mark::Done) => return Ok(()),
			Some(Mark::Visiting) => {
				let start = stack.iter().position(|n| *n == name).unwrap_or(0);
				let mut chain: Vec<String> =
					stack[start..].iter().map(|n| n.to_string()).collect();
				chain.push(name.to_string());
				return Err(CatalogError::Cycle { chain });
			}
			None => {}
		}

		marks.insert(name, Mark::Visiting);
		stack.push(name);
		let def = &config.definitions[name];
		for reference in def.references() {
			let Some((reference, _)) = config.definitions.get_key_value(reference) else {
				return Err(CatalogError::UnknownReference {
					definition: name.to_string(),
					reference: reference.to_string(),
				});
			};
			visit(reference, config, marks, stack, order)?;
		}
		stack.pop();
		marks.insert(name, Mark::Done);
		order.push(name);
		Ok(())
	}

	let mut marks = BTreeMap::new();
	let mut stack = Vec::new();
	let mut order = Vec::with_capacity(config.definitions.len());
	for name in config.definitions.keys() {
		visit(name, config, &mut marks, &mut stack, &mut order)?;
	}
	Ok(order)
}

fn build_rules(
	definition: &str,
	table: &str,
	cfg: &RulesConfig,
	built: &BTreeMap<String, Arc<RecordDefinition>>,
) -> Result<Vec<Rule>, CatalogError> {
	if let Some(key) = cfg.unknown.keys().next() {
		return Err(CatalogError::UnknownKey {
			table: table.to_string(),
			key: key.clone(),
		});
	}

	let mut rules = Vec::new();

	for include in &cfg.include {
		let nested = include
			.definition
			.as_deref()
			.map(|reference| {
				built
					.get(reference)
					.cloned()
					.ok_or_else(|| CatalogError::UnknownReference {
						definition: definition.to_string(),
						reference: reference.to_string(),
					})
			})
			.transpose()?;
		let traits = TraitName::parse_all(&include.traits).map_err(|source| {
			CatalogError::InvalidTraitName {
				definition: definition.to_string(),
				source,
			}
		})?;
		rules.push(Rule::IncludeAssociation(IncludeAssociation {
			name: include.association.clone(),
			definition: nested,
			traits,
		}));
	}
	rules.extend(cfg.exclude.iter().cloned().map(Rule::ExcludeAssociation));
	if !cfg.nullify.is_empty() {
		rules.push(Rule::Nullify(cfg.nullify.clone()));
	}
	rules.extend(cfg.set.iter().map(|(attribute, value)| Rule::Set {
		attribute: attribute.clone(),
		value: value.clone(),
	}));

	Ok(rules)
}
