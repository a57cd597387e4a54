//! Serde model of the TOML catalog format.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// Top-level catalog document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
	#[serde(default)]
	pub definitions: BTreeMap<String, DefinitionConfig>,
}

/// One `[definitions.<name>]` table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefinitionConfig {
	/// Definition to derive from. Top-level definitions omit it.
	#[serde(default)]
	pub parent: Option<String>,
	#[serde(flatten)]
	pub rules: RulesConfig,
	#[serde(default)]
	pub traits: BTreeMap<String, RulesConfig>,
}

/// Rules of a definition or of one of its traits.
///
/// Declared in the order: includes, excludes, nullify, then `set` entries by
/// attribute name.
///
/// Keys matching no rule land in `unknown` instead of failing the parse, since
/// this table is flattened into [`DefinitionConfig`]. The loader rejects them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RulesConfig {
	#[serde(default)]
	pub include: Vec<IncludeConfig>,
	#[serde(default)]
	pub exclude: Vec<String>,
	#[serde(default)]
	pub nullify: Vec<String>,
	#[serde(default)]
	pub set: BTreeMap<String, Value>,
	#[serde(flatten)]
	pub unknown: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncludeConfig {
	pub association: String,
	/// Catalog definition applied to each related record.
	#[serde(default)]
	pub definition: Option<String>,
	#[serde(default)]
	pub traits: Vec<String>,
}

impl DefinitionConfig {
	/// Names of the catalog definitions this one depends on.
	pub(super) fn references(&self) -> impl Iterator<Item = &str> {
		let includes = std::iter::once(&self.rules)
			.chain(self.traits.values())
			.flat_map(|rules| rules.include.iter())
			.filter_map(|include| include.definition.as_deref());
		self.parent.as_deref().into_iter().chain(includes)
	}
}
