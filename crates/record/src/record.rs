//! Dynamic record values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute map plus named associations to other records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
	#[serde(default)]
	pub attributes: Map<String, Value>,
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub associations: BTreeMap<String, Association>,
}

/// Related records under one association name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Association {
	Many(Vec<Record>),
	One(Option<Box<Record>>),
}

impl Record {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
		self.attributes.insert(attribute.into(), value.into());
		self
	}

	pub fn with_one(mut self, association: impl Into<String>, record: Record) -> Self {
		self.associations
			.insert(association.into(), Association::One(Some(Box::new(record))));
		self
	}

	pub fn with_many(mut self, association: impl Into<String>, records: Vec<Record>) -> Self {
		self.associations
			.insert(association.into(), Association::Many(records));
		self
	}

	pub fn get(&self, attribute: &str) -> Option<&Value> {
		self.attributes.get(attribute)
	}

	pub fn association(&self, name: &str) -> Option<&Association> {
		self.associations.get(name)
	}

	/// The single related record, if `name` is a present to-one association.
	pub fn one(&self, name: &str) -> Option<&Record> {
		match self.associations.get(name)? {
			Association::One(record) => record.as_deref(),
			Association::Many(_) => None,
		}
	}

	/// The related records, if `name` is a to-many association.
	pub fn many(&self, name: &str) -> Option<&[Record]> {
		match self.associations.get(name)? {
			Association::Many(records) => Some(records),
			Association::One(_) => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	#[test]
	fn test_deserialize_associations() {
		let record: Record = serde_json::from_value(json!({
			"attributes": { "title": "hello" },
			"associations": {
				"author": { "attributes": { "name": "ada" } },
				"editor": null,
				"tags": [{ "attributes": { "name": "rust" } }]
			}
		}))
		.unwrap();

		assert_eq!(record.get("title"), Some(&json!("hello")));
		assert_eq!(record.one("author").unwrap().get("name"), Some(&json!("ada")));
		assert_eq!(record.association("editor"), Some(&Association::One(None)));
		assert_eq!(record.many("tags").unwrap().len(), 1);
		assert_eq!(record.many("author"), None);
	}

	#[test]
	fn test_serialize_omits_empty_associations() {
		let value = serde_json::to_value(Record::new().with("id", 1)).unwrap();
		assert_eq!(value, json!({ "attributes": { "id": 1 } }));
	}
}
