//! End-to-end duplication through programmatic and catalog definitions.

use std::sync::Arc;
use std::thread;

use pretty_assertions::assert_eq;
use replica_core::{CallOptions, DispatchError, TraitName};
use replica_record::{
	Catalog, Record, RecordDefinition, RecordRules, record_definition, record_root,
};
use serde_json::json;

use indexmap as _;
use rstest as _;
use serde as _;
use tempfile as _;
use thiserror as _;
use toml as _;
use tracing as _;

fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn order_record() -> Record {
	serde_json::from_value(json!({
		"attributes": { "number": "A-100", "state": "paid", "total": 42 },
		"associations": {
			"items": [
				{ "attributes": { "sku": "x", "qty": 1 } },
				{ "attributes": { "sku": "y", "qty": 3 } }
			],
			"customer": { "attributes": { "name": "ada", "email": "ada@example.com" } },
			"payments": [{ "attributes": { "amount": 42 } }]
		}
	}))
	.unwrap()
}

/// Programmatic hierarchy: `order` -> `draft_order`, items through `item`.
fn definitions() -> (Arc<RecordDefinition>, Arc<RecordDefinition>) {
	let root = record_root("app");

	let mut item = record_definition(&root, "item");
	item.register_trait("reset_qty", |b| {
		b.set("qty", 0);
	})
	.unwrap();
	let item = Arc::new(item);

	let mut order = record_definition(&root, "order");
	order.declare_with(|b| {
		b.include_with("items", item.clone(), &[])
			.include("customer")
			.nullify(["number"]);
	});
	order
		.register_trait("with_payments", |b| {
			b.include("payments");
		})
		.unwrap();
	order
		.register_trait("anonymize", |b| {
			b.exclude("customer");
		})
		.unwrap();

	let mut draft = order.derive("draft_order");
	let reset = TraitName::parse_all(&["reset_qty"]).unwrap();
	draft.declare_with(|b| {
		b.include_with("items", item.clone(), &reset)
			.set("state", "draft")
			.finalize("copy_of", |source, copy, _| {
				copy.attributes
					.insert("copy_of".into(), source.get("number").cloned().unwrap_or_default());
			});
	});

	(Arc::new(order), Arc::new(draft))
}

#[test]
fn duplicates_through_hierarchy() {
	init_tracing();
	let (order, draft) = definitions();

	let copy = order.call(Some(&order_record()), CallOptions::new()).unwrap();
	assert_eq!(copy.get("number"), Some(&json!(null)));
	assert_eq!(copy.get("state"), Some(&json!("paid")));
	assert_eq!(copy.many("items").unwrap()[1].get("qty"), Some(&json!(3)));
	assert!(copy.one("customer").is_some());
	assert!(copy.association("payments").is_none());

	let draft_copy = draft.call(Some(&order_record()), CallOptions::new()).unwrap();
	assert_eq!(draft_copy.get("state"), Some(&json!("draft")));
	assert_eq!(draft_copy.get("copy_of"), Some(&json!("A-100")));
	assert!(
		draft_copy
			.many("items")
			.unwrap()
			.iter()
			.all(|item| item.get("qty") == Some(&json!(0)))
	);

	// The parent is untouched by the child's additions.
	assert_eq!(order.declarations().len(), 3);
	assert!(order.cache().has_default());
	assert_eq!(draft.declarations().len(), 6);
}

#[test]
fn trait_selection_order_changes_outcome() {
	init_tracing();
	let (order, _) = definitions();
	let mut widened = order.derive("widened");
	widened
		.register_trait("customer", |b| {
			b.include("customer");
		})
		.unwrap();

	let removed = widened
		.call(
			Some(&order_record()),
			CallOptions::new().with_traits(["customer", "anonymize"]),
		)
		.unwrap();
	let kept = widened
		.call(
			Some(&order_record()),
			CallOptions::new().with_traits(["anonymize", "customer"]),
		)
		.unwrap();

	assert!(removed.one("customer").is_none());
	assert!(kept.one("customer").is_some());
	assert_eq!(widened.cache().len(), 2);
}

#[test]
fn options_from_json_split_traits_and_params() {
	init_tracing();
	let root = record_root("app");
	let mut def = record_definition(&root, "order");
	def.register_trait("with_payments", |b| {
		b.include("payments");
	})
	.unwrap();
	def.declare_with(|b| {
		b.finalize("stamp", |_, copy, params| {
			copy.attributes
				.insert("copied_by".into(), params.get("user").cloned().unwrap_or_default());
		});
	});

	let options = CallOptions::from_json(json!({
		"traits": "with_payments",
		"user": "ops"
	}))
	.unwrap();
	let copy = def.call(Some(&order_record()), options).unwrap();

	assert_eq!(copy.get("copied_by"), Some(&json!("ops")));
	assert_eq!(copy.many("payments").unwrap().len(), 1);
	assert!(copy.get("traits").is_none());
}

#[test]
fn concurrent_calls_reuse_cached_plans() {
	init_tracing();
	let (order, _) = definitions();

	let handles: Vec<_> = (0..4)
		.map(|i| {
			let order = order.clone();
			thread::spawn(move || {
				let options = if i % 2 == 0 {
					CallOptions::new()
				} else {
					CallOptions::new().with_traits(["with_payments"])
				};
				order.call(Some(&order_record()), options).unwrap()
			})
		})
		.collect();

	for (i, handle) in handles.into_iter().enumerate() {
		let copy = handle.join().unwrap();
		assert_eq!(copy.association("payments").is_some(), i % 2 == 1);
	}
	assert!(order.cache().has_default());
	assert_eq!(order.cache().len(), 1);
}

#[test]
fn catalog_and_programmatic_definitions_agree() {
	init_tracing();
	let catalog = Catalog::from_toml_str(
		r#"
[definitions.item.traits.reset_qty]
set = { qty = 0 }

[definitions.order]
include = [{ association = "items", definition = "item" }, { association = "customer" }]
nullify = ["number"]

[definitions.order.traits.with_payments]
include = [{ association = "payments" }]

[definitions.order.traits.anonymize]
exclude = ["customer"]
"#,
	)
	.unwrap();
	let (order, _) = definitions();

	for traits in [vec![], vec!["with_payments"], vec!["with_payments", "anonymize"]] {
		let options = CallOptions::new().with_traits(traits.clone());
		let from_catalog = catalog
			.call("order", Some(&order_record()), options.clone())
			.unwrap();
		let programmatic = order.call(Some(&order_record()), options).unwrap();
		assert_eq!(from_catalog, programmatic, "traits {traits:?}");
	}
}

#[test]
fn missing_source_and_missing_adapter() {
	init_tracing();
	let (order, _) = definitions();
	assert!(matches!(
		order.call(None, CallOptions::new()),
		Err(DispatchError::UnprocessableSource)
	));

	let bare = record_root("app").derive("bare");
	assert!(matches!(
		bare.call(Some(&order_record()), CallOptions::new()),
		Err(DispatchError::Configuration { .. })
	));
}
