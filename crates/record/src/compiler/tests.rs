use std::sync::Arc;

use pretty_assertions::assert_eq;
use replica_core::CompileError;

use super::*;
use crate::rule::RecordRules;
use crate::{RecordDefinition, record_definition, record_root};

fn describe(rule: &Rule) -> String {
	match rule {
		Rule::InitAs(hook) => format!("init:{}", hook.label()),
		Rule::IncludeAssociation(include) => match &include.definition {
			Some(def) => format!("include:{}<{}>", include.name, def.name()),
			None => format!("include:{}", include.name),
		},
		Rule::ExcludeAssociation(name) => format!("exclude:{name}"),
		Rule::Nullify(attrs) => format!("nullify:{}", attrs.join(",")),
		Rule::Set { attribute, value } => format!("set:{attribute}={value}"),
		Rule::Finalize(hook) => format!("finalize:{}", hook.label()),
	}
}

fn plan_of(def: &RecordDefinition, traits: &[&str]) -> Vec<String> {
	let traits = TraitName::parse_all(traits).unwrap();
	def.plan_with_traits(&traits)
		.unwrap()
		.iter()
		.map(describe)
		.collect()
}

fn post() -> Arc<RecordDefinition> {
	Arc::new(record_definition(&record_root("root"), "post"))
}

#[test]
fn test_plan_is_ordered_by_phase() {
	let mut def = record_definition(&record_root("root"), "user");
	def.declare_with(|b| {
		b.finalize("stamp", |_, _, _| {})
			.nullify(["email"])
			.include("posts")
			.init_as("blank", |_, _| crate::Record::new());
	});

	assert_eq!(
		plan_of(&def, &[]),
		vec!["init:blank", "include:posts", "nullify:email", "finalize:stamp"]
	);
}

#[test]
fn test_trait_include_replaces_base_include_in_place() {
	let post = post();
	let mut def = record_definition(&record_root("root"), "user");
	def.declare_with(|b| {
		b.include("posts").include("comments");
	});
	def.register_trait("deep", |b| {
		b.include_with("posts", post.clone(), &[]);
	})
	.unwrap();

	assert_eq!(
		plan_of(&def, &["deep"]),
		vec!["include:posts<post>", "include:comments"]
	);
	assert_eq!(plan_of(&def, &[]), vec!["include:posts", "include:comments"]);
}

#[test]
fn test_exclude_removes_earlier_include() {
	let mut def = record_definition(&record_root("root"), "user");
	def.declare_with(|b| {
		b.include("posts").include("sessions");
	});
	def.register_trait("light", |b| {
		b.exclude("sessions");
	})
	.unwrap();
	def.register_trait("sessions", |b| {
		b.include("sessions");
	})
	.unwrap();

	assert_eq!(plan_of(&def, &["light"]), vec!["include:posts"]);
	assert_eq!(
		plan_of(&def, &["light", "sessions"]),
		vec!["include:posts", "include:sessions"]
	);
	assert_eq!(
		plan_of(&def, &["sessions", "light"]),
		vec!["include:posts"]
	);
}

#[test]
fn test_last_init_wins() {
	let mut def = record_definition(&record_root("root"), "user");
	def.declare_with(|b| {
		b.init_as("first", |_, _| crate::Record::new());
	});
	def.register_trait("second", |b| {
		b.init_as("second", |_, _| crate::Record::new());
	})
	.unwrap();

	assert_eq!(plan_of(&def, &["second"]), vec!["init:second"]);
}

#[test]
fn test_attribute_rules_keep_declaration_order() {
	let mut def = record_definition(&record_root("root"), "user");
	def.declare_with(|b| {
		b.set("state", "draft").nullify(["state"]);
	});
	def.register_trait("published", |b| {
		b.set("state", "published");
	})
	.unwrap();

	assert_eq!(
		plan_of(&def, &["published"]),
		vec!["set:state=\"draft\"", "nullify:state", "set:state=\"published\""]
	);
}

#[test]
fn test_unknown_trait_is_reported() {
	let def = record_definition(&record_root("root"), "user");
	let err = def
		.plan_with_traits(&TraitName::parse_all(&["ghost"]).unwrap())
		.unwrap_err();
	assert_eq!(
		err,
		CompileError::UnknownTrait {
			definition: "user".into(),
			name: "ghost".into(),
		}
	);
}

#[test]
fn test_plan_records_selection() {
	let mut def = record_definition(&record_root("root"), "user");
	def.register_trait("a", |_| {}).unwrap();
	let traits = TraitName::parse_all(&["a", "a"]).unwrap();
	assert_eq!(def.plan_with_traits(&traits).unwrap().traits(), &traits[..]);
}
