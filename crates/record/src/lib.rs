//! Record duplication on top of `replica-core`.
//!
//! Provides a concrete rule vocabulary ([`Rule`]), the compiler that resolves
//! rule overrides into a plan ([`RecordCompiler`]), the adapter that walks a
//! plan over a dynamic [`Record`] ([`RecordAdapter`]), and a TOML-backed
//! [`Catalog`] of named definitions.

pub mod adapter;
pub mod catalog;
pub mod compiler;
pub mod record;
pub mod rule;

#[cfg(test)]
use tracing_subscriber as _;

pub use adapter::{RecordAdapter, RecordError};
pub use catalog::{Catalog, CatalogError};
pub use compiler::RecordCompiler;
pub use record::{Association, Record};
pub use rule::{FinalizeFn, Hook, IncludeAssociation, InitFn, Phase, RecordRules, Rule};

/// Definition node over records.
pub type RecordDefinition = replica_core::Definition<Rule, RecordAdapter>;

/// Creates a hierarchy root that compiles plans with [`RecordCompiler`].
///
/// Direct children of the root do not inherit an adapter; see
/// [`record_definition`] for the usual starting point.
pub fn record_root(name: &str) -> RecordDefinition {
	RecordDefinition::root(name, std::sync::Arc::new(RecordCompiler))
}

/// Creates a top-level definition wired to [`RecordAdapter`].
pub fn record_definition(root: &RecordDefinition, name: &str) -> RecordDefinition {
	let mut def = root.derive(name);
	def.set_adapter(std::sync::Arc::new(RecordAdapter));
	def
}
