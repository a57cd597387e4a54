//! Definition hierarchy and plan caching for declarative duplication.
//!
//! A [`Definition`] holds an ordered list of rule declarations, a set of named
//! [`Trait`]s that contribute extra rules on demand, and the [`Adapter`] that
//! performs the actual duplication. Definitions form a single-rooted tree: a
//! child created with [`Definition::derive`] starts from an independent copy
//! of its parent's rules and traits and can extend them without touching the
//! parent.
//!
//! Calling a definition resolves a [`Plan`] for the requested trait selection,
//! compiling it through the definition's [`PlanCompiler`] on first use and
//! serving it from the per-definition [`PlanCache`] afterwards.
//!
//! # Crate layout
//!
//! - [`definition`] - hierarchy, registration and dispatch
//! - [`cache`] - per-definition plan memoization
//! - [`plan`] - compiled plans and the compiler seam
//! - [`adapter`] - the duplication seam
//! - [`options`] - per-call options (trait selection and params)
//! - [`key`] - trait names and canonical cache keys

pub mod adapter;
pub mod cache;
pub mod definition;
pub mod error;
pub mod key;
pub mod options;
pub mod plan;
pub mod rule;

pub use adapter::{Adapter, Params};
pub use cache::{Lookup, PlanCache};
pub use definition::{Definition, DefinitionView, TraitMap};
pub use error::{CompileError, DefinitionError, DispatchError, InvalidTraitName, OptionsError};
pub use key::{TRAIT_KEY_SEPARATOR, TraitKey, TraitName};
pub use options::{CallOptions, TraitSelection};
pub use plan::{MergeCompiler, Plan, PlanCompiler};
pub use rule::{RuleBuilder, Trait};
