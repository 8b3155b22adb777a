//! The explicit root registry.
//!
//! # Role
//!
//! A [`TypingEnvironment`] owns the root [`Namespace`], the canonical
//! builtin types and the active [`Processor`]. Everything that used to hang
//! off a static root is reached through an environment value instead.
//!
//! # Invariants
//!
//! - Bootstrap is one deterministic routine: create the root, then build and
//!   index one canonical type per builtin value class, in a fixed order.
//! - At most one environment is installed as the process global, once.
//! - Dropping an environment empties its namespace graph, releasing the
//!   reference cycles between types and their operations.

use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use crate::config::Config;
use crate::error::{Result, Violation};
use crate::namespace::Namespace;
use crate::operation::Operation;
use crate::processor::{self, Processor};
use crate::term::{Expression, Term};
use crate::types::{Type, TypeBuilder};
use crate::value::ValueClass;

static GLOBAL: OnceLock<TypingEnvironment> = OnceLock::new();

struct ProcessorSlot(Arc<dyn Processor>);

/// Canonical types created at bootstrap.
#[derive(Debug, Clone)]
pub struct Builtins {
	pub object: Type,
	pub unit: Type,
	pub boolean: Type,
	pub integer: Type,
	pub float: Type,
	pub text: Type,
	pub list: Type,
}

pub struct TypingEnvironment {
	root: Namespace,
	builtins: Builtins,
	processor: ArcSwap<ProcessorSlot>,
	config: Config,
}

impl TypingEnvironment {
	pub fn new() -> std::result::Result<Self, Violation> {
		Self::with_config(Config::default())
	}

	pub fn with_config(config: Config) -> std::result::Result<Self, Violation> {
		let root = Namespace::new_root("root");
		let builtins = bootstrap(&root)?;
		let processor = processor::from_config(&config.processor);
		tracing::debug!(mode = ?config.processor.mode, "environment.bootstrap");
		Ok(Self {
			root,
			builtins,
			processor: ArcSwap::from_pointee(ProcessorSlot(processor)),
			config,
		})
	}

	/// Makes this environment the process global, reachable through
	/// [`TypingEnvironment::global`]. Fails, handing the environment back,
	/// if one is already installed.
	pub fn install(self) -> std::result::Result<(), TypingEnvironment> {
		GLOBAL.set(self)
	}

	pub fn global() -> Option<&'static TypingEnvironment> {
		GLOBAL.get()
	}

	pub fn root(&self) -> &Namespace {
		&self.root
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn builtins(&self) -> &Builtins {
		&self.builtins
	}

	pub fn type_of(&self, class: ValueClass) -> Type {
		self.root.type_of(class)
	}

	/// A builder publishing into the root namespace.
	pub fn type_builder(&self, raw_name: impl Into<Arc<str>>, class: ValueClass) -> TypeBuilder {
		Type::builder(raw_name, class).in_namespace(&self.root)
	}

	pub fn namespace(&self, name: impl Into<Arc<str>>) -> std::result::Result<Namespace, Violation> {
		self.root.child(name)
	}

	pub fn processor(&self) -> Arc<dyn Processor> {
		self.processor.load().0.clone()
	}

	/// Swaps the processor used by expressions created from now on.
	pub fn set_processor(&self, processor: Arc<dyn Processor>) {
		tracing::debug!(?processor, "environment.set_processor");
		self.processor.store(Arc::new(ProcessorSlot(processor)));
	}

	/// An expression applying `operation` to `inputs`, run by the current
	/// processor when its value is requested.
	pub fn expression(&self, operation: Operation, inputs: impl IntoIterator<Item = Term>) -> Result<Term> {
		Expression::new(operation, inputs, self.processor()).map(Term::Expression)
	}
}

fn bootstrap(root: &Namespace) -> std::result::Result<Builtins, Violation> {
	let canonical = |name: &str, class| Type::builder(name, class).in_namespace(root).canonical().build();
	Ok(Builtins {
		object: canonical("object", ValueClass::Any)?,
		unit: canonical("unit", ValueClass::Unit)?,
		boolean: canonical("boolean", ValueClass::Bool)?,
		integer: canonical("integer", ValueClass::Int)?,
		float: canonical("float", ValueClass::Float)?,
		text: canonical("text", ValueClass::Text)?,
		list: canonical("list", ValueClass::List)?,
	})
}

impl Drop for TypingEnvironment {
	fn drop(&mut self) {
		self.root.dismantle();
	}
}

impl std::fmt::Debug for TypingEnvironment {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TypingEnvironment")
			.field("root", &self.root)
			.field("processor", &self.processor.load().0)
			.finish_non_exhaustive()
	}
}
