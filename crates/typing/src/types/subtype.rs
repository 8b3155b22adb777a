//! Tag-based sub-typing.
//!
//! # Role
//!
//! [`Type::sub`] layers tags atop a parent type. A [`Workbench`] carries the
//! parent, a [`TypeBuilder`] and the tags through an ordered
//! [`SubTypePipeline`] of steps, each `Workbench -> Result<Workbench, _>`.
//!
//! # Invariants
//!
//! - Steps run in order and the first failure aborts; no later step runs.
//! - With no steps at all, the sub-type is built from a plain copy of the
//!   parent's table.
//! - Placeholder types cannot be sub-typed; their defect is the violation.
//! - Tag type-level constraints are checked on the finished type before it
//!   is published. Any failure returns the parent unchanged as the fallback
//!   of an absent outcome and publishes nothing.
//! - Within the default pipeline, a tag symbol shadows an inherited parent
//!   symbol with the same id; two tags contributing the same id disable the
//!   builder.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use super::{Tag, Type, TypeBuilder};
use crate::error::{Violation, ViolationKind};
use crate::symbol::{Symbol, SymbolKind};
use crate::value::Outcome;

/// State threaded through sub-typing steps.
pub struct Workbench {
	parent: Type,
	builder: TypeBuilder,
	tags: Arc<[Tag]>,
}

impl Workbench {
	fn new(parent: &Type, tags: &[Tag]) -> Self {
		Self {
			parent: parent.clone(),
			builder: TypeBuilder::derived(parent),
			tags: tags.into(),
		}
	}

	pub fn parent(&self) -> &Type {
		&self.parent
	}

	pub fn tags(&self) -> &[Tag] {
		&self.tags
	}

	pub fn builder(&self) -> &TypeBuilder {
		&self.builder
	}

	pub fn builder_mut(&mut self) -> &mut TypeBuilder {
		&mut self.builder
	}
}

type StepFn = dyn Fn(Workbench) -> Result<Workbench, Violation> + Send + Sync;

/// One named transform of the sub-typing pipeline.
#[derive(Clone)]
pub struct SubTypeStep {
	name: Arc<str>,
	run: Arc<StepFn>,
}

impl SubTypeStep {
	pub fn new(
		name: impl Into<Arc<str>>,
		run: impl Fn(Workbench) -> Result<Workbench, Violation> + Send + Sync + 'static,
	) -> Self {
		Self {
			name: name.into(),
			run: Arc::new(run),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn apply(&self, bench: Workbench) -> Result<Workbench, Violation> {
		(self.run)(bench)
	}

	/// Keeps the parent's raw name and appends the new tag names.
	pub fn rename() -> Self {
		Self::new("rename", |mut bench| {
			let names: Vec<Arc<str>> = bench.tags.iter().map(|tag| tag.id().name_arc()).collect();
			bench.builder.append_tag_names(names);
			Ok(bench)
		})
	}

	/// Copies the parent's public symbols through the tags' mutations, then
	/// adds each tag and its public symbols, mutated by the tags after it.
	pub fn merge_tags() -> Self {
		Self::new("merge_tags", |mut bench| {
			let tags = bench.tags.clone();
			let builder = &mut bench.builder;

			for (_, symbol) in bench.parent.table().entries() {
				let Some(symbol) = tags.iter().try_fold(symbol, |symbol, tag| tag.mutate(symbol)) else {
					continue;
				};
				builder.add_symbol(symbol);
			}

			let mut layered = FxHashSet::default();
			for (index, tag) in tags.iter().enumerate() {
				builder.add_symbol(tag.clone());
				let later = &tags[index + 1..];
				for (_, symbol) in tag.table().entries() {
					let Some(symbol) = later.iter().try_fold(symbol, |symbol, tag| tag.mutate(symbol)) else {
						continue;
					};
					let id = symbol.id().clone();
					if layered.contains(&id) {
						builder.disable(Violation::new(ViolationKind::SymbolMustBeUnique, tag.id(), format_args!("{id:?}")));
					} else if builder.table().contains(&id) {
						builder.table().set(id.clone(), symbol);
					} else {
						builder.add_symbol(symbol);
					}
					layered.insert(id);
				}
			}
			Ok(bench)
		})
	}

	/// Re-signs inherited operations from the parent onto the sub-type.
	pub fn substitute_parent_type() -> Self {
		Self::new("substitute_parent_type", |mut bench| {
			let parent = bench.parent.clone();
			bench.builder.substitute(&parent);
			Ok(bench)
		})
	}
}

impl fmt::Debug for SubTypeStep {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("SubTypeStep").field(&self.name).finish()
	}
}

/// Ordered steps a type runs when sub-typed; sub-types inherit it.
#[derive(Clone, Debug)]
pub struct SubTypePipeline {
	steps: Arc<[SubTypeStep]>,
}

impl SubTypePipeline {
	/// `rename`, `merge_tags`, `substitute_parent_type`.
	pub fn standard() -> Self {
		Self::new([
			SubTypeStep::rename(),
			SubTypeStep::merge_tags(),
			SubTypeStep::substitute_parent_type(),
		])
	}

	pub fn empty() -> Self {
		Self::new([])
	}

	pub fn new(steps: impl IntoIterator<Item = SubTypeStep>) -> Self {
		Self {
			steps: steps.into_iter().collect(),
		}
	}

	pub fn with_step(&self, step: SubTypeStep) -> Self {
		Self::new(self.steps.iter().cloned().chain([step]))
	}

	pub fn steps(&self) -> &[SubTypeStep] {
		&self.steps
	}

	pub fn is_empty(&self) -> bool {
		self.steps.is_empty()
	}
}

impl Default for SubTypePipeline {
	fn default() -> Self {
		Self::standard()
	}
}

impl Type {
	/// Synthesizes a sub-type layering `tags` atop this type.
	///
	/// All or nothing: on failure the outcome is absent, carries the
	/// violation, and falls back to `self`; nothing is published. A sub-type
	/// with the same name layered from different tags is refused.
	pub fn sub(&self, tags: &[Tag]) -> Outcome<Type> {
		let failed = |violation: Violation| {
			tracing::debug!(parent = %self, %violation, "type.sub.failed");
			Outcome::No {
				violation,
				fallback: self.clone(),
			}
		};

		if let Some(defect) = self.defect() {
			return failed(defect.clone());
		}

		let mut bench = Workbench::new(self, tags);
		let pipeline = self.pipeline();
		if pipeline.is_empty() {
			bench.builder.table().add_all(self.table());
		}
		for step in pipeline.steps() {
			tracing::trace!(parent = %self, step = step.name(), "type.sub.step");
			bench = match step.apply(bench) {
				Ok(bench) => bench,
				Err(violation) => return failed(violation),
			};
		}

		let sub = match bench.builder.build_unpublished() {
			Ok(sub) => sub,
			Err(violation) => return failed(violation),
		};

		for symbol in sub.table().members(SymbolKind::Tag) {
			let Symbol::Tag(tag) = symbol else { continue };
			if let Err(violation) = tag.check_type(&sub) {
				sub.discard();
				return failed(violation);
			}
		}

		match sub.publish(false, true) {
			Ok(published) => {
				tracing::debug!(parent = %self, sub = %published, "type.sub");
				Outcome::One(published)
			}
			Err(violation) => {
				sub.discard();
				failed(violation)
			}
		}
	}
}
