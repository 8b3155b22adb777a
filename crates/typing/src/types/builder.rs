use std::sync::Arc;

use smallvec::SmallVec;

use super::{Kind, SubTypePipeline, Type, TypeInner};
use crate::constraint::Constraint;
use crate::error::Violation;
use crate::meta::Metadata;
use crate::namespace::Namespace;
use crate::operation::{Operation, OperationType};
use crate::symbol::{Symbol, SymbolId, SymbolKind, Visibility};
use crate::table::SymbolTable;
use crate::value::{Datum, ValueClass};

/// Assembles a [`Type`] and publishes it into its namespace.
///
/// Symbols added here land in the new type's table. A builder that has been
/// [disabled](TypeBuilder::disable) fails to build with the first violation
/// it recorded.
pub struct TypeBuilder {
	raw_name: Arc<str>,
	tag_names: SmallVec<[Arc<str>; 2]>,
	class: ValueClass,
	none: Option<Datum>,
	kind: Kind,
	namespace: Option<Namespace>,
	table: SymbolTable,
	pipeline: SubTypePipeline,
	canonical: bool,
	visibility: Visibility,
	metadata: Metadata,
	substitutes: SmallVec<[Type; 1]>,
	violation: Option<Violation>,
}

impl TypeBuilder {
	pub fn new(raw_name: impl Into<Arc<str>>, class: ValueClass) -> Self {
		Self {
			raw_name: raw_name.into(),
			tag_names: SmallVec::new(),
			class,
			none: None,
			kind: Kind::value_type(),
			namespace: None,
			table: SymbolTable::new(),
			pipeline: SubTypePipeline::standard(),
			canonical: false,
			visibility: Visibility::Public,
			metadata: Metadata::new(),
			substitutes: SmallVec::new(),
			violation: None,
		}
	}

	/// Seeds a builder for a sub-type of `parent`.
	pub(crate) fn derived(parent: &Type) -> Self {
		Self {
			raw_name: parent.0.raw_name.clone(),
			tag_names: parent.0.tag_names.clone(),
			class: parent.0.class,
			none: Some(parent.0.none.clone()),
			kind: parent.0.kind.clone(),
			namespace: parent.namespace().parent(),
			table: SymbolTable::new(),
			pipeline: parent.0.pipeline.clone(),
			canonical: false,
			visibility: parent.id().visibility(),
			metadata: parent.metadata().renew(),
			substitutes: SmallVec::new(),
			violation: None,
		}
	}

	/// Namespace the type is published into and parented under.
	pub fn in_namespace(mut self, namespace: &Namespace) -> Self {
		self.namespace = Some(namespace.clone());
		self
	}

	pub fn none(mut self, none: impl Into<Datum>) -> Self {
		self.none = Some(none.into());
		self
	}

	pub fn kind(mut self, kind: Kind) -> Self {
		self.kind = kind;
		self
	}

	pub fn constraint(mut self, constraint: Constraint) -> Self {
		self.add_symbol(constraint);
		self
	}

	pub fn operation(mut self, operation: Operation) -> Self {
		self.add_symbol(operation);
		self
	}

	pub fn symbol(mut self, symbol: impl Into<Symbol>) -> Self {
		self.add_symbol(symbol);
		self
	}

	pub fn pipeline(mut self, pipeline: SubTypePipeline) -> Self {
		self.pipeline = pipeline;
		self
	}

	/// Makes the type the canonical one for its value class.
	pub fn canonical(mut self) -> Self {
		self.canonical = true;
		self
	}

	pub fn visibility(mut self, visibility: Visibility) -> Self {
		self.visibility = visibility;
		self
	}

	pub fn metadata(mut self, metadata: Metadata) -> Self {
		self.metadata = metadata;
		self
	}

	/// Adds a symbol to the type's table; a duplicate disables the builder.
	pub fn add_symbol(&mut self, symbol: impl Into<Symbol>) {
		if let Err(violation) = self.table.add(symbol) {
			self.disable(violation);
		}
	}

	/// Records a violation. Only the first one is kept.
	pub fn disable(&mut self, violation: Violation) {
		self.violation.get_or_insert(violation);
	}

	pub fn is_disabled(&self) -> bool {
		self.violation.is_some()
	}

	pub fn table(&self) -> &SymbolTable {
		&self.table
	}

	pub fn raw_name(&self) -> &str {
		&self.raw_name
	}

	pub fn tag_names(&self) -> &[Arc<str>] {
		&self.tag_names
	}

	pub fn append_tag_names(&mut self, names: impl IntoIterator<Item = Arc<str>>) {
		self.tag_names.extend(names);
	}

	/// Re-signs operations mentioning `parent` against the built type.
	pub fn substitute(&mut self, parent: &Type) {
		self.substitutes.push(parent.clone());
	}

	/// Builds the type and publishes it into its namespace.
	///
	/// Fails with `SymbolMustBeUnique` if the namespace already holds the id,
	/// and with the check's violation if the none sentinel is not an
	/// instance of the type.
	///
	/// Each built type holds `read`/`write` operations whose signatures point
	/// back at it, so it keeps itself alive. A
	/// [`TypingEnvironment`](crate::TypingEnvironment) dismantles its graph on
	/// drop; anywhere else, call [`Namespace::dismantle`] on the enclosing
	/// namespace (or on [`Type::namespace`]) to release it.
	pub fn build(self) -> Result<Type, Violation> {
		let canonical = self.canonical;
		let ty = self.build_unpublished()?;
		ty.publish(canonical, false)
	}

	pub(crate) fn build_unpublished(self) -> Result<Type, Violation> {
		if let Some(violation) = self.violation {
			tracing::debug!(raw_name = %self.raw_name, %violation, "type.build.disabled");
			return Err(violation);
		}

		let name = super::display_name(&self.raw_name, &self.tag_names);
		let id = SymbolId::new(SymbolKind::Type, name, self.visibility);
		let core = Namespace::with_table(id, self.table, self.namespace.as_ref(), self.metadata);
		let ty = Type(Arc::new(TypeInner {
			core,
			raw_name: self.raw_name,
			tag_names: self.tag_names,
			none: self.none.unwrap_or_else(|| self.class.default_datum()),
			class: self.class,
			kind: self.kind,
			defect: None,
			pipeline: self.pipeline,
		}));

		for parent in &self.substitutes {
			ty.table().rewrite(|id, symbol| match symbol {
				Symbol::Operation(op) if op.signature().mentions(parent) => {
					let retyped = op.retype(parent, &ty);
					let id = if id == *op.id() { retyped.id().clone() } else { id };
					Some((id, Symbol::Operation(retyped)))
				}
				other => Some((id, other)),
			});
		}

		for name in ["read", "write"] {
			let id = SymbolId::operation(name, OperationType::unary(&ty, &ty), Visibility::Public);
			if !ty.table().contains(&id) {
				ty.table().set(id, Operation::identity(name, &ty, &ty));
			}
		}

		if let Err(violation) = ty.kind().check(&ty) {
			ty.discard();
			return Err(violation);
		}
		if let Err(violation) = ty.check_datum(ty.none()) {
			tracing::debug!(ty = %ty, none = %ty.none(), %violation, "type.build.bad_none");
			ty.discard();
			return Err(violation);
		}
		tracing::trace!(ty = %ty, "type.build");
		Ok(ty)
	}
}
