use std::fmt;
use std::sync::Arc;

use super::{Type, TypeCheck};
use crate::constraint::Constraint;
use crate::error::{Violation, ViolationKind};
use crate::meta::Metadata;
use crate::namespace::Namespace;
use crate::operation::Operation;
use crate::symbol::{Symbol, SymbolId, SymbolKind, Visibility};
use crate::table::SymbolTable;

/// Rewrites a symbol inherited by a sub-type; `None` drops it.
pub type Mutation = Arc<dyn Fn(&Symbol) -> Option<Symbol> + Send + Sync>;

/// A capability module merged into a type by [`Type::sub`].
///
/// A tag contributes the public symbols of its table, may rewrite symbols
/// inherited from the parent type through its mutations, and may declare a
/// type-level constraint checked on the finished sub-type.
#[derive(Clone)]
pub struct Tag(Arc<TagInner>);

struct TagInner {
	core: Namespace,
	type_constraint: Option<TypeCheck>,
	mutations: Vec<Mutation>,
}

impl Tag {
	pub fn builder(name: impl Into<Arc<str>>) -> TagBuilder {
		TagBuilder {
			id: SymbolId::public(SymbolKind::Tag, name),
			table: SymbolTable::new(),
			type_constraint: None,
			mutations: Vec::new(),
			metadata: Metadata::new(),
			violation: None,
		}
	}

	pub fn id(&self) -> &SymbolId {
		self.0.core.id()
	}

	pub fn name(&self) -> &str {
		self.0.core.name()
	}

	pub fn namespace(&self) -> &Namespace {
		&self.0.core
	}

	pub fn table(&self) -> &SymbolTable {
		self.0.core.table()
	}

	pub fn has_type_constraint(&self) -> bool {
		self.0.type_constraint.is_some()
	}

	/// Runs every mutation over `symbol`, stopping once one drops it.
	pub fn mutate(&self, symbol: Symbol) -> Option<Symbol> {
		self.0
			.mutations
			.iter()
			.try_fold(symbol, |symbol, mutation| mutation(&symbol))
	}

	/// Checks the type-level constraint, if any, against a finished type.
	pub fn check_type(&self, ty: &Type) -> Result<(), Violation> {
		let Some(check) = &self.0.type_constraint else {
			return Ok(());
		};
		check(ty).map_err(|cause| {
			Violation::new(
				ViolationKind::TagTypeConstraint {
					tag: self.id().name_arc(),
				},
				self.id(),
				ty,
			)
			.caused_by(cause)
		})
	}

	pub fn rename(&self, name: impl Into<Arc<str>>, visibility: Visibility) -> Self {
		Self(Arc::new(TagInner {
			core: self.0.core.rename(name, visibility),
			type_constraint: self.0.type_constraint.clone(),
			mutations: self.0.mutations.clone(),
		}))
	}
}

impl PartialEq for Tag {
	/// Same id, same symbols and the very same hooks.
	fn eq(&self, other: &Self) -> bool {
		if Arc::ptr_eq(&self.0, &other.0) {
			return true;
		}
		let same_check = match (&self.0.type_constraint, &other.0.type_constraint) {
			(None, None) => true,
			(Some(a), Some(b)) => Arc::ptr_eq(a, b),
			_ => false,
		};
		self.id() == other.id()
			&& same_check
			&& self.0.mutations.len() == other.0.mutations.len()
			&& self.0.mutations.iter().zip(&other.0.mutations).all(|(a, b)| Arc::ptr_eq(a, b))
			&& self.table() == other.table()
	}
}

impl fmt::Debug for Tag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Tag")
			.field("id", self.id())
			.field("symbols", &self.table().len())
			.field("mutations", &self.0.mutations.len())
			.finish()
	}
}

/// Assembles a [`Tag`].
pub struct TagBuilder {
	id: SymbolId,
	table: SymbolTable,
	type_constraint: Option<TypeCheck>,
	mutations: Vec<Mutation>,
	metadata: Metadata,
	violation: Option<Violation>,
}

impl TagBuilder {
	pub fn symbol(mut self, symbol: impl Into<Symbol>) -> Self {
		if let Err(violation) = self.table.add(symbol) {
			self.violation.get_or_insert(violation);
		}
		self
	}

	pub fn constraint(self, constraint: Constraint) -> Self {
		self.symbol(constraint)
	}

	pub fn operation(self, operation: Operation) -> Self {
		self.symbol(operation)
	}

	pub fn type_constraint(mut self, check: impl Fn(&Type) -> Result<(), Violation> + Send + Sync + 'static) -> Self {
		self.type_constraint = Some(Arc::new(check));
		self
	}

	pub fn mutation(mut self, mutation: impl Fn(&Symbol) -> Option<Symbol> + Send + Sync + 'static) -> Self {
		self.mutations.push(Arc::new(mutation));
		self
	}

	pub fn metadata(mut self, metadata: Metadata) -> Self {
		self.metadata = metadata;
		self
	}

	/// Fails if two contributed symbols shared an id.
	pub fn build(self) -> Result<Tag, Violation> {
		if let Some(violation) = self.violation {
			return Err(violation);
		}
		Ok(Tag(Arc::new(TagInner {
			core: Namespace::with_table(self.id, self.table, None, self.metadata),
			type_constraint: self.type_constraint,
			mutations: self.mutations,
		})))
	}
}
