//! Namespaces: symbols that own a table and a parent link.
//!
//! # Role
//!
//! Types, tags and plain namespaces all sit on a [`Namespace`]. A namespace
//! without a parent is a root; the root additionally indexes canonical types
//! by [`ValueClass`] so any namespace can answer [`Namespace::type_of`].
//!
//! # Invariants
//!
//! - The parent lives in the private `#parent` slot of the table, so it is
//!   reachable by id but never enumerated or inherited by sub-types.
//! - A value class maps to at most one canonical raw type name.
//! - [`Namespace::type_of`] never fails; unknown classes get a placeholder
//!   type whose every check fails with `SymbolMustBeRegistered`.

#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::{Violation, ViolationKind};
use crate::meta::Metadata;
use crate::symbol::{Symbol, SymbolId, SymbolKind, Visibility};
use crate::table::SymbolTable;
use crate::types::Type;
use crate::value::ValueClass;

/// A symbol owning a [`SymbolTable`] and linked to a parent namespace.
#[derive(Clone)]
pub struct Namespace(Arc<NamespaceInner>);

struct NamespaceInner {
	id: SymbolId,
	table: SymbolTable,
	metadata: Metadata,
	/// Present on parentless namespaces only.
	class_index: Option<Mutex<FxHashMap<ValueClass, Type>>>,
}

impl Namespace {
	/// A fresh root namespace with an empty class index.
	pub fn new_root(name: impl Into<Arc<str>>) -> Self {
		Self::with_table(
			SymbolId::public(SymbolKind::Namespace, name),
			SymbolTable::new(),
			None,
			Metadata::new(),
		)
	}

	/// A namespace under `parent`. It is not added to the parent's table;
	/// see [`Namespace::child`].
	pub fn new(name: impl Into<Arc<str>>, parent: &Namespace) -> Self {
		Self::with_table(
			SymbolId::public(SymbolKind::Namespace, name),
			SymbolTable::new(),
			Some(parent),
			Metadata::new(),
		)
	}

	pub(crate) fn with_table(id: SymbolId, table: SymbolTable, parent: Option<&Namespace>, metadata: Metadata) -> Self {
		let class_index = match parent {
			Some(parent) => {
				table.set(SymbolId::parent_slot(), parent.clone());
				None
			}
			None => Some(Mutex::new(FxHashMap::default())),
		};
		Self(Arc::new(NamespaceInner {
			id,
			table,
			metadata,
			class_index,
		}))
	}

	/// Creates a namespace under this one and registers it here.
	pub fn child(&self, name: impl Into<Arc<str>>) -> Result<Namespace, Violation> {
		let child = Namespace::new(name, self);
		self.add(child.clone())?;
		Ok(child)
	}

	pub fn id(&self) -> &SymbolId {
		&self.0.id
	}

	pub fn name(&self) -> &str {
		self.0.id.name()
	}

	pub fn table(&self) -> &SymbolTable {
		&self.0.table
	}

	pub fn metadata(&self) -> &Metadata {
		&self.0.metadata
	}

	pub fn parent(&self) -> Option<Namespace> {
		match self.0.table.symbol(&SymbolId::parent_slot()) {
			Ok(Symbol::Namespace(parent)) => Some(parent),
			_ => None,
		}
	}

	pub fn is_root(&self) -> bool {
		self.0.class_index.is_some()
	}

	/// Walks the parent chain up to the root.
	pub fn root(&self) -> Namespace {
		let mut current = self.clone();
		while let Some(parent) = current.parent() {
			current = parent;
		}
		current
	}

	pub fn add(&self, symbol: impl Into<Symbol>) -> Result<(), Violation> {
		let symbol = symbol.into();
		tracing::trace!(namespace = %self.0.id, symbol = %symbol.id(), "namespace.add");
		self.0.table.add(symbol)
	}

	pub fn symbol(&self, id: &SymbolId) -> Result<Symbol, Violation> {
		self.0.table.symbol(id)
	}

	/// The canonical type for `class`, or a permanently failing placeholder.
	pub fn type_of(&self, class: ValueClass) -> Type {
		let root = self.root();
		let found = root.0.class_index.as_ref().and_then(|index| index.lock().get(&class).cloned());
		found.unwrap_or_else(|| Type::unregistered(class))
	}

	/// Indexes `ty` as the canonical type of its value class at the root.
	///
	/// Re-registering a type with the same raw name is a no-op; a different
	/// raw name for an already bound class is a uniqueness violation.
	pub fn register_type(&self, ty: &Type) -> Result<(), Violation> {
		let root = self.root();
		let Some(index) = root.0.class_index.as_ref() else {
			return Err(Violation::new(ViolationKind::SymbolMustBeRegistered, root.id(), "class index"));
		};
		let class = ty.value_class();
		let mut index = index.lock();
		let bound = index.get(&class).map(|existing| existing.raw_name().to_owned());
		match bound {
			Some(existing) if existing == ty.raw_name() => Ok(()),
			Some(existing) => {
				drop(index);
				tracing::debug!(%class, existing = %existing, rejected = %ty, "namespace.register_type.conflict");
				Err(Violation::new(
					ViolationKind::SymbolMustBeUnique,
					root.id(),
					format_args!("{class} is bound to `{existing}`, not `{}`", ty.raw_name()),
				))
			}
			None => {
				index.insert(class, ty.clone());
				tracing::trace!(%class, ty = %ty, "namespace.register_type");
				Ok(())
			}
		}
	}

	/// A copy of this namespace under a new name. Copyable entries, the
	/// parent link included, are carried over.
	pub fn rename(&self, name: impl Into<Arc<str>>, visibility: Visibility) -> Self {
		let id = self.0.id.rename(name, visibility);
		let parent = self.parent();
		Self::with_table(id, self.0.table.copy(), parent.as_ref(), self.0.metadata.renew())
	}

	/// Empties this namespace and every namespace reachable from it, except
	/// through parent links. Releases the reference cycles types form with
	/// their own operations.
	pub fn dismantle(&self) {
		let indexed = self.0.class_index.as_ref().map(|index| std::mem::take(&mut *index.lock()));
		drop(indexed);
		let parent = SymbolId::parent_slot();
		for (id, symbol) in self.0.table.clear() {
			if id == parent {
				continue;
			}
			match symbol {
				Symbol::Namespace(ns) => ns.dismantle(),
				Symbol::Type(ty) => ty.namespace().dismantle(),
				_ => {}
			}
		}
	}
}

impl PartialEq for Namespace {
	/// Shallow: namespaces are equal when their ids are.
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0) || self.0.id == other.0.id
	}
}

impl fmt::Debug for Namespace {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Namespace")
			.field("id", &self.0.id)
			.field("table", &self.0.table)
			.finish()
	}
}

impl fmt::Display for Namespace {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0.id)
	}
}
