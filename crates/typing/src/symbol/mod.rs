//! Identity and access-policy primitives, and the [`Symbol`] sum type.
//!
//! # Role
//!
//! Every entry of a [`SymbolTable`](crate::SymbolTable) is a [`Symbol`]
//! addressed by a [`SymbolId`]. The id's [`Visibility`] decides which table
//! operations may touch it.
//!
//! # Invariants
//!
//! - Ids are immutable; [`SymbolId::rename`] returns a new id.
//! - The none id ([`SymbolId::none`]) is invisible and is never registered.

mod id;
mod visibility;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub use id::{SymbolId, SymbolKind};
use rustc_hash::FxHasher;
pub use visibility::{Access, Visibility};

use crate::constraint::Constraint;
use crate::namespace::Namespace;
use crate::operation::Operation;
use crate::term::Term;
use crate::types::{Kind, Tag, Type};

/// The addressable atom of a typing environment.
#[derive(Clone, Debug, PartialEq)]
pub enum Symbol {
	Namespace(Namespace),
	Type(Type),
	Kind(Kind),
	Tag(Tag),
	Operation(Operation),
	Constraint(Constraint),
	Term(Term),
}

impl Symbol {
	pub fn id(&self) -> &SymbolId {
		match self {
			Self::Namespace(ns) => ns.id(),
			Self::Type(ty) => ty.id(),
			Self::Kind(kind) => kind.id(),
			Self::Tag(tag) => tag.id(),
			Self::Operation(op) => op.id(),
			Self::Constraint(constraint) => constraint.id(),
			Self::Term(term) => term.id(),
		}
	}

	pub fn kind(&self) -> SymbolKind {
		self.id().kind()
	}

	pub fn name(&self) -> &str {
		self.id().name()
	}

	/// A structurally identical copy registered under a new name.
	pub fn rename(&self, name: impl Into<Arc<str>>, visibility: Visibility) -> Self {
		let name = name.into();
		match self {
			Self::Namespace(ns) => Self::Namespace(ns.rename(name, visibility)),
			Self::Type(ty) => Self::Type(ty.rename(name, visibility)),
			Self::Kind(kind) => Self::Kind(kind.rename(name, visibility)),
			Self::Tag(tag) => Self::Tag(tag.rename(name, visibility)),
			Self::Operation(op) => Self::Operation(op.rename(name, visibility)),
			Self::Constraint(constraint) => Self::Constraint(constraint.rename(name, visibility)),
			Self::Term(term) => Self::Term(term.rename(name, visibility)),
		}
	}

	/// Hash contribution of this symbol to a table's running hash.
	pub fn symbol_hash(&self) -> u64 {
		let mut hasher = FxHasher::default();
		self.id().hash(&mut hasher);
		hasher.finish()
	}

	pub fn as_type(&self) -> Option<&Type> {
		match self {
			Self::Type(ty) => Some(ty),
			_ => None,
		}
	}

	pub fn as_tag(&self) -> Option<&Tag> {
		match self {
			Self::Tag(tag) => Some(tag),
			_ => None,
		}
	}

	pub fn as_operation(&self) -> Option<&Operation> {
		match self {
			Self::Operation(op) => Some(op),
			_ => None,
		}
	}

	pub fn as_constraint(&self) -> Option<&Constraint> {
		match self {
			Self::Constraint(constraint) => Some(constraint),
			_ => None,
		}
	}

	pub fn as_namespace(&self) -> Option<&Namespace> {
		match self {
			Self::Namespace(ns) => Some(ns),
			_ => None,
		}
	}

	pub fn as_term(&self) -> Option<&Term> {
		match self {
			Self::Term(term) => Some(term),
			_ => None,
		}
	}
}

impl fmt::Display for Symbol {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.id())
	}
}

impl From<Namespace> for Symbol {
	fn from(ns: Namespace) -> Self {
		Self::Namespace(ns)
	}
}

impl From<Type> for Symbol {
	fn from(ty: Type) -> Self {
		Self::Type(ty)
	}
}

impl From<Kind> for Symbol {
	fn from(kind: Kind) -> Self {
		Self::Kind(kind)
	}
}

impl From<Tag> for Symbol {
	fn from(tag: Tag) -> Self {
		Self::Tag(tag)
	}
}

impl From<Operation> for Symbol {
	fn from(op: Operation) -> Self {
		Self::Operation(op)
	}
}

impl From<Constraint> for Symbol {
	fn from(constraint: Constraint) -> Self {
		Self::Constraint(constraint)
	}
}

impl From<Term> for Symbol {
	fn from(term: Term) -> Self {
		Self::Term(term)
	}
}
