//! Cast registration states and attempts.

use std::fmt;

use crate::error::Result;
use crate::namespace::Namespace;
use crate::symbol::{Symbol, SymbolId};
use crate::types::Type;
use crate::value::Value;

/// Whether a symbol id is known to be in a table, known to be absent, or
/// still to be looked up.
#[derive(Debug, Clone, PartialEq)]
pub enum Registration {
	Registered(Symbol),
	Unregistered(SymbolId),
	/// Ask `namespace` for `id` when resolved.
	Pending { id: SymbolId, namespace: Namespace },
}

impl Registration {
	/// Looks `id` up in `namespace` right away.
	pub fn lookup(namespace: &Namespace, id: &SymbolId) -> Self {
		match namespace.symbol(id) {
			Ok(symbol) => Self::Registered(symbol),
			Err(_) => Self::Unregistered(id.clone()),
		}
	}

	pub fn id(&self) -> &SymbolId {
		match self {
			Self::Registered(symbol) => symbol.id(),
			Self::Unregistered(id) | Self::Pending { id, .. } => id,
		}
	}

	pub fn is_registered(&self) -> bool {
		matches!(self, Self::Registered(_))
	}

	/// Turns a pending registration into a definite one.
	pub fn resolve(&self) -> Self {
		match self {
			Self::Pending { id, namespace } => Self::lookup(namespace, id),
			settled => settled.clone(),
		}
	}
}

impl fmt::Display for Registration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Registered(symbol) => write!(f, "registered {}", symbol.id()),
			Self::Unregistered(id) => write!(f, "unregistered {id}"),
			Self::Pending { id, namespace } => write!(f, "pending {id} in {namespace}"),
		}
	}
}

/// A requested cast of `object` from `source` to `target`, kept together
/// with what is known about the cast's registration.
#[derive(Debug, Clone, PartialEq)]
pub struct CastAttempt {
	source: Type,
	object: Value,
	target: Type,
	registration: Registration,
}

impl CastAttempt {
	pub fn new(source: Type, object: Value, target: Type, registration: Registration) -> Self {
		Self {
			source,
			object,
			target,
			registration,
		}
	}

	pub fn source(&self) -> &Type {
		&self.source
	}

	pub fn object(&self) -> &Value {
		&self.object
	}

	pub fn target(&self) -> &Type {
		&self.target
	}

	pub fn registration(&self) -> &Registration {
		&self.registration
	}

	/// The same attempt with its registration resolved.
	pub fn resolved(&self) -> Self {
		Self {
			registration: self.registration.resolve(),
			..self.clone()
		}
	}

	/// Performs the cast through [`Type::to`].
	pub fn cast(&self) -> Result<Value> {
		self.source.to(&self.target).evaluate(std::slice::from_ref(&self.object))
	}
}

impl fmt::Display for CastAttempt {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"cast {} from {} to {} ({})",
			self.object, self.source, self.target, self.registration
		)
	}
}
