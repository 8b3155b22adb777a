//! Typed holders of values.
//!
//! # Role
//!
//! A [`Term`] binds a value to a [`Type`]: constants are available now,
//! blocking constants may still be pending, variables change under a lock,
//! expressions are evaluated by a processor later, and unknown terms stand
//! in where no usable term exists yet.

mod constant;
mod expression;
mod variable;

use std::fmt;
use std::sync::Arc;

pub use constant::Constant;
pub use expression::Expression;
pub use variable::Variable;

use crate::error::{Violation, ViolationKind};
use crate::symbol::{SymbolId, SymbolKind, Visibility};
use crate::types::Type;
use crate::value::{Synchronicity, Value};

#[derive(Clone, Debug, PartialEq)]
pub enum Term {
	Constant(Constant),
	/// A constant whose read result may still be pending.
	BlockingConstant(Constant),
	Variable(Variable),
	Expression(Expression),
	Unknown(Unknown),
}

impl Term {
	pub fn id(&self) -> &SymbolId {
		match self {
			Self::Constant(c) | Self::BlockingConstant(c) => c.id(),
			Self::Variable(v) => v.id(),
			Self::Expression(e) => e.id(),
			Self::Unknown(u) => u.id(),
		}
	}

	pub fn ty(&self) -> &Type {
		match self {
			Self::Constant(c) | Self::BlockingConstant(c) => c.ty(),
			Self::Variable(v) => v.ty(),
			Self::Expression(e) => e.ty(),
			Self::Unknown(u) => u.ty(),
		}
	}

	pub fn value(&self) -> Synchronicity {
		match self {
			Self::Constant(c) => c.value(),
			Self::BlockingConstant(c) => c.blocking_value(),
			Self::Variable(v) => v.value(),
			Self::Expression(e) => e.value(),
			Self::Unknown(u) => u.value(),
		}
	}

	pub fn as_variable(&self) -> Option<&Variable> {
		match self {
			Self::Variable(v) => Some(v),
			_ => None,
		}
	}

	pub fn is_unknown(&self) -> bool {
		matches!(self, Self::Unknown(_))
	}

	/// Rejects unknown terms where a final, usable term is required.
	pub fn ensure_known(&self) -> Result<&Self, Violation> {
		match self {
			Self::Unknown(unknown) => Err(unknown.violation()),
			known => Ok(known),
		}
	}

	pub fn rename(&self, name: impl Into<Arc<str>>, visibility: Visibility) -> Self {
		match self {
			Self::Constant(c) => Self::Constant(c.rename(name, visibility)),
			Self::BlockingConstant(c) => Self::BlockingConstant(c.rename(name, visibility)),
			Self::Variable(v) => Self::Variable(v.rename(name, visibility)),
			Self::Expression(e) => Self::Expression(e.rename(name, visibility)),
			Self::Unknown(u) => Self::Unknown(u.rename(name, visibility)),
		}
	}
}

impl fmt::Display for Term {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}", self.id(), self.ty())
	}
}

/// Placeholder term; never a valid final value.
#[derive(Clone, Debug, PartialEq)]
pub struct Unknown {
	id: SymbolId,
	ty: Type,
}

impl Unknown {
	pub fn new(ty: &Type) -> Self {
		Self {
			id: SymbolId::public(SymbolKind::Term, format!("unknown({ty})")),
			ty: ty.clone(),
		}
	}

	pub fn id(&self) -> &SymbolId {
		&self.id
	}

	pub fn ty(&self) -> &Type {
		&self.ty
	}

	pub fn value(&self) -> Synchronicity {
		Synchronicity::Synchronous(Value::No(self.violation()))
	}

	fn violation(&self) -> Violation {
		Violation::new(ViolationKind::TermMustNotBeUnknown, "term", &self.id)
	}

	pub fn rename(&self, name: impl Into<Arc<str>>, visibility: Visibility) -> Self {
		Self {
			id: self.id.rename(name, visibility),
			ty: self.ty.clone(),
		}
	}
}
