//! The value algebra terms and operations exchange.
//!
//! # Role
//!
//! A [`Value`] holds exactly one datum, many data, a failure, or a pending
//! result. Failures are ordinary data here: constraint rejections, missing
//! symbols and body faults all arrive as [`Value::No`] or [`Value::Error`].
//!
//! # Invariants
//!
//! - Only [`Value::Blocking`] is blocking; every other variant is available now.
//! - [`Value::or_none`] never fails; [`Value::into_result`] is the strict path.

mod datum;
mod outcome;
mod pending;
#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::Arc;

pub use datum::{Datum, FromDatum, Opaque, ValueClass};
pub use outcome::Outcome;
pub use pending::{Pending, ResultSink};

use crate::error::Violation;

/// Zero, one or many results, a failure, or a result still being produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	One(Datum),
	Many(Arc<[Datum]>),
	/// Empty because a contract was violated.
	No(Violation),
	/// Empty because producing the value went wrong.
	Error(Violation),
	/// Still pending, with a wait budget.
	Blocking(Pending),
}

impl Value {
	pub fn one(datum: impl Into<Datum>) -> Self {
		Self::One(datum.into())
	}

	pub fn many(items: impl IntoIterator<Item = Datum>) -> Self {
		Self::Many(items.into_iter().collect())
	}

	pub fn is_blocking(&self) -> bool {
		matches!(self, Self::Blocking(_))
	}

	pub fn is_failure(&self) -> bool {
		matches!(self, Self::No(_) | Self::Error(_))
	}

	pub fn is_error(&self) -> bool {
		matches!(self, Self::Error(_))
	}

	/// The datum of a single-result value.
	pub fn datum(&self) -> Option<&Datum> {
		match self {
			Self::One(datum) => Some(datum),
			_ => None,
		}
	}

	pub fn violation(&self) -> Option<&Violation> {
		match self {
			Self::No(violation) | Self::Error(violation) => Some(violation),
			_ => None,
		}
	}

	/// Returns the single datum, or `none` for anything else.
	pub fn or_none(&self, none: &Datum) -> Datum {
		self.datum().cloned().unwrap_or_else(|| none.clone())
	}

	/// Strict access: the single datum or the violation that prevented it.
	///
	/// Blocking values are waited on within their budget first.
	pub fn into_result(self) -> Result<Datum, Violation> {
		match self.resolved() {
			Self::One(datum) => Ok(datum),
			Self::Many(items) => Ok(Datum::List(items)),
			Self::No(violation) | Self::Error(violation) => Err(violation),
			Self::Blocking(pending) => pending.wait().into_result(),
		}
	}

	/// Waits out a blocking value; other variants are returned as they are.
	pub fn resolved(self) -> Self {
		match self {
			Self::Blocking(pending) => pending.wait(),
			other => other,
		}
	}
}

impl From<Datum> for Value {
	fn from(datum: Datum) -> Self {
		Self::One(datum)
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::One(datum) => write!(f, "{datum}"),
			Self::Many(items) => write!(f, "{}", Datum::List(items.clone())),
			Self::No(violation) => write!(f, "no({})", violation.kind),
			Self::Error(violation) => write!(f, "error({})", violation.kind),
			Self::Blocking(_) => f.write_str("blocking"),
		}
	}
}

/// Whether a term's value is available now or later.
#[derive(Debug, Clone, PartialEq)]
pub enum Synchronicity {
	Synchronous(Value),
	Asynchronous(Pending),
}

impl Synchronicity {
	pub fn is_synchronous(&self) -> bool {
		matches!(self, Self::Synchronous(_))
	}

	/// Collapses to a value, blocking on deferred results within their budget.
	pub fn wait(self) -> Value {
		match self {
			Self::Synchronous(value) => value.resolved(),
			Self::Asynchronous(pending) => pending.wait(),
		}
	}
}
