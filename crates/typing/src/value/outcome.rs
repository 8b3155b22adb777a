use crate::error::Violation;

/// Present-or-absent result for things that are not data, such as types or
/// operations.
///
/// An absent outcome still carries a usable `fallback` so "or none" style
/// callers never have to handle the failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
	One(T),
	No { violation: Violation, fallback: T },
}

impl<T> Outcome<T> {
	pub fn is_one(&self) -> bool {
		matches!(self, Self::One(_))
	}

	pub fn violation(&self) -> Option<&Violation> {
		match self {
			Self::One(_) => None,
			Self::No { violation, .. } => Some(violation),
		}
	}

	/// The produced item, or the fallback when production failed.
	pub fn or_none(self) -> T {
		match self {
			Self::One(item) | Self::No { fallback: item, .. } => item,
		}
	}

	/// Borrowing variant of [`Outcome::or_none`].
	pub fn get(&self) -> &T {
		match self {
			Self::One(item) | Self::No { fallback: item, .. } => item,
		}
	}

	pub fn into_result(self) -> Result<T, Violation> {
		match self {
			Self::One(item) => Ok(item),
			Self::No { violation, .. } => Err(violation),
		}
	}

	pub fn map<U>(self, f: impl Fn(T) -> U) -> Outcome<U> {
		match self {
			Self::One(item) => Outcome::One(f(item)),
			Self::No { violation, fallback } => Outcome::No {
				violation,
				fallback: f(fallback),
			},
		}
	}
}
