//! Value predicates enforced by types.

use std::fmt;
use std::sync::Arc;

use crate::error::{Violation, ViolationKind};
use crate::symbol::{SymbolId, SymbolKind, Visibility};
use crate::value::Datum;

type Predicate = Arc<dyn Fn(&Datum) -> bool + Send + Sync>;

/// A named predicate over data. Every value a type admits must satisfy all
/// constraints registered in the type's table.
#[derive(Clone)]
pub struct Constraint(Arc<ConstraintInner>);

struct ConstraintInner {
	id: SymbolId,
	predicate: Predicate,
	description: Arc<str>,
}

impl Constraint {
	pub fn new(name: impl Into<Arc<str>>, predicate: impl Fn(&Datum) -> bool + Send + Sync + 'static) -> Self {
		let id = SymbolId::public(SymbolKind::Constraint, name);
		Self(Arc::new(ConstraintInner {
			description: id.name_arc(),
			id,
			predicate: Arc::new(predicate),
		}))
	}

	pub fn with_visibility(self, visibility: Visibility) -> Self {
		let name = self.0.id.name_arc();
		self.rename(name, visibility)
	}

	/// Human readable statement of the rule, used in violations.
	pub fn with_description(self, description: impl Into<Arc<str>>) -> Self {
		Self(Arc::new(ConstraintInner {
			id: self.0.id.clone(),
			predicate: self.0.predicate.clone(),
			description: description.into(),
		}))
	}

	pub fn id(&self) -> &SymbolId {
		&self.0.id
	}

	pub fn description(&self) -> &str {
		&self.0.description
	}

	pub fn accepts(&self, datum: &Datum) -> bool {
		(self.0.predicate)(datum)
	}

	pub fn check(&self, datum: &Datum) -> Result<(), Violation> {
		if self.accepts(datum) {
			return Ok(());
		}
		Err(Violation::new(
			ViolationKind::ConstraintViolated {
				constraint: self.0.description.clone(),
			},
			self.0.id.name(),
			datum,
		))
	}

	pub fn rename(&self, name: impl Into<Arc<str>>, visibility: Visibility) -> Self {
		Self(Arc::new(ConstraintInner {
			id: self.0.id.rename(name, visibility),
			predicate: self.0.predicate.clone(),
			description: self.0.description.clone(),
		}))
	}
}

impl PartialEq for Constraint {
	fn eq(&self, other: &Self) -> bool {
		self.0.id == other.0.id && Arc::ptr_eq(&self.0.predicate, &other.0.predicate)
	}
}

impl fmt::Debug for Constraint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Constraint")
			.field("id", &self.0.id)
			.field("description", &self.0.description)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_check_reports_description() {
		let positive = Constraint::new("positive", |d| d.as_int().is_some_and(|v| v > 0)).with_description("value > 0");
		assert!(positive.check(&Datum::Int(3)).is_ok());
		let err = positive.check(&Datum::Int(-3)).expect_err("negative");
		assert_eq!(
			err.kind,
			ViolationKind::ConstraintViolated {
				constraint: "value > 0".into()
			}
		);
		assert_eq!(&*err.inspected, "-3");
	}
}
