use std::fmt;
use std::sync::Arc;

use super::Type;
use crate::error::{Violation, ViolationKind};
use crate::symbol::{SymbolId, SymbolKind, Visibility};

/// A rule a whole type must satisfy, used by kinds and tags.
pub type TypeCheck = Arc<dyn Fn(&Type) -> Result<(), Violation> + Send + Sync>;

/// The meta-type of a type. Its checks run once, when a type is built.
#[derive(Clone)]
pub struct Kind(Arc<KindInner>);

struct KindInner {
	id: SymbolId,
	checks: Vec<TypeCheck>,
}

impl Kind {
	pub fn new(name: impl Into<Arc<str>>) -> Self {
		Self(Arc::new(KindInner {
			id: SymbolId::public(SymbolKind::Kind, name),
			checks: Vec::new(),
		}))
	}

	/// The kind of ordinary value types. It checks nothing.
	pub fn value_type() -> Self {
		Self::new("type")
	}

	pub fn with_check(self, check: impl Fn(&Type) -> Result<(), Violation> + Send + Sync + 'static) -> Self {
		let mut checks = self.0.checks.clone();
		checks.push(Arc::new(check));
		Self(Arc::new(KindInner {
			id: self.0.id.clone(),
			checks,
		}))
	}

	pub fn id(&self) -> &SymbolId {
		&self.0.id
	}

	pub fn name(&self) -> &str {
		self.0.id.name()
	}

	pub fn check(&self, ty: &Type) -> Result<(), Violation> {
		for check in &self.0.checks {
			check(ty).map_err(|cause| {
				Violation::new(
					ViolationKind::KindRejected {
						kind: self.0.id.name_arc(),
					},
					&self.0.id,
					ty,
				)
				.caused_by(cause)
			})?;
		}
		Ok(())
	}

	pub fn rename(&self, name: impl Into<Arc<str>>, visibility: Visibility) -> Self {
		Self(Arc::new(KindInner {
			id: self.0.id.rename(name, visibility),
			checks: self.0.checks.clone(),
		}))
	}
}

impl PartialEq for Kind {
	fn eq(&self, other: &Self) -> bool {
		self.0.id == other.0.id
			&& self.0.checks.len() == other.0.checks.len()
			&& self.0.checks.iter().zip(&other.0.checks).all(|(a, b)| Arc::ptr_eq(a, b))
	}
}

impl fmt::Debug for Kind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Kind")
			.field("id", &self.0.id)
			.field("checks", &self.0.checks.len())
			.finish()
	}
}
