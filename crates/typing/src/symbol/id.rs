use std::fmt;
use std::sync::Arc;

use super::Visibility;
use crate::operation::OperationType;

/// Which bucket of a symbol table a symbol lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolKind {
	Namespace,
	Type,
	Kind,
	Tag,
	Operation,
	Constraint,
	Term,
}

impl SymbolKind {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Namespace => "namespace",
			Self::Type => "type",
			Self::Kind => "kind",
			Self::Tag => "tag",
			Self::Operation => "operation",
			Self::Constraint => "constraint",
			Self::Term => "term",
		}
	}
}

impl fmt::Display for SymbolKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Immutable identity of a symbol: kind, name and visibility.
///
/// Operation ids also carry their [`OperationType`], so one name can be
/// registered once per signature.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SymbolId {
	kind: SymbolKind,
	name: Arc<str>,
	visibility: Visibility,
	signature: Option<OperationType>,
}

impl SymbolId {
	pub fn new(kind: SymbolKind, name: impl Into<Arc<str>>, visibility: Visibility) -> Self {
		Self {
			kind,
			name: name.into(),
			visibility,
			signature: None,
		}
	}

	pub fn public(kind: SymbolKind, name: impl Into<Arc<str>>) -> Self {
		Self::new(kind, name, Visibility::Public)
	}

	pub fn private(kind: SymbolKind, name: impl Into<Arc<str>>) -> Self {
		Self::new(kind, name, Visibility::Private)
	}

	pub fn operation(name: impl Into<Arc<str>>, signature: OperationType, visibility: Visibility) -> Self {
		Self {
			kind: SymbolKind::Operation,
			name: name.into(),
			visibility,
			signature: Some(signature),
		}
	}

	/// The id that stands for "no symbol". It can never be registered.
	pub fn none() -> Self {
		Self::new(SymbolKind::Namespace, "", Visibility::Invisible)
	}

	/// Reserved slot holding a namespace's parent.
	pub fn parent_slot() -> Self {
		Self::private(SymbolKind::Namespace, "parent")
	}

	pub fn is_none(&self) -> bool {
		self.visibility == Visibility::Invisible && self.name.is_empty()
	}

	pub fn kind(&self) -> SymbolKind {
		self.kind
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn name_arc(&self) -> Arc<str> {
		self.name.clone()
	}

	pub fn visibility(&self) -> Visibility {
		self.visibility
	}

	pub fn signature(&self) -> Option<&OperationType> {
		self.signature.as_ref()
	}

	/// A new id of the same kind (and signature) under another name.
	pub fn rename(&self, name: impl Into<Arc<str>>, visibility: Visibility) -> Self {
		Self {
			kind: self.kind,
			name: name.into(),
			visibility,
			signature: self.signature.clone(),
		}
	}

	pub(crate) fn with_signature(&self, signature: OperationType) -> Self {
		Self {
			signature: Some(signature),
			..self.clone()
		}
	}
}

impl fmt::Display for SymbolId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.visibility == Visibility::Private {
			f.write_str("#")?;
		}
		f.write_str(&self.name)?;
		if let Some(signature) = &self.signature {
			write!(f, ": {signature}")?;
		}
		Ok(())
	}
}

impl fmt::Debug for SymbolId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}({self})", self.visibility.sigil(), self.kind)
	}
}
