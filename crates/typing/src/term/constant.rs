use std::fmt;
use std::sync::Arc;

use crate::meta::Metadata;
use crate::operation::Operation;
use crate::symbol::{SymbolId, SymbolKind, Visibility};
use crate::types::Type;
use crate::value::{Synchronicity, Value};

/// An immutable value of a type, handed out through the type's `read`
/// operation.
///
/// The stored value is checked through the type on construction, or on
/// resolution when it is still pending.
///
/// Two constants are equal only if their stored values *and* their read
/// operations are; a redacting read must never compare equal to a plain one.
#[derive(Clone)]
pub struct Constant(Arc<ConstantInner>);

struct ConstantInner {
	id: SymbolId,
	ty: Type,
	value: Value,
	read: Operation,
	metadata: Metadata,
}

impl Constant {
	pub fn new(ty: &Type, value: Value) -> Self {
		let value = ty.checked(value);
		Self(Arc::new(ConstantInner {
			id: SymbolId::public(SymbolKind::Term, value.to_string()),
			ty: ty.clone(),
			read: ty.read_operation(),
			metadata: ty.metadata().renew(),
			value,
		}))
	}

	/// The same constant read through `read` instead of its type's default.
	pub fn with_read(&self, read: Operation) -> Self {
		Self(Arc::new(ConstantInner {
			id: self.0.id.clone(),
			ty: self.0.ty.clone(),
			value: self.0.value.clone(),
			read,
			metadata: self.0.metadata.clone(),
		}))
	}

	pub fn id(&self) -> &SymbolId {
		&self.0.id
	}

	pub fn ty(&self) -> &Type {
		&self.0.ty
	}

	pub fn metadata(&self) -> &Metadata {
		&self.0.metadata
	}

	pub fn read_operation(&self) -> &Operation {
		&self.0.read
	}

	fn read(&self) -> Value {
		self.0.read.apply(self.0.value.clone())
	}

	/// Always available now.
	pub fn value(&self) -> Synchronicity {
		Synchronicity::Synchronous(self.read())
	}

	/// Deferred while the read result is still pending with a nonzero wait
	/// budget; a zero budget means waiting here, indefinitely.
	pub(crate) fn blocking_value(&self) -> Synchronicity {
		match self.read() {
			Value::Blocking(pending) if !pending.max_wait().is_zero() => Synchronicity::Asynchronous(pending),
			Value::Blocking(pending) => Synchronicity::Synchronous(pending.wait()),
			other => Synchronicity::Synchronous(other),
		}
	}

	pub fn rename(&self, name: impl Into<Arc<str>>, visibility: Visibility) -> Self {
		Self(Arc::new(ConstantInner {
			id: self.0.id.rename(name, visibility),
			ty: self.0.ty.clone(),
			value: self.0.value.clone(),
			read: self.0.read.clone(),
			metadata: self.0.metadata.clone(),
		}))
	}
}

impl PartialEq for Constant {
	fn eq(&self, other: &Self) -> bool {
		self.0.ty == other.0.ty && self.0.value == other.0.value && self.0.read == other.0.read
	}
}

impl fmt::Debug for Constant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Constant")
			.field("id", &self.0.id)
			.field("ty", &self.0.ty.name())
			.field("read", &self.0.read.name())
			.finish_non_exhaustive()
	}
}
