use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::meta::Metadata;
use crate::operation::Operation;
use crate::symbol::{SymbolId, SymbolKind, Visibility};
use crate::types::Type;
use crate::value::{Synchronicity, Value};

static NEXT_VARIABLE: AtomicU64 = AtomicU64::new(0);

/// A mutable, lock-guarded value of a type.
///
/// # Invariants
///
/// - The stored value is never pending.
/// - [`Variable::set`] captures the old value, runs the write operation and
///   stores its result inside one critical section. The write operation
///   must not touch the same variable.
#[derive(Clone)]
pub struct Variable(Arc<VariableInner>);

struct VariableInner {
	id: SymbolId,
	ty: Type,
	state: Mutex<Value>,
	read: Operation,
	write: Operation,
	metadata: Metadata,
}

impl Variable {
	pub fn new(ty: &Type, initial: Value) -> Self {
		let serial = NEXT_VARIABLE.fetch_add(1, Ordering::Relaxed);
		let write = ty.write_operation();
		let stored = write.apply(initial.resolved());
		Self(Arc::new(VariableInner {
			id: SymbolId::public(SymbolKind::Term, format!("var#{serial}({ty})")),
			ty: ty.clone(),
			state: Mutex::new(stored),
			read: ty.read_operation(),
			write,
			metadata: ty.metadata().renew(),
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

	/// The current value, through the read operation.
	pub fn get(&self) -> Value {
		let current = self.0.state.lock().clone();
		self.0.read.apply(current)
	}

	pub fn value(&self) -> Synchronicity {
		Synchronicity::Synchronous(self.get())
	}

	/// Stores `new` through the write operation and returns the value that
	/// was current immediately before, through the read operation.
	///
	/// A write that fails leaves the variable unchanged and returns the
	/// failure.
	pub fn set(&self, new: impl Into<Value>) -> Value {
		let new = new.into().resolved();
		let mut state = self.0.state.lock();
		let written = self.0.write.apply(new);
		if written.is_failure() {
			drop(state);
			tracing::debug!(variable = %self.0.id, "variable.write.rejected");
			return written;
		}
		let old = std::mem::replace(&mut *state, written);
		drop(state);
		self.0.read.apply(old)
	}

	pub fn rename(&self, name: impl Into<Arc<str>>, visibility: Visibility) -> Self {
		let current = self.0.state.lock().clone();
		Self(Arc::new(VariableInner {
			id: self.0.id.rename(name, visibility),
			ty: self.0.ty.clone(),
			state: Mutex::new(current),
			read: self.0.read.clone(),
			write: self.0.write.clone(),
			metadata: self.0.metadata.clone(),
		}))
	}
}

impl PartialEq for Variable {
	/// Variables are equal only to themselves.
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for Variable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Variable").field("id", &self.0.id).finish_non_exhaustive()
	}
}
