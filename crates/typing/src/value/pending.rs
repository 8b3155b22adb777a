//! One-shot result cells for values that are not available yet.
//!
//! # Invariants
//!
//! - A cell is completed at most once; later completions are ignored.
//! - A [`ResultSink`] dropped without completing resolves its cell with an
//!   [`Abandoned`](crate::ViolationKind::Abandoned) violation, so waiters
//!   never hang on lost work.
//! - A wait budget of [`Duration::ZERO`] or [`Duration::MAX`] waits
//!   indefinitely.
//! - Guards added with [`Pending::map`] run on every read of the produced
//!   value, outside the cell lock. Timeouts are not passed through them.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use super::Value;
use crate::error::{Violation, ViolationKind};

struct Cell {
	slot: Mutex<Option<Value>>,
	ready: Condvar,
}

impl Cell {
	fn fill(&self, value: Value) -> bool {
		let mut slot = self.slot.lock();
		if slot.is_some() {
			return false;
		}
		*slot = Some(value);
		drop(slot);
		self.ready.notify_all();
		true
	}
}

type Guard = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Read side of a pending result.
#[derive(Clone)]
pub struct Pending {
	cell: Arc<Cell>,
	max_wait: Duration,
	guard: Option<Guard>,
}

/// Write side of a pending result, handed to whoever produces the value.
pub struct ResultSink {
	cell: Arc<Cell>,
}

impl Pending {
	/// Creates an empty cell with the given wait budget.
	pub fn new(max_wait: Duration) -> (Self, ResultSink) {
		let cell = Arc::new(Cell {
			slot: Mutex::new(None),
			ready: Condvar::new(),
		});
		(
			Self {
				cell: cell.clone(),
				max_wait,
				guard: None,
			},
			ResultSink { cell },
		)
	}

	/// A pending value that never expires on its own.
	pub fn unbounded() -> (Self, ResultSink) {
		Self::new(Duration::MAX)
	}

	pub fn max_wait(&self) -> Duration {
		self.max_wait
	}

	pub fn is_unbounded(&self) -> bool {
		self.max_wait.is_zero() || self.max_wait == Duration::MAX
	}

	pub fn is_ready(&self) -> bool {
		self.cell.slot.lock().is_some()
	}

	/// A view of the same cell whose result passes through `f` once produced.
	pub fn map(&self, f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
		let guard: Guard = match self.guard.clone() {
			Some(inner) => Arc::new(move |value: Value| f(inner(value))) as Guard,
			None => Arc::new(f) as Guard,
		};
		Self {
			cell: self.cell.clone(),
			max_wait: self.max_wait,
			guard: Some(guard),
		}
	}

	fn finish(&self, value: Value) -> Value {
		match &self.guard {
			Some(guard) => guard(value),
			None => value,
		}
	}

	/// Returns the result if it has already been produced.
	pub fn try_get(&self) -> Option<Value> {
		let produced = self.cell.slot.lock().clone();
		produced.map(|value| self.finish(value))
	}

	/// Blocks for the result within the wait budget.
	pub fn wait(&self) -> Value {
		self.wait_for(self.max_wait)
	}

	/// Blocks for the result within `budget`, overriding the cell's own.
	pub fn wait_for(&self, budget: Duration) -> Value {
		let mut slot = self.cell.slot.lock();
		if budget.is_zero() || budget == Duration::MAX {
			while slot.is_none() {
				self.cell.ready.wait(&mut slot);
			}
		} else if slot.is_none() {
			let _ = self.cell.ready.wait_while_for(&mut slot, |slot| slot.is_none(), budget);
		}
		let produced = slot.clone();
		drop(slot);
		match produced {
			Some(value) => self.finish(value),
			None => Value::No(Violation::new(ViolationKind::Timeout, "pending", format_args!("{budget:?}"))),
		}
	}
}

impl PartialEq for Pending {
	fn eq(&self, other: &Self) -> bool {
		let same_guard = match (&self.guard, &other.guard) {
			(None, None) => true,
			(Some(a), Some(b)) => Arc::ptr_eq(a, b),
			_ => false,
		};
		Arc::ptr_eq(&self.cell, &other.cell) && same_guard
	}
}

impl fmt::Debug for Pending {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Pending")
			.field("max_wait", &self.max_wait)
			.field("ready", &self.is_ready())
			.field("guarded", &self.guard.is_some())
			.finish()
	}
}

impl ResultSink {
	/// Publishes the result; returns false if the cell was already filled.
	pub fn complete(self, value: Value) -> bool {
		self.cell.fill(value)
	}
}

impl Drop for ResultSink {
	fn drop(&mut self) {
		let abandoned = Violation::new(ViolationKind::Abandoned, "result sink", "dropped before completion");
		if self.cell.fill(Value::No(abandoned)) {
			tracing::debug!("pending.abandoned");
		}
	}
}

impl fmt::Debug for ResultSink {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ResultSink").finish_non_exhaustive()
	}
}
