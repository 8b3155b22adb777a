//! Ordered, visibility-gated symbol registry.
//!
//! # Role
//!
//! A [`SymbolTable`] maps symbol kind to an insertion-ordered bucket of
//! `SymbolId -> Symbol`. It is the storage behind every namespace, type and
//! tag.
//!
//! # Invariants
//!
//! - Within one kind bucket ids are unique and iterate in insertion order.
//! - One table-wide lock covers reads and writes; no caller ever observes a
//!   half-applied mutation.
//! - Cross-table merges snapshot the source before taking the destination
//!   lock, so two tables copying from each other cannot deadlock.
//! - The running hash is maintained incrementally: the symbol at position
//!   `p` contributes `(p + 1) * symbol_hash` (wrapping). Removal subtracts
//!   the removed weight and re-weights the entries that shift down, so the
//!   hash depends only on the current contents and order.
//!
//! Equality is structural (same ids and symbols, bucket by bucket, in
//! order), not hash based. The running hash is exposed only as
//! [`SymbolTable::hash_code`].

#[cfg(test)]
mod tests;

use std::fmt;
use std::fmt::Write as _;

use indexmap::IndexMap;
use parking_lot::Mutex;
use rustc_hash::FxBuildHasher;

use crate::error::{Violation, ViolationKind};
use crate::symbol::{Access, Symbol, SymbolId, SymbolKind};

type Bucket = IndexMap<SymbolId, Symbol, FxBuildHasher>;

#[derive(Clone, Default)]
struct TableState {
	buckets: IndexMap<SymbolKind, Bucket, FxBuildHasher>,
	hash: u64,
}

impl TableState {
	fn weight(position: usize, symbol: &Symbol) -> u64 {
		(position as u64 + 1).wrapping_mul(symbol.symbol_hash())
	}

	fn get(&self, id: &SymbolId) -> Option<&Symbol> {
		self.buckets.get(&id.kind()).and_then(|bucket| bucket.get(id))
	}

	/// Inserts or replaces, keeping the slot position of an existing id.
	fn upsert(&mut self, id: SymbolId, symbol: Symbol) {
		let bucket = self.buckets.entry(id.kind()).or_default();
		match bucket.get_full(&id) {
			Some((position, _, previous)) => {
				self.hash = self.hash.wrapping_sub(Self::weight(position, previous));
				self.hash = self.hash.wrapping_add(Self::weight(position, &symbol));
			}
			None => {
				self.hash = self.hash.wrapping_add(Self::weight(bucket.len(), &symbol));
			}
		}
		bucket.insert(id, symbol);
	}

	fn take(&mut self, id: &SymbolId) -> Option<Symbol> {
		let bucket = self.buckets.get_mut(&id.kind())?;
		let (position, _, symbol) = bucket.shift_remove_full(id)?;
		let mut hash = self.hash.wrapping_sub(Self::weight(position, &symbol));
		for (offset, shifted) in bucket.values().skip(position).enumerate() {
			let now = position + offset;
			hash = hash.wrapping_sub(Self::weight(now + 1, shifted));
			hash = hash.wrapping_add(Self::weight(now, shifted));
		}
		self.hash = hash;
		if bucket.is_empty() {
			self.buckets.shift_remove(&id.kind());
		}
		Some(symbol)
	}

	fn filtered(&self, kind: SymbolKind, access: Access) -> impl Iterator<Item = (&SymbolId, &Symbol)> {
		self.buckets
			.get(&kind)
			.into_iter()
			.flat_map(|bucket| bucket.iter())
			.filter(move |(id, _)| id.visibility().allows(access))
	}

	fn all(&self, access: Access) -> impl Iterator<Item = (&SymbolId, &Symbol)> {
		self.buckets
			.values()
			.flat_map(|bucket| bucket.iter())
			.filter(move |(id, _)| id.visibility().allows(access))
	}

	fn same_entries(&self, other: &Self) -> bool {
		self.buckets.len() == other.buckets.len()
			&& self.buckets.iter().all(|(kind, bucket)| {
				other.buckets.get(kind).is_some_and(|theirs| {
					bucket.len() == theirs.len()
						&& bucket
							.iter()
							.zip(theirs.iter())
							.all(|((id_a, sym_a), (id_b, sym_b))| id_a == id_b && sym_a == sym_b)
				})
			})
	}
}

/// Concurrent two-level registry keyed by symbol kind and [`SymbolId`].
pub struct SymbolTable {
	state: Mutex<TableState>,
}

impl SymbolTable {
	pub fn new() -> Self {
		Self {
			state: Mutex::new(TableState::default()),
		}
	}

	/// Adds a symbol under its own id.
	///
	/// Fails if the id is already present in its bucket or if its visibility
	/// forbids adding it.
	pub fn add(&self, symbol: impl Into<Symbol>) -> Result<(), Violation> {
		let symbol = symbol.into();
		let id = symbol.id().clone();
		let mut state = self.state.lock();
		if !id.visibility().allows(Access::ADD) || state.get(&id).is_some() {
			drop(state);
			tracing::debug!(symbol = %id, "table.add.rejected");
			return Err(Violation::new(ViolationKind::SymbolMustBeUnique, "symbol table", format_args!("{id:?}")));
		}
		state.upsert(id, symbol);
		Ok(())
	}

	/// Unconditional upsert used for reserved slots such as `#parent`.
	///
	/// Ids whose visibility forbids adding are ignored.
	pub fn set(&self, id: SymbolId, symbol: impl Into<Symbol>) {
		if !id.visibility().allows(Access::ADD) {
			tracing::trace!(symbol = %id, "table.set.ignored");
			return;
		}
		self.state.lock().upsert(id, symbol.into());
	}

	/// Removes and returns the symbol registered under `id`.
	pub fn remove(&self, id: &SymbolId) -> Result<Symbol, Violation> {
		let removed = if id.visibility().allows(Access::REMOVE) {
			self.state.lock().take(id)
		} else {
			None
		};
		removed.ok_or_else(|| Violation::new(ViolationKind::SymbolMustBeRemovable, "symbol table", format_args!("{id:?}")))
	}

	/// Looks a symbol up by id. Absent and unqueryable ids yield a violation.
	pub fn symbol(&self, id: &SymbolId) -> Result<Symbol, Violation> {
		let found = if id.visibility().allows(Access::QUERY) {
			self.state.lock().get(id).cloned()
		} else {
			None
		};
		found.ok_or_else(|| Violation::new(ViolationKind::SymbolMustBeRegistered, "symbol table", format_args!("{id:?}")))
	}

	pub fn contains(&self, id: &SymbolId) -> bool {
		id.visibility().allows(Access::QUERY) && self.state.lock().get(id).is_some()
	}

	/// Enumerable symbols of one kind, in insertion order.
	pub fn symbols(&self, kind: SymbolKind) -> Vec<Symbol> {
		let state = self.state.lock();
		state.filtered(kind, Access::ENUMERATE).map(|(_, s)| s.clone()).collect()
	}

	/// Enumerable ids of one kind, in insertion order.
	pub fn symbol_ids(&self, kind: SymbolKind) -> Vec<SymbolId> {
		let state = self.state.lock();
		state.filtered(kind, Access::ENUMERATE).map(|(id, _)| id.clone()).collect()
	}

	/// Every directly addressable symbol of one kind, private ones included.
	pub fn members(&self, kind: SymbolKind) -> Vec<Symbol> {
		let state = self.state.lock();
		state.filtered(kind, Access::QUERY).map(|(_, s)| s.clone()).collect()
	}

	/// Enumerable entries across all kinds.
	pub fn entries(&self) -> Vec<(SymbolId, Symbol)> {
		let state = self.state.lock();
		state.all(Access::ENUMERATE).map(|(id, s)| (id.clone(), s.clone())).collect()
	}

	/// Copyable entries across all kinds, as one consistent snapshot.
	pub fn snapshot(&self) -> Vec<(SymbolId, Symbol)> {
		let state = self.state.lock();
		state.all(Access::COPY).map(|(id, s)| (id.clone(), s.clone())).collect()
	}

	/// A new table holding the copyable entries of this one.
	pub fn copy(&self) -> SymbolTable {
		let copy = SymbolTable::new();
		copy.add_all(self);
		copy
	}

	/// Merges the copyable entries of `other` that are not present here.
	///
	/// Returns how many entries were merged.
	pub fn add_all(&self, other: &SymbolTable) -> usize {
		let snapshot = other.snapshot();
		let mut state = self.state.lock();
		let mut merged = 0;
		for (id, symbol) in snapshot {
			if state.get(&id).is_none() {
				state.upsert(id, symbol);
				merged += 1;
			}
		}
		merged
	}

	/// Rewrites every entry in place, preserving order.
	///
	/// Entries mapped to `None` are dropped.
	pub(crate) fn rewrite(&self, mut f: impl FnMut(SymbolId, Symbol) -> Option<(SymbolId, Symbol)>) {
		let mut state = self.state.lock();
		let previous = std::mem::take(&mut *state);
		for (id, symbol) in previous.buckets.into_values().flatten() {
			if let Some((id, symbol)) = f(id, symbol) {
				state.upsert(id, symbol);
			}
		}
	}

	/// Empties the table and returns everything it held.
	pub fn clear(&self) -> Vec<(SymbolId, Symbol)> {
		let previous = std::mem::take(&mut *self.state.lock());
		previous.buckets.into_values().flatten().collect()
	}

	pub fn len(&self) -> usize {
		self.state.lock().buckets.values().map(Bucket::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// The incrementally maintained running hash.
	pub fn hash_code(&self) -> u64 {
		self.state.lock().hash
	}

	/// Renders printable entries, one per line: sigil, kind, id.
	pub fn print(&self) -> String {
		let state = self.state.lock();
		let mut out = String::new();
		for (id, _) in state.all(Access::PRINT) {
			let _ = writeln!(out, "{} {} {id}", id.visibility().sigil(), id.kind());
		}
		out
	}
}

impl Default for SymbolTable {
	fn default() -> Self {
		Self::new()
	}
}

impl PartialEq for SymbolTable {
	fn eq(&self, other: &Self) -> bool {
		if std::ptr::eq(self, other) {
			return true;
		}
		// One lock at a time.
		let ours = self.state.lock().clone();
		let theirs = other.state.lock().clone();
		ours.same_entries(&theirs)
	}
}

impl fmt::Debug for SymbolTable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.state.lock();
		f.debug_struct("SymbolTable")
			.field("len", &state.buckets.values().map(Bucket::len).sum::<usize>())
			.field("hash", &state.hash)
			.finish()
	}
}
