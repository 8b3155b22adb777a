use std::sync::Arc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::SymbolTable;
use crate::constraint::Constraint;
use crate::error::ViolationKind;
use crate::symbol::{Symbol, SymbolId, SymbolKind, Visibility};

fn public(name: &str) -> Constraint {
	Constraint::new(name, |_| true)
}

fn private(name: &str) -> Constraint {
	Constraint::new(name, |_| true).with_visibility(Visibility::Private)
}

/// A second symbol with an equal id is rejected and the first one stays.
#[test]
fn test_add_rejects_duplicate_id() {
	let table = SymbolTable::new();
	let first = public("positive");
	let second = Constraint::new("positive", |_| false);

	table.add(first.clone()).expect("first add");
	let err = table.add(second).expect_err("duplicate add must fail");

	assert_eq!(err.kind, ViolationKind::SymbolMustBeUnique);
	assert_eq!(table.len(), 1);
	assert_eq!(table.symbol(first.id()), Ok(Symbol::Constraint(first)));
}

#[test]
fn test_invisible_ids_are_never_added_or_found() {
	let table = SymbolTable::new();
	let hidden = Constraint::new("hidden", |_| true).with_visibility(Visibility::Invisible);
	assert!(table.add(hidden.clone()).is_err());

	table.set(hidden.id().clone(), hidden.clone());
	assert!(table.is_empty());
	assert!(!table.contains(hidden.id()));
	assert!(!table.contains(&SymbolId::none()));
}

/// Private entries are addressable by id but absent from bulk views.
#[test]
fn test_private_entries_hidden_from_bulk_views() {
	let table = SymbolTable::new();
	table.add(public("a")).expect("add a");
	table.add(private("b")).expect("add b");
	table.add(public("c")).expect("add c");

	let names: Vec<_> = table
		.symbol_ids(SymbolKind::Constraint)
		.iter()
		.map(|id| id.name().to_owned())
		.collect();
	assert_eq!(names, vec!["a", "c"]);
	assert!(table.contains(private("b").id()));
	assert_eq!(table.members(SymbolKind::Constraint).len(), 3);
	assert_eq!(table.symbols(SymbolKind::Constraint).len(), 2);
}

#[test]
fn test_lookup_of_absent_id_carries_violation() {
	let table = SymbolTable::new();
	let err = table.symbol(&SymbolId::public(SymbolKind::Type, "missing")).expect_err("absent");
	assert_eq!(err.kind, ViolationKind::SymbolMustBeRegistered);
}

#[test]
fn test_set_upserts_reserved_slot() {
	let table = SymbolTable::new();
	let slot = SymbolId::private(SymbolKind::Constraint, "input1");
	table.set(slot.clone(), public("first"));
	table.set(slot.clone(), public("second"));
	assert_eq!(table.len(), 1);
	let stored = table.symbol(&slot).expect("slot");
	assert_eq!(stored.name(), "second");
}

#[test]
fn test_remove_preserves_order_and_restores_hash() {
	let table = SymbolTable::new();
	let empty_hash = table.hash_code();
	table.add(public("a")).expect("add a");
	let after_a = table.hash_code();
	table.add(public("b")).expect("add b");
	table.add(public("c")).expect("add c");

	table.remove(public("c").id()).expect("remove c");
	table.remove(public("b").id()).expect("remove b");
	assert_eq!(table.hash_code(), after_a);
	table.remove(public("a").id()).expect("remove a");
	assert_eq!(table.hash_code(), empty_hash);

	assert_eq!(
		table.remove(public("a").id()).expect_err("gone").kind,
		ViolationKind::SymbolMustBeRemovable
	);
}

/// Removing from the front re-weights the shifted entries.
#[test]
fn test_hash_tracks_contents_after_front_removal() {
	let table = SymbolTable::new();
	let empty_hash = table.hash_code();
	for name in ["a", "b", "c"] {
		table.add(public(name)).expect("add");
	}
	table.remove(public("a").id()).expect("remove a");

	let fresh = SymbolTable::new();
	fresh.add(public("b")).expect("add b");
	fresh.add(public("c")).expect("add c");
	assert_eq!(table.hash_code(), fresh.hash_code());

	table.remove(public("b").id()).expect("remove b");
	table.remove(public("c").id()).expect("remove c");
	assert_eq!(table.hash_code(), empty_hash);
}

/// Copies carry copyable entries (private included) but never invisible ones.
#[test]
fn test_copy_and_add_all() {
	let source = SymbolTable::new();
	source.add(public("a")).expect("add a");
	source.add(private("b")).expect("add b");

	let copy = source.copy();
	assert_eq!(copy, source);
	assert_eq!(copy.len(), 2);

	let target = SymbolTable::new();
	target.add(public("a")).expect("add a");
	assert_eq!(target.add_all(&source), 1);
	assert_eq!(target.len(), 2);
}

/// Two tables merging from each other concurrently must both finish.
#[test]
fn test_concurrent_cross_merge_does_not_deadlock() {
	let left = Arc::new(SymbolTable::new());
	let right = Arc::new(SymbolTable::new());
	for i in 0..32 {
		left.add(public(&format!("l{i}"))).expect("left");
		right.add(public(&format!("r{i}"))).expect("right");
	}

	let handles: Vec<_> = (0..4)
		.map(|i| {
			let (a, b) = if i % 2 == 0 {
				(left.clone(), right.clone())
			} else {
				(right.clone(), left.clone())
			};
			std::thread::spawn(move || {
				for _ in 0..50 {
					a.add_all(&b);
				}
			})
		})
		.collect();
	for handle in handles {
		handle.join().expect("merge thread");
	}

	assert_eq!(left.len(), 64);
	assert_eq!(right.len(), 64);
}

#[test]
fn test_print_lists_printable_entries() {
	let table = SymbolTable::new();
	table.add(public("a")).expect("add a");
	table.add(private("b")).expect("add b");
	assert_eq!(table.print(), "+ constraint a\n# constraint #b\n");
}

/// Equality is structural, so insertion order matters.
#[test]
fn test_equality_is_structural() {
	let a = public("a");
	let b = public("b");
	let left = SymbolTable::new();
	left.add(a.clone()).expect("add");
	left.add(b.clone()).expect("add");
	let right = SymbolTable::new();
	right.add(b).expect("add");
	right.add(a).expect("add");
	assert!(left != right);
}

proptest! {
	/// Bulk enumeration returns public ids in exactly their insertion order.
	#[test]
	fn prop_symbol_ids_preserve_insertion_order(entries in proptest::collection::vec((0u16..400, any::<bool>()), 0..40)) {
		let table = SymbolTable::new();
		let mut expected = Vec::new();
		for (n, is_private) in entries {
			let name = format!("c{n}");
			let constraint = if is_private { private(&name) } else { public(&name) };
			let id = constraint.id().clone();
			let fresh = !table.contains(&id) && table.add(constraint).is_ok();
			if fresh && !is_private {
				expected.push(id);
			}
		}
		prop_assert_eq!(table.symbol_ids(SymbolKind::Constraint), expected);
	}
}
