use pretty_assertions::assert_eq;

use super::Namespace;
use crate::error::ViolationKind;
use crate::symbol::{Symbol, SymbolId, SymbolKind};
use crate::types::Type;
use crate::value::{Datum, ValueClass};

#[test]
fn test_child_links_parent_and_root() {
	let root = Namespace::new_root("root");
	let shapes = root.child("shapes").expect("child");
	let polygons = shapes.child("polygons").expect("grandchild");

	assert!(root.is_root());
	assert!(!shapes.is_root());
	assert_eq!(polygons.parent(), Some(shapes.clone()));
	assert_eq!(polygons.root(), root);
	assert_eq!(root.symbol(shapes.id()), Ok(Symbol::Namespace(shapes.clone())));
}

/// The parent link is addressable but hidden from enumeration.
#[test]
fn test_parent_slot_is_private() {
	let root = Namespace::new_root("root");
	let child = root.child("child").expect("child");

	assert!(child.table().contains(&SymbolId::parent_slot()));
	assert!(child.table().symbols(SymbolKind::Namespace).is_empty());
	assert!(child.table().entries().is_empty());
}

#[test]
fn test_child_name_must_be_unique() {
	let root = Namespace::new_root("root");
	root.child("dup").expect("first");
	let err = root.child("dup").expect_err("second");
	assert_eq!(err.kind, ViolationKind::SymbolMustBeUnique);
}

/// Unknown classes resolve to a placeholder that rejects everything.
#[test]
fn test_type_of_unregistered_class_is_placeholder() {
	let root = Namespace::new_root("root");
	let placeholder = root.type_of(ValueClass::Float);

	assert_eq!(placeholder.name(), "type(float)");
	let err = placeholder.check_datum(&Datum::Float(1.5)).expect_err("placeholder");
	assert_eq!(err.kind, ViolationKind::SymbolMustBeRegistered);
}

/// Canonical types are indexed at the root and visible from any descendant.
#[test]
fn test_canonical_type_indexed_at_root() {
	let root = Namespace::new_root("root");
	let child = root.child("child").expect("child");
	let integer = Type::builder("integer", ValueClass::Int)
		.in_namespace(&child)
		.canonical()
		.build()
		.expect("integer");

	assert_eq!(root.type_of(ValueClass::Int), integer);
	assert_eq!(child.type_of(ValueClass::Int), integer);
	assert!(child.table().contains(integer.id()));
	assert!(!root.table().contains(integer.id()));
}

#[test]
fn test_register_type_is_idempotent_per_raw_name() {
	let root = Namespace::new_root("root");
	let integer = Type::builder("integer", ValueClass::Int)
		.in_namespace(&root)
		.canonical()
		.build()
		.expect("integer");

	assert_eq!(root.register_type(&integer), Ok(()));
}

/// A second canonical type for a bound class is rejected and unpublished.
#[test]
fn test_register_type_conflict() {
	let root = Namespace::new_root("root");
	Type::builder("integer", ValueClass::Int)
		.in_namespace(&root)
		.canonical()
		.build()
		.expect("integer");

	let err = Type::builder("whole", ValueClass::Int)
		.in_namespace(&root)
		.canonical()
		.build()
		.expect_err("class already bound");

	assert_eq!(err.kind, ViolationKind::SymbolMustBeUnique);
	assert_eq!(root.type_of(ValueClass::Int).raw_name(), "integer");
	assert!(!root.table().contains(&SymbolId::public(SymbolKind::Type, "whole")));
}

/// Dismantling empties descendants but leaves the parent alone.
#[test]
fn test_dismantle_spares_parent() {
	let root = Namespace::new_root("root");
	let child = root.child("child").expect("child");
	let leaf = child.child("leaf").expect("leaf");

	child.dismantle();

	assert!(child.table().is_empty());
	assert!(leaf.table().is_empty());
	assert!(root.table().contains(child.id()));
}
