//! Types, tags and kinds.
//!
//! # Role
//!
//! A [`Type`] is a namespace bound to a [`ValueClass`], a [`Kind`] and a
//! "none" sentinel. Its table holds the constraints every value must meet,
//! the `read`/`write` operations terms pass values through, and casts.
//! [`Tag`]s extend types through [`Type::sub`].
//!
//! # Invariants
//!
//! - A value is an instance when its class matches and every constraint in
//!   the table (private ones included) accepts it. Checking stops at the
//!   first rejection.
//! - Built types always carry `read` and `write` operations for their own
//!   signature; identity ones unless something else was registered.
//! - A type's display name is `raw[tag1,tag2]` once tags are applied.
//! - The none sentinel of a built type is itself an instance of the type.
//! - Ids are unique per namespace. Only a sub-type layered from equal tags
//!   resolves to the one already published under its id.

mod builder;
mod kind;
mod subtype;
mod tag;
#[cfg(test)]
mod tests;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub use builder::TypeBuilder;
pub use kind::{Kind, TypeCheck};
use smallvec::SmallVec;
pub use subtype::{SubTypePipeline, SubTypeStep, Workbench};
pub use tag::{Mutation, Tag, TagBuilder};

use crate::cast::{CastAttempt, Registration};
use crate::constraint::Constraint;
use crate::error::{Violation, ViolationKind};
use crate::meta::Metadata;
use crate::namespace::Namespace;
use crate::operation::{Operation, OperationType};
use crate::symbol::{Symbol, SymbolId, SymbolKind, Visibility};
use crate::table::SymbolTable;
use crate::term::{Constant, Term, Unknown, Variable};
use crate::value::{Datum, Value, ValueClass};

/// A class of values plus the rules and operations that come with it.
#[derive(Clone)]
pub struct Type(Arc<TypeInner>);

struct TypeInner {
	core: Namespace,
	raw_name: Arc<str>,
	tag_names: SmallVec<[Arc<str>; 2]>,
	class: ValueClass,
	none: Datum,
	kind: Kind,
	/// Set on placeholder types; every check fails with it.
	defect: Option<Violation>,
	pipeline: SubTypePipeline,
}

fn display_name(raw_name: &str, tag_names: &[Arc<str>]) -> String {
	if tag_names.is_empty() {
		return raw_name.to_owned();
	}
	let mut name = String::with_capacity(raw_name.len() + 2 + tag_names.iter().map(|t| t.len() + 1).sum::<usize>());
	name.push_str(raw_name);
	name.push('[');
	for (i, tag) in tag_names.iter().enumerate() {
		if i > 0 {
			name.push(',');
		}
		name.push_str(tag);
	}
	name.push(']');
	name
}

impl Type {
	pub fn builder(raw_name: impl Into<Arc<str>>, class: ValueClass) -> TypeBuilder {
		TypeBuilder::new(raw_name, class)
	}

	/// Placeholder answered for value classes nobody registered.
	pub(crate) fn unregistered(class: ValueClass) -> Self {
		let name: Arc<str> = format!("type({class})").into();
		let defect = Violation::new(ViolationKind::SymbolMustBeRegistered, "root namespace", class);
		Self(Arc::new(TypeInner {
			core: Namespace::with_table(
				SymbolId::public(SymbolKind::Type, name.clone()),
				SymbolTable::new(),
				None,
				Metadata::new(),
			),
			raw_name: name,
			tag_names: SmallVec::new(),
			class,
			none: class.default_datum(),
			kind: Kind::value_type(),
			defect: Some(defect),
			pipeline: SubTypePipeline::empty(),
		}))
	}

	pub fn id(&self) -> &SymbolId {
		self.0.core.id()
	}

	pub fn name(&self) -> &str {
		self.0.core.name()
	}

	pub fn raw_name(&self) -> &str {
		&self.0.raw_name
	}

	pub fn tag_names(&self) -> &[Arc<str>] {
		&self.0.tag_names
	}

	pub fn value_class(&self) -> ValueClass {
		self.0.class
	}

	/// The sentinel returned by "or none" accessors for this type.
	pub fn none(&self) -> &Datum {
		&self.0.none
	}

	pub fn kind(&self) -> &Kind {
		&self.0.kind
	}

	pub fn namespace(&self) -> &Namespace {
		&self.0.core
	}

	pub fn table(&self) -> &SymbolTable {
		self.0.core.table()
	}

	pub fn metadata(&self) -> &Metadata {
		self.0.core.metadata()
	}

	pub fn pipeline(&self) -> &SubTypePipeline {
		&self.0.pipeline
	}

	/// The violation every check fails with, for placeholder types.
	pub fn defect(&self) -> Option<&Violation> {
		self.0.defect.as_ref()
	}

	pub fn add(&self, symbol: impl Into<Symbol>) -> Result<(), Violation> {
		self.0.core.add(symbol)
	}

	/// Registers a cast from this type to `target` in this type's table.
	pub fn add_cast(
		&self,
		target: &Type,
		body: impl Fn(&Datum) -> Value + Send + Sync + 'static,
	) -> Result<(), Violation> {
		self.add(Operation::unary("cast", self, target, body))
	}

	pub fn type_of(&self, class: ValueClass) -> Type {
		self.0.core.type_of(class)
	}

	pub fn constraints(&self) -> Vec<Constraint> {
		self.table()
			.members(SymbolKind::Constraint)
			.into_iter()
			.filter_map(|symbol| match symbol {
				Symbol::Constraint(constraint) => Some(constraint),
				_ => None,
			})
			.collect()
	}

	/// Checks one datum against the class and every constraint.
	pub fn check_datum(&self, datum: &Datum) -> Result<(), Violation> {
		if let Some(defect) = &self.0.defect {
			return Err(defect.clone());
		}
		if !self.0.class.admits(datum) {
			return Err(Violation::new(
				ViolationKind::ValueMustBeInstanceOfClass {
					expected: self.0.class,
				},
				self,
				datum,
			));
		}
		for constraint in self.constraints() {
			constraint.check(datum)?;
		}
		Ok(())
	}

	/// Checks a value available now. Failures and pending values pass; use
	/// [`Type::checked`] to have pending values checked once they resolve.
	pub fn check(&self, value: &Value) -> Result<(), Violation> {
		match value {
			Value::One(datum) => self.check_datum(datum),
			Value::Many(items) => items.iter().try_for_each(|datum| self.check_datum(datum)),
			Value::No(_) | Value::Error(_) | Value::Blocking(_) => Ok(()),
		}
	}

	/// The value if it is an instance, else an error value. A pending value
	/// stays pending and is checked when it resolves.
	pub fn checked(&self, value: Value) -> Value {
		if let Value::Blocking(pending) = &value {
			let ty = self.clone();
			return Value::Blocking(pending.map(move |resolved| ty.checked(resolved)));
		}
		match self.check(&value) {
			Ok(()) => value,
			Err(violation) => self.error_value(violation),
		}
	}

	pub fn is_instance(&self, datum: &Datum) -> bool {
		self.check_datum(datum).is_ok()
	}

	pub fn error_value(&self, violation: Violation) -> Value {
		Value::Error(violation)
	}

	pub fn no_value(&self, violation: Violation) -> Value {
		Value::No(violation)
	}

	/// A constant of this type. Rejected data become an error value.
	pub fn instance(&self, datum: impl Into<Datum>) -> Term {
		self.instance_value(Value::One(datum.into()))
	}

	/// A constant over an arbitrary value; pending values give a blocking
	/// constant.
	pub fn instance_value(&self, value: Value) -> Term {
		let blocking = value.is_blocking();
		let constant = Constant::new(self, value);
		if blocking {
			Term::BlockingConstant(constant)
		} else {
			Term::Constant(constant)
		}
	}

	pub fn variable(&self, initial: impl Into<Datum>) -> Term {
		Term::Variable(Variable::new(self, Value::One(initial.into())))
	}

	pub fn unknown(&self) -> Term {
		Term::Unknown(Unknown::new(self))
	}

	fn own_operation(&self, name: &str) -> Operation {
		let id = SymbolId::operation(name, OperationType::unary(self, self), Visibility::Public);
		match self.table().symbol(&id) {
			Ok(Symbol::Operation(op)) => op,
			_ => Operation::identity(name, self, self),
		}
	}

	/// The operation values pass through when a term of this type is read.
	pub fn read_operation(&self) -> Operation {
		self.own_operation("read")
	}

	/// The operation values pass through when a variable of this type is set.
	pub fn write_operation(&self) -> Operation {
		self.own_operation("write")
	}

	/// Resolves the cast from this type to `that`.
	///
	/// Looks for a registered cast in this table, then in `that` table; falls
	/// back to identity when the value classes match, else to a cast that
	/// always fails.
	pub fn to(&self, that: &Type) -> Operation {
		let id = Self::cast_id(self, that);
		for table in [self.table(), that.table()] {
			if let Ok(Symbol::Operation(cast)) = table.symbol(&id) {
				return cast;
			}
		}
		if self.0.class == that.0.class {
			return Operation::identity("cast", self, that);
		}
		let violation = Violation::new(ViolationKind::NoCast, self, that);
		Operation::rejecting("cast", self, that, violation)
	}

	/// A diagnostic handle for casting `object` to `target`; the cast is
	/// looked up only when asked.
	pub fn cast_attempt(&self, object: Value, target: &Type) -> CastAttempt {
		let registration = Registration::Pending {
			id: Self::cast_id(self, target),
			namespace: self.namespace().clone(),
		};
		CastAttempt::new(self.clone(), object, target.clone(), registration)
	}

	pub(crate) fn cast_id(from: &Type, to: &Type) -> SymbolId {
		SymbolId::operation("cast", OperationType::unary(from, to), Visibility::Public)
	}

	pub fn rename(&self, name: impl Into<Arc<str>>, visibility: Visibility) -> Self {
		let name = name.into();
		Self(Arc::new(TypeInner {
			core: self.0.core.rename(name.clone(), visibility),
			raw_name: name,
			tag_names: SmallVec::new(),
			class: self.0.class,
			none: self.0.none.clone(),
			kind: self.0.kind.clone(),
			defect: self.0.defect.clone(),
			pipeline: self.0.pipeline.clone(),
		}))
	}

	/// Tags merged into this type, in application order.
	pub fn tags(&self) -> Vec<Tag> {
		self.table()
			.members(SymbolKind::Tag)
			.into_iter()
			.filter_map(|symbol| match symbol {
				Symbol::Tag(tag) => Some(tag),
				_ => None,
			})
			.collect()
	}

	/// Adds this type to its enclosing namespace.
	///
	/// With `reuse`, an id collision with a type layered from equal tags
	/// yields that type; any other collision is refused.
	pub(crate) fn publish(&self, canonical: bool, reuse: bool) -> Result<Type, Violation> {
		let Some(namespace) = self.0.core.parent() else {
			return Ok(self.clone());
		};
		if let Err(violation) = namespace.add(self.clone()) {
			let tags = self.tags();
			self.discard();
			return match namespace.symbol(self.id()) {
				Ok(Symbol::Type(existing)) if reuse && existing.tags() == tags => Ok(existing),
				_ => {
					tracing::debug!(ty = %self, %violation, "type.publish.rejected");
					Err(violation)
				}
			};
		}
		if canonical && let Err(violation) = namespace.register_type(self) {
			let _ = namespace.table().remove(self.id());
			self.discard();
			return Err(violation);
		}
		Ok(self.clone())
	}

	/// Empties the table of a type that will not be published.
	pub(crate) fn discard(&self) {
		drop(self.table().clear());
	}
}

impl PartialEq for Type {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0) || (self.id() == other.id() && self.0.class == other.0.class)
	}
}

impl Eq for Type {}

impl Hash for Type {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id().hash(state);
	}
}

impl fmt::Debug for Type {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Type")
			.field("id", self.id())
			.field("class", &self.0.class)
			.field("kind", &self.0.kind.name())
			.finish_non_exhaustive()
	}
}

impl fmt::Display for Type {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}
