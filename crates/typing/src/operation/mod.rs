//! Typed, constraint-checked transforms.
//!
//! # Role
//!
//! An [`Operation`] is a symbol with an [`OperationType`] and a body. One
//! generic type covers every arity; the signature's input vector carries it.
//!
//! # Invariants
//!
//! - [`Operation::evaluate`] never panics and never returns a domain failure
//!   as `Err`. Domain failures come back as [`Value::No`] or
//!   [`Value::Error`]; `Err` is reserved for arity misuse.
//! - Inputs are checked in order and the first rejection short-circuits with
//!   its 0-based position. A body panic reports position [`BODY_FAULT`].
//! - Failure inputs are passed through unchecked; they failed where they
//!   were produced. Pending inputs reach the body guarded: once resolved,
//!   a rejected one reads as the same bad-input failure.
//! - An output rejected by the output type becomes [`Value::Error`], also
//!   when it is only produced later.

mod signature;

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

pub use signature::OperationType;
use smallvec::SmallVec;

use crate::error::{BODY_FAULT, Result, TypingError, Violation, ViolationKind};
use crate::meta::Metadata;
use crate::symbol::{SymbolId, Visibility};
use crate::types::Type;
use crate::value::{Datum, Outcome, Value};

type NativeBody = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

#[derive(Clone)]
enum Body {
	Native(NativeBody),
	Identity,
	Rejecting(Violation),
	Curried { parent: Operation, bound: Value },
}

impl PartialEq for Body {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Native(a), Self::Native(b)) => Arc::ptr_eq(a, b),
			(Self::Identity, Self::Identity) => true,
			(Self::Rejecting(a), Self::Rejecting(b)) => a == b,
			(
				Self::Curried { parent: pa, bound: ba },
				Self::Curried { parent: pb, bound: bb },
			) => pa == pb && ba == bb,
			_ => false,
		}
	}
}

/// A typed transform registered as a symbol.
#[derive(Clone)]
pub struct Operation(Arc<OperationInner>);

struct OperationInner {
	id: SymbolId,
	signature: OperationType,
	body: Body,
	metadata: Metadata,
}

impl Operation {
	fn from_body(name: impl Into<Arc<str>>, signature: OperationType, body: Body) -> Self {
		Self(Arc::new(OperationInner {
			id: SymbolId::operation(name, signature.clone(), Visibility::Public),
			signature,
			body,
			metadata: Metadata::new(),
		}))
	}

	/// An operation over raw values. The body sees failure and pending
	/// inputs as they are; prefer the lifting constructors unless it needs to.
	pub fn new(
		name: impl Into<Arc<str>>,
		signature: OperationType,
		body: impl Fn(&[Value]) -> Value + Send + Sync + 'static,
	) -> Self {
		Self::from_body(name, signature, Body::Native(Arc::new(body)))
	}

	/// An operation over single data. A failed input is returned as the
	/// result and pending inputs are waited on before the body runs.
	pub fn lifted(
		name: impl Into<Arc<str>>,
		signature: OperationType,
		body: impl Fn(&[Datum]) -> Value + Send + Sync + 'static,
	) -> Self {
		Self::new(name, signature, move |inputs| {
			let mut data: SmallVec<[Datum; 4]> = SmallVec::with_capacity(inputs.len());
			for input in inputs {
				match single(input) {
					Ok(datum) => data.push(datum),
					Err(failed) => return failed,
				}
			}
			body(&data)
		})
	}

	pub fn unary(
		name: impl Into<Arc<str>>,
		input: &Type,
		output: &Type,
		body: impl Fn(&Datum) -> Value + Send + Sync + 'static,
	) -> Self {
		Self::lifted(name, OperationType::unary(input, output), move |data| body(&data[0]))
	}

	pub fn binary(
		name: impl Into<Arc<str>>,
		first: &Type,
		second: &Type,
		output: &Type,
		body: impl Fn(&Datum, &Datum) -> Value + Send + Sync + 'static,
	) -> Self {
		Self::lifted(name, OperationType::binary(first, second, output), move |data| {
			body(&data[0], &data[1])
		})
	}

	/// A unary operation returning its input unchanged.
	pub fn identity(name: impl Into<Arc<str>>, input: &Type, output: &Type) -> Self {
		Self::from_body(name, OperationType::unary(input, output), Body::Identity)
	}

	/// A unary operation that always fails with `violation`.
	pub fn rejecting(name: impl Into<Arc<str>>, input: &Type, output: &Type, violation: Violation) -> Self {
		Self::from_body(name, OperationType::unary(input, output), Body::Rejecting(violation))
	}

	pub fn with_visibility(self, visibility: Visibility) -> Self {
		let name = self.0.id.name_arc();
		self.rename(name, visibility)
	}

	pub fn with_metadata(self, metadata: Metadata) -> Self {
		Self(Arc::new(OperationInner {
			id: self.0.id.clone(),
			signature: self.0.signature.clone(),
			body: self.0.body.clone(),
			metadata,
		}))
	}

	pub fn id(&self) -> &SymbolId {
		&self.0.id
	}

	pub fn name(&self) -> &str {
		self.0.id.name()
	}

	pub fn signature(&self) -> &OperationType {
		&self.0.signature
	}

	pub fn arity(&self) -> usize {
		self.0.signature.arity()
	}

	pub fn output_type(&self) -> &Type {
		self.0.signature.output()
	}

	pub fn metadata(&self) -> &Metadata {
		&self.0.metadata
	}

	/// Evaluates the operation against exactly [`arity`](Self::arity) inputs.
	pub fn evaluate(&self, inputs: &[Value]) -> Result<Value> {
		let signature = &self.0.signature;
		if inputs.len() != signature.arity() {
			return Err(TypingError::Arity {
				operation: self.0.id.name_arc(),
				expected: signature.arity(),
				actual: inputs.len(),
			});
		}

		let mut checked: SmallVec<[Value; 4]> = SmallVec::with_capacity(inputs.len());
		for (position, (input, ty)) in inputs.iter().zip(signature.inputs()).enumerate() {
			if let Value::Blocking(pending) = input {
				let (id, ty) = (self.0.id.clone(), ty.clone());
				checked.push(Value::Blocking(pending.map(move |resolved| guard_input(&id, &ty, position, resolved))));
				continue;
			}
			if let Err(violation) = ty.check(input) {
				tracing::trace!(operation = %self.0.id, position, "operation.bad_input");
				return Ok(Value::No(
					Violation::new(ViolationKind::BadInput { position }, &self.0.id, input).caused_by(violation),
				));
			}
			checked.push(input.clone());
		}
		let inputs = &checked[..];

		let output = match &self.0.body {
			Body::Identity => inputs[0].clone(),
			Body::Rejecting(violation) => Value::No(violation.clone()),
			Body::Curried { parent, bound } => {
				let mut full: SmallVec<[Value; 4]> = SmallVec::with_capacity(inputs.len() + 1);
				full.push(bound.clone());
				full.extend(inputs.iter().cloned());
				parent.evaluate(&full)?
			}
			Body::Native(body) => match catch_unwind(AssertUnwindSafe(|| body(inputs))) {
				Ok(output) => output,
				Err(panic) => {
					let message = panic_message(panic.as_ref());
					tracing::warn!(operation = %self.0.id, %message, "operation.body_fault");
					return Ok(Value::No(Violation::new(
						ViolationKind::BadInput { position: BODY_FAULT },
						&self.0.id,
						message,
					)));
				}
			},
		};

		Ok(guard_output(&self.0.id, signature.output(), output))
	}

	/// Evaluates a unary operation, folding misuse into an error value.
	pub fn apply(&self, input: Value) -> Value {
		self.evaluate(std::slice::from_ref(&input))
			.unwrap_or_else(|err| Value::Error(Violation::new(ViolationKind::Usage, &self.0.id, err)))
	}

	/// Binds the first input, producing an operation of arity `n - 1`.
	///
	/// The bound input is checked right away. A rejected input still yields
	/// the curried operation, as the fallback of an absent outcome.
	pub fn curry(&self, first: Value) -> Result<Outcome<Operation>> {
		let signature = &self.0.signature;
		if signature.arity() < 2 {
			return Err(TypingError::NotCurryable {
				operation: self.0.id.name_arc(),
				arity: signature.arity(),
			});
		}

		let check = signature.inputs()[0].check(&first);
		let name = format!("{} ( {} )", self.0.id.name(), first);
		let curried = Self(Arc::new(OperationInner {
			id: SymbolId::operation(name, signature.curried(), self.0.id.visibility()),
			signature: signature.curried(),
			body: Body::Curried {
				parent: self.clone(),
				bound: first.clone(),
			},
			metadata: self.0.metadata.renew(),
		}));

		Ok(match check {
			Ok(()) => Outcome::One(curried),
			Err(violation) => Outcome::No {
				violation: Violation::new(ViolationKind::BadInput { position: 0 }, &self.0.id, &first)
					.caused_by(violation),
				fallback: curried,
			},
		})
	}

	/// The same operation with `from` replaced by `to` in its signature.
	pub fn retype(&self, from: &Type, to: &Type) -> Self {
		let signature = self.0.signature.substitute(from, to);
		Self(Arc::new(OperationInner {
			id: self.0.id.with_signature(signature.clone()),
			signature,
			body: self.0.body.clone(),
			metadata: self.0.metadata.clone(),
		}))
	}

	pub fn rename(&self, name: impl Into<Arc<str>>, visibility: Visibility) -> Self {
		Self(Arc::new(OperationInner {
			id: self.0.id.rename(name, visibility),
			signature: self.0.signature.clone(),
			body: self.0.body.clone(),
			metadata: self.0.metadata.clone(),
		}))
	}
}

/// Checks a resolved input; rejection reads as a bad input at `position`.
fn guard_input(id: &SymbolId, ty: &Type, position: usize, input: Value) -> Value {
	if let Value::Blocking(pending) = &input {
		let (id, ty) = (id.clone(), ty.clone());
		return Value::Blocking(pending.map(move |resolved| guard_input(&id, &ty, position, resolved)));
	}
	match ty.check(&input) {
		Ok(()) => input,
		Err(violation) => {
			tracing::trace!(operation = %id, position, "operation.bad_input");
			Value::No(Violation::new(ViolationKind::BadInput { position }, id, &input).caused_by(violation))
		}
	}
}

/// Checks an output, now or once it resolves.
fn guard_output(id: &SymbolId, ty: &Type, output: Value) -> Value {
	if let Value::Blocking(pending) = &output {
		let (id, ty) = (id.clone(), ty.clone());
		return Value::Blocking(pending.map(move |resolved| guard_output(&id, &ty, resolved)));
	}
	match ty.check(&output) {
		Ok(()) => output,
		Err(violation) => Value::Error(Violation::new(ViolationKind::OutputInvalid, id, &output).caused_by(violation)),
	}
}

/// Reduces an input to one datum, or to the value to return in its place.
fn single(input: &Value) -> std::result::Result<Datum, Value> {
	match input {
		Value::One(datum) => Ok(datum.clone()),
		Value::Blocking(pending) => single(&pending.wait()),
		Value::Many(_) => Err(Value::Error(Violation::new(ViolationKind::ValueMustBeSingle, "operation", input))),
		Value::No(_) | Value::Error(_) => Err(input.clone()),
	}
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
	if let Some(message) = panic.downcast_ref::<&str>() {
		(*message).to_owned()
	} else if let Some(message) = panic.downcast_ref::<String>() {
		message.clone()
	} else {
		"opaque panic payload".to_owned()
	}
}

impl PartialEq for Operation {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0) || (self.0.id == other.0.id && self.0.body == other.0.body)
	}
}

impl fmt::Debug for Operation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Operation").field("id", &self.0.id).finish_non_exhaustive()
	}
}

impl fmt::Display for Operation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.0.id.name())
	}
}
