use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::{Result, TypingError, Violation, ViolationKind};
use crate::meta::Metadata;
use crate::operation::Operation;
use crate::processor::{self, Processor};
use crate::symbol::{SymbolId, SymbolKind, Visibility};
use crate::types::Type;
use crate::value::{Pending, Synchronicity, Value};

use super::Term;

/// Deferred application of an operation to input terms.
///
/// [`Expression::value`] never runs the operation itself: it hands the
/// expression and a result sink to its processor and returns the pending
/// side at once.
#[derive(Clone)]
pub struct Expression(Arc<ExpressionInner>);

struct ExpressionInner {
	id: SymbolId,
	operation: Operation,
	inputs: SmallVec<[Term; 2]>,
	processor: Arc<dyn Processor>,
	metadata: Metadata,
}

impl Expression {
	pub fn new(
		operation: Operation,
		inputs: impl IntoIterator<Item = Term>,
		processor: Arc<dyn Processor>,
	) -> Result<Self> {
		let inputs: SmallVec<[Term; 2]> = inputs.into_iter().collect();
		if inputs.len() != operation.arity() {
			return Err(TypingError::Arity {
				operation: operation.id().name_arc(),
				expected: operation.arity(),
				actual: inputs.len(),
			});
		}

		let mut name = format!("{} ( ", operation.name());
		for (i, input) in inputs.iter().enumerate() {
			if i > 0 {
				name.push_str(", ");
			}
			let _ = write!(name, "{}", input.id().name());
		}
		let _ = write!(name, " ) : {}", operation.output_type());

		Ok(Self(Arc::new(ExpressionInner {
			id: SymbolId::public(SymbolKind::Term, name),
			metadata: operation.metadata().renew(),
			operation,
			inputs,
			processor,
		})))
	}

	pub fn id(&self) -> &SymbolId {
		&self.0.id
	}

	pub fn ty(&self) -> &Type {
		self.0.operation.output_type()
	}

	pub fn operation(&self) -> &Operation {
		&self.0.operation
	}

	pub fn inputs(&self) -> &[Term] {
		&self.0.inputs
	}

	pub fn metadata(&self) -> &Metadata {
		&self.0.metadata
	}

	pub fn processor(&self) -> &Arc<dyn Processor> {
		&self.0.processor
	}

	/// Hands the expression to its processor; the result arrives later.
	pub fn value(&self) -> Synchronicity {
		let (pending, sink) = Pending::unbounded();
		processor::dispatch(&self.0.processor, self.clone(), sink);
		Synchronicity::Asynchronous(pending)
	}

	/// Resolves every input and evaluates the operation on this thread.
	///
	/// Processors call this once they decide to run the expression.
	pub fn evaluate_now(&self) -> Value {
		let inputs: SmallVec<[Value; 4]> = self.0.inputs.iter().map(|term| term.value().wait()).collect();
		self.0.operation.evaluate(&inputs).unwrap_or_else(|err| {
			Value::Error(Violation::new(ViolationKind::Usage, &self.0.id, err))
		})
	}

	pub fn rename(&self, name: impl Into<Arc<str>>, visibility: Visibility) -> Self {
		Self(Arc::new(ExpressionInner {
			id: self.0.id.rename(name, visibility),
			operation: self.0.operation.clone(),
			inputs: self.0.inputs.clone(),
			processor: self.0.processor.clone(),
			metadata: self.0.metadata.clone(),
		}))
	}
}

impl PartialEq for Expression {
	fn eq(&self, other: &Self) -> bool {
		self.0.operation == other.0.operation && self.0.inputs == other.0.inputs
	}
}

impl fmt::Debug for Expression {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Expression")
			.field("id", &self.0.id)
			.field("processor", &self.0.processor)
			.finish_non_exhaustive()
	}
}
