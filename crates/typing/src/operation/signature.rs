use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::symbol::SymbolId;
use crate::types::Type;

/// Signature of an operation: ordered input types, one output type and
/// optional hint symbols.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct OperationType {
	inputs: SmallVec<[Type; 2]>,
	output: Type,
	hints: Arc<[SymbolId]>,
}

impl OperationType {
	pub fn new(inputs: impl IntoIterator<Item = Type>, output: Type) -> Self {
		Self {
			inputs: inputs.into_iter().collect(),
			output,
			hints: Arc::from(Vec::new()),
		}
	}

	pub fn unary(input: &Type, output: &Type) -> Self {
		Self::new([input.clone()], output.clone())
	}

	pub fn binary(first: &Type, second: &Type, output: &Type) -> Self {
		Self::new([first.clone(), second.clone()], output.clone())
	}

	pub fn with_hints(mut self, hints: impl IntoIterator<Item = SymbolId>) -> Self {
		self.hints = hints.into_iter().collect();
		self
	}

	pub fn inputs(&self) -> &[Type] {
		&self.inputs
	}

	pub fn output(&self) -> &Type {
		&self.output
	}

	pub fn hints(&self) -> &[SymbolId] {
		&self.hints
	}

	pub fn arity(&self) -> usize {
		self.inputs.len()
	}

	pub fn mentions(&self, ty: &Type) -> bool {
		self.output == *ty || self.inputs.iter().any(|input| input == ty)
	}

	/// The same signature with every occurrence of `from` replaced by `to`.
	pub fn substitute(&self, from: &Type, to: &Type) -> Self {
		let swap = |ty: &Type| if ty == from { to.clone() } else { ty.clone() };
		Self {
			inputs: self.inputs.iter().map(swap).collect(),
			output: swap(&self.output),
			hints: self.hints.clone(),
		}
	}

	/// The signature left after binding the first input.
	pub(crate) fn curried(&self) -> Self {
		Self {
			inputs: self.inputs.iter().skip(1).cloned().collect(),
			output: self.output.clone(),
			hints: self.hints.clone(),
		}
	}
}

impl fmt::Display for OperationType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("(")?;
		for (i, input) in self.inputs.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{input}")?;
		}
		write!(f, ") -> {}", self.output)
	}
}

impl fmt::Debug for OperationType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(self, f)
	}
}
