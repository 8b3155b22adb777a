//! Failure vocabulary.
//!
//! Domain failures are [`Violation`]s and travel as data inside values and
//! outcomes. Usage defects are [`TypingError`]s and travel through `Result`.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::value::ValueClass;

/// Input position reported when an operation body faults instead of an input.
pub const BODY_FAULT: usize = 999;

/// The contract a [`Violation`] reports as broken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
	/// A symbol id is already taken, or its visibility forbids adding it.
	SymbolMustBeUnique,
	/// No symbol is registered under the requested id.
	SymbolMustBeRegistered,
	/// The id is absent or its visibility forbids removal.
	SymbolMustBeRemovable,
	/// A named constraint rejected a value.
	ConstraintViolated { constraint: Arc<str> },
	/// A value does not belong to the class a type is bound to.
	ValueMustBeInstanceOfClass { expected: ValueClass },
	/// An operation input failed its type check; [`BODY_FAULT`] marks the body.
	BadInput { position: usize },
	/// An operation produced output its output type rejects.
	OutputInvalid,
	/// An operation expecting one datum received many.
	ValueMustBeSingle,
	/// An operation was invoked in a way its signature does not allow.
	Usage,
	/// A tag's type-level constraint rejected a synthesized type.
	TagTypeConstraint { tag: Arc<str> },
	/// A kind rejected a type being built.
	KindRejected { kind: Arc<str> },
	/// No cast exists between two types.
	NoCast,
	/// An unknown term was used where a final term is required.
	TermMustNotBeUnknown,
	/// A blocking value did not resolve within its wait budget.
	Timeout,
	/// Deferred processing ended without producing a result.
	Abandoned,
}

impl fmt::Display for ViolationKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::SymbolMustBeUnique => f.write_str("symbol must be unique"),
			Self::SymbolMustBeRegistered => f.write_str("symbol must be registered"),
			Self::SymbolMustBeRemovable => f.write_str("symbol must be removable"),
			Self::ConstraintViolated { constraint } => write!(f, "constraint `{constraint}` violated"),
			Self::ValueMustBeInstanceOfClass { expected } => write!(f, "value must be instance of {expected}"),
			Self::BadInput { position } if *position == BODY_FAULT => f.write_str("operation body faulted"),
			Self::BadInput { position } => write!(f, "bad input at position {position}"),
			Self::OutputInvalid => f.write_str("output invalid"),
			Self::ValueMustBeSingle => f.write_str("value must be a single datum"),
			Self::Usage => f.write_str("operation misused"),
			Self::TagTypeConstraint { tag } => write!(f, "tag `{tag}` rejected the type"),
			Self::KindRejected { kind } => write!(f, "kind `{kind}` rejected the type"),
			Self::NoCast => f.write_str("no cast registered"),
			Self::TermMustNotBeUnknown => f.write_str("term must not be unknown"),
			Self::Timeout => f.write_str("blocking wait timed out"),
			Self::Abandoned => f.write_str("processing abandoned"),
		}
	}
}

/// Structured description of a failed contract.
///
/// `plaintiff` names whoever enforced the contract and `inspected` renders
/// the data that failed it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {plaintiff} rejected `{inspected}`")]
pub struct Violation {
	pub kind: ViolationKind,
	pub plaintiff: Arc<str>,
	pub inspected: Arc<str>,
	#[source]
	pub cause: Option<Box<Violation>>,
}

impl Violation {
	pub fn new(kind: ViolationKind, plaintiff: impl fmt::Display, inspected: impl fmt::Display) -> Self {
		Self {
			kind,
			plaintiff: plaintiff.to_string().into(),
			inspected: inspected.to_string().into(),
			cause: None,
		}
	}

	/// Attaches the violation that led to this one.
	pub fn caused_by(mut self, cause: Violation) -> Self {
		self.cause = Some(Box::new(cause));
		self
	}

	/// Walks the cause chain down to the innermost violation.
	pub fn root_cause(&self) -> &Violation {
		let mut current = self;
		while let Some(cause) = current.cause.as_deref() {
			current = cause;
		}
		current
	}

	/// Returns the failing input position for [`ViolationKind::BadInput`].
	pub fn bad_input_position(&self) -> Option<usize> {
		match self.kind {
			ViolationKind::BadInput { position } => Some(position),
			_ => None,
		}
	}
}

/// Defects in how the typing API is called.
#[derive(Debug, Error, PartialEq)]
pub enum TypingError {
	#[error("operation `{operation}` expects {expected} inputs, got {actual}")]
	Arity {
		operation: Arc<str>,
		expected: usize,
		actual: usize,
	},

	#[error("operation `{operation}` has arity {arity} and cannot be curried")]
	NotCurryable { operation: Arc<str>, arity: usize },
}

/// Result type for usage-checked typing operations.
pub type Result<T> = std::result::Result<T, TypingError>;

/// Errors that can occur while loading configuration or installing logging.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or shape.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// The log filter directive could not be parsed.
	#[error("invalid log filter: {0}")]
	Filter(#[from] tracing_subscriber::filter::ParseError),

	/// A global subscriber was already installed.
	#[error("failed to install tracing subscriber: {0}")]
	Subscriber(String),
}
