//! Runtime typing environment.
//!
//! Host applications describe their domain values with [`Type`]s whose
//! validity rules ([`Constraint`]s) and transforms ([`Operation`]s) are
//! enforced at runtime. Types are extended by layering [`Tag`]s onto them
//! ([`Type::sub`]), and values are held by [`Term`]s that may be available
//! now, pending, mutable, or deferred to a [`Processor`].
//!
//! # Modules
//!
//! - [`symbol`] - symbol ids, visibility and the [`Symbol`] sum type
//! - [`table`] - the ordered, visibility-gated [`SymbolTable`]
//! - [`namespace`] - [`Namespace`]s and the root value-class index
//! - [`types`] - [`Type`], [`Tag`], [`Kind`] and sub-typing
//! - [`operation`] - [`Operation`] evaluation and currying
//! - [`term`] - constants, variables, expressions
//! - [`cast`] - cast registration states and attempts
//! - [`processor`] - schedulers for deferred expressions
//! - [`value`] - the [`Value`] algebra
//!
//! Domain failures never panic or return `Err`: they are [`Violation`]s
//! carried inside values and outcomes. `Err` is reserved for misuse of the
//! API itself ([`TypingError`]).

pub mod cast;
pub mod config;
pub mod constraint;
pub mod env;
pub mod error;
pub mod logging;
pub mod meta;
pub mod namespace;
pub mod operation;
pub mod processor;
pub mod symbol;
pub mod table;
pub mod term;
pub mod types;
pub mod value;

pub use cast::{CastAttempt, Registration};
pub use config::Config;
pub use constraint::Constraint;
pub use env::{Builtins, TypingEnvironment};
pub use error::{BODY_FAULT, ConfigError, TypingError, Violation, ViolationKind};
pub use meta::Metadata;
pub use namespace::Namespace;
pub use operation::{Operation, OperationType};
pub use processor::{DelegatingProcessor, InlineProcessor, Processor, ThreadProcessor, WorkerProcessor};
pub use symbol::{Access, Symbol, SymbolId, SymbolKind, Visibility};
pub use table::SymbolTable;
pub use term::{Constant, Expression, Term, Unknown, Variable};
pub use types::{Kind, SubTypePipeline, SubTypeStep, Tag, TagBuilder, Type, TypeBuilder, Workbench};
pub use value::{Datum, FromDatum, Outcome, Pending, ResultSink, Synchronicity, Value, ValueClass};
