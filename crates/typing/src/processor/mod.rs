//! Schedulers for deferred expressions.
//!
//! # Role
//!
//! The typing core never decides where an [`Expression`] runs. It hands the
//! expression and a [`ResultSink`] to a [`Processor`], which may delegate to
//! another one first. Implementations here evaluate inline, on a dedicated
//! thread, or on the kindred-worker blocking pool, and
//! [`DelegatingProcessor`] picks between them with a pluggable policy.
//!
//! # Invariants
//!
//! - Delegation is resolved once per dispatch; the chosen processor runs.
//! - A processor that cannot schedule the work drops the sink, which
//!   resolves the pending value as abandoned.
//! - Once dispatched, an expression cannot be cancelled.

#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::Arc;

use kindred_worker::TaskClass;

use crate::config::{ProcessorConfig, ProcessorMode};
use crate::term::{Expression, Term};
use crate::value::ResultSink;

/// Runs expressions handed over by [`Expression::value`].
pub trait Processor: Send + Sync + fmt::Debug {
	/// Picks another processor for `expression`; `None` keeps it here.
	fn delegate(&self, expression: &Expression) -> Option<Arc<dyn Processor>> {
		let _ = expression;
		None
	}

	/// Evaluates `expression` at some point and completes `sink`.
	fn process(&self, expression: Expression, sink: ResultSink);
}

/// Sends `expression` to whichever processor `top` delegates it to.
pub fn dispatch(top: &Arc<dyn Processor>, expression: Expression, sink: ResultSink) {
	let target = top.delegate(&expression).unwrap_or_else(|| top.clone());
	tracing::debug!(expression = %expression.id(), processor = ?target, "processor.dispatch");
	target.process(expression, sink);
}

/// Builds the processor a configuration asks for.
pub fn from_config(config: &ProcessorConfig) -> Arc<dyn Processor> {
	let class = config.class.into();
	match config.mode {
		ProcessorMode::Inline => Arc::new(InlineProcessor),
		ProcessorMode::Thread => Arc::new(ThreadProcessor::new(class)),
		ProcessorMode::Worker => Arc::new(WorkerProcessor::new(class)),
		ProcessorMode::Delegating => Arc::new(DelegatingProcessor::nested_to(class)),
	}
}

/// Evaluates on the calling thread before returning.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineProcessor;

impl Processor for InlineProcessor {
	fn process(&self, expression: Expression, sink: ResultSink) {
		sink.complete(expression.evaluate_now());
	}
}

/// Evaluates each expression on its own named thread.
#[derive(Debug, Clone, Copy)]
pub struct ThreadProcessor {
	class: TaskClass,
}

impl ThreadProcessor {
	pub fn new(class: TaskClass) -> Self {
		Self { class }
	}
}

impl Processor for ThreadProcessor {
	fn process(&self, expression: Expression, sink: ResultSink) {
		let name = format!("kindred-{}", self.class);
		let spawned = kindred_worker::spawn_named_thread(self.class, name, move || {
			sink.complete(expression.evaluate_now());
		});
		if let Err(error) = spawned {
			tracing::warn!(worker_class = self.class.as_str(), %error, "processor.thread.spawn_failed");
		}
	}
}

/// Evaluates on the kindred-worker blocking pool.
#[derive(Debug, Clone, Copy)]
pub struct WorkerProcessor {
	class: TaskClass,
}

impl WorkerProcessor {
	pub fn new(class: TaskClass) -> Self {
		Self { class }
	}

	pub fn class(&self) -> TaskClass {
		self.class
	}
}

impl Processor for WorkerProcessor {
	fn process(&self, expression: Expression, sink: ResultSink) {
		let spawned = kindred_worker::spawn_blocking(self.class, move || {
			sink.complete(expression.evaluate_now());
		});
		if let Err(error) = spawned {
			tracing::warn!(worker_class = self.class.as_str(), %error, "processor.worker.spawn_failed");
		}
	}
}

type Policy = Arc<dyn Fn(&Expression) -> Option<TaskClass> + Send + Sync>;

/// Routes each expression by a policy: `None` evaluates inline, a class
/// sends it to a [`WorkerProcessor`] of that class.
#[derive(Clone)]
pub struct DelegatingProcessor {
	policy: Policy,
}

impl DelegatingProcessor {
	pub fn new(policy: impl Fn(&Expression) -> Option<TaskClass> + Send + Sync + 'static) -> Self {
		Self {
			policy: Arc::new(policy),
		}
	}

	/// Expressions over other expressions go to the pool as `class`;
	/// expressions over settled terms run inline.
	pub fn nested_to(class: TaskClass) -> Self {
		Self::new(move |expression| {
			expression
				.inputs()
				.iter()
				.any(|input| matches!(input, Term::Expression(_)))
				.then_some(class)
		})
	}
}

impl Processor for DelegatingProcessor {
	fn delegate(&self, expression: &Expression) -> Option<Arc<dyn Processor>> {
		let class = (self.policy)(expression)?;
		Some(Arc::new(WorkerProcessor::new(class)))
	}

	fn process(&self, expression: Expression, sink: ResultSink) {
		InlineProcessor.process(expression, sink);
	}
}

impl fmt::Debug for DelegatingProcessor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DelegatingProcessor").finish_non_exhaustive()
	}
}
