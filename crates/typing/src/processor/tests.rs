use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;

use super::*;
use crate::error::ViolationKind;
use crate::operation::Operation;
use crate::types::Type;
use crate::value::{Synchronicity, Value, ValueClass};

fn integer() -> Type {
	Type::builder("integer", ValueClass::Int).build().expect("integer")
}

fn double(ty: &Type) -> Operation {
	Operation::unary("double", ty, ty, |d| Value::one(d.as_int().unwrap_or_default() * 2))
}

fn expression(processor: Arc<dyn Processor>) -> Expression {
	let ty = integer();
	Expression::new(double(&ty), [ty.instance(21)], processor).expect("arity")
}

/// Drops the sink without running anything.
#[derive(Debug)]
struct Dropping;

impl Processor for Dropping {
	fn process(&self, _expression: Expression, _sink: ResultSink) {}
}

#[test]
fn test_inline_processor_completes_before_returning() {
	let Synchronicity::Asynchronous(pending) = expression(Arc::new(InlineProcessor)).value() else {
		panic!("expressions are asynchronous");
	};
	assert!(pending.is_ready());
	assert_eq!(pending.wait(), Value::one(42));
}

#[test]
fn test_thread_processor() {
	let value = expression(Arc::new(ThreadProcessor::new(TaskClass::Background))).value();
	assert_eq!(value.wait(), Value::one(42));
}

#[test]
fn test_worker_processor() {
	let value = expression(Arc::new(WorkerProcessor::new(TaskClass::CpuBlocking))).value();
	assert_eq!(value.wait(), Value::one(42));
}

/// Lost work resolves as abandoned instead of hanging the reader.
#[test]
fn test_dropped_sink_abandons_expression() {
	let value = expression(Arc::new(Dropping)).value().wait();
	assert_eq!(value.violation().map(|v| &v.kind), Some(&ViolationKind::Abandoned));
}

#[test]
fn test_delegation_runs_chosen_processor() {
	let routed = Arc::new(AtomicUsize::new(0));
	let policy = {
		let routed = routed.clone();
		move |_: &Expression| {
			routed.fetch_add(1, Ordering::SeqCst);
			Some(TaskClass::IoBlocking)
		}
	};
	let top: Arc<dyn Processor> = Arc::new(DelegatingProcessor::new(policy));

	assert_eq!(expression(top).value().wait(), Value::one(42));
	assert_eq!(routed.load(Ordering::SeqCst), 1);
}

/// Only expressions over other expressions leave the calling thread.
#[test]
fn test_nested_to_routes_nested_expressions() {
	let ty = integer();
	let delegating = DelegatingProcessor::nested_to(TaskClass::CpuBlocking);
	let inline: Arc<dyn Processor> = Arc::new(InlineProcessor);

	let flat = Expression::new(double(&ty), [ty.instance(1)], inline.clone()).expect("arity");
	let nested = Expression::new(double(&ty), [Term::Expression(flat.clone())], inline).expect("arity");

	assert!(delegating.delegate(&flat).is_none());
	assert!(delegating.delegate(&nested).is_some());

	let top: Arc<dyn Processor> = Arc::new(delegating);
	let routed = Expression::new(double(&ty), [Term::Expression(nested)], top).expect("arity");
	assert_eq!(routed.value().wait(), Value::one(8));
}

/// A chain of expressions sharing one delegating processor resolves on the
/// worker pool, each nested level routed once.
#[test]
fn test_delegating_processor_resolves_nested_chain_on_pool() {
	let ty = integer();
	let routed = Arc::new(AtomicUsize::new(0));
	let policy = {
		let routed = routed.clone();
		move |expression: &Expression| {
			let nested = expression.inputs().iter().any(|input| matches!(input, Term::Expression(_)));
			nested.then(|| {
				routed.fetch_add(1, Ordering::SeqCst);
				TaskClass::CpuBlocking
			})
		}
	};
	let top: Arc<dyn Processor> = Arc::new(DelegatingProcessor::new(policy));

	let leaf = Expression::new(double(&ty), [ty.instance(3)], top.clone()).expect("arity");
	let middle = Expression::new(double(&ty), [Term::Expression(leaf)], top.clone()).expect("arity");
	let outer = Expression::new(double(&ty), [Term::Expression(middle)], top).expect("arity");

	assert_eq!(outer.value().wait(), Value::one(24));
	assert_eq!(routed.load(Ordering::SeqCst), 2);
}

#[test]
fn test_from_config_picks_mode() {
	let config = ProcessorConfig::default();
	let processor = from_config(&config);
	assert_eq!(format!("{processor:?}"), "InlineProcessor");
}
