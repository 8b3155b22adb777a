use std::time::Duration;

use pretty_assertions::assert_eq;

use super::*;
use crate::error::ViolationKind;

#[test]
fn test_datum_extraction_is_class_checked() {
	let datum = Datum::from(5);
	assert_eq!(datum.get::<i64>(), Some(5));
	assert_eq!(datum.get::<String>(), None);
	assert_eq!(Datum::from("abc").get::<String>().as_deref(), Some("abc"));
	assert_eq!(<i64 as FromDatum>::value_class(), ValueClass::Int);
}

#[test]
fn test_value_class_admits() {
	assert!(ValueClass::Int.admits(&Datum::Int(1)));
	assert!(!ValueClass::Int.admits(&Datum::Float(1.0)));
	assert!(ValueClass::Any.admits(&Datum::text("x")));

	#[derive(Debug)]
	struct Point;
	let point = Datum::opaque(Point);
	assert!(ValueClass::opaque::<Point>().admits(&point));
	assert!(!ValueClass::opaque::<String>().admits(&point));
}

#[test]
fn test_or_none_never_fails() {
	let none = Datum::Int(0);
	let failed = Value::No(crate::Violation::new(ViolationKind::NoCast, "test", "x"));
	assert_eq!(failed.or_none(&none), none);
	assert_eq!(Value::one(7).or_none(&none), Datum::Int(7));
	assert!(failed.into_result().is_err());
}

/// A pending value resolves once its sink completes, even across threads.
#[test]
fn test_pending_completes_across_threads() {
	let (pending, sink) = Pending::unbounded();
	assert!(!pending.is_ready());
	let producer = std::thread::spawn(move || sink.complete(Value::one(3)));
	assert_eq!(pending.wait(), Value::one(3));
	assert!(producer.join().expect("producer"));
	assert_eq!(pending.try_get(), Some(Value::one(3)));
}

#[test]
fn test_pending_times_out_within_budget() {
	let (pending, _sink) = Pending::new(Duration::from_millis(10));
	let value = pending.wait();
	assert_eq!(value.violation().map(|v| &v.kind), Some(&ViolationKind::Timeout));
}

/// Dropping the sink resolves the cell instead of leaving waiters hanging.
#[test]
fn test_dropped_sink_abandons() {
	let (pending, sink) = Pending::unbounded();
	drop(sink);
	let value = pending.wait();
	assert_eq!(value.violation().map(|v| &v.kind), Some(&ViolationKind::Abandoned));
}

/// Guards see the produced value on every read; the plain view is untouched.
#[test]
fn test_mapped_pending_guards_result() {
	let (pending, sink) = Pending::unbounded();
	let doubled = pending.map(|value| match value {
		Value::One(Datum::Int(v)) => Value::one(v * 2),
		other => other,
	});
	assert!(doubled != pending);
	assert_eq!(doubled.try_get(), None);

	assert!(sink.complete(Value::one(4)));
	assert_eq!(doubled.wait(), Value::one(8));
	assert_eq!(doubled.try_get(), Some(Value::one(8)));
	assert_eq!(pending.wait(), Value::one(4));
}

#[test]
fn test_second_completion_is_ignored() {
	let (pending, sink) = Pending::unbounded();
	assert!(sink.complete(Value::one(1)));
	assert_eq!(pending.wait(), Value::one(1));
}

#[test]
fn test_outcome_fallback() {
	let failed: Outcome<i64> = Outcome::No {
		violation: crate::Violation::new(ViolationKind::NoCast, "test", "x"),
		fallback: 1,
	};
	assert!(!failed.is_one());
	assert_eq!(*failed.get(), 1);
	assert_eq!(failed.map(|v| v + 1).or_none(), 2);
}
