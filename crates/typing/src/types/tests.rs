use pretty_assertions::assert_eq;

use super::*;
use crate::value::Outcome;

fn positive_number(root: &Namespace) -> Type {
	Type::builder("number", ValueClass::Int)
		.in_namespace(root)
		.none(1)
		.constraint(Constraint::new("positive", |d| d.as_int().is_some_and(|v| v > 0)))
		.build()
		.expect("number")
}

fn range(min: i64, max: i64) -> Tag {
	Tag::builder("range")
		.constraint(Constraint::new("in range", move |d| d.as_int().is_some_and(|v| (min..=max).contains(&v))))
		.build()
		.expect("range tag")
}

fn constant_of(term: &Term) -> Value {
	term.value().wait()
}

/// A constraint on the type rejects bad data; good data passes through.
#[test]
fn test_positive_number_instances() {
	let root = Namespace::new_root("root");
	let number = positive_number(&root);

	assert!(constant_of(&number.instance(-1)).is_error());
	assert_eq!(constant_of(&number.instance(5)), Value::one(5));
	assert!(number.is_instance(&Datum::Int(5)));
	assert!(!number.is_instance(&Datum::text("5")));
}

#[test]
fn test_built_type_has_default_read_and_write() {
	let root = Namespace::new_root("root");
	let number = positive_number(&root);
	let sig = OperationType::unary(&number, &number);

	assert!(number.table().contains(&SymbolId::operation("read", sig.clone(), Visibility::Public)));
	assert!(number.table().contains(&SymbolId::operation("write", sig, Visibility::Public)));
	assert_eq!(number.none(), &Datum::Int(1));

	let count = Type::builder("count", ValueClass::Int).build().expect("count");
	assert_eq!(count.none(), &Datum::Int(0));
}

/// The none sentinel must itself be an instance.
#[test]
fn test_none_must_be_instance() {
	let err = Type::builder("number", ValueClass::Int)
		.none(Datum::text("oops"))
		.build()
		.expect_err("text none");
	assert_eq!(err.kind, ViolationKind::ValueMustBeInstanceOfClass { expected: ValueClass::Int });

	let root = Namespace::new_root("root");
	let err = Type::builder("number", ValueClass::Int)
		.in_namespace(&root)
		.constraint(Constraint::new("positive", |d| d.as_int().is_some_and(|v| v > 0)))
		.build()
		.expect_err("default none of 0");
	assert_eq!(err.kind, ViolationKind::ConstraintViolated { constraint: "positive".into() });
	assert!(!root.table().contains(&SymbolId::public(SymbolKind::Type, "number")));
}

/// A tag excluding the inherited none sentinel cannot be layered.
#[test]
fn test_sub_type_rejects_inherited_none() {
	let root = Namespace::new_root("root");
	let number = positive_number(&root);
	let outcome = number.sub(&[range(5, 10)]);

	assert_eq!(
		outcome.violation().map(|v| &v.kind),
		Some(&ViolationKind::ConstraintViolated { constraint: "in range".into() })
	);
	assert_eq!(outcome.or_none(), number);
	assert!(!root.table().contains(&SymbolId::public(SymbolKind::Type, "number[range]")));
}

#[test]
fn test_sub_type_layers_tag_constraints() {
	let root = Namespace::new_root("root");
	let number = positive_number(&root);
	let bounded = number.sub(&[range(1, 10)]).into_result().expect("sub-type");

	assert_eq!(bounded.name(), "number[range]");
	assert_eq!(bounded.raw_name(), "number");
	assert!(constant_of(&bounded.instance(50)).is_error());
	assert!(constant_of(&bounded.instance(-1)).is_error());
	assert_eq!(constant_of(&bounded.instance(5)), Value::one(5));
	assert!(root.table().contains(bounded.id()));
}

/// Sub-typing twice with the same tag yields the already published type.
#[test]
fn test_sub_type_is_reused() {
	let root = Namespace::new_root("root");
	let number = positive_number(&root);
	let small = range(1, 10);
	let first = number.sub(&[small.clone()]).into_result().expect("first");
	let second = number.sub(&[small]).into_result().expect("second");

	assert_eq!(first, second);
	assert_eq!(root.symbol(first.id()), Ok(Symbol::Type(first.clone())));
}

/// An equally named tag with other contents must not alias the published
/// sub-type.
#[test]
fn test_same_name_different_tag_is_refused() {
	let root = Namespace::new_root("root");
	let number = positive_number(&root);
	let narrow = number.sub(&[range(1, 10)]).into_result().expect("narrow");

	let wide = number.sub(&[range(1, 1000)]);
	assert_eq!(wide.violation().map(|v| &v.kind), Some(&ViolationKind::SymbolMustBeUnique));
	assert_eq!(wide.or_none(), number);
	assert_eq!(root.symbol(narrow.id()), Ok(Symbol::Type(narrow.clone())));
	assert!(!narrow.is_instance(&Datum::Int(500)));
}

/// The placeholder for an unregistered class fails sub-typing with its defect.
#[test]
fn test_placeholder_cannot_be_sub_typed() {
	let root = Namespace::new_root("root");
	let placeholder = root.type_of(ValueClass::Float);
	let outcome = placeholder.sub(&[]);

	assert!(!outcome.is_one());
	assert_eq!(outcome.violation().map(|v| &v.kind), Some(&ViolationKind::SymbolMustBeRegistered));
	let fallback = outcome.or_none();
	assert!(!fallback.is_instance(&Datum::Float(1.5)));
	assert!(fallback.defect().is_some());
}

#[test]
fn test_nested_sub_type_name() {
	let number = Type::builder("number", ValueClass::Int).none(2).build().expect("number");
	let even = Tag::builder("even")
		.constraint(Constraint::new("even", |d| d.as_int().is_some_and(|v| v % 2 == 0)))
		.build()
		.expect("even");
	let sub = number.sub(&[range(1, 10)]).or_none().sub(&[even]).or_none();

	assert_eq!(sub.name(), "number[range,even]");
	assert!(sub.is_instance(&Datum::Int(4)));
	assert!(!sub.is_instance(&Datum::Int(3)));
	assert!(!sub.is_instance(&Datum::Int(12)));
}

/// A failing tag type constraint returns the parent and publishes nothing.
#[test]
fn test_sub_type_is_atomic() {
	let root = Namespace::new_root("root");
	let number = positive_number(&root);
	let text_only = Tag::builder("text-only")
		.type_constraint(|ty| match ty.value_class() {
			ValueClass::Text => Ok(()),
			class => Err(Violation::new(
				ViolationKind::ValueMustBeInstanceOfClass {
					expected: ValueClass::Text,
				},
				"text-only",
				class,
			)),
		})
		.build()
		.expect("tag");

	let outcome = number.sub(&[text_only]);
	assert_eq!(
		outcome.violation().map(|v| &v.kind),
		Some(&ViolationKind::TagTypeConstraint { tag: "text-only".into() })
	);
	assert_eq!(outcome.or_none(), number);
	assert!(!root.table().contains(&SymbolId::public(SymbolKind::Type, "number[text-only]")));
}

/// The first failing step stops the pipeline.
#[test]
fn test_failing_step_aborts_sub_typing() {
	let ran_after = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
	let marker = ran_after.clone();
	let pipeline = SubTypePipeline::standard()
		.with_step(SubTypeStep::new("deny", |bench| {
			Err(Violation::new(ViolationKind::Usage, "deny", bench.parent()))
		}))
		.with_step(SubTypeStep::new("after", move |bench| {
			marker.store(true, std::sync::atomic::Ordering::SeqCst);
			Ok(bench)
		}));
	let number = Type::builder("number", ValueClass::Int)
		.pipeline(pipeline)
		.build()
		.expect("number");

	let outcome = number.sub(&[range(1, 10)]);
	assert!(matches!(&outcome, Outcome::No { violation, .. } if violation.kind == ViolationKind::Usage));
	assert_eq!(outcome.or_none(), number);
	assert!(!ran_after.load(std::sync::atomic::Ordering::SeqCst));
}

/// With no steps, the sub-type is a plain copy of the parent.
#[test]
fn test_empty_pipeline_copies_parent() {
	let number = Type::builder("number", ValueClass::Int)
		.none(1)
		.constraint(Constraint::new("positive", |d| d.as_int().is_some_and(|v| v > 0)))
		.pipeline(SubTypePipeline::empty())
		.build()
		.expect("number");

	let copy = number.sub(&[range(1, 10)]).into_result().expect("copy");
	assert_eq!(copy.name(), "number");
	assert!(copy.is_instance(&Datum::Int(50)));
	assert!(!copy.is_instance(&Datum::Int(-1)));
}

/// Private constraints bind the type itself but are not inherited.
#[test]
fn test_private_constraint_not_inherited() {
	let number = Type::builder("number", ValueClass::Int)
		.none(1)
		.constraint(Constraint::new("small", |d| d.as_int().is_some_and(|v| v < 100)).with_visibility(Visibility::Private))
		.build()
		.expect("number");
	let sub = number.sub(&[range(1, 1000)]).into_result().expect("sub");

	assert!(!number.is_instance(&Datum::Int(500)));
	assert!(sub.is_instance(&Datum::Int(500)));
}

/// A tag read operation shadows the inherited one on the sub-type only.
#[test]
fn test_tag_read_operation_shadows_parent() {
	let number = Type::builder("number", ValueClass::Int).build().expect("number");
	let redacted = Tag::builder("redacted")
		.operation(Operation::unary("read", &number, &number, |_| Value::one(0)))
		.build()
		.expect("redacted");
	let secret = number.sub(&[redacted]).into_result().expect("secret");

	assert_eq!(constant_of(&number.instance(42)), Value::one(42));
	assert_eq!(constant_of(&secret.instance(42)), Value::one(0));
	assert!(number.instance(42) != secret.instance(42));
}

#[test]
fn test_tag_mutation_drops_inherited_symbols() {
	let number = Type::builder("number", ValueClass::Int)
		.none(1)
		.constraint(Constraint::new("positive", |d| d.as_int().is_some_and(|v| v > 0)))
		.build()
		.expect("number");
	let relaxed = Tag::builder("relaxed")
		.mutation(|symbol| match symbol {
			Symbol::Constraint(c) if c.id().name() == "positive" => None,
			other => Some(other.clone()),
		})
		.build()
		.expect("relaxed");
	let sub = number.sub(&[relaxed]).into_result().expect("sub");

	assert!(sub.is_instance(&Datum::Int(-3)));
	assert!(!number.is_instance(&Datum::Int(-3)));
}

/// Two tags contributing the same symbol id cannot be combined.
#[test]
fn test_conflicting_tags_fail() {
	let number = Type::builder("number", ValueClass::Int).build().expect("number");
	let a = Tag::builder("a")
		.constraint(Constraint::new("bound", |_| true))
		.build()
		.expect("a");
	let b = Tag::builder("b")
		.constraint(Constraint::new("bound", |_| true))
		.build()
		.expect("b");

	let outcome = number.sub(&[a, b]);
	assert_eq!(outcome.violation().map(|v| &v.kind), Some(&ViolationKind::SymbolMustBeUnique));
	assert_eq!(outcome.or_none(), number);
}

#[test]
fn test_cast_fallbacks() {
	let number = Type::builder("number", ValueClass::Int).build().expect("number");
	let count = Type::builder("count", ValueClass::Int).build().expect("count");
	let flag = Type::builder("flag", ValueClass::Bool).build().expect("flag");

	assert_eq!(number.to(&count).evaluate(&[Value::one(3)]), Ok(Value::one(3)));

	let refused = number.to(&flag).evaluate(&[Value::one(3)]).expect("arity");
	assert_eq!(refused.violation().map(|v| &v.kind), Some(&ViolationKind::NoCast));
}

/// Registered casts are found on both sides and follow the type into sub-types.
#[test]
fn test_registered_cast_is_inherited() {
	let number = Type::builder("number", ValueClass::Int).none(1).build().expect("number");
	let label = Type::builder("label", ValueClass::Text).build().expect("label");
	number
		.add_cast(&label, |d| Value::one(Datum::text(format!("#{d}"))))
		.expect("cast");

	assert_eq!(number.to(&label).evaluate(&[Value::one(7)]), Ok(Value::one("#7")));

	let bounded = number.sub(&[range(1, 10)]).into_result().expect("sub");
	assert_eq!(bounded.to(&label).evaluate(&[Value::one(7)]), Ok(Value::one("#7")));
	assert_eq!(bounded.to(&label).signature().inputs(), &[bounded.clone()]);
}

#[test]
fn test_cast_attempt_resolves_lazily() {
	let number = Type::builder("number", ValueClass::Int).build().expect("number");
	let label = Type::builder("label", ValueClass::Text).build().expect("label");
	let attempt = number.cast_attempt(Value::one(1), &label);
	assert!(matches!(attempt.registration(), crate::Registration::Pending { .. }));
	assert!(!attempt.resolved().registration().is_registered());

	number.add_cast(&label, |d| Value::one(Datum::text(d.to_string()))).expect("cast");
	assert!(attempt.resolved().registration().is_registered());
	assert_eq!(attempt.cast(), Ok(Value::one("1")));
}

#[test]
fn test_kind_rejects_type() {
	let numeric = Kind::new("numeric").with_check(|ty| match ty.value_class() {
		ValueClass::Int | ValueClass::Float => Ok(()),
		class => Err(Violation::new(
			ViolationKind::ValueMustBeInstanceOfClass {
				expected: ValueClass::Int,
			},
			"numeric",
			class,
		)),
	});

	assert!(Type::builder("count", ValueClass::Int).kind(numeric.clone()).build().is_ok());
	let err = Type::builder("word", ValueClass::Text)
		.kind(numeric)
		.build()
		.expect_err("text is not numeric");
	assert_eq!(err.kind, ViolationKind::KindRejected { kind: "numeric".into() });
}

#[test]
fn test_duplicate_builder_symbol_disables() {
	let err = Type::builder("number", ValueClass::Int)
		.constraint(Constraint::new("positive", |_| true))
		.constraint(Constraint::new("positive", |_| false))
		.build()
		.expect_err("duplicate");
	assert_eq!(err.kind, ViolationKind::SymbolMustBeUnique);
}

/// Sub-typing without tags yields the parent itself once published.
#[test]
fn test_sub_without_tags_is_parent() {
	let root = Namespace::new_root("root");
	let number = positive_number(&root);
	assert_eq!(number.sub(&[]).into_result(), Ok(number));
}

/// A standalone type keeps itself alive until its namespace is dismantled.
#[test]
fn test_dismantle_releases_standalone_type() {
	let number = Type::builder("number", ValueClass::Int).build().expect("number");
	assert!(number.read_operation().signature().mentions(&number));

	number.namespace().dismantle();
	assert!(number.table().is_empty());
}
