use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Host data carried by values.
#[derive(Clone)]
pub enum Datum {
	Unit,
	Bool(bool),
	Int(i64),
	Float(f64),
	Text(Arc<str>),
	List(Arc<[Datum]>),
	Opaque(Opaque),
}

/// Any `Send + Sync` Rust value, tagged with its type name.
#[derive(Clone)]
pub struct Opaque {
	type_name: &'static str,
	value: Arc<dyn Any + Send + Sync>,
}

impl Opaque {
	pub fn new<T: Any + Send + Sync>(value: T) -> Self {
		Self {
			type_name: std::any::type_name::<T>(),
			value: Arc::new(value),
		}
	}

	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.value.downcast_ref()
	}
}

impl PartialEq for Opaque {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.value, &other.value)
	}
}

impl Datum {
	pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
		Self::Opaque(Opaque::new(value))
	}

	pub fn text(value: impl AsRef<str>) -> Self {
		Self::Text(Arc::from(value.as_ref()))
	}

	pub fn list(items: impl IntoIterator<Item = Datum>) -> Self {
		Self::List(items.into_iter().collect())
	}

	pub fn class(&self) -> ValueClass {
		ValueClass::of(self)
	}

	pub fn as_int(&self) -> Option<i64> {
		match self {
			Self::Int(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_float(&self) -> Option<f64> {
		match self {
			Self::Float(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Text(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_list(&self) -> Option<&[Datum]> {
		match self {
			Self::List(v) => Some(v),
			_ => None,
		}
	}

	/// Typed extraction; `None` when the datum holds another class.
	pub fn get<T: FromDatum>(&self) -> Option<T> {
		T::from_datum(self)
	}
}

impl PartialEq for Datum {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Unit, Self::Unit) => true,
			(Self::Bool(a), Self::Bool(b)) => a == b,
			(Self::Int(a), Self::Int(b)) => a == b,
			(Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
			(Self::Text(a), Self::Text(b)) => a == b,
			(Self::List(a), Self::List(b)) => a == b,
			(Self::Opaque(a), Self::Opaque(b)) => a == b,
			_ => false,
		}
	}
}

impl Eq for Datum {}

impl Hash for Datum {
	fn hash<H: Hasher>(&self, state: &mut H) {
		std::mem::discriminant(self).hash(state);
		match self {
			Self::Unit => {}
			Self::Bool(v) => v.hash(state),
			Self::Int(v) => v.hash(state),
			Self::Float(v) => v.to_bits().hash(state),
			Self::Text(v) => v.hash(state),
			Self::List(v) => v.hash(state),
			Self::Opaque(v) => {
				v.type_name.hash(state);
				(Arc::as_ptr(&v.value) as *const () as usize).hash(state);
			}
		}
	}
}

impl fmt::Debug for Datum {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Text(v) => write!(f, "{v:?}"),
			_ => fmt::Display::fmt(self, f),
		}
	}
}

impl fmt::Display for Datum {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Unit => f.write_str("()"),
			Self::Bool(v) => write!(f, "{v}"),
			Self::Int(v) => write!(f, "{v}"),
			Self::Float(v) => write!(f, "{v:?}"),
			Self::Text(v) => f.write_str(v),
			Self::List(items) => {
				f.write_str("[")?;
				for (i, item) in items.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{item}")?;
				}
				f.write_str("]")
			}
			Self::Opaque(v) => write!(f, "<{}>", v.type_name),
		}
	}
}

impl From<()> for Datum {
	fn from((): ()) -> Self {
		Datum::Unit
	}
}

impl From<bool> for Datum {
	fn from(v: bool) -> Self {
		Datum::Bool(v)
	}
}

impl From<i64> for Datum {
	fn from(v: i64) -> Self {
		Datum::Int(v)
	}
}

impl From<f64> for Datum {
	fn from(v: f64) -> Self {
		Datum::Float(v)
	}
}

impl From<&str> for Datum {
	fn from(v: &str) -> Self {
		Datum::Text(Arc::from(v))
	}
}

impl From<String> for Datum {
	fn from(v: String) -> Self {
		Datum::Text(Arc::from(v))
	}
}

impl From<Vec<Datum>> for Datum {
	fn from(v: Vec<Datum>) -> Self {
		Datum::List(Arc::from(v))
	}
}

/// The class of data a type is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueClass {
	Unit,
	Bool,
	Int,
	Float,
	Text,
	List,
	/// A Rust type carried through [`Datum::Opaque`], keyed by type name.
	Opaque(&'static str),
	/// Admits every datum.
	Any,
}

impl ValueClass {
	pub fn of(datum: &Datum) -> Self {
		match datum {
			Datum::Unit => Self::Unit,
			Datum::Bool(_) => Self::Bool,
			Datum::Int(_) => Self::Int,
			Datum::Float(_) => Self::Float,
			Datum::Text(_) => Self::Text,
			Datum::List(_) => Self::List,
			Datum::Opaque(v) => Self::Opaque(v.type_name),
		}
	}

	/// Class of the Rust type `T` when carried opaquely.
	pub fn opaque<T: Any>() -> Self {
		Self::Opaque(std::any::type_name::<T>())
	}

	pub fn admits(self, datum: &Datum) -> bool {
		self == Self::Any || self == Self::of(datum)
	}

	/// The datum a type of this class uses as its "none" sentinel by default.
	/// Opaque classes admit no default; their types must set one.
	pub fn default_datum(self) -> Datum {
		match self {
			Self::Bool => Datum::Bool(false),
			Self::Int => Datum::Int(0),
			Self::Float => Datum::Float(0.0),
			Self::Text => Datum::Text(Arc::from("")),
			Self::List => Datum::List(Arc::from(Vec::new())),
			Self::Unit | Self::Opaque(_) | Self::Any => Datum::Unit,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Unit => "unit",
			Self::Bool => "bool",
			Self::Int => "int",
			Self::Float => "float",
			Self::Text => "text",
			Self::List => "list",
			Self::Opaque(name) => name,
			Self::Any => "any",
		}
	}
}

impl fmt::Display for ValueClass {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

// Seal the FromDatum trait to prevent external implementations.
mod sealed {
	pub trait Sealed {}
	impl Sealed for () {}
	impl Sealed for bool {}
	impl Sealed for i64 {}
	impl Sealed for f64 {}
	impl Sealed for String {}
	impl Sealed for std::sync::Arc<str> {}
}

/// Types that can be extracted from a [`Datum`].
pub trait FromDatum: sealed::Sealed + Sized {
	/// Extracts the value, returning `None` if the class doesn't match.
	fn from_datum(datum: &Datum) -> Option<Self>;

	/// The [`ValueClass`] corresponding to this Rust type.
	fn value_class() -> ValueClass;
}

impl FromDatum for () {
	fn from_datum(datum: &Datum) -> Option<Self> {
		matches!(datum, Datum::Unit).then_some(())
	}

	fn value_class() -> ValueClass {
		ValueClass::Unit
	}
}

impl FromDatum for bool {
	fn from_datum(datum: &Datum) -> Option<Self> {
		datum.as_bool()
	}

	fn value_class() -> ValueClass {
		ValueClass::Bool
	}
}

impl FromDatum for i64 {
	fn from_datum(datum: &Datum) -> Option<Self> {
		datum.as_int()
	}

	fn value_class() -> ValueClass {
		ValueClass::Int
	}
}

impl FromDatum for f64 {
	fn from_datum(datum: &Datum) -> Option<Self> {
		datum.as_float()
	}

	fn value_class() -> ValueClass {
		ValueClass::Float
	}
}

impl FromDatum for String {
	fn from_datum(datum: &Datum) -> Option<Self> {
		datum.as_str().map(str::to_owned)
	}

	fn value_class() -> ValueClass {
		ValueClass::Text
	}
}

impl FromDatum for Arc<str> {
	fn from_datum(datum: &Datum) -> Option<Self> {
		match datum {
			Datum::Text(v) => Some(v.clone()),
			_ => None,
		}
	}

	fn value_class() -> ValueClass {
		ValueClass::Text
	}
}
