//! Typed values and the type descriptors used to declare them.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Scalar kinds the conversion engine can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    String,
    Bool,
    I16,
    I32,
    I64,
    U16,
    U32,
    U64,
    F32,
    F64,
    Decimal,
    Uuid,
    /// Date and time without an offset.
    DateTime,
    /// Date and time with a fixed UTC offset.
    DateTimeOffset,
    Duration,
}

impl ScalarType {
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Decimal => "decimal",
            Self::Uuid => "uuid",
            Self::DateTime => "datetime",
            Self::DateTimeOffset => "datetime-offset",
            Self::Duration => "duration",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::I16 | Self::I32 | Self::I64 | Self::U16 | Self::U32 | Self::U64
        )
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a collection target is materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionShape {
    /// Fixed-size, sized to the token count.
    Array,
    /// Growable list.
    List,
    /// Abstract "some sequence" target; materialized as an array.
    Sequence,
}

impl CollectionShape {
    /// The concrete shape a value of this target is stored as.
    pub fn materialized(self) -> Self {
        match self {
            Self::Array | Self::Sequence => Self::Array,
            Self::List => Self::List,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::List => "list",
            Self::Sequence => "sequence",
        }
    }
}

/// Semantic type of an argument's destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Scalar(ScalarType),
    /// A value that may be absent; unwrapped before conversion.
    Nullable(Box<ValueType>),
    Collection {
        shape: CollectionShape,
        element: Box<ValueType>,
    },
}

impl ValueType {
    /// Descriptor for a Rust type, e.g. `ValueType::of::<Vec<String>>()`.
    pub fn of<T: ArgType>() -> Self {
        T::value_type()
    }

    pub fn list(element: ScalarType) -> Self {
        Self::collection(CollectionShape::List, element)
    }

    pub fn array(element: ScalarType) -> Self {
        Self::collection(CollectionShape::Array, element)
    }

    pub fn sequence(element: ScalarType) -> Self {
        Self::collection(CollectionShape::Sequence, element)
    }

    pub fn collection(shape: CollectionShape, element: ScalarType) -> Self {
        Self::Collection {
            shape,
            element: Box::new(Self::Scalar(element)),
        }
    }

    pub fn nullable(inner: ValueType) -> Self {
        Self::Nullable(Box::new(inner))
    }

    /// Strip any `Nullable` wrappers.
    pub fn unwrapped(&self) -> &ValueType {
        let mut current = self;
        while let Self::Nullable(inner) = current {
            current = inner;
        }
        current
    }

    pub fn is_enumerable(&self) -> bool {
        matches!(self.unwrapped(), Self::Collection { .. })
    }

    pub fn scalar(&self) -> Option<ScalarType> {
        match self.unwrapped() {
            Self::Scalar(ty) => Some(*ty),
            _ => None,
        }
    }

    pub fn shape(&self) -> Option<CollectionShape> {
        match self.unwrapped() {
            Self::Collection { shape, .. } => Some(*shape),
            _ => None,
        }
    }

    pub fn element(&self) -> Option<&ValueType> {
        match self.unwrapped() {
            Self::Collection { element, .. } => Some(element),
            _ => None,
        }
    }
}

impl Default for ValueType {
    fn default() -> Self {
        Self::Scalar(ScalarType::String)
    }
}

impl From<ScalarType> for ValueType {
    fn from(ty: ScalarType) -> Self {
        Self::Scalar(ty)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(ty) => write!(f, "{ty}"),
            Self::Nullable(inner) => write!(f, "optional<{inner}>"),
            Self::Collection { shape, element } => write!(f, "{}<{element}>", shape.name()),
        }
    }
}

/// A parsed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    Uuid(Uuid),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
    Duration(TimeDelta),
    Array(Box<[Value]>),
    List(Vec<Value>),
}

impl Value {
    /// Build a collection in the concrete form `shape` materializes to.
    pub fn collection(shape: CollectionShape, items: Vec<Value>) -> Self {
        match shape.materialized() {
            CollectionShape::List => Self::List(items),
            _ => Self::Array(items.into_boxed_slice()),
        }
    }

    /// Integer value of kind `ty`, if `n` fits.
    pub fn integer(ty: ScalarType, n: i64) -> Option<Self> {
        match ty {
            ScalarType::I16 => i16::try_from(n).ok().map(Self::I16),
            ScalarType::I32 => i32::try_from(n).ok().map(Self::I32),
            ScalarType::I64 => Some(Self::I64(n)),
            ScalarType::U16 => u16::try_from(n).ok().map(Self::U16),
            ScalarType::U32 => u32::try_from(n).ok().map(Self::U32),
            ScalarType::U64 => u64::try_from(n).ok().map(Self::U64),
            _ => None,
        }
    }

    /// Scalar kind of this value, `None` for collections.
    pub fn scalar_type(&self) -> Option<ScalarType> {
        Some(match self {
            Self::String(_) => ScalarType::String,
            Self::Bool(_) => ScalarType::Bool,
            Self::I16(_) => ScalarType::I16,
            Self::I32(_) => ScalarType::I32,
            Self::I64(_) => ScalarType::I64,
            Self::U16(_) => ScalarType::U16,
            Self::U32(_) => ScalarType::U32,
            Self::U64(_) => ScalarType::U64,
            Self::F32(_) => ScalarType::F32,
            Self::F64(_) => ScalarType::F64,
            Self::Decimal(_) => ScalarType::Decimal,
            Self::Uuid(_) => ScalarType::Uuid,
            Self::DateTime(_) => ScalarType::DateTime,
            Self::DateTimeOffset(_) => ScalarType::DateTimeOffset,
            Self::Duration(_) => ScalarType::Duration,
            Self::Array(_) | Self::List(_) => return None,
        })
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Any integer variant widened to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::I16(v) => Some(v.into()),
            Self::I32(v) => Some(v.into()),
            Self::I64(v) => Some(v),
            Self::U16(v) => Some(v.into()),
            Self::U32(v) => Some(v.into()),
            Self::U64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Elements of an array or list.
    pub fn items(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_collection(&self) -> bool {
        self.items().is_some()
    }

    /// Elements of a collection, or the value itself as a single element.
    pub fn into_items(self) -> Vec<Value> {
        match self {
            Self::Array(items) => items.into_vec(),
            Self::List(items) => items,
            other => vec![other],
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(v) => f.write_str(v),
            Self::Bool(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Uuid(v) => write!(f, "{v}"),
            Self::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%dT%H:%M:%S%.f")),
            Self::DateTimeOffset(v) => f.write_str(&v.to_rfc3339()),
            Self::Duration(v) => f.write_str(&format_duration(*v)),
            Self::Array(items) => write_items(f, items),
            Self::List(items) => write_items(f, items),
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    f.write_str("[")?;
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str("]")
}

/// Render a duration as `[-][d.]hh:mm:ss[.fffffffff]`.
///
/// The output is accepted back by the free-form duration parser.
pub fn format_duration(delta: TimeDelta) -> String {
    let negative = delta < TimeDelta::zero();
    let magnitude = if negative { -delta } else { delta };
    let total = magnitude.num_seconds();
    let nanos = magnitude.subsec_nanos();

    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if days > 0 {
        out.push_str(&format!("{days}."));
    }
    out.push_str(&format!("{hours:02}:{minutes:02}:{seconds:02}"));
    if nanos > 0 {
        let fraction = format!("{nanos:09}");
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out
}

/// Typed extraction from a stored [`Value`].
///
/// A value of a different runtime type yields `None`; lookups never coerce.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

/// Rust types with a known [`ValueType`] descriptor.
pub trait ArgType: FromValue {
    fn value_type() -> ValueType;
}

macro_rules! scalar_types {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }

            impl FromValue for $ty {
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }

            impl ArgType for $ty {
                fn value_type() -> ValueType {
                    ValueType::Scalar(ScalarType::$variant)
                }
            }
        )*
    };
}

scalar_types! {
    String => String,
    bool => Bool,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    Uuid => Uuid,
    NaiveDateTime => DateTime,
    DateTime<FixedOffset> => DateTimeOffset,
    TimeDelta => Duration,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Option<Self> {
        value.items()?.iter().map(T::from_value).collect()
    }
}

impl<T: FromValue> FromValue for Box<[T]> {
    fn from_value(value: &Value) -> Option<Self> {
        Vec::<T>::from_value(value).map(Vec::into_boxed_slice)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        T::from_value(value).map(Some)
    }
}

impl<T: ArgType> ArgType for Vec<T> {
    fn value_type() -> ValueType {
        ValueType::Collection {
            shape: CollectionShape::List,
            element: Box::new(T::value_type()),
        }
    }
}

impl<T: ArgType> ArgType for Box<[T]> {
    fn value_type() -> ValueType {
        ValueType::Collection {
            shape: CollectionShape::Array,
            element: Box::new(T::value_type()),
        }
    }
}

impl<T: ArgType> ArgType for Option<T> {
    fn value_type() -> ValueType {
        ValueType::nullable(T::value_type())
    }
}
