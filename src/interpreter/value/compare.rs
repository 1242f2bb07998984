use std::sync::Arc;

use ordered_float::OrderedFloat;

use crate::{interpreter::value::core::Value, util::num::parse_numeric_text};

/// The numeric reading of a primitive for cross-kind comparison.
///
/// Booleans read as `1`/`0`, strings through [`parse_numeric_text`].
fn numeric_view(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => parse_numeric_text(s),
        _ => None,
    }
}

/// Compares two numbers, treating NaN as equal to itself.
fn numbers_equal(a: f64, b: f64) -> bool {
    OrderedFloat(a) == OrderedFloat(b)
}

/// Loose equality over optional values.
///
/// Absent behaves exactly like [`Value::Null`].
///
/// ## Example
/// ```
/// use weft::interpreter::{value::compare::loosely_equal, value::core::Value};
///
/// assert!(loosely_equal(None, Some(&Value::Null)));
/// assert!(!loosely_equal(None, Some(&Value::from(0.0))));
/// ```
#[must_use]
pub fn loosely_equal(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (None | Some(Value::Null), None | Some(Value::Null)) => true,
        (None | Some(Value::Null), Some(_)) | (Some(_), None | Some(Value::Null)) => false,
        (Some(l), Some(r)) => l.loosely_equals(r),
    }
}

/// Truthiness of an optional value; absent is false.
#[must_use]
pub fn truthy(value: Option<&Value>) -> bool {
    value.is_some_and(Value::is_truthy)
}

impl Value {
    /// Compares two values with the language's coercing equality.
    ///
    /// Rules, applied symmetrically:
    /// - `null` equals only `null`.
    /// - Two strings compare byte for byte.
    /// - Any other pair of booleans, numbers and strings compares numerically:
    ///   booleans read as `1`/`0`, strings are trimmed and parsed (an empty
    ///   string is `0`, an unparsable one equals no number). NaN equals NaN so
    ///   that every value equals itself.
    /// - Sequences are equal when they have the same length and are pairwise
    ///   loosely equal.
    /// - Mappings are equal when they have the same keys and loosely equal
    ///   values.
    /// - Sets are equal when each member of one is a member of the other.
    /// - Host objects are equal only to themselves.
    /// - Anything else is unequal.
    ///
    /// ## Example
    /// ```
    /// use weft::interpreter::value::core::Value;
    ///
    /// assert!(Value::from(9.0).loosely_equals(&Value::from("9")));
    /// assert!(Value::from(true).loosely_equals(&Value::from("1")));
    /// assert!(!Value::from("1.0").loosely_equals(&Value::from("1")));
    /// assert!(!Value::from(true).loosely_equals(&Value::from(false)));
    /// ```
    #[must_use]
    pub fn loosely_equals(&self, other: &Self) -> bool {
        use Value::{Bool, Mapping, Null, Number, Object, Sequence, Set, String};

        match (self, other) {
            (Null, Null) => true,
            (String(a), String(b)) => a == b,
            (Bool(a), Bool(b)) => a == b,
            (Bool(_) | Number(_) | String(_), Bool(_) | Number(_) | String(_)) => {
                match (numeric_view(self), numeric_view(other)) {
                    (Some(a), Some(b)) => numbers_equal(a, b),
                    _ => false,
                }
            },
            (Sequence(a), Sequence(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.loosely_equals(y))
            },
            (Mapping(a), Mapping(b)) => {
                a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| x.loosely_equals(y)))
            },
            (Set(a), Set(b)) => a.len() == b.len() && a.iter().all(|x| b.contains(x)),
            (Object(a), Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Returns the truthiness of the value.
    ///
    /// `null` is false, booleans are themselves, numbers are true unless zero
    /// or NaN, strings are true unless empty, and compound values and host
    /// objects are always true.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::Sequence(_) | Self::Mapping(_) | Self::Set(_) | Self::Object(_) => true,
        }
    }
}

/// A hash key that is identical for any two loosely equal values.
///
/// Loose equality is not transitive, so the key is only used to narrow a
/// membership search; candidates sharing a key are still compared with
/// [`Value::loosely_equals`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LooseKey {
    /// `null`.
    Null,
    /// Any boolean, number, or string with a numeric reading.
    Number(OrderedFloat<f64>),
    /// A string without a numeric reading.
    Text(Arc<str>),
    /// A sequence of the given length.
    Sequence(usize),
    /// A mapping with the given number of fields.
    Mapping(usize),
    /// A set of the given size.
    Set(usize),
    /// A host object, by address.
    Object(usize),
}

impl LooseKey {
    /// Computes the key for a value.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) | Value::Number(_) | Value::String(_) => match numeric_view(value) {
                // -0.0 and 0.0 compare equal but hash differently.
                Some(n) if n == 0.0 => Self::Number(OrderedFloat(0.0)),
                Some(n) => Self::Number(OrderedFloat(n)),
                None => match value {
                    Value::String(s) => Self::Text(Arc::clone(s)),
                    _ => Self::Null,
                },
            },
            Value::Sequence(items) => Self::Sequence(items.len()),
            Value::Mapping(fields) => Self::Mapping(fields.len()),
            Value::Set(set) => Self::Set(set.len()),
            Value::Object(o) => Self::Object(Arc::as_ptr(o).cast::<()>() as usize),
        }
    }
}
