use std::sync::Arc;

use indexmap::IndexMap;

use crate::interpreter::value::set_value::SetValue;

/// An opaque value supplied by the host.
///
/// Host objects travel through pipes untouched. Accessors consult
/// [`HostObject::field`], and templates render them through
/// [`HostObject::to_text`].
///
/// ## Example
/// ```
/// use std::sync::Arc;
///
/// use weft::interpreter::value::core::{HostObject, Value};
///
/// #[derive(Debug)]
/// struct Point(f64, f64);
///
/// impl HostObject for Point {
///     fn field(&self, name: &str) -> Option<Value> {
///         match name {
///             "x" => Some(self.0.into()),
///             "y" => Some(self.1.into()),
///             _ => None,
///         }
///     }
///
///     fn to_text(&self) -> String {
///         format!("({}, {})", self.0, self.1)
///     }
/// }
///
/// let point = Value::Object(Arc::new(Point(1.0, 2.0)));
/// assert_eq!(point.to_string(), "(1, 2)");
/// ```
pub trait HostObject: std::fmt::Debug + Send + Sync {
    /// Reads a named field. `None` means the field is absent.
    fn field(&self, name: &str) -> Option<Value>;

    /// Renders the object as template text.
    fn to_text(&self) -> String;

    /// Short name used in diagnostics.
    fn type_name(&self) -> &'static str {
        "object"
    }
}

/// Represents a runtime value in the interpreter.
///
/// Compound variants are reference counted, so cloning a value is cheap and a
/// value can be shared between threads. Absence (a missing field, an empty
/// interpolation) is not a variant: evaluation returns `Option<Value>` and
/// `None` is the absent value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// An explicit null.
    #[default]
    Null,
    /// A boolean value (`true` or `false`).
    Bool(bool),
    /// A number (double precision floating-point).
    Number(f64),
    /// A string of text.
    String(Arc<str>),
    /// An ordered sequence of values.
    Sequence(Arc<Vec<Self>>),
    /// A mapping from field names to values, in insertion order.
    Mapping(Arc<IndexMap<String, Self>>),
    /// A set of unique values.
    Set(SetValue),
    /// An opaque host object.
    Object(Arc<dyn HostObject>),
}

impl Value {
    /// Returns a short name for the value's kind, for diagnostics.
    ///
    /// ## Example
    /// ```
    /// use weft::interpreter::value::core::Value;
    ///
    /// assert_eq!(Value::from("text").type_name(), "string");
    /// assert_eq!(Value::Null.type_name(), "null");
    /// ```
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
            Self::Set(_) => "set",
            Self::Object(o) => o.type_name(),
        }
    }

    /// Returns the string contents, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number, if this is a number.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean, if this is a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the elements, if this is a sequence.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Self]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the fields, if this is a mapping.
    #[must_use]
    pub fn as_mapping(&self) -> Option<&IndexMap<String, Self>> {
        match self {
            Self::Mapping(fields) => Some(fields),
            _ => None,
        }
    }

    /// Returns the set, if this is a set.
    #[must_use]
    pub const fn as_set(&self) -> Option<&SetValue> {
        match self {
            Self::Set(set) => Some(set),
            _ => None,
        }
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Structural equality.
///
/// This is the strict, kind-preserving comparison used by Rust code and
/// tests; the language's `eq` uses [`Value::loosely_equals`] instead. Host
/// objects are equal only to themselves.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Sequence(a), Self::Sequence(b)) => a == b,
            (Self::Mapping(a), Self::Mapping(b)) => a == b,
            (Self::Set(a), Self::Set(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::evaluator::core::InvocationContext;

    #[test]
    fn default_is_null() {
        assert!(Value::default().is_null());
        assert!(InvocationContext::default().default.is_null());
        assert!(InvocationContext::default().extra.is_empty());
    }
}
