use std::{fmt::Display, sync::Arc};

use indexmap::IndexMap;

use crate::{
    interpreter::value::{core::Value, set_value::SetValue},
    util::num::{MAX_SAFE_U64_INT, format_number},
};

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(Arc::from(v))
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::Sequence(Arc::new(v))
    }
}

impl From<IndexMap<String, Self>> for Value {
    fn from(v: IndexMap<String, Self>) -> Self {
        Self::Mapping(Arc::new(v))
    }
}

impl From<SetValue> for Value {
    fn from(v: SetValue) -> Self {
        Self::Set(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::from(s),
            serde_json::Value::Array(items) => {
                Self::from(items.into_iter().map(Self::from).collect::<Vec<_>>())
            },
            serde_json::Value::Object(fields) => {
                Self::from(fields.into_iter()
                                 .map(|(k, v)| (k, Self::from(v)))
                                 .collect::<IndexMap<_, _>>())
            },
        }
    }
}

impl Value {
    /// Converts the value into JSON.
    ///
    /// Sets become arrays, integral numbers become integers, non-finite
    /// numbers become `null`, and host objects become their text rendering.
    ///
    /// ## Example
    /// ```
    /// use weft::interpreter::value::core::Value;
    ///
    /// let value = Value::from(serde_json::json!({"id": 1, "tags": ["a"]}));
    /// assert_eq!(value.to_json(), serde_json::json!({"id": 1, "tags": ["a"]}));
    /// ```
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => number_to_json(*n),
            Self::String(s) => serde_json::Value::String(s.to_string()),
            Self::Sequence(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            },
            Self::Mapping(fields) => {
                serde_json::Value::Object(fields.iter()
                                                .map(|(k, v)| (k.clone(), v.to_json()))
                                                .collect())
            },
            Self::Set(set) => serde_json::Value::Array(set.iter().map(Self::to_json).collect()),
            Self::Object(o) => serde_json::Value::String(o.to_text()),
        }
    }
}

/// Integral numbers become JSON integers so `1` does not print as `1.0`.
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_precision_loss)]
fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_U64_INT as f64 {
        return serde_json::Value::from(n as i64);
    }
    serde_json::Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

/// Renders an optional value as template text; absent renders as nothing.
#[must_use]
pub fn render_text(value: Option<&Value>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}

/// Template text rendering.
///
/// - `null` renders as an empty string.
/// - Strings render as their contents, numbers through
///   [`format_number`], booleans as `true`/`false`.
/// - Sequences and sets render their members comma separated.
/// - Mappings render as compact JSON.
/// - Host objects render through their own hook.
impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{}", format_number(*n)),
            Self::String(s) => write!(f, "{s}"),
            Self::Sequence(items) => write_joined(f, items.iter()),
            Self::Set(set) => write_joined(f, set.iter()),
            Self::Mapping(_) => write!(f, "{}", self.to_json()),
            Self::Object(o) => write!(f, "{}", o.to_text()),
        }
    }
}

fn write_joined<'a>(f: &mut std::fmt::Formatter<'_>,
                    items: impl Iterator<Item = &'a Value>)
                    -> std::fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
