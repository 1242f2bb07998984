use std::sync::Arc;

use indexmap::IndexMap;

use crate::interpreter::value::{compare::LooseKey, core::Value};

/// An immutable set of values.
///
/// Members are bucketed by [`LooseKey`] and compared with
/// [`Value::loosely_equals`] inside a bucket, so membership agrees with the
/// `eq` builtin: a set holding `2` also holds `"2"`. Iteration follows the
/// order in which buckets were first created.
#[derive(Debug, Clone, Default)]
pub struct SetValue {
    buckets: Arc<IndexMap<LooseKey, Vec<Value>>>,
    len:     usize,
}

impl SetValue {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of members.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the set has no members.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if a loosely equal member exists.
    ///
    /// ## Example
    /// ```
    /// use weft::interpreter::value::{core::Value, set_value::SetValue};
    ///
    /// let set = SetValue::new().with(Value::from(2.0));
    ///
    /// assert!(set.contains(&Value::from(2.0)));
    /// assert!(set.contains(&Value::from("2")));
    /// assert!(!set.contains(&Value::from(20.0)));
    /// ```
    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        self.buckets
            .get(&LooseKey::of(value))
            .is_some_and(|bucket| bucket.iter().any(|member| member.loosely_equals(value)))
    }

    /// Returns a set that also contains `value`.
    ///
    /// If a loosely equal member already exists the set is returned
    /// unchanged. The receiver is never modified.
    #[must_use]
    pub fn with(&self, value: Value) -> Self {
        if self.contains(&value) {
            return self.clone();
        }
        let mut buckets = (*self.buckets).clone();
        buckets.entry(LooseKey::of(&value)).or_default().push(value);
        Self { buckets: Arc::new(buckets),
               len:     self.len + 1, }
    }

    /// Iterates over the members.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.buckets.values().flatten()
    }
}

impl FromIterator<Value> for SetValue {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        iter.into_iter().fold(Self::new(), |set, value| set.with(value))
    }
}

/// Two sets are equal when they hold structurally equal members.
impl PartialEq for SetValue {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().all(|a| other.iter().any(|b| a == b))
    }
}
