use crate::{
    error::RuntimeError,
    interpreter::{compiler::Segment, evaluator::core::EvalResult, value::core::Value},
};

/// Follows an accessor path from `root`.
///
/// - A missing mapping field yields absent.
/// - Any step from `null` or from an absent value yields absent.
/// - On a sequence, a numeric step indexes; out of range yields absent and a
///   non-numeric step is a type error.
/// - On a host object, the object's own `field` hook decides.
/// - Any step into a set, boolean, number or string is a type error.
///
/// # Parameters
/// - `root`: The value the path starts from.
/// - `path`: Compiled path steps.
/// - `offset`: Byte offset of the accessor for error reporting.
///
/// ## Example
/// ```
/// use serde_json::json;
/// use weft::interpreter::{
///     compiler::Segment, evaluator::access::follow_path, value::core::Value,
/// };
///
/// let data = Value::from(json!({"items": [{"id": 7}]}));
/// let path: Vec<Segment> = ["items", "0", "id"].iter()
///                                              .map(|s| Segment::from(&s.to_string()))
///                                              .collect();
///
/// assert_eq!(follow_path(Some(&data), &path, 0).unwrap(), Some(Value::from(7)));
/// assert_eq!(follow_path(Some(&data), &path[..1], 0).unwrap().map(|v| v.type_name()),
///            Some("sequence"));
/// ```
pub fn follow_path(root: Option<&Value>,
                   path: &[Segment],
                   offset: usize)
                   -> EvalResult<Option<Value>> {
    let mut current = root.cloned();

    for segment in path {
        current = match current {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Mapping(fields)) => fields.get(&segment.name).cloned(),
            Some(Value::Sequence(items)) => match segment.index {
                Some(index) => items.get(index).cloned(),
                None => {
                    return Err(RuntimeError::TypeError { details: format!("cannot read field '{}' of a sequence",
                                                                          segment.name),
                                                         offset });
                },
            },
            Some(Value::Object(object)) => object.field(&segment.name),
            Some(other) => {
                return Err(RuntimeError::TypeError { details: format!("cannot read field '{}' of {}",
                                                                      segment.name,
                                                                      other.type_name()),
                                                     offset });
            },
        };
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn path(steps: &[&str]) -> Vec<Segment> {
        steps.iter().map(|s| Segment::from(&(*s).to_string())).collect()
    }

    #[test]
    fn missing_fields_are_absent() {
        let data = Value::from(json!({"a": {"b": null}}));

        assert_eq!(follow_path(Some(&data), &path(&["fake"]), 0).unwrap(), None);
        assert_eq!(follow_path(Some(&data), &path(&["a", "b", "c"]), 0).unwrap(), None);
        assert_eq!(follow_path(None, &path(&["x"]), 0).unwrap(), None);
    }

    #[test]
    fn empty_path_is_the_root() {
        let data = Value::from(3);
        assert_eq!(follow_path(Some(&data), &[], 0).unwrap(), Some(data));
    }

    #[test]
    fn index_out_of_range_is_absent() {
        let data = Value::from(json!([1, 2]));
        assert_eq!(follow_path(Some(&data), &path(&["5"]), 0).unwrap(), None);
    }

    #[test]
    fn fields_of_primitives_are_type_errors() {
        for data in [Value::from("text"), Value::from(1), Value::from(true)] {
            let err = follow_path(Some(&data), &path(&["x"]), 4).unwrap_err();
            assert!(matches!(err, RuntimeError::TypeError { offset: 4, .. }), "{err:?}");
        }

        let list = Value::from(json!([1]));
        assert!(follow_path(Some(&list), &path(&["len"]), 0).is_err());
    }
}
