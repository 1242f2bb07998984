use crate::interpreter::{
    evaluator::{
        core::EvalResult,
        function::core::{Call, Outcome, describe},
    },
    value::{core::Value, set_value::SetValue},
};

/// Evaluates the set operand of a two-operand set function.
fn set_operand(call: &Call<'_>) -> EvalResult<SetValue> {
    match call.operand(2, 0)? {
        Some(Value::Set(set)) => Ok(set),
        other => Err(call.type_error(format!("{} expects a set, found {}",
                                             call.name(),
                                             describe(other.as_ref())))),
    }
}

/// Creates an empty set.
pub fn set_new(_call: &Call<'_>) -> EvalResult<Outcome> {
    Ok(Outcome::from(Value::from(SetValue::new())))
}

/// Returns a set that also contains a value.
///
/// Forms: `set_add v` (the parent is the set) and `set_add set v`. The
/// original set is unchanged. If a loosely equal member is already present
/// the result equals the input. An absent value is added as `null`.
///
/// # Errors
/// Returns a type error if the set operand is not a set.
pub fn set_add(call: &Call<'_>) -> EvalResult<Outcome> {
    let set = set_operand(call)?;
    let value = call.operand(2, 1)?.unwrap_or(Value::Null);

    Ok(Outcome::from(Value::from(set.with(value))))
}

/// Tests set membership with the same loose equality as `eq`.
///
/// Forms: `set_has v` and `set_has set v`.
///
/// # Errors
/// Returns a type error if the set operand is not a set.
pub fn set_has(call: &Call<'_>) -> EvalResult<Outcome> {
    let set = set_operand(call)?;
    let value = call.operand(2, 1)?.unwrap_or(Value::Null);

    Ok(Outcome::from(Value::from(set.contains(&value))))
}
