use crate::interpreter::{
    evaluator::{
        core::EvalResult,
        function::core::{Call, Outcome},
    },
    value::{
        compare::{loosely_equal, truthy},
        core::Value,
    },
};

/// Loose equality.
///
/// Forms: `eq b` (compares the parent with `b`) and `eq a b`. Absent compares
/// like `null`; see [`loosely_equal`] for the full table.
pub fn eq(call: &Call<'_>) -> EvalResult<Outcome> {
    let left = call.operand(2, 0)?;
    let right = call.operand(2, 1)?;

    Ok(Outcome::from(Value::from(loosely_equal(left.as_ref(), right.as_ref()))))
}

/// Logical and of two truthiness tests.
///
/// Forms: `and b` and `and a b`. The second operand is not evaluated when
/// the first is falsy.
pub fn and(call: &Call<'_>) -> EvalResult<Outcome> {
    let left = truthy(call.operand(2, 0)?.as_ref());
    let result = left && truthy(call.operand(2, 1)?.as_ref());

    Ok(Outcome::from(Value::from(result)))
}

/// Logical or of two truthiness tests.
///
/// Forms: `or b` and `or a b`. The second operand is not evaluated when the
/// first is truthy.
pub fn or(call: &Call<'_>) -> EvalResult<Outcome> {
    let left = truthy(call.operand(2, 0)?.as_ref());
    let result = left || truthy(call.operand(2, 1)?.as_ref());

    Ok(Outcome::from(Value::from(result)))
}

/// Logical negation. Forms: `not` and `not a`.
pub fn not(call: &Call<'_>) -> EvalResult<Outcome> {
    let value = call.operand(1, 0)?;

    Ok(Outcome::from(Value::from(!truthy(value.as_ref()))))
}

/// Falls back when a value is missing.
///
/// Forms: `default fallback` and `default v fallback`. Yields `v` unless it
/// is absent or `null`; the fallback is evaluated only when needed.
pub fn default(call: &Call<'_>) -> EvalResult<Outcome> {
    match call.operand(2, 0)? {
        Some(value) if !value.is_null() => Ok(Outcome::from(value)),
        _ => Ok(Outcome::from(call.operand(2, 1)?)),
    }
}
