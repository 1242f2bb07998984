use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::EvalResult,
            function::core::{Call, Outcome, describe},
        },
        value::core::Value,
    },
    util::num::usize_to_f64_checked,
};

/// Applies an expression to every element of a sequence.
///
/// Forms: `map expr` (the parent is the sequence) and `map seq expr`. The
/// expression is evaluated once per element with `.` bound to the element.
/// Results keep the input order; an absent result is stored as `null`.
///
/// # Errors
/// Returns [`RuntimeError::ExpectedSequence`] if the operand is not a
/// sequence.
pub fn map(call: &Call<'_>) -> EvalResult<Outcome> {
    let source = call.operand(2, 0)?;
    let items = match &source {
        Some(Value::Sequence(items)) => items,
        other => {
            return Err(RuntimeError::ExpectedSequence { name:   call.name().to_string(),
                                                        found:  describe(other.as_ref()).to_string(),
                                                        offset: call.offset(), });
        },
    };
    let Some(expr) = call.operand_index(2, 1) else {
        return Ok(Outcome::from(source.clone()));
    };

    let mapped = items.iter()
                      .map(|item| Ok(call.arg_with(expr, Some(item))?.unwrap_or(Value::Null)))
                      .collect::<EvalResult<Vec<_>>>()?;

    Ok(Outcome::from(Value::from(mapped)))
}

/// Counts characters of a string or members of a sequence, set or mapping.
///
/// Forms: `len` (of the parent) and `len v`.
///
/// # Errors
/// Returns a type error for any other operand.
pub fn len(call: &Call<'_>) -> EvalResult<Outcome> {
    let value = call.operand(1, 0)?;
    let count = match &value {
        Some(Value::String(s)) => s.chars().count(),
        Some(Value::Sequence(items)) => items.len(),
        Some(Value::Mapping(fields)) => fields.len(),
        Some(Value::Set(set)) => set.len(),
        other => return Err(call.type_error(format!("len expects a string or collection, found {}",
                                                    describe(other.as_ref())))),
    };

    let count = usize_to_f64_checked(count, call.error("length is too large to represent"))?;
    Ok(Outcome::from(Value::from(count)))
}
