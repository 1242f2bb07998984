use rand::Rng;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::EvalResult,
            function::core::{Call, Outcome, describe},
        },
        value::core::Value,
    },
};

/// Requires a number.
fn number(call: &Call<'_>, value: Option<&Value>, role: &str) -> EvalResult<f64> {
    match value {
        Some(Value::Number(n)) => Ok(*n),
        other => Err(call.type_error(format!("rand expects a number as {role}, found {}",
                                             describe(other)))),
    }
}

/// Draws a uniformly distributed number from an inclusive range.
///
/// Forms:
/// - `rand`: a number in `[0, 1]`.
/// - `rand hi`: a number in `[parent, hi]`.
/// - `rand lo hi`: a number in `[lo, hi]`.
///
/// # Errors
/// Returns a type error for a non-numeric bound and
/// [`RuntimeError::InvalidArgument`] if the range is not finite or `lo > hi`.
pub fn rand(call: &Call<'_>) -> EvalResult<Outcome> {
    let (lo, hi) = if call.is_empty() {
        (0.0, 1.0)
    } else {
        (number(call, call.operand(2, 0)?.as_ref(), "lower bound")?,
         number(call, call.operand(2, 1)?.as_ref(), "upper bound")?)
    };

    // The width must be finite as well, or sampling overflows.
    if !(hi - lo).is_finite() || lo > hi {
        return Err(RuntimeError::InvalidArgument { details: format!("rand needs finite bounds with lo <= hi, got [{lo}, {hi}]"),
                                                   offset:  call.offset(), });
    }

    let n = rand::thread_rng().gen_range(lo..=hi);
    Ok(Outcome::from(Value::from(n)))
}
