use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::EvalResult,
            function::core::{Call, Outcome, describe},
        },
        value::{convert::render_text, core::Value},
    },
};

/// Evaluates operand `index` and requires a string.
fn string_operand(call: &Call<'_>, full: usize, index: usize, role: &str) -> EvalResult<String> {
    match call.operand(full, index)? {
        Some(Value::String(s)) => Ok(s.to_string()),
        other => Err(call.type_error(format!("{} expects a string {role}, found {}",
                                             call.name(),
                                             describe(other.as_ref())))),
    }
}

/// Splits text on a literal separator.
///
/// Forms: `split sep` (the parent is the text) and `split text sep`.
///
/// - Empty text yields `[""]`, whatever the separator.
/// - An empty separator splits the text into its characters.
/// - Otherwise every occurrence of the separator splits, so leading, trailing
///   and repeated separators produce empty strings.
///
/// # Errors
/// Returns a type error if the text or the separator is not a string.
pub fn split(call: &Call<'_>) -> EvalResult<Outcome> {
    let text = string_operand(call, 2, 0, "to split")?;
    let sep = string_operand(call, 2, 1, "separator")?;

    let parts: Vec<Value> = if text.is_empty() {
        vec![Value::from("")]
    } else if sep.is_empty() {
        text.chars().map(|c| Value::from(c.to_string())).collect()
    } else {
        text.split(sep.as_str()).map(Value::from).collect()
    };

    Ok(Outcome::from(Value::from(parts)))
}

/// Joins the text rendering of a sequence's elements.
///
/// Forms: `join sep` (the parent is the sequence) and `join seq sep`. Sets
/// join in insertion order.
///
/// # Errors
/// Returns [`RuntimeError::ExpectedSequence`] for a non-sequence operand and a
/// type error for a non-string separator.
pub fn join(call: &Call<'_>) -> EvalResult<Outcome> {
    let source = call.operand(2, 0)?;
    let sep = string_operand(call, 2, 1, "separator")?;

    let rendered: Vec<String> = match &source {
        Some(Value::Sequence(items)) => items.iter().map(ToString::to_string).collect(),
        Some(Value::Set(set)) => set.iter().map(ToString::to_string).collect(),
        other => {
            return Err(RuntimeError::ExpectedSequence { name:   call.name().to_string(),
                                                        found:  describe(other.as_ref()).to_string(),
                                                        offset: call.offset(), });
        },
    };

    Ok(Outcome::from(Value::from(rendered.join(&sep))))
}

/// Concatenates text.
///
/// As a pipe stage, the parent's text comes first and each argument's text
/// follows: `.name | concat "!"`. Elsewhere only the arguments are joined,
/// since the parent would be the whole current value. Absent and `null`
/// render as nothing.
pub fn concat(call: &Call<'_>) -> EvalResult<Outcome> {
    let mut out = String::new();
    if call.is_piped() {
        out.push_str(&render_text(call.parent()));
    }
    for value in call.args()? {
        out.push_str(&render_text(value.as_ref()));
    }

    Ok(Outcome::from(Value::from(out)))
}
