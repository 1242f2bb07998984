use std::sync::Arc;

use crate::interpreter::{
    evaluator::{
        core::EvalResult,
        function::{
            core::{Arity, Call, Outcome, check_arity},
            logic, random, sequence, set, text,
        },
    },
    registry::{Function, ParserContext},
};

/// Type alias for builtin function handlers.
///
/// A builtin receives the call and returns an [`Outcome`].
type BuiltinFn = fn(&Call<'_>) -> EvalResult<Outcome>;

/// Defines builtin functions by generating a lookup table and a name list.
///
/// Each entry provides:
/// - a string name,
/// - an arity specification,
/// - a function pointer implementing the builtin.
///
/// The macro produces:
/// - `BuiltinDef` (internal metadata),
/// - `BUILTIN_TABLE` (static table for registration),
/// - `BUILTIN_FUNCTIONS` (public list of builtin names).
macro_rules! builtin_functions {
    (
        $(
            $name:literal => {
                arity: $arity:expr,
                func: $func:expr $(,)?
            }
        ),* $(,)?
    ) => {
        struct BuiltinDef {
            name:  &'static str,
            arity: Arity,
            func:  BuiltinFn,
        }
        static BUILTIN_TABLE: &[BuiltinDef] = &[
            $(
                BuiltinDef { name: $name, arity: $arity, func: $func },
            )*
        ];
        pub const BUILTIN_FUNCTIONS: &[&str] = &[
            $($name,)*
        ];
    };
}

builtin_functions! {
    "map"     => { arity: Arity::OneOf(&[1, 2]),    func: sequence::map },
    "len"     => { arity: Arity::OneOf(&[0, 1]),    func: sequence::len },
    "split"   => { arity: Arity::OneOf(&[1, 2]),    func: text::split },
    "join"    => { arity: Arity::OneOf(&[1, 2]),    func: text::join },
    "concat"  => { arity: Arity::AtLeast(0),        func: text::concat },
    "rand"    => { arity: Arity::OneOf(&[0, 1, 2]), func: random::rand },
    "eq"      => { arity: Arity::OneOf(&[1, 2]),    func: logic::eq },
    "and"     => { arity: Arity::OneOf(&[1, 2]),    func: logic::and },
    "or"      => { arity: Arity::OneOf(&[1, 2]),    func: logic::or },
    "not"     => { arity: Arity::OneOf(&[0, 1]),    func: logic::not },
    "default" => { arity: Arity::OneOf(&[1, 2]),    func: logic::default },
    "set_new" => { arity: Arity::Exact(0),          func: set::set_new },
    "set_add" => { arity: Arity::OneOf(&[1, 2]),    func: set::set_add },
    "set_has" => { arity: Arity::OneOf(&[1, 2]),    func: set::set_has },
}

/// Registers every builtin in `context`.
///
/// Builtins are ordinary registry entries: registering another function under
/// the same name replaces one. Each entry checks its argument count before
/// running.
///
/// ## Example
/// ```
/// use weft::interpreter::{
///     evaluator::function::builtin::{BUILTIN_FUNCTIONS, install},
///     registry::ParserContext,
/// };
///
/// let context = ParserContext::new();
/// install(&context);
///
/// assert!(BUILTIN_FUNCTIONS.iter().all(|name| context.contains(name)));
/// ```
pub fn install(context: &ParserContext) {
    for def in BUILTIN_TABLE {
        let native = move |call: &Call<'_>| {
            check_arity(call, def.arity)?;
            (def.func)(call)
        };
        context.register(def.name, Function::Native(Arc::new(native)));
    }
}
