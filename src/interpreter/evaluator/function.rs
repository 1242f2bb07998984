/// The builtin table.
///
/// Lists every builtin with its arity and installs them into a registry.
pub mod builtin;
/// Call and outcome types shared by every native function.
///
/// Defines the [`Call`](core::Call) a native function receives, the
/// [`Outcome`](core::Outcome) it returns, and the arity checks the builtin
/// table relies on.
pub mod core;
/// `eq`, `and`, `or`, `not` and `default`.
pub mod logic;
/// The `rand` function.
pub mod random;
/// `map` and `len`.
pub mod sequence;
/// `set_new`, `set_add` and `set_has`.
pub mod set;
/// `split`, `join` and `concat`.
pub mod text;
