/// Set value representation.
///
/// Defines the `SetValue` type used by `Value::Set`. Sets are immutable: adding
/// a member produces a new set and leaves the original untouched, so a set
/// can be shared freely between evaluations.
///
/// Membership uses the same loose equality as the `eq` builtin.
pub mod set_value;

/// Loose comparison rules.
///
/// Implements the coercing equality used by `eq` and by set membership, and
/// the truthiness rules used by `and`, `or` and `not`.
pub mod compare;

/// Conversions between values, host data and text.
///
/// Covers `serde_json` interop, `From` implementations for Rust primitives,
/// and the text rendering used by templates.
pub mod convert;

/// The runtime value type.
///
/// Declares the `Value` enum and the `HostObject` trait for opaque values
/// supplied by the host.
pub mod core;
