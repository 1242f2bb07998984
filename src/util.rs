/// Numeric conversion and formatting helpers.
///
/// This module provides the conversions the interpreter needs between
/// `usize`, `f64` and text: lossless counts, loose parsing of numeric strings,
/// canonical number rendering, and accessor index parsing.
pub mod num;
