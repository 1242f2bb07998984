/// Represents a literal value in the language.
///
/// `LiteralValue` covers the constants that can appear directly in source
/// text: strings, numbers, booleans and `null`.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// A string literal with escapes already resolved.
    String(String),
    /// A number literal.
    Number(f64),
    /// A boolean literal value: `true` or `false`.
    Bool(bool),
    /// The `null` literal.
    Null,
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// An abstract syntax tree (AST) node representing an expression in the
/// language.
///
/// Each variant models a distinct syntactic construct and records the byte
/// offset of its first token for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value (string, number, boolean or null).
    Literal {
        /// The constant value.
        value:  LiteralValue,
        /// Byte offset in the source text.
        offset: usize,
    },
    /// A field path rooted at the current value, such as `.` or `.user.id`.
    Accessor {
        /// Field names, outermost first. Empty for `.` itself.
        path:   Vec<String>,
        /// Byte offset in the source text.
        offset: usize,
    },
    /// A field path rooted at a named global, such as `$request.id`.
    GlobalAccessor {
        /// Name of the global.
        name:   String,
        /// Field names following the global.
        path:   Vec<String>,
        /// Byte offset in the source text.
        offset: usize,
    },
    /// A reference to a closure parameter, such as `$val` or `$val.id`.
    VariableRef {
        /// Name of the parameter.
        name:   String,
        /// Field names following the parameter.
        path:   Vec<String>,
        /// Byte offset in the source text.
        offset: usize,
    },
    /// A pipe chain: `head | stage | stage ...`.
    Pipe {
        /// The term that produces the initial value.
        head:   Box<Self>,
        /// Calls that each receive the previous result as their parent.
        stages: Vec<Self>,
        /// Byte offset in the source text.
        offset: usize,
    },
    /// A call of a registered function, such as `split ","`.
    FunctionCall {
        /// Name of the function being called.
        name:      String,
        /// Arguments to the function.
        arguments: Vec<Self>,
        /// Byte offset in the source text.
        offset:    usize,
    },
    /// A closure definition, `@name(params) => ( body )`.
    ClosureDefinition(ClosureDef),
    /// A closure invocation, such as `@greet "bob"`.
    ClosureInvocation {
        /// Name of the closure, without the `@`.
        name:      String,
        /// Arguments bound to the closure's parameters.
        arguments: Vec<Self>,
        /// Byte offset in the source text.
        offset:    usize,
    },
}

impl Expr {
    /// Gets the byte offset from `self`.
    /// ## Example
    /// ```
    /// use weft::ast::Expr;
    ///
    /// let expr = Expr::Accessor { path:   vec!["id".to_string()],
    ///                             offset: 5, };
    ///
    /// assert_eq!(expr.offset(), 5);
    /// ```
    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::Literal { offset, .. }
            | Self::Accessor { offset, .. }
            | Self::GlobalAccessor { offset, .. }
            | Self::VariableRef { offset, .. }
            | Self::Pipe { offset, .. }
            | Self::FunctionCall { offset, .. }
            | Self::ClosureInvocation { offset, .. }
            | Self::ClosureDefinition(ClosureDef { offset, .. }) => *offset,
        }
    }
}

/// Represents a user-defined closure.
///
/// A closure binds an ordered list of parameter names to an expression body.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosureDef {
    /// The name of the closure, without the `@`.
    pub name:   String,
    /// The parameter names, referenced as `$name` in the body.
    pub params: Vec<String>,
    /// The body expression evaluated when the closure is invoked.
    pub body:   Box<Expr>,
    /// Byte offset in the source text.
    pub offset: usize,
}

/// One piece of an interpolation template.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    /// Literal text with escapes already resolved.
    Text(String),
    /// An embedded `{ ... }` span. `None` for an empty span.
    Expr(Option<Expr>),
}

/// A parsed interpolation template.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    /// Text runs and embedded expressions, in source order.
    pub parts: Vec<TemplatePart>,
}
