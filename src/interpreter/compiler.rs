use std::{collections::BTreeSet, sync::Arc};

use crate::{
    ast::{ClosureDef, Expr, LiteralValue, Template, TemplatePart},
    error::ParseError,
    interpreter::{parser::core::ParseResult, value::core::Value},
    util::num::parse_index,
};

/// Options that affect compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Names that `$name` references outside closure parameters may use.
    /// Every invocation of the compiled unit must supply them.
    pub globals: Vec<String>,
}

impl CompileOptions {
    /// Declares one more global name.
    ///
    /// ## Example
    /// ```
    /// use weft::interpreter::compiler::CompileOptions;
    ///
    /// let options = CompileOptions::default().with_global("request");
    /// assert_eq!(options.globals, ["request"]);
    /// ```
    #[must_use]
    pub fn with_global(mut self, name: impl Into<String>) -> Self {
        self.globals.push(name.into());
        self
    }
}

/// One step of an accessor path.
///
/// The numeric reading of the field name is worked out once here so that
/// sequence indexing does not reparse it on every evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Field name as written.
    pub name:  String,
    /// The name read as a sequence index, if it is all digits.
    pub index: Option<usize>,
}

impl From<&String> for Segment {
    fn from(name: &String) -> Self {
        Self { name:  name.clone(),
               index: parse_index(name), }
    }
}

/// Where an accessor path starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Root {
    /// The current value `.`.
    Current,
    /// A global supplied by the invocation context.
    Global(String),
    /// A parameter of an enclosing closure.
    Param(String),
}

/// A compiled closure: its parameters and compiled body.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosureNode {
    /// The closure name, without the `@`.
    pub name:   String,
    /// Parameter names in order.
    pub params: Vec<String>,
    /// The body, evaluated with `.` bound to the parent.
    pub body:   Node,
    /// Byte offset of the definition.
    pub offset: usize,
}

/// A node of the compiled tree that the evaluator walks.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A constant.
    Literal(Value),
    /// An accessor path from the current value, a global or a parameter.
    Access {
        /// Where the path starts.
        root:   Root,
        /// The steps to take from the root.
        path:   Vec<Segment>,
        /// Byte offset in the source text.
        offset: usize,
    },
    /// A pipe chain.
    Pipe {
        /// Produces the initial value.
        head:   Box<Self>,
        /// Each receives the previous result as its parent.
        stages: Vec<Self>,
    },
    /// A call of a registry entry, resolved by name at evaluation time.
    Call {
        /// The function name.
        name:      String,
        /// Unevaluated arguments.
        arguments: Vec<Self>,
        /// Byte offset in the source text.
        offset:    usize,
    },
    /// Binds a closure for the rest of the pipe.
    DefineClosure(Arc<ClosureNode>),
    /// An `@name` invocation, looked up in scope and then in the registry.
    InvokeClosure {
        /// The closure name.
        name:      String,
        /// Unevaluated arguments.
        arguments: Vec<Self>,
        /// Byte offset in the source text.
        offset:    usize,
    },
}

/// A piece of a compiled template.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateSegment {
    /// Literal text.
    Text(String),
    /// An expression whose result is rendered as text.
    Expr(Node),
}

/// The output of compiling an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression {
    /// The compiled tree.
    pub root:    Node,
    /// Globals the tree references, sorted.
    pub globals: Vec<String>,
}

/// The output of compiling a template.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTemplate {
    /// Text and expression segments in order. Adjacent text is merged and
    /// empty spans are dropped.
    pub segments: Vec<TemplateSegment>,
    /// Globals the segments reference, sorted.
    pub globals:  Vec<String>,
}

/// Lowers parsed trees into compiled nodes.
///
/// A compiler checks every global reference against its [`CompileOptions`]
/// and collects the ones it saw.
struct Compiler<'a> {
    options:    &'a CompileOptions,
    referenced: BTreeSet<String>,
}

impl<'a> Compiler<'a> {
    const fn new(options: &'a CompileOptions) -> Self {
        Self { options,
               referenced: BTreeSet::new() }
    }

    fn into_globals(self) -> Vec<String> {
        self.referenced.into_iter().collect()
    }

    fn lower(&mut self, expr: &Expr) -> ParseResult<Node> {
        match expr {
            Expr::Literal { value, .. } => Ok(Node::Literal(literal_value(value))),
            Expr::Accessor { path, offset } => Ok(Node::Access { root:   Root::Current,
                                                                 path:   segments(path),
                                                                 offset: *offset, }),
            Expr::VariableRef { name, path, offset } => {
                Ok(Node::Access { root:   Root::Param(name.clone()),
                                  path:   segments(path),
                                  offset: *offset, })
            },
            Expr::GlobalAccessor { name, path, offset } => {
                if !self.options.globals.iter().any(|g| g == name) {
                    return Err(ParseError::UndeclaredGlobal { name:   name.clone(),
                                                              offset: *offset, });
                }
                self.referenced.insert(name.clone());
                Ok(Node::Access { root:   Root::Global(name.clone()),
                                  path:   segments(path),
                                  offset: *offset, })
            },
            Expr::Pipe { head, stages, .. } => {
                let head = self.lower(head)?;
                let stages = self.lower_all(stages)?;
                Ok(Node::Pipe { head: Box::new(head),
                                stages })
            },
            Expr::FunctionCall { name,
                                 arguments,
                                 offset, } => Ok(Node::Call { name:      name.clone(),
                                                              arguments: self.lower_all(arguments)?,
                                                              offset:    *offset, }),
            Expr::ClosureDefinition(def) => Ok(Node::DefineClosure(Arc::new(self.lower_closure(def)?))),
            Expr::ClosureInvocation { name,
                                      arguments,
                                      offset, } => {
                Ok(Node::InvokeClosure { name:      name.clone(),
                                         arguments: self.lower_all(arguments)?,
                                         offset:    *offset, })
            },
        }
    }

    fn lower_all(&mut self, exprs: &[Expr]) -> ParseResult<Vec<Node>> {
        exprs.iter().map(|e| self.lower(e)).collect()
    }

    fn lower_closure(&mut self, def: &ClosureDef) -> ParseResult<ClosureNode> {
        Ok(ClosureNode { name:   def.name.clone(),
                         params: def.params.clone(),
                         body:   self.lower(&def.body)?,
                         offset: def.offset, })
    }
}

fn literal_value(value: &LiteralValue) -> Value {
    match value {
        LiteralValue::String(s) => Value::from(s.as_str()),
        LiteralValue::Number(n) => Value::Number(*n),
        LiteralValue::Bool(b) => Value::Bool(*b),
        LiteralValue::Null => Value::Null,
    }
}

fn segments(path: &[String]) -> Vec<Segment> {
    path.iter().map(Segment::from).collect()
}

/// Compiles a parsed expression.
///
/// # Errors
/// Returns [`ParseError::UndeclaredGlobal`] for a `$name` reference that is
/// neither a closure parameter nor listed in `options`.
///
/// ## Example
/// ```
/// use weft::interpreter::{
///     compiler::{CompileOptions, compile_expression},
///     parser::core::parse_expression,
/// };
///
/// let expr = parse_expression("$user.name").unwrap();
///
/// assert!(compile_expression(&expr, &CompileOptions::default()).is_err());
///
/// let options = CompileOptions::default().with_global("user");
/// let compiled = compile_expression(&expr, &options).unwrap();
/// assert_eq!(compiled.globals, ["user"]);
/// ```
pub fn compile_expression(expr: &Expr, options: &CompileOptions) -> ParseResult<CompiledExpression> {
    let mut compiler = Compiler::new(options);
    let root = compiler.lower(expr)?;
    Ok(CompiledExpression { root,
                            globals: compiler.into_globals() })
}

/// Compiles a parsed template.
///
/// # Errors
/// Same as [`compile_expression`], for any embedded expression.
pub fn compile_template(template: &Template, options: &CompileOptions) -> ParseResult<CompiledTemplate> {
    let mut compiler = Compiler::new(options);
    let mut segments = Vec::with_capacity(template.parts.len());

    for part in &template.parts {
        match part {
            TemplatePart::Text(text) => {
                if let Some(TemplateSegment::Text(previous)) = segments.last_mut() {
                    previous.push_str(text);
                } else {
                    segments.push(TemplateSegment::Text(text.clone()));
                }
            },
            TemplatePart::Expr(Some(expr)) => segments.push(TemplateSegment::Expr(compiler.lower(expr)?)),
            TemplatePart::Expr(None) => {},
        }
    }

    Ok(CompiledTemplate { segments,
                          globals: compiler.into_globals() })
}

/// Compiles a closure definition for the registry.
///
/// Registered closures have no invocation context of their own, so their
/// bodies may only refer to their parameters.
///
/// # Errors
/// Returns [`ParseError::UndeclaredGlobal`] for any other `$name`.
pub fn compile_closure(def: &ClosureDef) -> ParseResult<ClosureNode> {
    let options = CompileOptions::default();
    Compiler::new(&options).lower_closure(def)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::parser::{
        core::{parse_closure_definition, parse_expression},
        template::parse_template,
    };

    #[test]
    fn segments_carry_indices() {
        let expr = parse_expression(".items.0.name").unwrap();
        let compiled = compile_expression(&expr, &CompileOptions::default()).unwrap();
        let Node::Access { root, path, .. } = compiled.root else {
            panic!("expected an accessor");
        };

        assert_eq!(root, Root::Current);
        assert_eq!(path.iter().map(|s| s.index).collect::<Vec<_>>(), [None, Some(0), None]);
    }

    #[test]
    fn template_text_is_merged_and_empty_spans_dropped() {
        let template = parse_template(r"a{}b\{{.x}").unwrap();
        let compiled = compile_template(&template, &CompileOptions::default()).unwrap();

        assert_eq!(compiled.segments.len(), 2);
        assert_eq!(compiled.segments[0], TemplateSegment::Text("ab{".into()));
    }

    #[test]
    fn globals_are_collected_once() {
        let template = parse_template("{$a} {$b.x} {$a.y}").unwrap();
        let options = CompileOptions::default().with_global("b").with_global("a");
        let compiled = compile_template(&template, &options).unwrap();

        assert_eq!(compiled.globals, ["a", "b"]);
    }

    #[test]
    fn undeclared_global_in_template() {
        let template = parse_template("x {$missing}").unwrap();
        let err = compile_template(&template, &CompileOptions::default()).unwrap_err();

        assert_eq!(err,
                   ParseError::UndeclaredGlobal { name:   "missing".into(),
                                                  offset: 3, });
    }

    #[test]
    fn closure_parameters_are_not_globals() {
        let def = parse_closure_definition("@f(x) => ($x.id)").unwrap();
        assert!(compile_closure(&def).is_ok());

        let def = parse_closure_definition("@f(x) => ($y)").unwrap();
        assert!(compile_closure(&def).is_err());
    }
}
