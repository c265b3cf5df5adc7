use std::ops::Range;

/// A parsed template script.
#[derive(Debug, Clone)]
pub struct Program {
    pub stmts: Vec<Stmt>,
    /// The source file ID (for error reporting with codespan-reporting).
    pub source_id: usize,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    /// A builder/helper call, optionally carrying a `do … end` body.
    Call {
        call: CallExpr,
        body: Option<Vec<Stmt>>,
        span: Range<usize>,
    },
    /// A `%name arg` compiler directive. Only ever emitted by the template
    /// compiler's preamble/postamble, never written by authors.
    Directive {
        name: String,
        arg: String,
        span: Range<usize>,
    },
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub name: String,
    pub name_span: Range<usize>,
    pub args: Vec<Expr>,
    pub kwargs: Vec<(String, Expr)>,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Str(String),
    Num(f64),
    Bool(bool),
    Array(Vec<Expr>),
    /// Ambient local supplied by the rendering context.
    Ident(String, Range<usize>),
    /// Parenthesized call in expression position.
    Call(Box<CallExpr>),
}
