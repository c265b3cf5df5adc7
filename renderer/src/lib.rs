//! Template rendering core: compiles author templates into augmented
//! source, parses and evaluates the result against the block builders in
//! `blockkit`, and maps reported positions back to author coordinates.
//!
//! The pipeline is three pure stages. [`Compiler`] wraps a template with a
//! variant-specific preamble and postamble, [`parser::Parser`] turns the
//! augmented source into a [`ast::Program`], and [`evaluator::evaluate`]
//! walks the program against a host-supplied [`RenderingContext`]. Error
//! spans always refer to the augmented source; [`translate_location`]
//! shifts them back onto the author's lines.

pub mod ast;
pub mod compiler;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod location;
pub mod parser;
pub mod partials;

pub use compiler::{Compiler, OutputFormat, POSTAMBLE_LINES, PREAMBLE_LINES, Variant};
pub use context::{NullContext, RenderingContext};
pub use error::{DiagnosticError, ParseError, RenderError, RenderFailure};
pub use location::{Location, translate as translate_location};

use serde_json::Value;

/// Compile, parse and evaluate a template in one pass. `source_id` is the
/// codespan file ID the augmented source was (or will be) registered under;
/// hosts that don't report diagnostics can pass 0.
pub fn render(
    source: &str,
    format: Option<OutputFormat>,
    ctx: &mut dyn RenderingContext,
    source_id: usize,
) -> Result<Value, RenderFailure> {
    let augmented = Compiler::for_format(format).compile(source);
    let program = parser::Parser::new(augmented, source_id)
        .parse()
        .map_err(RenderFailure::Parse)?;
    evaluator::evaluate(&program, ctx).map_err(RenderFailure::Eval)
}
