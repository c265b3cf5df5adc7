use serde_json::{Map, Value};

use crate::compiler::OutputFormat;
use crate::error::RenderError;

/// The ambient scope a host supplies to one template evaluation: locals
/// readable by bare identifiers, named helper capabilities reachable through
/// the method-resolution fallback, and sub-template rendering for partial
/// composition.
pub trait RenderingContext {
    /// Look up an ambient local by name.
    fn local(&self, name: &str) -> Option<Value>;

    /// Whether the context exposes a helper with this name. Checked after
    /// the builder's own operation table.
    fn has_capability(&self, name: &str) -> bool;

    /// Invoke a helper. Only called when `has_capability` returned true.
    fn call_capability(
        &mut self,
        name: &str,
        args: &[Value],
        kwargs: &Map<String, Value>,
    ) -> Result<Value, RenderError>;

    /// Render a sub-template by conventional name and return its output
    /// text (a JSON block document for block-format partials).
    fn render_partial(
        &mut self,
        name: &str,
        locals: &Map<String, Value>,
        format: OutputFormat,
    ) -> Result<String, RenderError>;
}

/// A context with no locals, no helpers and no partials.
pub struct NullContext;

impl RenderingContext for NullContext {
    fn local(&self, _name: &str) -> Option<Value> {
        None
    }

    fn has_capability(&self, _name: &str) -> bool {
        false
    }

    fn call_capability(
        &mut self,
        name: &str,
        _args: &[Value],
        _kwargs: &Map<String, Value>,
    ) -> Result<Value, RenderError> {
        Err(RenderError::NoCapability(name.to_string()))
    }

    fn render_partial(
        &mut self,
        name: &str,
        _locals: &Map<String, Value>,
        _format: OutputFormat,
    ) -> Result<String, RenderError> {
        Err(RenderError::Custom(format!(
            "this context cannot render partials (requested '{}')",
            name
        )))
    }
}
