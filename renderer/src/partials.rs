//! Partial composition: resolve an item to a conventionally-named
//! sub-template, render it through the host, and extract its block array.

use serde_json::{Map, Value};

use crate::compiler::OutputFormat;
use crate::context::RenderingContext;
use crate::error::RenderError;

/// Render one item or a sequence of items into a flat block list. Arrays
/// fan out through the single-item path in order; an empty array yields an
/// empty list.
pub fn render_blocks(
    ctx: &mut dyn RenderingContext,
    target: &Value,
    locals: &Map<String, Value>,
) -> Result<Vec<Value>, RenderError> {
    match target {
        Value::Array(items) => {
            let mut blocks = Vec::new();
            for item in items {
                blocks.extend(render_item(ctx, item, locals)?);
            }
            Ok(blocks)
        }
        other => render_item(ctx, other, locals),
    }
}

fn render_item(
    ctx: &mut dyn RenderingContext,
    item: &Value,
    locals: &Map<String, Value>,
) -> Result<Vec<Value>, RenderError> {
    let kind = item
        .as_object()
        .and_then(|obj| obj.get("type"))
        .and_then(Value::as_str)
        .ok_or_else(|| RenderError::BadArgument {
            op: "render".to_string(),
            detail: "item must be an object with a string 'type' field".to_string(),
        })?;

    // users/user for type "user". Plain `s` pluralization; good enough for
    // the naming convention this establishes.
    let partial_name = format!("{}s/{}", kind, kind);

    // The item binding wins a name conflict with caller locals.
    let mut merged = locals.clone();
    merged.insert(kind.to_string(), item.clone());

    let output = ctx.render_partial(&partial_name, &merged, OutputFormat::SlackMessage)?;
    let document: Value = serde_json::from_str(&output)
        .map_err(|e| RenderError::MalformedPartial(format!("{} ('{}')", e, partial_name)))?;

    // A document without a blocks array is an empty result, not an error.
    match document.get("blocks") {
        Some(Value::Array(blocks)) => Ok(blocks.clone()),
        _ => Ok(Vec::new()),
    }
}
