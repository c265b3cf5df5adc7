//! Evaluates augmented source against a builder surface. Directives pick
//! the surface and yield the built structure; every other statement is a
//! call resolved in two stages: the builder's operation table first, then
//! the rendering context's capabilities, else a NoCapability error.

use std::ops::Range;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use blockkit::rich_text::{RichTextBuilder, RichTextSectionBuilder};
use blockkit::{BlocksBuilder, ModalBuilder, TextArg, elements};

use crate::ast::{CallExpr, Expr, Program, Stmt};
use crate::context::RenderingContext;
use crate::error::{DiagnosticError, RenderError};
use crate::partials;

enum Surface {
    Blocks(BlocksBuilder),
    Modal(ModalBuilder),
}

/// Evaluate a parsed augmented-source program to the built structure:
/// `{"blocks": […]}` for the blocks variant, the modal record for the modal
/// variant. Error spans are in augmented-source coordinates.
pub fn evaluate(
    program: &Program,
    ctx: &mut dyn RenderingContext,
) -> Result<Value, DiagnosticError> {
    let source_id = program.source_id;
    let mut surface: Option<Surface> = None;
    let mut fallback = false;
    let mut result: Option<Value> = None;

    for stmt in &program.stmts {
        match stmt {
            Stmt::Directive { name, arg, span } => {
                match (name.as_str(), arg.as_str()) {
                    ("builder", "blocks") => surface = Some(Surface::Blocks(BlocksBuilder::new())),
                    ("builder", "modal") => surface = Some(Surface::Modal(ModalBuilder::new())),
                    ("fallback", "context") => fallback = true,
                    ("yield", "blocks") => match surface.take() {
                        Some(Surface::Blocks(builder)) => {
                            result = Some(json!({ "blocks": builder.into_blocks() }));
                        }
                        _ => {
                            return Err(DiagnosticError::new(
                                RenderError::BadDirective(
                                    "%yield blocks without a blocks builder".to_string(),
                                ),
                                span.clone(),
                                source_id,
                            ));
                        }
                    },
                    ("yield", "modal") => match surface.take() {
                        Some(Surface::Modal(builder)) => {
                            let modal = builder.finish().map_err(|_| {
                                DiagnosticError::new(
                                    RenderError::MissingTitle,
                                    span.clone(),
                                    source_id,
                                )
                            })?;
                            result = Some(modal);
                        }
                        _ => {
                            return Err(DiagnosticError::new(
                                RenderError::BadDirective(
                                    "%yield modal without a modal builder".to_string(),
                                ),
                                span.clone(),
                                source_id,
                            ));
                        }
                    },
                    _ => {
                        return Err(DiagnosticError::new(
                            RenderError::BadDirective(format!("%{} {}", name, arg)),
                            span.clone(),
                            source_id,
                        ));
                    }
                }
            }
            Stmt::Call { call, body, span } => {
                let Some(active) = surface.as_mut() else {
                    return Err(DiagnosticError::new(
                        RenderError::Custom("call before %builder directive".to_string()),
                        span.clone(),
                        source_id,
                    ));
                };
                eval_builder_stmt(active, call, body.as_deref(), span, ctx, fallback, source_id)?;
            }
        }
    }

    result.ok_or_else(|| {
        RenderError::Custom("augmented source yielded no structure".to_string()).into()
    })
}

// ---------------------------------------------------------------------------
// Statement dispatch
// ---------------------------------------------------------------------------

fn eval_builder_stmt(
    surface: &mut Surface,
    call: &CallExpr,
    body: Option<&[Stmt]>,
    span: &Range<usize>,
    ctx: &mut dyn RenderingContext,
    fallback: bool,
    source_id: usize,
) -> Result<(), DiagnosticError> {
    // Modal setters shadow nothing in the block table, so try them first.
    if let Surface::Modal(modal) = surface {
        let recognized = matches!(call.name.as_str(), "title" | "submit" | "close" | "callback");
        if recognized {
            let args = Args::from_call(call, ctx, fallback, source_id)?;
            reject_body(&args, body)?;
            args.check_len(1, 1)?;
            args.no_leftover_kwargs()?;
            let text = args.req_str(0, "text")?;
            match call.name.as_str() {
                "title" => modal.title(&text),
                "submit" => modal.submit(&text),
                "close" => modal.close(&text),
                "callback" => modal.callback(&text),
                _ => unreachable!(),
            }
            return Ok(());
        }
    }

    let builder = match surface {
        Surface::Blocks(builder) => builder,
        Surface::Modal(modal) => modal.blocks_mut(),
    };

    // rich_text is the one block op that owns a statement body.
    if call.name == "rich_text" {
        let args = Args::from_call(call, ctx, fallback, source_id)?;
        args.check_len(0, 0)?;
        args.no_leftover_kwargs()?;
        let rich = eval_rich_text_body(body.unwrap_or(&[]), ctx, fallback, source_id)?;
        builder.append(rich.into_block());
        return Ok(());
    }

    if call.name == "render" {
        let mut args = Args::from_call(call, ctx, fallback, source_id)?;
        reject_body(&args, body)?;
        args.check_len(1, 1)?;
        let target = args.req_value(0, "item")?;
        let locals = args.take_locals()?;
        args.no_leftover_kwargs()?;
        let blocks = partials::render_blocks(ctx, &target, &locals)
            .map_err(|e| DiagnosticError::new(e, span.clone(), source_id))?;
        for block in blocks {
            builder.append(block);
        }
        return Ok(());
    }

    let mut args = Args::from_call(call, ctx, fallback, source_id)?;
    if block_op(builder, &mut args)? {
        reject_body(&args, body)?;
        return Ok(());
    }

    // Element factories are valid statements too; the record is discarded,
    // but argument errors still surface.
    if element_op(&mut args)?.is_some() {
        reject_body(&args, body)?;
        return Ok(());
    }

    if fallback && ctx.has_capability(&call.name) {
        reject_body(&args, body)?;
        ctx.call_capability(&call.name, &args.values, &args.kwargs)
            .map_err(|e| DiagnosticError::new(e, call.name_span.clone(), source_id))?;
        return Ok(());
    }

    Err(DiagnosticError::new(
        RenderError::NoCapability(call.name.clone()),
        call.name_span.clone(),
        source_id,
    ))
}

fn reject_body(args: &Args, body: Option<&[Stmt]>) -> Result<(), DiagnosticError> {
    if body.is_some() {
        Err(args.err(format!("'{}' does not take a do-block", args.op)))
    } else {
        Ok(())
    }
}

/// Try `args.op` as a block factory. Returns false when unrecognized.
fn block_op(builder: &mut BlocksBuilder, args: &mut Args) -> Result<bool, DiagnosticError> {
    match args.op.as_str() {
        "header" => {
            args.check_len(1, 1)?;
            let text = args.req_text(0, "text")?;
            args.no_leftover_kwargs()?;
            builder.header(text);
        }
        "section" => {
            args.check_len(0, 1)?;
            let text = args.opt_text(0, "text")?;
            let opts = args.opts()?;
            builder.section(text, opts);
        }
        "simple_section" => {
            args.check_len(1, 1)?;
            let text = args.req_text(0, "text")?;
            args.no_leftover_kwargs()?;
            builder.simple_section(text);
        }
        "divider" => {
            args.check_len(0, 0)?;
            args.no_leftover_kwargs()?;
            builder.divider();
        }
        "context" => {
            args.check_len(1, 1)?;
            let elements = args.req_array(0, "elements")?;
            args.no_leftover_kwargs()?;
            builder.context(elements);
        }
        "context_actions" => {
            args.check_len(1, 1)?;
            let elements = args.req_array(0, "elements")?;
            let opts = args.opts()?;
            builder.context_actions(elements, opts);
        }
        "actions" => {
            args.check_len(1, 1)?;
            let elements = args.req_array(0, "elements")?;
            args.no_leftover_kwargs()?;
            builder.actions(elements);
        }
        "image" => {
            args.check_len(2, 2)?;
            let image_url = args.req_str(0, "image_url")?;
            let alt_text = args.req_str(1, "alt_text")?;
            let opts = args.opts()?;
            builder.image(&image_url, &alt_text, opts);
        }
        "input" => {
            args.check_len(2, 2)?;
            let label = args.req_text(0, "label")?;
            let element = args.req_value(1, "element")?;
            let opts = args.opts()?;
            builder.input(label, element, opts);
        }
        "file" => {
            args.check_len(1, 1)?;
            let external_id = args.req_str(0, "external_id")?;
            let opts = args.opts()?;
            builder.file(&external_id, opts);
        }
        "video" => {
            args.check_len(4, 4)?;
            let title = args.req_text(0, "title")?;
            let title_url = args.req_str(1, "title_url")?;
            let thumbnail_url = args.req_str(2, "thumbnail_url")?;
            let video_url = args.req_str(3, "video_url")?;
            let alt_text = args.req_kwarg_str("alt_text")?;
            let opts = args.opts()?;
            builder.video(title, &title_url, &thumbnail_url, &video_url, &alt_text, opts);
        }
        _ => return Ok(false),
    }
    Ok(true)
}

/// Try `args.op` as an element factory. Returns the finished record, or
/// None when unrecognized.
fn element_op(args: &mut Args) -> Result<Option<Value>, DiagnosticError> {
    let record = match args.op.as_str() {
        "image_element" => {
            args.check_len(2, 2)?;
            let image_url = args.req_str(0, "image_url")?;
            let alt_text = args.req_str(1, "alt_text")?;
            args.no_leftover_kwargs()?;
            elements::image_element(&image_url, &alt_text)
        }
        "mrkdwn_text" => {
            args.check_len(1, 1)?;
            let text = args.req_str(0, "text")?;
            args.no_leftover_kwargs()?;
            elements::mrkdwn_text(&text)
        }
        "plain_text" => {
            args.check_len(1, 1)?;
            let text = args.req_str(0, "text")?;
            elements::plain_text(&text, args.opts()?)
        }
        "button" => {
            args.check_len(2, 2)?;
            let text = args.req_text(0, "text")?;
            let action_id = args.req_str(1, "action_id")?;
            elements::button(text, &action_id, args.opts()?)
        }
        "checkboxes" => {
            args.check_len(2, 2)?;
            let action_id = args.req_str(0, "action_id")?;
            let options = args.req_array(1, "options")?;
            elements::checkboxes(&action_id, options, args.opts()?)
        }
        "date_picker" => {
            args.check_len(1, 1)?;
            let action_id = args.req_str(0, "action_id")?;
            elements::date_picker(&action_id, args.opts()?)
        }
        "datetime_picker" => {
            args.check_len(1, 1)?;
            let action_id = args.req_str(0, "action_id")?;
            elements::datetime_picker(&action_id, args.opts()?)
        }
        "time_picker" => {
            args.check_len(1, 1)?;
            let action_id = args.req_str(0, "action_id")?;
            elements::time_picker(&action_id, args.opts()?)
        }
        "plain_text_input" => {
            args.check_len(1, 1)?;
            let action_id = args.req_str(0, "action_id")?;
            elements::plain_text_input(&action_id, args.opts()?)
        }
        "email_input" => {
            args.check_len(1, 1)?;
            let action_id = args.req_str(0, "action_id")?;
            elements::email_input(&action_id, args.opts()?)
        }
        "url_input" => {
            args.check_len(1, 1)?;
            let action_id = args.req_str(0, "action_id")?;
            elements::url_input(&action_id, args.opts()?)
        }
        "rich_text_input" => {
            args.check_len(1, 1)?;
            let action_id = args.req_str(0, "action_id")?;
            elements::rich_text_input(&action_id, args.opts()?)
        }
        "number_input" => {
            args.check_len(1, 1)?;
            let action_id = args.req_str(0, "action_id")?;
            let is_decimal_allowed = args.req_kwarg_bool("is_decimal_allowed")?;
            elements::number_input(&action_id, is_decimal_allowed, args.opts()?)
        }
        "radio_buttons" => {
            args.check_len(2, 2)?;
            let action_id = args.req_str(0, "action_id")?;
            let options = args.req_array(1, "options")?;
            elements::radio_buttons(&action_id, options, args.opts()?)
        }
        "select_menu" => {
            args.check_len(1, 1)?;
            let action_id = args.req_str(0, "action_id")?;
            let placeholder = args.req_kwarg_text("placeholder")?;
            elements::select_menu(&action_id, placeholder, args.opts()?)
        }
        "multi_select_menu" => {
            args.check_len(1, 1)?;
            let action_id = args.req_str(0, "action_id")?;
            let placeholder = args.req_kwarg_text("placeholder")?;
            elements::multi_select_menu(&action_id, placeholder, args.opts()?)
        }
        "users_select" => {
            args.check_len(1, 1)?;
            let action_id = args.req_str(0, "action_id")?;
            let placeholder = args.req_kwarg_text("placeholder")?;
            elements::users_select(&action_id, placeholder, args.opts()?)
        }
        "multi_users_select" => {
            args.check_len(1, 1)?;
            let action_id = args.req_str(0, "action_id")?;
            let placeholder = args.req_kwarg_text("placeholder")?;
            elements::multi_users_select(&action_id, placeholder, args.opts()?)
        }
        "conversations_select" => {
            args.check_len(1, 1)?;
            let action_id = args.req_str(0, "action_id")?;
            let placeholder = args.req_kwarg_text("placeholder")?;
            elements::conversations_select(&action_id, placeholder, args.opts()?)
        }
        "multi_conversations_select" => {
            args.check_len(1, 1)?;
            let action_id = args.req_str(0, "action_id")?;
            let placeholder = args.req_kwarg_text("placeholder")?;
            elements::multi_conversations_select(&action_id, placeholder, args.opts()?)
        }
        "channels_select" => {
            args.check_len(1, 1)?;
            let action_id = args.req_str(0, "action_id")?;
            let placeholder = args.req_kwarg_text("placeholder")?;
            elements::channels_select(&action_id, placeholder, args.opts()?)
        }
        "multi_channels_select" => {
            args.check_len(1, 1)?;
            let action_id = args.req_str(0, "action_id")?;
            let placeholder = args.req_kwarg_text("placeholder")?;
            elements::multi_channels_select(&action_id, placeholder, args.opts()?)
        }
        "overflow" => {
            args.check_len(2, 2)?;
            let action_id = args.req_str(0, "action_id")?;
            let options = args.req_array(1, "options")?;
            elements::overflow(&action_id, options, args.opts()?)
        }
        "file_input" => {
            args.check_len(1, 1)?;
            let action_id = args.req_str(0, "action_id")?;
            elements::file_input(&action_id, args.opts()?)
        }
        "workflow_button" => {
            args.check_len(1, 1)?;
            let text = args.req_text(0, "text")?;
            let workflow = args.req_kwarg_value("workflow")?;
            elements::workflow_button(text, workflow, args.opts()?)
        }
        "feedback_buttons" => {
            args.check_len(4, 4)?;
            let positive_text = args.req_str(0, "positive_text")?;
            let positive_value = args.req_str(1, "positive_value")?;
            let negative_text = args.req_str(2, "negative_text")?;
            let negative_value = args.req_str(3, "negative_value")?;
            elements::feedback_buttons(
                &positive_text,
                &positive_value,
                &negative_text,
                &negative_value,
                args.opts()?,
            )
        }
        "icon_button" => {
            args.check_len(3, 3)?;
            let icon = args.req_str(0, "icon")?;
            let text = args.req_text(1, "text")?;
            let action_id = args.req_str(2, "action_id")?;
            elements::icon_button(&icon, text, &action_id, args.opts()?)
        }
        "option" => {
            args.check_len(2, 2)?;
            let text = args.req_text(0, "text")?;
            let value = args.req_str(1, "value")?;
            elements::option(text, &value, args.opts()?)
        }
        "option_group" => {
            args.check_len(2, 2)?;
            let label = args.req_text(0, "label")?;
            let options = args.req_array(1, "options")?;
            args.no_leftover_kwargs()?;
            elements::option_group(label, options)
        }
        "confirm_dialog" => {
            args.check_len(0, 0)?;
            let title = args.req_kwarg_text("title")?;
            let text = args.req_kwarg_text("text")?;
            let confirm = args.req_kwarg_text("confirm")?;
            let deny = args.req_kwarg_text("deny")?;
            elements::confirm_dialog(title, text, confirm, deny, args.opts()?)
        }
        "dispatch_action_config" => {
            args.no_leftover_kwargs()?;
            elements::dispatch_action_config(args.values.clone())
        }
        "filter" => {
            args.check_len(0, 0)?;
            elements::filter(args.opts()?)
        }
        _ => return Ok(None),
    };
    Ok(Some(record))
}

// ---------------------------------------------------------------------------
// Rich-text scopes
// ---------------------------------------------------------------------------

fn eval_rich_text_body(
    body: &[Stmt],
    ctx: &mut dyn RenderingContext,
    fallback: bool,
    source_id: usize,
) -> Result<RichTextBuilder, DiagnosticError> {
    let mut rich = RichTextBuilder::new();
    for stmt in body {
        let Stmt::Call { call, body, span } = stmt else {
            return Err(directive_in_body(stmt, source_id));
        };
        let inner = body.as_deref().unwrap_or(&[]);
        match call.name.as_str() {
            "section" | "preformatted" | "quote" => {
                let args = Args::from_call(call, ctx, fallback, source_id)?;
                args.check_len(0, 0)?;
                args.no_leftover_kwargs()?;
                let mut failure = None;
                match call.name.as_str() {
                    "section" => rich.section(|s| {
                        failure = eval_rich_section_body(inner, s, ctx, fallback, source_id).err();
                    }),
                    "preformatted" => rich.preformatted(|s| {
                        failure = eval_rich_section_body(inner, s, ctx, fallback, source_id).err();
                    }),
                    _ => rich.quote(|s| {
                        failure = eval_rich_section_body(inner, s, ctx, fallback, source_id).err();
                    }),
                }
                if let Some(error) = failure {
                    return Err(error);
                }
            }
            "list" => {
                let mut args = Args::from_call(call, ctx, fallback, source_id)?;
                args.check_len(0, 0)?;
                let style = args.req_kwarg_str("style")?;
                args.no_leftover_kwargs()?;
                let mut failure = None;
                rich.list(&style, |s| {
                    failure = eval_rich_section_body(inner, s, ctx, fallback, source_id).err();
                });
                if let Some(error) = failure {
                    return Err(error);
                }
            }
            _ => {
                return Err(DiagnosticError::new(
                    RenderError::NoCapability(call.name.clone()),
                    span.clone(),
                    source_id,
                ));
            }
        }
    }
    Ok(rich)
}

fn eval_rich_section_body(
    body: &[Stmt],
    section: &mut RichTextSectionBuilder,
    ctx: &mut dyn RenderingContext,
    fallback: bool,
    source_id: usize,
) -> Result<(), DiagnosticError> {
    for stmt in body {
        let Stmt::Call { call, body, span } = stmt else {
            return Err(directive_in_body(stmt, source_id));
        };
        let mut args = Args::from_call(call, ctx, fallback, source_id)?;
        reject_body(&args, body.as_deref())?;
        match call.name.as_str() {
            "text" => {
                args.check_len(1, 1)?;
                let text = args.req_str(0, "text")?;
                section.text(&text, args.opts()?);
            }
            "link" => {
                args.check_len(1, 1)?;
                let url = args.req_str(0, "url")?;
                section.link(&url, args.opts()?);
            }
            "emoji" => {
                args.check_len(1, 1)?;
                let name = args.req_str(0, "name")?;
                args.no_leftover_kwargs()?;
                section.emoji(&name);
            }
            "channel" => {
                args.check_len(1, 1)?;
                let id = args.req_str(0, "channel_id")?;
                args.no_leftover_kwargs()?;
                section.channel(&id);
            }
            "user" => {
                args.check_len(1, 1)?;
                let id = args.req_str(0, "user_id")?;
                args.no_leftover_kwargs()?;
                section.user(&id);
            }
            "usergroup" => {
                args.check_len(1, 1)?;
                let id = args.req_str(0, "usergroup_id")?;
                args.no_leftover_kwargs()?;
                section.usergroup(&id);
            }
            "date" => {
                args.check_len(1, 1)?;
                let timestamp = args.req_i64(0, "timestamp")?;
                let format = args.req_kwarg_str("format")?;
                section.date(timestamp, &format, args.opts()?);
            }
            "broadcast" => {
                args.check_len(0, 0)?;
                let range = args.req_kwarg_str("range")?;
                args.no_leftover_kwargs()?;
                section.broadcast(&range);
            }
            _ => {
                return Err(DiagnosticError::new(
                    RenderError::NoCapability(call.name.clone()),
                    span.clone(),
                    source_id,
                ));
            }
        }
    }
    Ok(())
}

fn directive_in_body(stmt: &Stmt, source_id: usize) -> DiagnosticError {
    let span = match stmt {
        Stmt::Directive { span, .. } | Stmt::Call { span, .. } => span.clone(),
    };
    DiagnosticError::new(
        RenderError::BadDirective("directives are not allowed inside do-blocks".to_string()),
        span,
        source_id,
    )
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

fn eval_expr(
    expr: &Expr,
    ctx: &mut dyn RenderingContext,
    fallback: bool,
    source_id: usize,
) -> Result<Value, DiagnosticError> {
    match expr {
        Expr::Str(s) => Ok(Value::String(s.clone())),
        // Whole-valued literals become JSON integers so timestamps and
        // length limits round-trip without a fractional part.
        Expr::Num(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
            Ok(json!(*n as i64))
        }
        Expr::Num(n) => Ok(json!(n)),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Array(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(eval_expr(item, ctx, fallback, source_id)?);
            }
            Ok(Value::Array(values))
        }
        Expr::Ident(name, span) => ctx.local(name).ok_or_else(|| {
            DiagnosticError::new(
                RenderError::UndefinedLocal(name.clone()),
                span.clone(),
                source_id,
            )
        }),
        Expr::Call(call) => eval_value_call(call, ctx, fallback, source_id),
    }
}

/// A call in expression position: element factory, `render`, or context
/// helper.
fn eval_value_call(
    call: &CallExpr,
    ctx: &mut dyn RenderingContext,
    fallback: bool,
    source_id: usize,
) -> Result<Value, DiagnosticError> {
    let mut args = Args::from_call(call, ctx, fallback, source_id)?;

    if call.name == "render" {
        args.check_len(1, 1)?;
        let target = args.req_value(0, "item")?;
        let locals = args.take_locals()?;
        args.no_leftover_kwargs()?;
        let blocks = partials::render_blocks(ctx, &target, &locals)
            .map_err(|e| DiagnosticError::new(e, call.name_span.clone(), source_id))?;
        return Ok(Value::Array(blocks));
    }

    if let Some(record) = element_op(&mut args)? {
        return Ok(record);
    }

    if fallback && ctx.has_capability(&call.name) {
        return ctx
            .call_capability(&call.name, &args.values, &args.kwargs)
            .map_err(|e| DiagnosticError::new(e, call.name_span.clone(), source_id));
    }

    Err(DiagnosticError::new(
        RenderError::NoCapability(call.name.clone()),
        call.name_span.clone(),
        source_id,
    ))
}

// ---------------------------------------------------------------------------
// Argument coercion
// ---------------------------------------------------------------------------

struct Args {
    op: String,
    span: Range<usize>,
    source_id: usize,
    values: Vec<Value>,
    kwargs: Map<String, Value>,
}

impl Args {
    fn from_call(
        call: &CallExpr,
        ctx: &mut dyn RenderingContext,
        fallback: bool,
        source_id: usize,
    ) -> Result<Self, DiagnosticError> {
        let mut values = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            values.push(eval_expr(arg, ctx, fallback, source_id)?);
        }
        let mut kwargs = Map::new();
        for (key, expr) in &call.kwargs {
            kwargs.insert(key.clone(), eval_expr(expr, ctx, fallback, source_id)?);
        }
        Ok(Args {
            op: call.name.clone(),
            span: call.name_span.clone(),
            source_id,
            values,
            kwargs,
        })
    }

    fn err(&self, detail: impl Into<String>) -> DiagnosticError {
        DiagnosticError::new(
            RenderError::BadArgument {
                op: self.op.clone(),
                detail: detail.into(),
            },
            self.span.clone(),
            self.source_id,
        )
    }

    fn missing(&self, name: &str) -> DiagnosticError {
        DiagnosticError::new(
            RenderError::MissingArgument {
                op: self.op.clone(),
                name: name.to_string(),
            },
            self.span.clone(),
            self.source_id,
        )
    }

    fn check_len(&self, min: usize, max: usize) -> Result<(), DiagnosticError> {
        if self.values.len() < min {
            return Err(self.err(format!(
                "expected at least {} positional argument(s), got {}",
                min,
                self.values.len()
            )));
        }
        if self.values.len() > max {
            return Err(self.err(format!(
                "expected at most {} positional argument(s), got {}",
                max,
                self.values.len()
            )));
        }
        Ok(())
    }

    fn req_value(&self, idx: usize, name: &str) -> Result<Value, DiagnosticError> {
        self.values
            .get(idx)
            .cloned()
            .ok_or_else(|| self.missing(name))
    }

    fn req_str(&self, idx: usize, name: &str) -> Result<String, DiagnosticError> {
        match self.values.get(idx) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(self.err(format!("'{}' must be a string, got {}", name, other))),
            None => Err(self.missing(name)),
        }
    }

    fn req_i64(&self, idx: usize, name: &str) -> Result<i64, DiagnosticError> {
        match self.values.get(idx).and_then(Value::as_i64) {
            Some(n) => Ok(n),
            None if self.values.get(idx).is_some() => {
                Err(self.err(format!("'{}' must be an integer", name)))
            }
            None => Err(self.missing(name)),
        }
    }

    fn req_text(&self, idx: usize, name: &str) -> Result<TextArg, DiagnosticError> {
        match self.values.get(idx) {
            Some(Value::String(s)) => Ok(TextArg::Plain(s.clone())),
            Some(Value::Object(_)) => Ok(TextArg::Built(self.values[idx].clone())),
            Some(other) => Err(self.err(format!(
                "'{}' must be a string or a text record, got {}",
                name, other
            ))),
            None => Err(self.missing(name)),
        }
    }

    fn opt_text(&self, idx: usize, name: &str) -> Result<Option<TextArg>, DiagnosticError> {
        if self.values.get(idx).is_none() {
            return Ok(None);
        }
        self.req_text(idx, name).map(Some)
    }

    fn req_array(&self, idx: usize, name: &str) -> Result<Vec<Value>, DiagnosticError> {
        match self.values.get(idx) {
            Some(Value::Array(items)) => Ok(items.clone()),
            Some(other) => Err(self.err(format!("'{}' must be an array, got {}", name, other))),
            None => Err(self.missing(name)),
        }
    }

    fn req_kwarg_str(&mut self, name: &str) -> Result<String, DiagnosticError> {
        match self.kwargs.remove(name) {
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(self.err(format!("'{}' must be a string, got {}", name, other))),
            None => Err(self.missing(name)),
        }
    }

    fn req_kwarg_bool(&mut self, name: &str) -> Result<bool, DiagnosticError> {
        match self.kwargs.remove(name) {
            Some(Value::Bool(b)) => Ok(b),
            Some(other) => Err(self.err(format!("'{}' must be a boolean, got {}", name, other))),
            None => Err(self.missing(name)),
        }
    }

    fn req_kwarg_text(&mut self, name: &str) -> Result<TextArg, DiagnosticError> {
        match self.kwargs.remove(name) {
            Some(Value::String(s)) => Ok(TextArg::Plain(s)),
            Some(value @ Value::Object(_)) => Ok(TextArg::Built(value)),
            Some(other) => Err(self.err(format!(
                "'{}' must be a string or a text record, got {}",
                name, other
            ))),
            None => Err(self.missing(name)),
        }
    }

    fn req_kwarg_value(&mut self, name: &str) -> Result<Value, DiagnosticError> {
        self.kwargs.remove(name).ok_or_else(|| self.missing(name))
    }

    /// The optional `locals:` object for `render`.
    fn take_locals(&mut self) -> Result<Map<String, Value>, DiagnosticError> {
        match self.kwargs.remove("locals") {
            Some(Value::Object(map)) => Ok(map),
            Some(other) => Err(self.err(format!("'locals' must be an object, got {}", other))),
            None => Ok(Map::new()),
        }
    }

    /// Deserialize the remaining kwargs into an option struct. Unknown
    /// keywords are rejected by the struct's `deny_unknown_fields`.
    fn opts<T: DeserializeOwned>(&mut self) -> Result<T, DiagnosticError> {
        let kwargs = std::mem::take(&mut self.kwargs);
        serde_json::from_value(Value::Object(kwargs)).map_err(|e| self.err(e.to_string()))
    }

    fn no_leftover_kwargs(&self) -> Result<(), DiagnosticError> {
        if let Some(key) = self.kwargs.keys().next() {
            return Err(self.err(format!("unknown keyword argument '{}'", key)));
        }
        Ok(())
    }
}
