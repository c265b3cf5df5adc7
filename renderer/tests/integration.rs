use serde_json::{Map, Value, json};

use renderer::{
    Compiler, Location, NullContext, OutputFormat, RenderError, RenderFailure, RenderingContext,
    translate_location,
};

fn render(source: &str, format: Option<OutputFormat>) -> Value {
    renderer::render(source, format, &mut NullContext, 0).expect("render failed")
}

fn render_err(source: &str, format: Option<OutputFormat>) -> RenderFailure {
    renderer::render(source, format, &mut NullContext, 0).expect_err("render succeeded")
}

/// A scripted host: fixed locals, recording helpers, canned partial output.
#[derive(Default)]
struct StubContext {
    locals: Map<String, Value>,
    helpers: Map<String, Value>,
    helper_calls: Vec<(String, Vec<Value>)>,
    partial_requests: Vec<(String, Map<String, Value>)>,
    partial_output: String,
}

impl RenderingContext for StubContext {
    fn local(&self, name: &str) -> Option<Value> {
        self.locals.get(name).cloned()
    }

    fn has_capability(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    fn call_capability(
        &mut self,
        name: &str,
        args: &[Value],
        _kwargs: &Map<String, Value>,
    ) -> Result<Value, RenderError> {
        self.helper_calls.push((name.to_string(), args.to_vec()));
        Ok(self.helpers[name].clone())
    }

    fn render_partial(
        &mut self,
        name: &str,
        locals: &Map<String, Value>,
        _format: OutputFormat,
    ) -> Result<String, RenderError> {
        self.partial_requests.push((name.to_string(), locals.clone()));
        Ok(self.partial_output.clone())
    }
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

#[test]
fn compile_wraps_source_with_blocks_scaffolding() {
    let augmented = Compiler::blocks().compile("header \"hi\"");
    assert_eq!(
        augmented,
        "%builder blocks\n%fallback context\nheader \"hi\"\n%yield blocks\n"
    );
}

#[test]
fn compile_normalizes_trailing_newlines() {
    let once = Compiler::blocks().compile("divider\n");
    let many = Compiler::blocks().compile("divider\n\n\n");
    let none = Compiler::blocks().compile("divider");
    assert_eq!(once, many);
    assert_eq!(once, none);
}

#[test]
fn modal_format_gets_modal_scaffolding() {
    let compiler = Compiler::for_format(Some(OutputFormat::SlackModal));
    assert!(compiler.preamble().starts_with("%builder modal\n"));
    assert_eq!(compiler.postamble(), "%yield modal\n");
}

#[test]
fn undeclared_format_compiles_as_blocks() {
    let compiler = Compiler::for_format(None);
    assert!(compiler.preamble().starts_with("%builder blocks\n"));
}

#[test]
fn author_line_one_is_augmented_line_three() {
    let augmented = Compiler::blocks().compile("divider");
    let lines: Vec<&str> = augmented.lines().collect();
    assert_eq!(lines[renderer::PREAMBLE_LINES], "divider");
}

#[test]
fn compiler_metadata() {
    assert_eq!(Compiler::default_format(), OutputFormat::SlackMessage);
    assert!(Compiler::handles_encoding());
    assert_eq!(Compiler::modal().variant(), renderer::Variant::Modal);
}

#[test]
fn format_names_parse() {
    assert_eq!("slack_message".parse(), Ok(OutputFormat::SlackMessage));
    assert_eq!("slack_modal".parse(), Ok(OutputFormat::SlackModal));
    assert_eq!("modal".parse(), Ok(OutputFormat::SlackModal));
    assert!("pdf".parse::<OutputFormat>().is_err());
}

// ---------------------------------------------------------------------------
// Location translation
// ---------------------------------------------------------------------------

#[test]
fn translation_subtracts_the_preamble_offset() {
    let loc = translate_location(Location::lines(5, 5));
    assert_eq!((loc.first_line, loc.last_line), (3, 3));
}

#[test]
fn translation_clamps_preamble_positions_to_line_one() {
    assert_eq!(translate_location(Location::lines(1, 1)).first_line, 1);
    assert_eq!(translate_location(Location::lines(2, 2)).first_line, 1);
    assert_eq!(translate_location(Location::lines(3, 3)).first_line, 1);
}

#[test]
fn translation_trims_injected_snippet_lines() {
    let loc = Location::lines(3, 3).with_script_lines(vec![
        "%builder blocks".to_string(),
        "%fallback context".to_string(),
        "divider".to_string(),
        "%yield blocks".to_string(),
    ]);
    let translated = translate_location(loc);
    assert_eq!(translated.script_lines, Some(vec!["divider".to_string()]));
}

#[test]
fn translation_never_underflows_on_short_snippets() {
    let loc = Location::lines(1, 1).with_script_lines(vec!["%builder blocks".to_string()]);
    let translated = translate_location(loc);
    assert_eq!(translated.script_lines, Some(Vec::new()));
}

// ---------------------------------------------------------------------------
// End-to-end rendering
// ---------------------------------------------------------------------------

#[test]
fn one_line_template_renders_a_block_document() {
    let document = render("header \"Welcome\"", None);
    assert_eq!(
        document,
        json!({
            "blocks": [{
                "type": "header",
                "text": { "type": "plain_text", "text": "Welcome" }
            }]
        })
    );
}

#[test]
fn section_kwargs_reach_the_builder() {
    let document = render("section \"*hello*\", markdown: true", None);
    assert_eq!(document["blocks"][0]["text"]["type"], "mrkdwn");
}

#[test]
fn element_calls_nest_in_expression_position() {
    let document = render(
        "actions [button(\"Go\", \"go\"), button(\"Stop\", \"stop\", style: \"danger\")]",
        None,
    );
    let elements = document["blocks"][0]["elements"].as_array().unwrap();
    assert_eq!(elements.len(), 2);
    assert_eq!(elements[1]["style"], "danger");
}

#[test]
fn rich_text_scopes_evaluate_through_do_blocks() {
    let source = "rich_text do\n  section do\n    text \"hi\", bold: true\n    emoji \"tada\"\n  end\n  list style: \"bullet\" do\n    text \"item\"\n  end\nend";
    let document = render(source, None);
    let block = &document["blocks"][0];
    assert_eq!(block["type"], "rich_text");
    assert_eq!(block["elements"][0]["elements"][0]["style"], json!({ "bold": true }));
    assert_eq!(block["elements"][1]["style"], "bullet");
}

#[test]
fn multi_byte_text_round_trips() {
    // 2-, 3- and 4-byte UTF-8 sequences in string literals.
    let document = render("header \"café\"", None);
    assert_eq!(document["blocks"][0]["text"]["text"], "café");

    let document = render("simple_section \"price: 5€\"", None);
    assert_eq!(document["blocks"][0]["text"]["text"], "price: 5€");

    let document = render("header \"done 🎉\"\ndivider", None);
    assert_eq!(document["blocks"][0]["text"]["text"], "done 🎉");
    assert_eq!(document["blocks"].as_array().unwrap().len(), 2);
}

#[test]
fn multi_byte_text_next_to_the_closing_quote() {
    let document = render("section \"über\", markdown: true", None);
    assert_eq!(document["blocks"][0]["text"]["text"], "über");
}

#[test]
fn whole_number_literals_stay_integers() {
    let source = "rich_text do\n  section do\n    date 1700000000, format: \"{date_short}\"\n  end\nend";
    let document = render(source, None);
    assert_eq!(
        document["blocks"][0]["elements"][0]["elements"][0]["timestamp"],
        json!(1700000000)
    );
}

#[test]
fn modal_template_renders_a_modal() {
    let source = "title \"Settings\"\nsubmit \"Save\"\nsimple_section \"body\"";
    let document = render(source, Some(OutputFormat::SlackModal));
    assert_eq!(document["type"], "modal");
    assert_eq!(document["title"]["text"], "Settings");
    assert_eq!(document["blocks"].as_array().unwrap().len(), 1);
    assert!(document.get("callback_id").is_none());
    assert!(document.get("close").is_none());
}

#[test]
fn modal_without_title_fails_at_export() {
    let failure = render_err("divider", Some(OutputFormat::SlackModal));
    let RenderFailure::Eval(error) = failure else {
        panic!("expected eval failure");
    };
    assert!(matches!(error.error, RenderError::MissingTitle));
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[test]
fn builder_table_wins_before_the_context() {
    let mut ctx = StubContext::default();
    ctx.helpers.insert("divider".to_string(), json!("nope"));
    let document = renderer::render("divider", None, &mut ctx, 0).unwrap();
    assert_eq!(document["blocks"][0], json!({ "type": "divider" }));
    assert!(ctx.helper_calls.is_empty());
}

#[test]
fn unresolved_calls_fall_back_to_context_helpers() {
    let mut ctx = StubContext::default();
    ctx.helpers.insert("track".to_string(), json!(null));
    renderer::render("track \"viewed\"\ndivider", None, &mut ctx, 0).unwrap();
    assert_eq!(ctx.helper_calls, vec![("track".to_string(), vec![json!("viewed")])]);
}

#[test]
fn helper_results_feed_expression_positions() {
    let mut ctx = StubContext::default();
    ctx.helpers.insert("whoami".to_string(), json!("Ana"));
    let document = renderer::render("header whoami()", None, &mut ctx, 0).unwrap();
    assert_eq!(document["blocks"][0]["text"]["text"], "Ana");
}

#[test]
fn unknown_calls_are_capability_errors() {
    let failure = render_err("frobnicate \"x\"", None);
    let RenderFailure::Eval(error) = failure else {
        panic!("expected eval failure");
    };
    assert!(matches!(error.error, RenderError::NoCapability(ref name) if name == "frobnicate"));
    assert!(error.span.is_some());
}

#[test]
fn bare_identifiers_read_ambient_locals() {
    let mut ctx = StubContext::default();
    ctx.locals.insert("greeting".to_string(), json!("Hello"));
    let document = renderer::render("header greeting", None, &mut ctx, 0).unwrap();
    assert_eq!(document["blocks"][0]["text"]["text"], "Hello");
}

#[test]
fn missing_locals_are_errors() {
    let failure = render_err("header greeting", None);
    let RenderFailure::Eval(error) = failure else {
        panic!("expected eval failure");
    };
    assert!(matches!(error.error, RenderError::UndefinedLocal(ref name) if name == "greeting"));
}

#[test]
fn unknown_keywords_are_rejected() {
    let failure = render_err("header \"x\", bogus: true", None);
    let RenderFailure::Eval(error) = failure else {
        panic!("expected eval failure");
    };
    assert!(matches!(error.error, RenderError::BadArgument { .. }));
}

#[test]
fn missing_required_keywords_are_reported() {
    let failure = render_err("input \"Email\", select_menu(\"pick\")", None);
    let RenderFailure::Eval(error) = failure else {
        panic!("expected eval failure");
    };
    assert!(matches!(
        error.error,
        RenderError::MissingArgument { ref name, .. } if name == "placeholder"
    ));
}

#[test]
fn non_text_section_arguments_are_rejected() {
    let failure = render_err("section 42", None);
    let RenderFailure::Eval(error) = failure else {
        panic!("expected eval failure");
    };
    assert!(matches!(error.error, RenderError::BadArgument { .. }));
}

#[test]
fn arity_is_checked() {
    let failure = render_err("header", None);
    let RenderFailure::Eval(error) = failure else {
        panic!("expected eval failure");
    };
    assert!(matches!(error.error, RenderError::BadArgument { .. }));
}

// ---------------------------------------------------------------------------
// Partial composition
// ---------------------------------------------------------------------------

#[test]
fn render_routes_items_to_conventional_partials() {
    let mut ctx = StubContext::default();
    ctx.locals
        .insert("item".to_string(), json!({ "type": "user", "name": "Ana" }));
    ctx.partial_output = json!({ "blocks": [{ "type": "divider" }] }).to_string();

    let document = renderer::render("render item", None, &mut ctx, 0).unwrap();
    assert_eq!(document["blocks"], json!([{ "type": "divider" }]));

    let (name, locals) = &ctx.partial_requests[0];
    assert_eq!(name, "users/user");
    assert_eq!(locals["user"], json!({ "type": "user", "name": "Ana" }));
}

#[test]
fn render_fans_out_arrays_in_order() {
    let mut ctx = StubContext::default();
    ctx.locals.insert(
        "items".to_string(),
        json!([{ "type": "user", "id": 1 }, { "type": "team", "id": 2 }]),
    );
    ctx.partial_output = json!({ "blocks": [{ "type": "divider" }] }).to_string();

    let document = renderer::render("render items", None, &mut ctx, 0).unwrap();
    assert_eq!(document["blocks"].as_array().unwrap().len(), 2);
    let names: Vec<&str> = ctx.partial_requests.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["users/user", "teams/team"]);
}

#[test]
fn empty_arrays_render_to_nothing() {
    let mut ctx = StubContext::default();
    ctx.locals.insert("items".to_string(), json!([]));
    let document = renderer::render("render items", None, &mut ctx, 0).unwrap();
    assert_eq!(document["blocks"], json!([]));
    assert!(ctx.partial_requests.is_empty());
}

#[test]
fn item_binding_wins_a_locals_conflict() {
    let mut ctx = StubContext::default();
    ctx.locals
        .insert("item".to_string(), json!({ "type": "user", "name": "Ana" }));
    ctx.locals
        .insert("extra".to_string(), json!({ "user": "shadow", "theme": "dark" }));
    ctx.partial_output = json!({ "blocks": [] }).to_string();

    renderer::render("render item, locals: extra", None, &mut ctx, 0).unwrap();
    let (_, locals) = &ctx.partial_requests[0];
    assert_eq!(locals["user"], json!({ "type": "user", "name": "Ana" }));
    assert_eq!(locals["theme"], "dark");
}

#[test]
fn caller_locals_are_forwarded_to_partials() {
    let mut ctx = StubContext::default();
    ctx.locals.insert("item".to_string(), json!({ "type": "user" }));
    ctx.partial_output = json!({ "blocks": [] }).to_string();

    renderer::render("render item, locals: [\"compact\"]", None, &mut ctx, 0)
        .expect_err("array locals should be rejected");

    renderer::render("render item", None, &mut ctx, 0).unwrap();
    let (_, locals) = &ctx.partial_requests[0];
    assert!(locals.contains_key("user"));
}

#[test]
fn partial_without_blocks_key_contributes_nothing() {
    let mut ctx = StubContext::default();
    ctx.locals.insert("item".to_string(), json!({ "type": "user" }));
    ctx.partial_output = json!({ "ok": true }).to_string();
    let document = renderer::render("render item\ndivider", None, &mut ctx, 0).unwrap();
    assert_eq!(document["blocks"], json!([{ "type": "divider" }]));
}

#[test]
fn non_json_partial_output_is_an_error() {
    let mut ctx = StubContext::default();
    ctx.locals.insert("item".to_string(), json!({ "type": "user" }));
    ctx.partial_output = "<html>".to_string();
    let failure = renderer::render("render item", None, &mut ctx, 0).unwrap_err();
    let RenderFailure::Eval(error) = failure else {
        panic!("expected eval failure");
    };
    assert!(matches!(error.error, RenderError::MalformedPartial(_)));
}

#[test]
fn items_without_a_type_field_are_rejected() {
    let mut ctx = StubContext::default();
    ctx.locals.insert("item".to_string(), json!({ "name": "Ana" }));
    let failure = renderer::render("render item", None, &mut ctx, 0).unwrap_err();
    let RenderFailure::Eval(error) = failure else {
        panic!("expected eval failure");
    };
    assert!(matches!(error.error, RenderError::BadArgument { .. }));
}

// ---------------------------------------------------------------------------
// Parse errors
// ---------------------------------------------------------------------------

#[test]
fn statement_errors_are_collected_per_line() {
    let failure = render_err("header \"a\" \"b\"\ndivider\nsection ,", None);
    let RenderFailure::Parse(errors) = failure else {
        panic!("expected parse failure");
    };
    assert_eq!(errors.len(), 2);
}

#[test]
fn unterminated_strings_fail_to_tokenize() {
    let failure = render_err("header \"oops", None);
    assert!(matches!(failure, RenderFailure::Parse(_)));
}

#[test]
fn do_blocks_require_a_matching_end() {
    let failure = render_err("rich_text do\n  section do\n    text \"hi\"\n  end", None);
    assert!(matches!(failure, RenderFailure::Parse(_)));
}

#[test]
fn comments_and_blank_lines_are_ignored() {
    let document = render("# greeting\n\nheader \"hi\" # trailing\n", None);
    assert_eq!(document["blocks"].as_array().unwrap().len(), 1);
}
