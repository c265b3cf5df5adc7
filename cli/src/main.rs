mod config;
mod context;

use std::ops::Range;
use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use serde_json::{Map, Value};

use renderer::location::{line_of_offset, span_of_lines};
use renderer::{Compiler, DiagnosticError, Location, OutputFormat, ParseError, translate_location};

use config::Config;
use context::FileContext;

const SUBCOMMANDS: &[&str] = &["render", "help"];

#[derive(Parser)]
#[command(name = "blockdown", version, about = "Block Kit template renderer")]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a template to a Block Kit JSON document
    Render(RenderArgs),
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Template file to render
    file: String,

    /// Output format: slack_message (default) or slack_modal
    #[arg(short, long)]
    format: Option<String>,

    /// JSON file with template locals
    #[arg(short, long)]
    locals: Option<String>,

    /// Config file (defaults to blockdown.toml next to the template)
    #[arg(short, long)]
    config: Option<String>,

    /// Pretty-print the output document
    #[arg(short, long)]
    pretty: bool,

    /// Parse only, don't render (exit 0 if valid)
    #[arg(long)]
    check: bool,

    /// Print the augmented source instead of rendering
    #[arg(long)]
    augmented: bool,

    /// Suppress the output document (just check for errors)
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    // Backwards compatibility: if the first positional arg is not a known
    // subcommand, inject "render" so `blockdown file.bd` works like
    // `blockdown render file.bd`.
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(first_pos) = args.iter().skip(1).find(|a| !a.starts_with('-')) {
        let first_pos = first_pos.clone();
        if !SUBCOMMANDS.contains(&first_pos.as_str()) {
            let pos = args.iter().position(|a| *a == first_pos).unwrap();
            args.insert(pos, "render".to_string());
        }
    }

    let cli = Cli::parse_from(&args);

    match cli.command {
        Command::Render(render_args) => do_render(render_args, cli.no_color),
    }
}

fn do_render(args: RenderArgs, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    // Read template source
    let source = match std::fs::read_to_string(&args.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", args.file, e);
            process::exit(1);
        }
    };

    let base_dir = Path::new(&args.file)
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    let config = match &args.config {
        Some(path) => Config::load_file(Path::new(path)),
        None => Config::load(&base_dir),
    };
    let config = match config {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    // --format wins, then the `.modal.bd` naming convention, then the
    // config's default_format.
    let inferred = args.file.ends_with(".modal.bd").then_some("slack_modal");
    let format = args
        .format
        .as_deref()
        .or(inferred)
        .or(config.default_format.as_deref());
    let format = match format.map(str::parse::<OutputFormat>).transpose() {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    let augmented = Compiler::for_format(format).compile(&source);

    if args.augmented {
        print!("{}", augmented);
        return;
    }

    // Diagnostics are reported against the author's file: spans come back
    // in augmented coordinates and are translated before display.
    let mut files = SimpleFiles::new();
    let file_id = files.add(args.file.clone(), source.clone());

    let parser = renderer::parser::Parser::new(augmented.clone(), file_id);
    let program = match parser.parse() {
        Ok(p) => p,
        Err(errors) => {
            let writer = StandardStream::stderr(color_choice);
            let config = term::Config::default();
            for error in &errors {
                let diagnostic = parse_diagnostic(error, &augmented, &source);
                let _ =
                    term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
            }
            process::exit(1);
        }
    };

    if args.check {
        eprintln!("ok: {} parsed successfully", args.file);
        return;
    }

    let locals = match load_locals(args.locals.as_deref()) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    let mut ctx = FileContext::new(config.templates_dir(&base_dir), locals);
    let document = match renderer::evaluator::evaluate(&program, &mut ctx) {
        Ok(d) => d,
        Err(error) => {
            let writer = StandardStream::stderr(color_choice);
            let config = term::Config::default();
            let diagnostic = eval_diagnostic(&error, &augmented, &source);
            let _ = term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
            process::exit(1);
        }
    };

    if args.quiet {
        return;
    }

    let output = if args.pretty {
        serde_json::to_string_pretty(&document)
    } else {
        serde_json::to_string(&document)
    };
    match output {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("error: cannot serialize output: {}", e);
            process::exit(1);
        }
    }
}

/// Map a span in augmented coordinates onto the author's file.
fn original_span(augmented: &str, original: &str, span: &Range<usize>) -> Range<usize> {
    let first = line_of_offset(augmented, span.start);
    let last = line_of_offset(augmented, span.end.saturating_sub(1).max(span.start));
    let translated = translate_location(Location::lines(first, last));
    span_of_lines(original, translated.first_line, translated.last_line)
}

fn parse_diagnostic(error: &ParseError, augmented: &str, original: &str) -> Diagnostic<usize> {
    let span = original_span(augmented, original, &error.span);
    Diagnostic::error()
        .with_message(&error.message)
        .with_labels(vec![Label::primary(error.file_id, span)])
        .with_notes(error.notes.clone())
}

fn eval_diagnostic(error: &DiagnosticError, augmented: &str, original: &str) -> Diagnostic<usize> {
    let mut diagnostic = Diagnostic::error().with_message(error.to_string());
    if let Some(span) = &error.span {
        let span = original_span(augmented, original, span);
        diagnostic = diagnostic.with_labels(vec![Label::primary(error.source_id, span)]);
    }
    diagnostic
}

/// Read template locals from a JSON file. The document must be an object.
fn load_locals(path: Option<&str>) -> Result<Map<String, Value>, String> {
    let Some(path) = path else {
        return Ok(Map::new());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read locals '{}': {}", path, e))?;
    let value: Value =
        serde_json::from_str(&text).map_err(|e| format!("invalid locals '{}': {}", path, e))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(format!("locals '{}' must be a JSON object", path)),
    }
}
