//! Line-oriented template script parser. One call per line, literals and
//! parenthesized calls in expression position, `do … end` bodies for scoped
//! builders, `%` compiler directives, `#` comments.

use std::ops::Range;

use crate::ast::{CallExpr, Expr, Program, Stmt};
use crate::error::ParseError;

// ---------------------------------------------------------------------------
// Token types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Str(String),
    Num(f64),
    True,
    False,
    Ident(String),

    Do,
    End,

    Colon,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,

    Newline,
    Directive { name: String, arg: String },
}

fn token_name(token: &Token) -> &'static str {
    match token {
        Token::Str(_) => "string",
        Token::Num(_) => "number",
        Token::True | Token::False => "boolean",
        Token::Ident(_) => "identifier",
        Token::Do => "'do'",
        Token::End => "'end'",
        Token::Colon => "':'",
        Token::Comma => "','",
        Token::LParen => "'('",
        Token::RParen => "')'",
        Token::LBracket => "'['",
        Token::RBracket => "']'",
        Token::Newline => "end of line",
        Token::Directive { .. } => "directive",
    }
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

fn tokenize(source: &str, file_id: usize) -> Result<Vec<(Token, Range<usize>)>, ParseError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut at_line_start = true;

    while i < bytes.len() {
        let c = bytes[i] as char;

        match c {
            ' ' | '\t' | '\r' => {
                i += 1;
            }
            '\n' => {
                tokens.push((Token::Newline, i..i + 1));
                i += 1;
                at_line_start = true;
            }
            '#' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            '%' if at_line_start => {
                let start = i;
                let mut end = i;
                while end < bytes.len() && bytes[end] != b'\n' {
                    end += 1;
                }
                let line = &source[start + 1..end];
                let mut words = line.split_whitespace();
                let name = words.next().unwrap_or("").to_string();
                let arg = words.next().unwrap_or("").to_string();
                if name.is_empty() || words.next().is_some() {
                    return Err(ParseError::error(
                        "malformed directive: expected '%name arg'",
                        start..end,
                        file_id,
                    ));
                }
                tokens.push((Token::Directive { name, arg }, start..end));
                i = end;
            }
            '"' => {
                let start = i;
                i += 1;
                let mut text = String::new();
                let mut closed = false;
                // Decode char-by-char; string content is the one place a
                // template may carry multi-byte UTF-8.
                while let Some(ch) = source[i..].chars().next() {
                    if ch == '\\' {
                        let escape = source[i + 1..].chars().next();
                        match escape {
                            Some('"') => text.push('"'),
                            Some('\\') => text.push('\\'),
                            Some('n') => text.push('\n'),
                            Some('t') => text.push('\t'),
                            _ => {
                                let len = escape.map_or(1, |e| 1 + e.len_utf8());
                                return Err(ParseError::error(
                                    "unknown string escape",
                                    i..i + len,
                                    file_id,
                                ));
                            }
                        }
                        i += 2;
                    } else if ch == '"' {
                        i += 1;
                        closed = true;
                        break;
                    } else if ch == '\n' {
                        break;
                    } else {
                        text.push(ch);
                        i += ch.len_utf8();
                    }
                }
                if !closed {
                    return Err(ParseError::error("unterminated string", start..i, file_id));
                }
                tokens.push((Token::Str(text), start..i));
                at_line_start = false;
            }
            c if c.is_ascii_digit()
                || (c == '-' && bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit())) =>
            {
                let start = i;
                i += 1;
                while i < bytes.len()
                    && ((bytes[i] as char).is_ascii_digit() || bytes[i] == b'.')
                {
                    i += 1;
                }
                let text = &source[start..i];
                let value: f64 = text.parse().map_err(|_| {
                    ParseError::error(format!("invalid number: {}", text), start..i, file_id)
                })?;
                tokens.push((Token::Num(value), start..i));
                at_line_start = false;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                i += 1;
                while i < bytes.len() {
                    let ch = bytes[i] as char;
                    if ch.is_ascii_alphanumeric() || ch == '_' {
                        i += 1;
                    } else {
                        break;
                    }
                }
                let word = &source[start..i];
                let token = match word {
                    "do" => Token::Do,
                    "end" => Token::End,
                    "true" => Token::True,
                    "false" => Token::False,
                    _ => Token::Ident(word.to_string()),
                };
                tokens.push((token, start..i));
                at_line_start = false;
            }
            ':' => {
                tokens.push((Token::Colon, i..i + 1));
                i += 1;
                at_line_start = false;
            }
            ',' => {
                tokens.push((Token::Comma, i..i + 1));
                i += 1;
                at_line_start = false;
            }
            '(' => {
                tokens.push((Token::LParen, i..i + 1));
                i += 1;
                at_line_start = false;
            }
            ')' => {
                tokens.push((Token::RParen, i..i + 1));
                i += 1;
                at_line_start = false;
            }
            '[' => {
                tokens.push((Token::LBracket, i..i + 1));
                i += 1;
                at_line_start = false;
            }
            ']' => {
                tokens.push((Token::RBracket, i..i + 1));
                i += 1;
                at_line_start = false;
            }
            _ => {
                let ch = source[i..].chars().next().expect("in bounds");
                return Err(ParseError::error(
                    format!("unexpected character '{}'", ch),
                    i..i + ch.len_utf8(),
                    file_id,
                ));
            }
        }
    }

    Ok(tokens)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parser entry point.
pub struct Parser {
    source: String,
    file_id: usize,
}

impl Parser {
    pub fn new(source: String, file_id: usize) -> Self {
        Parser { source, file_id }
    }

    /// Parse the source into a Program, collecting every statement-level
    /// error rather than stopping at the first.
    pub fn parse(&self) -> Result<Program, Vec<ParseError>> {
        let tokens = tokenize(&self.source, self.file_id).map_err(|e| vec![e])?;
        let mut state = ParseState {
            tokens,
            pos: 0,
            file_id: self.file_id,
            source_len: self.source.len(),
        };

        let mut stmts = Vec::new();
        let mut errors = Vec::new();
        while !state.at_end() {
            if state.eat(&Token::Newline) {
                continue;
            }
            match state.parse_stmt() {
                Ok(stmt) => stmts.push(stmt),
                Err(error) => {
                    errors.push(error);
                    state.skip_to_newline();
                }
            }
        }

        if errors.is_empty() {
            Ok(Program {
                stmts,
                source_id: self.file_id,
            })
        } else {
            Err(errors)
        }
    }
}

// ---------------------------------------------------------------------------
// Statement & expression parsing
// ---------------------------------------------------------------------------

struct ParseState {
    tokens: Vec<(Token, Range<usize>)>,
    pos: usize,
    file_id: usize,
    source_len: usize,
}

impl ParseState {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek2(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1).map(|(t, _)| t)
    }

    fn span(&self) -> Range<usize> {
        self.tokens
            .get(self.pos)
            .map(|(_, s)| s.clone())
            .unwrap_or(self.source_len..self.source_len)
    }

    fn advance(&mut self) -> Option<(Token, Range<usize>)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::error(message, self.span(), self.file_id)
    }

    fn skip_to_newline(&mut self) {
        while let Some(token) = self.peek() {
            let is_newline = *token == Token::Newline;
            self.pos += 1;
            if is_newline {
                break;
            }
        }
    }

    /// Skip newlines inside bracketed/parenthesized lists.
    fn skip_newlines(&mut self) {
        while self.eat(&Token::Newline) {}
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.peek() {
            Some(Token::Directive { .. }) => {
                let (token, span) = self.advance().expect("peeked");
                let Token::Directive { name, arg } = token else {
                    unreachable!()
                };
                self.expect_line_end()?;
                Ok(Stmt::Directive { name, arg, span })
            }
            Some(Token::Ident(_)) => {
                let (token, name_span) = self.advance().expect("peeked");
                let Token::Ident(name) = token else {
                    unreachable!()
                };
                let mut call = CallExpr {
                    name,
                    name_span: name_span.clone(),
                    args: Vec::new(),
                    kwargs: Vec::new(),
                };
                let mut end = name_span.end;

                // Paren-less argument list up to end of line or `do`.
                if !matches!(self.peek(), None | Some(Token::Newline) | Some(Token::Do)) {
                    end = self.parse_arg_list(&mut call, false)?;
                }

                let body = if self.eat(&Token::Do) {
                    self.expect_line_end()?;
                    let (body, body_end) = self.parse_body(&call.name)?;
                    end = body_end;
                    Some(body)
                } else {
                    self.expect_line_end()?;
                    None
                };

                Ok(Stmt::Call {
                    call,
                    body,
                    span: name_span.start..end,
                })
            }
            Some(other) => Err(self.error(format!(
                "expected a call or directive, found {}",
                token_name(other)
            ))),
            None => Err(self.error("expected a statement")),
        }
    }

    /// Parse statements until the matching `end`.
    fn parse_body(&mut self, opener: &str) -> Result<(Vec<Stmt>, usize), ParseError> {
        let mut body = Vec::new();
        loop {
            if self.eat(&Token::Newline) {
                continue;
            }
            match self.peek() {
                Some(Token::End) => {
                    let (_, span) = self.advance().expect("peeked");
                    self.expect_line_end()?;
                    return Ok((body, span.end));
                }
                Some(_) => body.push(self.parse_stmt()?),
                None => {
                    return Err(self.error(format!("missing 'end' for '{} do'", opener)));
                }
            }
        }
    }

    /// Parse a comma-separated argument list into `call`. Returns the byte
    /// offset just past the last consumed token. `parenthesized` allows
    /// newlines between items.
    fn parse_arg_list(&mut self, call: &mut CallExpr, parenthesized: bool) -> Result<usize, ParseError> {
        let mut end = call.name_span.end;
        loop {
            if parenthesized {
                self.skip_newlines();
                if self.peek() == Some(&Token::RParen) {
                    break;
                }
            }

            // `name: value` keyword argument.
            if matches!(self.peek(), Some(Token::Ident(_))) && self.peek2() == Some(&Token::Colon)
            {
                let (token, _) = self.advance().expect("peeked");
                let Token::Ident(key) = token else {
                    unreachable!()
                };
                self.advance(); // colon
                let (value, value_end) = self.parse_expr()?;
                end = value_end;
                call.kwargs.push((key, value));
            } else {
                if !call.kwargs.is_empty() {
                    return Err(self.error("positional argument after keyword argument"));
                }
                let (expr, expr_end) = self.parse_expr()?;
                end = expr_end;
                call.args.push(expr);
            }

            if self.eat(&Token::Comma) {
                // A comma may wrap to the next line.
                self.skip_newlines();
                continue;
            }
            break;
        }
        Ok(end)
    }

    /// Parse one expression; returns it and the byte offset just past it.
    fn parse_expr(&mut self) -> Result<(Expr, usize), ParseError> {
        match self.peek() {
            Some(Token::Str(_)) => {
                let (token, span) = self.advance().expect("peeked");
                let Token::Str(text) = token else { unreachable!() };
                Ok((Expr::Str(text), span.end))
            }
            Some(Token::Num(_)) => {
                let (token, span) = self.advance().expect("peeked");
                let Token::Num(value) = token else { unreachable!() };
                Ok((Expr::Num(value), span.end))
            }
            Some(Token::True) => {
                let (_, span) = self.advance().expect("peeked");
                Ok((Expr::Bool(true), span.end))
            }
            Some(Token::False) => {
                let (_, span) = self.advance().expect("peeked");
                Ok((Expr::Bool(false), span.end))
            }
            Some(Token::LBracket) => {
                let (_, open_span) = self.advance().expect("peeked");
                let mut items = Vec::new();
                loop {
                    self.skip_newlines();
                    if self.peek() == Some(&Token::RBracket) {
                        break;
                    }
                    let (item, _) = self.parse_expr()?;
                    items.push(item);
                    self.skip_newlines();
                    if !self.eat(&Token::Comma) {
                        break;
                    }
                }
                self.skip_newlines();
                if self.peek() == Some(&Token::RBracket) {
                    let (_, span) = self.advance().expect("peeked");
                    Ok((Expr::Array(items), span.end))
                } else {
                    Err(ParseError::error(
                        "unclosed '['",
                        open_span,
                        self.file_id,
                    ))
                }
            }
            Some(Token::Ident(_)) => {
                let (token, name_span) = self.advance().expect("peeked");
                let Token::Ident(name) = token else { unreachable!() };
                if self.eat(&Token::LParen) {
                    let mut call = CallExpr {
                        name,
                        name_span: name_span.clone(),
                        args: Vec::new(),
                        kwargs: Vec::new(),
                    };
                    if self.peek() != Some(&Token::RParen) {
                        self.parse_arg_list(&mut call, true)?;
                    }
                    self.skip_newlines();
                    if self.peek() == Some(&Token::RParen) {
                        let (_, span) = self.advance().expect("peeked");
                        Ok((Expr::Call(Box::new(call)), span.end))
                    } else {
                        Err(self.error(format!("unclosed '(' in call to '{}'", call.name)))
                    }
                } else {
                    let end = name_span.end;
                    Ok((Expr::Ident(name, name_span), end))
                }
            }
            Some(other) => Err(self.error(format!(
                "expected an expression, found {}",
                token_name(other)
            ))),
            None => Err(self.error("expected an expression")),
        }
    }

    fn expect_line_end(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            None | Some(Token::Newline) => {
                self.eat(&Token::Newline);
                Ok(())
            }
            Some(other) => Err(self.error(format!(
                "expected end of line, found {}",
                token_name(other)
            ))),
        }
    }
}
