/*
 * compiler.rs
 *
 * Copyright (C) 2026 Nucleus Contributors. All rights reserved.
 *
 */

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;

/// `single` for one interactive entry (prints the last expression's
/// value); `exec` for a block submitted from the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Single,
    Exec,
}

/// Synthetic filename of the form `name` or `name+offset`, encoding where
/// a submitted slice began in the editor buffer. Readers must split on
/// the *last* `+` (a filename may itself contain one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginTag(String);

impl OriginTag {
    /// A bare line, interactive or otherwise, has no editor origin.
    pub fn bare(name: &str) -> Self {
        OriginTag(name.to_string())
    }

    /// Build the tag for a block submitted from offset `line_offset` in
    /// `filename` (§4.3 step 3): `filename+line_offset` when the offset is
    /// positive, else just `filename`.
    pub fn for_block(filename: &str, line_offset: u32) -> Self {
        if line_offset > 0 {
            OriginTag(format!("{filename}+{line_offset}"))
        } else {
            OriginTag(filename.to_string())
        }
    }

    pub fn parse(tag: &str) -> Self {
        OriginTag(tag.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split on the last `+` to recover `(editor_filename, line_offset)`.
    /// A tag with no `+`, or whose suffix isn't a non-negative integer, has
    /// offset 0 and the whole tag is the filename.
    pub fn split(&self) -> (&str, u32) {
        if let Some(pos) = self.0.rfind('+') {
            let (name, suffix) = self.0.split_at(pos);
            let suffix = &suffix[1..];
            if let Ok(offset) = suffix.parse::<u32>() {
                return (name, offset);
            }
        }
        (&self.0, 0)
    }
}

impl std::fmt::Display for OriginTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

static NEXT_UNIT_ID: AtomicU64 = AtomicU64::new(1);

/// An opaque, executable artifact produced by [`Compiler::compile`] from
/// one source string.
#[derive(Debug, Clone)]
pub struct CompiledUnit {
    id: u64,
    origin: OriginTag,
    mode: Mode,
    /// The fully normalized source text (newline-folded, encoding cookie
    /// defanged). This is what a `Runtime` actually executes.
    source: String,
}

impl CompiledUnit {
    fn new(origin: OriginTag, mode: Mode, source: String) -> Self {
        CompiledUnit {
            id: NEXT_UNIT_ID.fetch_add(1, Ordering::Relaxed),
            origin,
            mode,
            source,
        }
    }

    #[cfg(test)]
    pub(crate) fn new_for_test(id: u64, origin: OriginTag, mode: Mode) -> Self {
        CompiledUnit {
            id,
            origin,
            mode,
            source: String::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn origin(&self) -> &OriginTag {
        &self.origin
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// A structured description of a compile-time syntax error (§4.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxErrorDescriptor {
    pub message: String,
    pub filename: String,
    pub line: u32,
    pub column: u32,
    pub text: String,
}

#[derive(Debug, Clone)]
pub enum CompileOutcome {
    Complete(CompiledUnit),
    Incomplete,
    Invalid(SyntaxErrorDescriptor),
}

static ENCODING_COOKIE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"coding[:=]\s*[-\w.]+").unwrap());

/// Fold all newline conventions to `\n` (the source is assumed already
/// decoded to Unicode — §4.1 step 1).
fn normalize_newlines(source: &str) -> String {
    source.replace("\r\n", "\n").replace('\r', "\n")
}

/// Defang an encoding-declaration cookie (`coding: utf-8` / `coding=utf8`)
/// in the first two physical lines. A declared encoding on a string that
/// has already been decoded is nonsensical and must not abort compilation
/// (§4.1 step 2, property P6).
fn defang_encoding_cookie(source: &str) -> String {
    let lines: Vec<String> = source
        .split('\n')
        .enumerate()
        .map(|(i, line)| {
            if i < 2 && ENCODING_COOKIE.is_match(line) {
                ENCODING_COOKIE
                    .replace(line, |caps: &regex::Captures| {
                        let matched = &caps[0];
                        let sep = matched.find(['=', ':']).unwrap();
                        format!("coding is {}", &matched[sep + 1..])
                    })
                    .into_owned()
            } else {
                line.to_string()
            }
        })
        .collect();
    lines.join("\n")
}

/// Incremental compiler: a pure function of its inputs (plus the bracket
/// and quote heuristics it needs to judge completeness — it holds no
/// session state). See SPEC_FULL.md §4.1.1 for the heuristic this
/// implementation resolves the distilled spec's open point with.
pub struct Compiler;

impl Compiler {
    pub fn new() -> Self {
        Compiler
    }

    pub fn compile(&self, source_text: &str, origin: OriginTag, mode: Mode) -> CompileOutcome {
        let normalized = defang_encoding_cookie(&normalize_newlines(source_text));

        match classify(&normalized) {
            Classification::Invalid { message, line, column, text } => {
                CompileOutcome::Invalid(SyntaxErrorDescriptor {
                    message,
                    filename: origin.as_str().to_string(),
                    line,
                    column,
                    text,
                })
            },
            Classification::Incomplete => CompileOutcome::Incomplete,
            Classification::Complete => {
                CompileOutcome::Complete(CompiledUnit::new(origin, mode, normalized))
            },
        }
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

enum Classification {
    Complete,
    Incomplete,
    Invalid {
        message: String,
        line: u32,
        column: u32,
        text: String,
    },
}

/// Bracket/quote/indentation scanner. Not a full grammar: a best-effort
/// heuristic, exactly as the original component is specified to be.
fn classify(source: &str) -> Classification {
    if source.trim().is_empty() {
        return Classification::Complete;
    }

    let mut depth: i64 = 0;
    let mut in_string: Option<char> = None;
    let mut triple = false;
    let mut escape = false;
    let mut chars = source.chars().peekable();
    let mut line: u32 = 1;
    let mut col: u32 = 0;

    while let Some(c) = chars.next() {
        col += 1;
        if c == '\n' {
            line += 1;
            col = 0;
        }

        if let Some(quote) = in_string {
            if escape {
                escape = false;
                continue;
            }
            if c == '\\' {
                escape = true;
                continue;
            }
            if c == quote {
                if triple {
                    // Need two more of the same quote to close.
                    if chars.peek() == Some(&quote) {
                        chars.next();
                        col += 1;
                        if chars.peek() == Some(&quote) {
                            chars.next();
                            col += 1;
                            in_string = None;
                            triple = false;
                        }
                    }
                } else {
                    in_string = None;
                }
            }
            continue;
        }

        match c {
            '\'' | '"' => {
                let quote = c;
                let mut lookahead = chars.clone();
                if lookahead.next() == Some(quote) && lookahead.next() == Some(quote) {
                    chars.next();
                    chars.next();
                    col += 2;
                    triple = true;
                } else {
                    triple = false;
                }
                in_string = Some(quote);
            },
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth -= 1;
                if depth < 0 {
                    return Classification::Invalid {
                        message: "unmatched closing bracket".to_string(),
                        line,
                        column: col,
                        text: current_line(source, line),
                    };
                }
            },
            _ => {},
        }
    }

    if in_string.is_some() {
        // Single-quoted strings can't span lines; only an open triple
        // quote (or a trailing backslash continuation, handled below)
        // means "more input needed".
        if triple {
            return Classification::Incomplete;
        }
        return Classification::Invalid {
            message: "unterminated string literal".to_string(),
            line,
            column: col,
            text: current_line(source, line),
        };
    }

    if depth > 0 {
        return Classification::Incomplete;
    }

    if source.ends_with('\\') && !source.ends_with("\\\\") {
        return Classification::Incomplete;
    }

    // A compound statement header (`if x:`, `def f():`, ...) opens a
    // suite that stays open until a dedented or blank terminator line,
    // mirroring `codeop.CommandCompiler`'s interactive behavior: a body
    // line alone never closes it, only a later line at or below the
    // header's own indentation, or a trailing blank line, does.
    if open_suite(source) {
        return Classification::Incomplete;
    }

    Classification::Complete
}

/// True while `source` ends inside an indented suite that hasn't yet
/// been closed by a dedent or a trailing blank line.
///
/// Uses `split('\n')`, not `.lines()`: a trailing `\n` must surface as a
/// final empty element, since that's the only signal available for "the
/// caller appended a blank line" once fragments are rejoined by
/// `LineBuffer::joined()`'s `join("\n")`.
fn open_suite(source: &str) -> bool {
    let physical: Vec<&str> = source.split('\n').collect();
    let trailing_blank = physical.len() > 1 && physical.last() == Some(&"");
    let body_lines = if trailing_blank {
        &physical[..physical.len() - 1]
    } else {
        &physical[..]
    };

    let mut indent_stack: Vec<usize> = vec![0];
    let mut pending_header: Option<usize> = None;

    for raw_line in body_lines {
        if raw_line.trim().is_empty() {
            continue;
        }
        let indent = raw_line.len() - raw_line.trim_start().len();

        if let Some(header_indent) = pending_header.take() {
            if indent > header_indent {
                indent_stack.push(indent);
            }
        } else {
            while indent < *indent_stack.last().unwrap_or(&0) {
                indent_stack.pop();
            }
        }

        if raw_line.trim_end().ends_with(':') {
            pending_header = Some(indent);
        }
    }

    if pending_header.is_some() {
        return true;
    }

    indent_stack.len() > 1 && !trailing_blank
}

fn current_line(source: &str, line: u32) -> String {
    source
        .lines()
        .nth((line.saturating_sub(1)) as usize)
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_tag_round_trips_through_last_plus() {
        let tag = OriginTag::for_block("notebook+cell.py", 12);
        assert_eq!(tag.as_str(), "notebook+cell.py+12");
        assert_eq!(tag.split(), ("notebook+cell.py", 12));
    }

    #[test]
    fn origin_tag_with_zero_offset_has_no_plus() {
        let tag = OriginTag::for_block("script.py", 0);
        assert_eq!(tag.as_str(), "script.py");
        assert_eq!(tag.split(), ("script.py", 0));
    }

    #[test]
    fn simple_expression_is_complete() {
        let compiler = Compiler::new();
        match compiler.compile("x + 1", OriginTag::bare("<stdin>"), Mode::Single) {
            CompileOutcome::Complete(unit) => assert_eq!(unit.source(), "x + 1"),
            other => panic!("expected Complete, got {other:?}"),
        }
    }

    #[test]
    fn open_paren_is_incomplete() {
        let compiler = Compiler::new();
        match compiler.compile("f(1, 2", OriginTag::bare("<stdin>"), Mode::Single) {
            CompileOutcome::Incomplete => {},
            other => panic!("expected Incomplete, got {other:?}"),
        }
    }

    #[test]
    fn unmatched_closing_bracket_is_invalid() {
        let compiler = Compiler::new();
        match compiler.compile("f(1))", OriginTag::bare("<stdin>"), Mode::Single) {
            CompileOutcome::Invalid(_) => {},
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn def_header_awaits_body() {
        let compiler = Compiler::new();
        match compiler.compile("def f():", OriginTag::bare("<stdin>"), Mode::Single) {
            CompileOutcome::Incomplete => {},
            other => panic!("expected Incomplete, got {other:?}"),
        }
    }

    #[test]
    fn def_with_body_and_blank_line_is_complete() {
        let compiler = Compiler::new();
        let source = "def f():\n    return 42\n";
        match compiler.compile(source, OriginTag::bare("<stdin>"), Mode::Single) {
            CompileOutcome::Complete(_) => {},
            other => panic!("expected Complete, got {other:?}"),
        }
    }

    #[test]
    fn encoding_cookie_is_neutralized_and_compiles() {
        // P6: a source beginning with a coding cookie compiles exactly
        // like the same source without it.
        let compiler = Compiler::new();
        let with_cookie = "# -*- coding: utf-8 -*-\nx = 1";
        let without_cookie = "x = 1";

        let a = compiler.compile(with_cookie, OriginTag::bare("<stdin>"), Mode::Exec);
        let b = compiler.compile(without_cookie, OriginTag::bare("<stdin>"), Mode::Exec);

        match (a, b) {
            (CompileOutcome::Complete(ua), CompileOutcome::Complete(ub)) => {
                assert!(ua.source().contains("coding is"));
                assert!(ub.source() == "x = 1");
            },
            _ => panic!("expected both to compile"),
        }
    }

    #[test]
    fn triple_quoted_string_spanning_lines_is_incomplete_then_complete() {
        let compiler = Compiler::new();
        match compiler.compile("x = \"\"\"abc", OriginTag::bare("<stdin>"), Mode::Single) {
            CompileOutcome::Incomplete => {},
            other => panic!("expected Incomplete, got {other:?}"),
        }
        match compiler.compile("x = \"\"\"abc\ndef\"\"\"", OriginTag::bare("<stdin>"), Mode::Single)
        {
            CompileOutcome::Complete(_) => {},
            other => panic!("expected Complete, got {other:?}"),
        }
    }
}
