/*
 * runtime.rs
 *
 * Copyright (C) 2026 Nucleus Contributors. All rights reserved.
 *
 */

use crate::compiler::CompiledUnit;
use crate::compiler::Mode;
use crate::namespace::Namespace;
use crate::namespace::Value;

/// One traceback frame as produced by a [`Runtime`]: the 1-based line,
/// within the unit's own source, at which this frame's activity is
/// happening. [`crate::traceback::TracebackRewriter`] is the only thing
/// that ever turns this into an editor-relative line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub line: u32,
}

/// An exception as raised by user code: name, message, and the call stack
/// at the point of the raise, innermost frame last (matching the
/// reference REPL's frame ordering).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionTriple {
    pub ename: String,
    pub evalue: String,
    pub frames: Vec<Frame>,
}

/// What happened when a [`Runtime`] ran a [`CompiledUnit`] (§4.4 step 4).
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeOutcome {
    /// Ran to completion. For `single` mode, carries the last top-level
    /// expression's value if the unit's final statement was an
    /// expression rather than a statement with no value.
    Ok(Option<Value>),
    Exception(ExceptionTriple),
    KeyboardInterrupt,
    DebuggerQuit,
    SystemExit(i32),
}

/// The pluggable collaborator that actually executes a [`CompiledUnit`]
/// against a namespace. The kernel (Executor, REPLLoop) is written only
/// against this trait — never against any concrete language — which is
/// the Rust-native analogue of the teacher framework's split between a
/// language-agnostic kernel crate and a language-specific execution
/// backend.
pub trait Runtime: Send {
    fn execute(&mut self, unit: &CompiledUnit, ns: &mut dyn Namespace) -> RuntimeOutcome;
}

/// A small reference `Runtime`: one `name = expr` assignment or bare
/// `expr` per logical (non-blank) line, over signed integers, strings,
/// and booleans. Exists only to drive the kernel end-to-end in tests;
/// see SPEC_FULL.md §2.1.
#[derive(Default)]
pub struct ExprRuntime;

impl ExprRuntime {
    pub fn new() -> Self {
        ExprRuntime
    }
}

impl Runtime for ExprRuntime {
    fn execute(&mut self, unit: &CompiledUnit, ns: &mut dyn Namespace) -> RuntimeOutcome {
        let lines: Vec<&str> = unit
            .source()
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty())
            .map(|(_, l)| l)
            .collect();
        let line_numbers: Vec<u32> = unit
            .source()
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty())
            .map(|(i, _)| (i + 1) as u32)
            .collect();

        let mut last_value: Option<Value> = None;

        for (idx, raw_line) in lines.iter().enumerate() {
            let line_no = line_numbers[idx];
            let stmt = raw_line.trim();

            if let Some(rest) = stmt.strip_prefix("raise ") {
                match parse_raise(rest) {
                    RaiseKind::SystemExit(code) => return RuntimeOutcome::SystemExit(code),
                    RaiseKind::KeyboardInterrupt => return RuntimeOutcome::KeyboardInterrupt,
                    RaiseKind::Other(ename, evalue) => {
                        return RuntimeOutcome::Exception(ExceptionTriple {
                            ename,
                            evalue,
                            frames: vec![Frame { line: line_no }],
                        });
                    },
                }
            }

            if stmt == "breakpoint()" {
                return RuntimeOutcome::DebuggerQuit;
            }

            if let Some(inner) = stmt.strip_prefix("print(").and_then(|s| s.strip_suffix(')')) {
                match eval(inner, ns) {
                    Ok(_) => {
                        last_value = None;
                        continue;
                    },
                    Err(exc) => {
                        return RuntimeOutcome::Exception(ExceptionTriple {
                            frames: vec![Frame { line: line_no }],
                            ..exc
                        });
                    },
                }
            }

            if let Some((name, expr)) = split_assignment(stmt) {
                match eval(expr, ns) {
                    Ok(value) => {
                        ns.set(name, value);
                        last_value = None;
                    },
                    Err(exc) => {
                        return RuntimeOutcome::Exception(ExceptionTriple {
                            frames: vec![Frame { line: line_no }],
                            ..exc
                        });
                    },
                }
                continue;
            }

            match eval(stmt, ns) {
                Ok(value) => last_value = Some(value),
                Err(exc) => {
                    return RuntimeOutcome::Exception(ExceptionTriple {
                        frames: vec![Frame { line: line_no }],
                        ..exc
                    });
                },
            }
        }

        if unit.mode() == Mode::Single {
            RuntimeOutcome::Ok(last_value)
        } else {
            // `exec` mode never surfaces a bare expression's value.
            RuntimeOutcome::Ok(None)
        }
    }
}

enum RaiseKind {
    SystemExit(i32),
    KeyboardInterrupt,
    Other(String, String),
}

fn parse_raise(rest: &str) -> RaiseKind {
    let rest = rest.trim();
    if let Some(args) = rest.strip_prefix("SystemExit").map(str::trim) {
        let code = args
            .trim_start_matches('(')
            .trim_end_matches(')')
            .trim()
            .parse::<i32>()
            .unwrap_or(0);
        return RaiseKind::SystemExit(code);
    }
    if rest == "KeyboardInterrupt" {
        return RaiseKind::KeyboardInterrupt;
    }
    RaiseKind::Other("RuntimeError".to_string(), rest.to_string())
}

fn split_assignment(stmt: &str) -> Option<(&str, &str)> {
    let pos = stmt.find('=')?;
    // Don't treat `==` (or the start of `!=`/`<=`/`>=`) as assignment.
    if stmt.as_bytes().get(pos + 1) == Some(&b'=') {
        return None;
    }
    let name = stmt[..pos].trim();
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    if name.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(true) {
        return None;
    }
    Some((name, stmt[pos + 1..].trim()))
}

type EvalResult = Result<Value, ExceptionTriple>;

fn eval(expr: &str, ns: &dyn Namespace) -> EvalResult {
    let mut parser = ExprParser {
        tokens: tokenize(expr),
        pos: 0,
    };
    let value = parser.parse_expr(ns)?;
    if parser.pos != parser.tokens.len() {
        return Err(exc("SyntaxError", &format!("could not parse: {expr}")));
    }
    Ok(value)
}

fn exc(ename: &str, evalue: &str) -> ExceptionTriple {
    ExceptionTriple {
        ename: ename.to_string(),
        evalue: evalue.to_string(),
        frames: Vec::new(),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Int(i64),
    Str(String),
    Bool(bool),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(expr: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            },
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            },
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            },
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            },
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            },
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            },
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            },
            '\'' | '"' => {
                let quote = c;
                chars.next();
                let mut s = String::new();
                for c2 in chars.by_ref() {
                    if c2 == quote {
                        break;
                    }
                    s.push(c2);
                }
                tokens.push(Token::Str(s));
            },
            c if c.is_ascii_digit() => {
                let mut s = String::new();
                while let Some(&c2) = chars.peek() {
                    if c2.is_ascii_digit() {
                        s.push(c2);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Int(s.parse().unwrap_or(0)));
            },
            c if c.is_alphabetic() || c == '_' => {
                let mut s = String::new();
                while let Some(&c2) = chars.peek() {
                    if c2.is_alphanumeric() || c2 == '_' {
                        s.push(c2);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match s.as_str() {
                    "True" => tokens.push(Token::Bool(true)),
                    "False" => tokens.push(Token::Bool(false)),
                    _ => tokens.push(Token::Ident(s)),
                }
            },
            _ => {
                chars.next();
            },
        }
    }
    tokens
}

struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl ExprParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn parse_expr(&mut self, ns: &dyn Namespace) -> EvalResult {
        let mut left = self.parse_term(ns)?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    let right = self.parse_term(ns)?;
                    left = add(left, right)?;
                },
                Some(Token::Minus) => {
                    self.pos += 1;
                    let right = self.parse_term(ns)?;
                    left = sub(left, right)?;
                },
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_term(&mut self, ns: &dyn Namespace) -> EvalResult {
        let mut left = self.parse_factor(ns)?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    let right = self.parse_factor(ns)?;
                    left = mul(left, right)?;
                },
                Some(Token::Slash) => {
                    self.pos += 1;
                    let right = self.parse_factor(ns)?;
                    left = div(left, right)?;
                },
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_factor(&mut self, ns: &dyn Namespace) -> EvalResult {
        match self.tokens.get(self.pos).cloned() {
            Some(Token::Int(n)) => {
                self.pos += 1;
                Ok(Value::Int(n))
            },
            Some(Token::Str(s)) => {
                self.pos += 1;
                Ok(Value::Str(s))
            },
            Some(Token::Bool(b)) => {
                self.pos += 1;
                Ok(Value::Bool(b))
            },
            Some(Token::Ident(name)) => {
                self.pos += 1;
                ns.get(&name)
                    .cloned()
                    .ok_or_else(|| exc("NameError", &format!("name '{name}' is not defined")))
            },
            Some(Token::Minus) => {
                self.pos += 1;
                match self.parse_factor(ns)? {
                    Value::Int(n) => Ok(Value::Int(-n)),
                    other => Err(exc(
                        "TypeError",
                        &format!("bad operand type for unary -: {other}"),
                    )),
                }
            },
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.parse_expr(ns)?;
                match self.peek() {
                    Some(Token::RParen) => {
                        self.pos += 1;
                        Ok(inner)
                    },
                    _ => Err(exc("SyntaxError", "expected ')'")),
                }
            },
            _ => Err(exc("SyntaxError", "unexpected end of expression")),
        }
    }
}

fn add(a: Value, b: Value) -> EvalResult {
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a + b)),
        (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
        (a, b) => Err(exc(
            "TypeError",
            &format!("unsupported operand type(s) for +: {a} and {b}"),
        )),
    }
}

fn sub(a: Value, b: Value) -> EvalResult {
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a - b)),
        (a, b) => Err(exc(
            "TypeError",
            &format!("unsupported operand type(s) for -: {a} and {b}"),
        )),
    }
}

fn mul(a: Value, b: Value) -> EvalResult {
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a * b)),
        (a, b) => Err(exc(
            "TypeError",
            &format!("unsupported operand type(s) for *: {a} and {b}"),
        )),
    }
}

fn div(a: Value, b: Value) -> EvalResult {
    match (a, b) {
        (Value::Int(_), Value::Int(0)) => Err(exc("ZeroDivisionError", "division by zero")),
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a / b)),
        (a, b) => Err(exc(
            "TypeError",
            &format!("unsupported operand type(s) for /: {a} and {b}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Compiler;
    use crate::compiler::OriginTag;
    use crate::namespace::UserNamespace;

    fn compile(source: &str, origin: &str, mode: Mode) -> CompiledUnit {
        match Compiler::new().compile(source, OriginTag::parse(origin), mode) {
            crate::compiler::CompileOutcome::Complete(unit) => unit,
            other => panic!("expected Complete, got {other:?}"),
        }
    }

    #[test]
    fn assignment_then_expression_surfaces_last_value() {
        let mut ns = UserNamespace::new();
        let mut rt = ExprRuntime::new();

        let unit = compile("x = 1", "<stdin>", Mode::Single);
        assert_eq!(rt.execute(&unit, &mut ns), RuntimeOutcome::Ok(None));

        let unit = compile("x+1", "<stdin>", Mode::Single);
        assert_eq!(rt.execute(&unit, &mut ns), RuntimeOutcome::Ok(Some(Value::Int(2))));
    }

    #[test]
    fn division_by_zero_reports_line_within_unit() {
        let mut ns = UserNamespace::new();
        let mut rt = ExprRuntime::new();
        let unit = compile("a=1\nb=1/0\n", "ex.py+10", Mode::Exec);
        match rt.execute(&unit, &mut ns) {
            RuntimeOutcome::Exception(exc) => {
                assert_eq!(exc.ename, "ZeroDivisionError");
                assert_eq!(exc.frames, vec![Frame { line: 2 }]);
            },
            other => panic!("expected Exception, got {other:?}"),
        }
    }

    #[test]
    fn raise_system_exit_carries_code() {
        let mut ns = UserNamespace::new();
        let mut rt = ExprRuntime::new();
        let unit = compile("raise SystemExit(7)", "<cell>", Mode::Exec);
        assert_eq!(rt.execute(&unit, &mut ns), RuntimeOutcome::SystemExit(7));
    }

    #[test]
    fn unbound_name_is_name_error() {
        let mut ns = UserNamespace::new();
        let mut rt = ExprRuntime::new();
        let unit = compile("y", "<stdin>", Mode::Single);
        match rt.execute(&unit, &mut ns) {
            RuntimeOutcome::Exception(exc) => assert_eq!(exc.ename, "NameError"),
            other => panic!("expected Exception, got {other:?}"),
        }
    }
}
