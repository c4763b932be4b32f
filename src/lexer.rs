use crate::bindings::{Bindings, BindingKind};
use crate::builtin;
use crate::node::{Callable, ClosureCallable, InfixOp};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use std::cell::Cell;
use std::rc::Rc;

// Maximal-munch patterns for the two variable-length token classes, the same
// anchored-regex approach the teacher's `lexeme::Pattern` uses for its own
// terminals, cached once per process instead of per lexer instance.
static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?").unwrap()
});
static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*").unwrap());

pub(crate) enum Token<'a> {
    End,
    Number(f64),
    Variable(&'a Cell<f64>),
    Function {
        arity: usize,
        pure: bool,
        callable: Callable,
    },
    Closure {
        arity: usize,
        pure: bool,
        callable: ClosureCallable,
        context: Rc<dyn std::any::Any>,
    },
    Infix(InfixOp),
    Open,
    Close,
    Sep,
    Error,
}

/// A single-pass scanner over the input string. `next` overwrites whatever
/// token was previously produced; the caller is expected to hold onto at
/// most one [`Token`] at a time, exactly like the original's `next_token`.
pub(crate) struct Lexer<'b, 'a> {
    input: &'b [u8],
    pos: usize,
    token_start: usize,
    bindings: &'b Bindings<'a>,
}

impl<'b, 'a> Lexer<'b, 'a> {
    pub(crate) fn new(input: &'b str, bindings: &'b Bindings<'a>) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
            token_start: 0,
            bindings,
        }
    }

    /// Byte offset where the token last produced by [`Self::next`] began
    /// (after any leading whitespace was skipped); used to report the error
    /// position when the parser gives up on that token.
    pub(crate) fn token_start(&self) -> usize {
        self.token_start
    }

    pub(crate) fn next(&mut self) -> Token<'a> {
        loop {
            let Some(&b) = self.input.get(self.pos) else {
                self.token_start = self.pos;
                return Token::End;
            };

            if matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
                self.pos += 1;
                continue;
            }

            self.token_start = self.pos;

            if b.is_ascii_digit() || b == b'.' {
                let m = NUMBER.find(&self.input[self.pos..]).expect("digit/dot must match NUMBER");
                let text = std::str::from_utf8(&self.input[self.pos..self.pos + m.end()]).unwrap();
                let value: f64 = match text.parse() {
                    Ok(v) => v,
                    Err(_) => return Token::Error,
                };
                self.pos += m.end();
                return Token::Number(value);
            }

            if b.is_ascii_alphabetic() {
                let m = IDENTIFIER
                    .find(&self.input[self.pos..])
                    .expect("alphabetic must match IDENTIFIER");
                let name =
                    std::str::from_utf8(&self.input[self.pos..self.pos + m.end()]).unwrap();
                self.pos += m.end();
                return self.resolve_identifier(name);
            }

            self.pos += 1;
            return match b {
                b'+' => Token::Infix(InfixOp::Add),
                b'-' => Token::Infix(InfixOp::Sub),
                b'*' => Token::Infix(InfixOp::Mul),
                b'/' => Token::Infix(InfixOp::Div),
                b'^' => Token::Infix(InfixOp::Pow),
                b'%' => Token::Infix(InfixOp::Mod),
                b'(' => Token::Open,
                b')' => Token::Close,
                b',' => Token::Sep,
                _ => Token::Error,
            };
        }
    }

    /// First match wins: the caller's bindings are searched (in registration
    /// order) before the built-in table, which is the only mechanism a
    /// caller has to shadow a built-in name.
    fn resolve_identifier(&self, name: &str) -> Token<'a> {
        if let Some(binding) = self.bindings.find(name) {
            return match &binding.kind {
                BindingKind::Variable(cell) => Token::Variable(cell),
                BindingKind::Function { arity, pure, func } => Token::Function {
                    arity: *arity,
                    pure: *pure,
                    callable: Callable::User(func.clone()),
                },
                BindingKind::Closure {
                    arity,
                    pure,
                    func,
                    context,
                } => Token::Closure {
                    arity: *arity,
                    pure: *pure,
                    callable: func.clone(),
                    context: context.clone(),
                },
            };
        }

        match builtin::find(name) {
            Some(entry) => Token::Function {
                arity: entry.kind.arity(),
                pure: true,
                callable: Callable::Builtin(entry.kind),
            },
            None => Token::Error,
        }
    }
}
