use crate::bindings::Bindings;
use crate::error::CompileError;
use crate::lexer::{Lexer, Token};
use crate::node::{Callable, InfixOp, Node};

pub(crate) struct Parser<'b, 'a> {
    lexer: Lexer<'b, 'a>,
    current: Token<'a>,
    current_start: usize,
    error: bool,
}

impl<'b, 'a> Parser<'b, 'a> {
    pub(crate) fn new(input: &'b str, bindings: &'b Bindings<'a>) -> Self {
        let mut lexer = Lexer::new(input, bindings);
        let current = lexer.next();
        let current_start = lexer.token_start();
        Self {
            lexer,
            current,
            current_start,
            error: false,
        }
    }

    fn advance(&mut self) {
        self.current = self.lexer.next();
        self.current_start = self.lexer.token_start();
    }

    /// Give up on whatever token is current; its start position is the one
    /// reported to the caller, matching the original's habit of blaming the
    /// token the parser was looking at rather than wherever the scanner has
    /// since wandered off to.
    fn fail<T>(&mut self) -> Result<T, ()> {
        self.error = true;
        Err(())
    }

    /// Parse the whole input and confirm every byte was consumed.
    pub(crate) fn parse(mut self) -> Result<Node<'a>, CompileError> {
        match self.list() {
            Ok(root) if !self.error && matches!(self.current, Token::End) => Ok(root),
            _ => Err(CompileError::new(
                self.current_start,
                "unexpected token while parsing expression",
            )),
        }
    }

    /// `list = expr {"," expr}` — a comma at top level joins two expressions
    /// into a "discard left, keep right" node; it is not an argument
    /// separator (those are consumed directly inside `base`).
    fn list(&mut self) -> Result<Node<'a>, ()> {
        let mut ret = self.expr()?;
        while matches!(self.current, Token::Sep) {
            self.advance();
            let rhs = self.expr()?;
            ret = Node::Call {
                callable: Callable::Binary(InfixOp::Comma),
                pure: ret.is_pure() && rhs.is_pure(),
                children: vec![ret, rhs],
            };
        }
        Ok(ret)
    }

    /// `expr = term {("+" | "-") term}`
    fn expr(&mut self) -> Result<Node<'a>, ()> {
        let mut ret = self.term()?;
        while let Token::Infix(op) = self.current {
            if !op.is_additive() {
                break;
            }
            self.advance();
            let rhs = self.term()?;
            ret = Node::Call {
                pure: ret.is_pure() && rhs.is_pure(),
                callable: Callable::Binary(op),
                children: vec![ret, rhs],
            };
        }
        Ok(ret)
    }

    /// `term = factor {("*" | "/" | "%") factor}`
    fn term(&mut self) -> Result<Node<'a>, ()> {
        let mut ret = self.factor()?;
        while let Token::Infix(op @ (InfixOp::Mul | InfixOp::Div | InfixOp::Mod)) = self.current {
            self.advance();
            let rhs = self.factor()?;
            ret = Node::Call {
                pure: ret.is_pure() && rhs.is_pure(),
                callable: Callable::Binary(op),
                children: vec![ret, rhs],
            };
        }
        Ok(ret)
    }

    /// `factor = power {"^" power}`.
    ///
    /// Associativity is a compile-time choice (Cargo feature
    /// `pow-right-assoc`); the two bodies below correspond 1:1 to the
    /// original's `#ifdef TE_POW_FROM_RIGHT` branches.
    #[cfg(not(feature = "pow-right-assoc"))]
    fn factor(&mut self) -> Result<Node<'a>, ()> {
        let mut ret = self.power()?;
        while matches!(self.current, Token::Infix(InfixOp::Pow)) {
            self.advance();
            let rhs = self.power()?;
            ret = Node::Call {
                pure: ret.is_pure() && rhs.is_pure(),
                callable: Callable::Binary(InfixOp::Pow),
                children: vec![ret, rhs],
            };
        }
        Ok(ret)
    }

    #[cfg(feature = "pow-right-assoc")]
    fn factor(&mut self) -> Result<Node<'a>, ()> {
        let first = self.power()?;

        // If the base carried a leading unary negation, unwrap it: the
        // negation applies once, at the end, around the whole "^" chain.
        let (mut base, negated) = match first {
            Node::Call { callable: Callable::Negate, mut children, .. } => {
                (children.pop().unwrap(), true)
            }
            other => (other, false),
        };

        if matches!(self.current, Token::Infix(InfixOp::Pow)) {
            // Collect the right-hand chain of powers, then fold it
            // right-to-left: a^b^c == a^(b^c).
            let mut rhs_chain = Vec::new();
            while matches!(self.current, Token::Infix(InfixOp::Pow)) {
                self.advance();
                rhs_chain.push(self.power()?);
            }
            let mut folded = rhs_chain.pop().unwrap();
            while let Some(next) = rhs_chain.pop() {
                folded = Node::Call {
                    pure: next.is_pure() && folded.is_pure(),
                    callable: Callable::Binary(InfixOp::Pow),
                    children: vec![next, folded],
                };
            }
            base = Node::Call {
                pure: base.is_pure() && folded.is_pure(),
                callable: Callable::Binary(InfixOp::Pow),
                children: vec![base, folded],
            };
        }

        if negated {
            base = Node::Call {
                pure: base.is_pure(),
                callable: Callable::Negate,
                children: vec![base],
            };
        }

        Ok(base)
    }

    /// `power = {("+" | "-")} base`
    fn power(&mut self) -> Result<Node<'a>, ()> {
        let mut negative = false;
        while let Token::Infix(op @ (InfixOp::Add | InfixOp::Sub)) = self.current {
            if op == InfixOp::Sub {
                negative = !negative;
            }
            self.advance();
        }

        let ret = self.base()?;
        if negative {
            Ok(Node::Call {
                pure: ret.is_pure(),
                callable: Callable::Negate,
                children: vec![ret],
            })
        } else {
            Ok(ret)
        }
    }

    /// `base = NUMBER | VARIABLE | FUNCTION0 ["(" ")"] | FUNCTION1 power
    ///       | FUNCTIONk "(" expr ("," expr){k-1} ")"  (k >= 2)
    ///       | CLOSUREk analogous to FUNCTIONk
    ///       | "(" list ")"`
    fn base(&mut self) -> Result<Node<'a>, ()> {
        match std::mem::replace(&mut self.current, Token::End) {
            Token::Number(v) => {
                self.advance();
                Ok(Node::Constant(v))
            }
            Token::Variable(cell) => {
                self.advance();
                Ok(Node::Variable(cell))
            }
            Token::Function { arity: 0, pure, callable } => {
                self.advance();
                if matches!(self.current, Token::Open) {
                    self.advance();
                    if !matches!(self.current, Token::Close) {
                        return self.fail();
                    }
                    self.advance();
                }
                Ok(Node::Call { callable, pure, children: Vec::new() })
            }
            Token::Function { arity: 1, pure, callable } => {
                self.advance();
                let arg = self.power()?;
                Ok(Node::Call { callable, pure, children: vec![arg] })
            }
            Token::Function { arity, pure, callable } => {
                self.advance();
                let children = self.call_arguments(arity)?;
                Ok(Node::Call { callable, pure, children })
            }
            Token::Closure { arity: 0, pure, callable, context } => {
                self.advance();
                if matches!(self.current, Token::Open) {
                    self.advance();
                    if !matches!(self.current, Token::Close) {
                        return self.fail();
                    }
                    self.advance();
                }
                Ok(Node::Closure { callable, context, pure, children: Vec::new() })
            }
            Token::Closure { arity: 1, pure, callable, context } => {
                self.advance();
                let arg = self.power()?;
                Ok(Node::Closure { callable, context, pure, children: vec![arg] })
            }
            Token::Closure { arity, pure, callable, context } => {
                self.advance();
                let children = self.call_arguments(arity)?;
                Ok(Node::Closure { callable, context, pure, children })
            }
            Token::Open => {
                self.advance();
                let ret = self.list()?;
                if !matches!(self.current, Token::Close) {
                    return self.fail();
                }
                self.advance();
                Ok(ret)
            }
            _ => self.fail(),
        }
    }

    /// Parse the `"(" expr ("," expr){arity-1} ")"` tail shared by every
    /// function/closure of arity >= 2.
    fn call_arguments(&mut self, arity: usize) -> Result<Vec<Node<'a>>, ()> {
        if !matches!(self.current, Token::Open) {
            return self.fail();
        }
        self.advance();

        let mut children = Vec::with_capacity(arity);
        for i in 0..arity {
            children.push(self.expr()?);
            if i + 1 < arity {
                if !matches!(self.current, Token::Sep) {
                    return self.fail();
                }
                self.advance();
            }
        }

        if !matches!(self.current, Token::Close) {
            return self.fail();
        }
        self.advance();
        Ok(children)
    }
}
